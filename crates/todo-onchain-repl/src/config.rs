use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use todo_onchain_core::{Address, CoreConfig};

const APP_DIR: &str = "todo-onchain";

/// REPL configuration that can be loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplConfig {
    /// Program id (base58) the session talks to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) program_id: Option<String>,

    /// Hex-encoded 32-byte secret key of the wallet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) keypair: Option<String>,

    /// Where the simulated ledger is persisted between runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) ledger_path: Option<PathBuf>,
}

impl ReplConfig {
    /// Load config from a JSON file
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ReplConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the default config file if there is one, otherwise an empty config
    pub(crate) fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

pub(crate) fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
}

/// Directory for the ledger snapshot and the generated keypair
pub(crate) fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Where the wallet secret comes from, in order of precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeypairSource {
    Hex(String),
    File(PathBuf),
}

/// Fully resolved settings for one REPL run
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) core: CoreConfig,
    pub(crate) keypair: KeypairSource,
    pub(crate) ledger_path: PathBuf,
}

impl Settings {
    /// Command-line values win over the environment, which wins over the config file
    pub(crate) fn resolve(
        config: ReplConfig,
        program_id: Option<String>,
        keypair: Option<String>,
        keypair_env: Option<String>,
        ledger_path: Option<PathBuf>,
    ) -> Result<Self> {
        let core = match program_id.or(config.program_id) {
            Some(id) => {
                let program_id: Address = id
                    .parse()
                    .with_context(|| format!("Invalid program id: {id}"))?;
                CoreConfig::new(program_id)
            }
            None => CoreConfig::default(),
        };

        let keypair = keypair
            .or(keypair_env.filter(|k| !k.is_empty()))
            .or(config.keypair)
            .map(KeypairSource::Hex)
            .unwrap_or_else(|| KeypairSource::File(data_dir().join("id.hex")));

        let ledger_path = ledger_path
            .or(config.ledger_path)
            .unwrap_or_else(|| data_dir().join("ledger.json"));

        Ok(Self {
            core,
            keypair,
            ledger_path,
        })
    }
}
