//! On-disk persistence for the simulated ledger and the local keypair.

use std::path::Path;

use anyhow::{Context, Result};
use todo_onchain_core::ledger::LedgerSnapshot;
use todo_onchain_core::{Address, InMemoryLedger, KeypairWallet};

pub(crate) fn load_ledger(path: &Path, program_id: Address) -> Result<InMemoryLedger> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // First run - start from an empty ledger
            return Ok(InMemoryLedger::new(program_id));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read ledger: {}", path.display()))
        }
    };

    let snapshot: LedgerSnapshot = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse ledger: {}", path.display()))?;
    if snapshot.program_id != program_id {
        anyhow::bail!(
            "Ledger at {} belongs to program {}, not {}",
            path.display(),
            snapshot.program_id,
            program_id
        );
    }
    Ok(InMemoryLedger::from_snapshot(snapshot)?)
}

pub(crate) fn save_ledger(path: &Path, ledger: &InMemoryLedger) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&ledger.snapshot()).context("Failed to serialize ledger")?;
    std::fs::write(path, json).with_context(|| format!("Failed to save ledger: {}", path.display()))
}

/// Load the hex secret at `path`, generating and saving a new one if absent
pub(crate) fn load_or_create_keypair(path: &Path) -> Result<KeypairWallet> {
    match std::fs::read_to_string(path) {
        Ok(secret) => Ok(KeypairWallet::from_secret_hex(&secret)
            .with_context(|| format!("Invalid keypair file: {}", path.display()))?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let wallet = KeypairWallet::generate();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, wallet.secret_hex())
                .with_context(|| format!("Failed to save keypair: {}", path.display()))?;
            tracing::info!(path = %path.display(), "generated new keypair");
            Ok(wallet)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read keypair: {}", path.display())),
    }
}
