mod commands;
mod config;
mod format;
mod store;
mod tracing_setup;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use todo_onchain_core::{KeypairWallet, TodoClient, TodoSession};

use crate::commands::{execute, parse_command, CommandResult};
use crate::config::{KeypairSource, ReplConfig, Settings};
use crate::format::{format_todo_list, print_error_raw, print_separator_raw, print_system_raw, prompt};

pub(crate) const CYAN: &str = "\x1b[36m";
pub(crate) const GREEN: &str = "\x1b[32m";
pub(crate) const YELLOW: &str = "\x1b[33m";
pub(crate) const RED: &str = "\x1b[31m";
pub(crate) const WHITE_BOLD: &str = "\x1b[1;37m";
pub(crate) const DIM: &str = "\x1b[2m";
pub(crate) const RESET: &str = "\x1b[0m";

const KEYPAIR_ENV: &str = "TODO_ONCHAIN_KEYPAIR";

#[derive(Parser, Debug)]
#[command(name = "todo-onchain-repl")]
#[command(about = "Interactive client for the on-chain todo program")]
struct Args {
    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hex-encoded secret key (prefer TODO_ONCHAIN_KEYPAIR env var)
    #[arg(long)]
    keypair: Option<String>,

    /// Program id to talk to (base58)
    #[arg(long)]
    program_id: Option<String>,

    /// Ledger snapshot file
    #[arg(long)]
    ledger: Option<PathBuf>,
}

fn load_wallet(source: &KeypairSource) -> Result<KeypairWallet> {
    match source {
        KeypairSource::Hex(secret) => {
            KeypairWallet::from_secret_hex(secret).context("Invalid keypair")
        }
        KeypairSource::File(path) => store::load_or_create_keypair(path),
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_setup::init_tracing();
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => ReplConfig::load(path)?,
        None => ReplConfig::load_default()?,
    };
    let settings = Settings::resolve(
        file_config,
        args.program_id,
        args.keypair,
        std::env::var(KEYPAIR_ENV).ok(),
        args.ledger,
    )?;

    let wallet = Arc::new(load_wallet(&settings.keypair)?);
    let ledger = Arc::new(store::load_ledger(
        &settings.ledger_path,
        settings.core.program_id,
    )?);
    let client = TodoClient::new(ledger.clone(), wallet.clone(), &settings.core);
    let session = TodoSession::new(client);

    tracing::info!(
        identity = %wallet.pubkey(),
        program_id = %settings.core.program_id,
        ledger = %settings.ledger_path.display(),
        "starting session"
    );

    println!("{}", print_separator_raw());
    println!(
        "{}",
        print_system_raw(&format!("Connected as {}. Type /help for commands.", wallet.pubkey()))
    );
    session.identity_changed().await;
    print_lines(&format_todo_list(&session.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", prompt(&session.snapshot()));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", print_error_raw(&e));
                continue;
            }
        };

        let is_write = command.is_write();
        match execute(command, &session, &wallet).await {
            CommandResult::Lines(output) => print_lines(&output),
            CommandResult::Quit => break,
        }

        if is_write {
            if let Err(e) = store::save_ledger(&settings.ledger_path, &ledger) {
                tracing::error!(error = %e, "failed to persist ledger");
                println!("{}", print_error_raw(&format!("{e:#}")));
            }
        }
    }

    store::save_ledger(&settings.ledger_path, &ledger)?;
    Ok(())
}
