use std::sync::Arc;

use todo_onchain_core::{KeypairWallet, TodoSession, TodoSnapshot};

use crate::format::{
    format_notice, format_todo_list, print_error_raw, print_help_raw, print_system_raw,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Init,
    Add(String),
    Draft(Option<String>),
    Mark(u8),
    Remove(u8),
    List,
    Refresh,
    WhoAmI,
    Disconnect,
    Connect,
    Help,
    Quit,
}

impl Command {
    /// Whether running this command can change ledger state
    pub(crate) fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Init | Command::Add(_) | Command::Mark(_) | Command::Remove(_)
        )
    }
}

pub(crate) enum CommandResult {
    Lines(Vec<String>),
    Quit,
}

fn parse_idx(arg: Option<&str>, usage: &str) -> Result<u8, String> {
    let arg = arg.ok_or_else(|| format!("usage: {usage}"))?;
    arg.parse::<u8>()
        .map_err(|_| format!("invalid index '{arg}', expected 0-255"))
}

/// Parse one input line. Returns `Ok(None)` for blank input.
pub(crate) fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if !line.starts_with('/') {
        return Ok(Some(Command::Add(line.to_string())));
    }

    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, Some(rest.trim()).filter(|s| !s.is_empty())),
        None => (line, None),
    };

    let command = match cmd {
        "/init" => Command::Init,
        "/add" => Command::Add(arg.ok_or("usage: /add <text>")?.to_string()),
        "/draft" => Command::Draft(arg.map(str::to_string)),
        "/mark" => Command::Mark(parse_idx(arg, "/mark <idx>")?),
        "/remove" => Command::Remove(parse_idx(arg, "/remove <idx>")?),
        "/list" | "/ls" => Command::List,
        "/refresh" => Command::Refresh,
        "/whoami" => Command::WhoAmI,
        "/disconnect" => Command::Disconnect,
        "/connect" => Command::Connect,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" | "/q" => Command::Quit,
        other => return Err(format!("unknown command {other}, try /help")),
    };
    Ok(Some(command))
}

fn find_by_idx(snapshot: &TodoSnapshot, idx: u8) -> Option<todo_onchain_core::Address> {
    snapshot
        .incomplete
        .iter()
        .chain(snapshot.complete.iter())
        .find(|todo| todo.account.idx == idx)
        .map(|todo| todo.address)
}

fn drain_notices(session: &TodoSession, output: &mut Vec<String>) {
    output.extend(session.drain_notices().iter().map(format_notice));
}

// ─── Command Handlers ───────────────────────────────────────────────────────

pub(crate) async fn execute(
    command: Command,
    session: &TodoSession,
    wallet: &Arc<KeypairWallet>,
) -> CommandResult {
    let mut output = Vec::new();
    match command {
        Command::Init => {
            if session.snapshot().initialized {
                output.push(print_system_raw("Profile already initialized."));
            } else {
                session.initialize().await;
                drain_notices(session, &mut output);
            }
        }
        Command::Add(text) => {
            let snapshot = session.snapshot();
            if snapshot.identity.is_none() {
                output.push(print_system_raw("No wallet connected. Use /connect."));
                return CommandResult::Lines(output);
            }
            if !snapshot.initialized {
                output.push(print_system_raw("No profile yet. Use /init first."));
                return CommandResult::Lines(output);
            }
            session.set_draft(text);
            let added = session.add_item().await;
            drain_notices(session, &mut output);
            if added {
                output.extend(format_todo_list(&session.snapshot()));
            }
        }
        Command::Draft(Some(text)) => {
            session.set_draft(text);
            output.push(print_system_raw("Draft saved."));
        }
        Command::Draft(None) => {
            let draft = session.snapshot().draft;
            if draft.is_empty() {
                output.push(print_system_raw("Draft is empty."));
            } else {
                output.push(format!("draft: {draft}"));
            }
        }
        Command::Mark(idx) => {
            let snapshot = session.snapshot();
            match snapshot.incomplete.iter().find(|t| t.account.idx == idx) {
                Some(todo) => {
                    session.mark_item(todo.address, idx).await;
                    drain_notices(session, &mut output);
                    output.extend(format_todo_list(&session.snapshot()));
                }
                None if find_by_idx(&snapshot, idx).is_some() => {
                    output.push(print_system_raw(&format!("Todo {idx} is already done.")));
                }
                None => output.push(print_error_raw(&format!("no todo with index {idx}"))),
            }
        }
        Command::Remove(idx) => {
            let snapshot = session.snapshot();
            match snapshot.complete.iter().find(|t| t.account.idx == idx) {
                Some(todo) => {
                    session.remove_item(todo.address, idx).await;
                    drain_notices(session, &mut output);
                    output.extend(format_todo_list(&session.snapshot()));
                }
                None if find_by_idx(&snapshot, idx).is_some() => {
                    output.push(print_system_raw(&format!(
                        "Todo {idx} is still open. Mark it before removing."
                    )));
                }
                None => output.push(print_error_raw(&format!("no todo with index {idx}"))),
            }
        }
        Command::List => output.extend(format_todo_list(&session.snapshot())),
        Command::Refresh => {
            session.refresh().await;
            output.extend(format_todo_list(&session.snapshot()));
        }
        Command::WhoAmI => match session.identity() {
            Some(identity) => output.push(format!("{identity}")),
            None => output.push(print_system_raw("Not connected.")),
        },
        Command::Disconnect => {
            session.disconnect().await;
            output.push(print_system_raw("Wallet disconnected."));
        }
        Command::Connect => {
            session.connect(wallet.clone()).await;
            output.push(print_system_raw(&format!("Connected as {}", wallet.pubkey())));
            output.extend(format_todo_list(&session.snapshot()));
        }
        Command::Help => output.push(print_help_raw()),
        Command::Quit => return CommandResult::Quit,
    }
    CommandResult::Lines(output)
}
