use chrono::Local;
use todo_onchain_core::{Notice, NoticeLevel, ProgramAccount, TodoAccount, TodoSnapshot};

use crate::{CYAN, DIM, GREEN, RED, RESET, WHITE_BOLD, YELLOW};

pub(crate) fn print_error_raw(msg: &str) -> String {
    format!("{RED}error:{RESET} {msg}")
}

pub(crate) fn print_system_raw(msg: &str) -> String {
    format!("{DIM}{msg}{RESET}")
}

pub(crate) fn print_separator_raw() -> String {
    let time = Local::now().format("%H:%M").to_string();
    format!("{DIM}── {time} ────────────────────────────{RESET}")
}

pub(crate) fn print_help_raw() -> String {
    format!(
        "{WHITE_BOLD}Commands:{RESET}\n\
         \x20 /init                 Create your profile account\n\
         \x20 /add <text>           Add a todo (bare text works too)\n\
         \x20 /draft [text]         Show or set the draft without submitting\n\
         \x20 /mark <idx>           Mark an open todo as done\n\
         \x20 /remove <idx>         Remove a completed todo\n\
         \x20 /list                 Show cached todos\n\
         \x20 /refresh              Reload from the ledger\n\
         \x20 /whoami               Show the connected identity\n\
         \x20 /disconnect           Disconnect the wallet\n\
         \x20 /connect              Reconnect the local keypair\n\
         \x20 /help                 Show this help\n\
         \x20 /quit                 Exit"
    )
}

pub(crate) fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("{GREEN}✓{RESET} {}", notice.message),
        NoticeLevel::Error => match &notice.detail {
            Some(detail) => format!("{RED}✗{RESET} {} {DIM}({detail}){RESET}", notice.message),
            None => format!("{RED}✗{RESET} {}", notice.message),
        },
    }
}

fn format_todo(todo: &ProgramAccount<TodoAccount>) -> String {
    let check = if todo.account.marked {
        format!("{GREEN}[x]{RESET}")
    } else {
        "[ ]".to_string()
    };
    format!(
        "  {check} {CYAN}{:>3}{RESET}  {}",
        todo.account.idx, todo.account.content
    )
}

pub(crate) fn format_todo_list(snapshot: &TodoSnapshot) -> Vec<String> {
    let Some(identity) = snapshot.identity else {
        return vec![print_system_raw("No wallet connected. Use /connect.")];
    };
    if !snapshot.initialized {
        return vec![print_system_raw(&format!(
            "No profile for {identity}. Use /init to create one."
        ))];
    }

    let mut out = Vec::new();
    if snapshot.loading {
        out.push(format!("{YELLOW}loading…{RESET}"));
    }

    out.push(format!("{WHITE_BOLD}Todo ({}){RESET}", snapshot.incomplete.len()));
    if snapshot.incomplete.is_empty() {
        out.push(print_system_raw("  nothing to do"));
    }
    out.extend(snapshot.incomplete.iter().map(format_todo));

    out.push(format!("{WHITE_BOLD}Done ({}){RESET}", snapshot.complete.len()));
    if snapshot.complete.is_empty() {
        out.push(print_system_raw("  nothing done yet"));
    }
    out.extend(snapshot.complete.iter().map(format_todo));
    out
}

pub(crate) fn prompt(snapshot: &TodoSnapshot) -> String {
    let who = match snapshot.identity {
        Some(identity) => {
            let full = identity.to_string();
            full.chars().take(6).collect::<String>()
        }
        None => "offline".to_string(),
    };
    format!("{CYAN}{who}{RESET}> ")
}
