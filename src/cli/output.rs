use crate::core::message::Message;
use crate::core::session::SessionSummary;

pub const APP_TITLE: &str = "Holiya Medical AI Agent";
pub const SIDEBAR_TITLE: &str = "Holiya Medical AI";
pub const SESSIONS_HEADING: &str = "Chat Sessions";
pub const NEW_SESSION_LABEL: &str = "\u{2795} Start New Session";
pub const NO_SESSION_HINT: &str = "Create or select a chat session from the sidebar.";
pub const THINKING: &str = "Holiya Agent is thinking...";
pub const USER_LABEL: &str = "You:";
pub const AI_LABEL: &str = "Holiya AI:";

pub fn session_caption(token: &str) -> String {
    format!("Session ID: {token}")
}

/// Plain-text rendering of one exchange, user block first.
pub fn format_exchange(msg: &Message) -> String {
    format!(
        "\x1b[32;1m{USER_LABEL}\x1b[0m {}\n\x1b[36;1m{AI_LABEL}\x1b[0m {}",
        msg.user_text, msg.ai_text
    )
}

pub fn format_session_list(sessions: &[SessionSummary], current_db_id: Option<i64>) -> Vec<String> {
    sessions
        .iter()
        .map(|s| {
            let marker = if Some(s.db_id) == current_db_id { " *" } else { "" };
            format!("  {}{marker}", s.label())
        })
        .collect()
}
