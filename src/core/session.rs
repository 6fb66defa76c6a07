use serde::{Deserialize, Serialize};

use crate::core::message::Message;

/// Characters of the session token shown in picker labels.
const TOKEN_PREFIX_LEN: usize = 8;

/// A backend-persisted session as returned by the session list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(rename = "chat_session_id")]
    pub db_id: i64,
    #[serde(rename = "session_id")]
    pub session_token: String,
}

impl SessionSummary {
    pub fn new(db_id: i64, session_token: impl Into<String>) -> Self {
        Self {
            db_id,
            session_token: session_token.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("Session {} \u{2014} {}", self.db_id, token_prefix(&self.session_token))
    }
}

/// The conversation currently shown in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Absent until the backend has stored the first exchange.
    pub db_id: Option<i64>,
    pub session_token: String,
    pub messages: Vec<Message>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            db_id: None,
            session_token: uuid::Uuid::new_v4().to_string(),
            messages: Vec::new(),
        }
    }

    pub fn existing(db_id: i64, session_token: String, messages: Vec<Message>) -> Self {
        Self {
            db_id: Some(db_id),
            session_token,
            messages,
        }
    }

    pub fn is_new(&self) -> bool {
        self.db_id.is_none()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub fn token_prefix(token: &str) -> &str {
    match token.char_indices().nth(TOKEN_PREFIX_LEN) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}
