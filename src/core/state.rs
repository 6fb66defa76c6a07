//! Client-local session state.
//!
//! `ChatState` is a plain value: every transition replaces whole fields and
//! performs no I/O, so handlers can be tested without a backend or terminal.

use crate::core::message::Message;
use crate::core::session::Session;

/// What the main view should show.
#[derive(Debug, PartialEq, Eq)]
pub enum View<'a> {
    NoSession,
    Active(&'a Session),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChatState {
    active: Option<Session>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active session with a fresh, not-yet-persisted one and
    /// returns its token.
    pub fn start_new(&mut self) -> &str {
        let session = self.active.insert(Session::new());
        &session.session_token
    }

    /// Switches to a backend session, replacing the transcript wholesale.
    pub fn select_existing(&mut self, db_id: i64, session_token: String, messages: Vec<Message>) {
        self.active = Some(Session::existing(db_id, session_token, messages));
    }

    /// Appends one exchange. Returns `false` when there is no session to append to.
    pub fn append_exchange(&mut self, user_text: String, ai_text: String) -> bool {
        match self.active.as_mut() {
            Some(session) => {
                session.messages.push(Message {
                    user_text,
                    ai_text,
                });
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> View<'_> {
        match &self.active {
            Some(session) => View::Active(session),
            None => View::NoSession,
        }
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.session_token.as_str())
    }

    pub fn current_chat_db_id(&self) -> Option<i64> {
        self.active.as_ref().and_then(|s| s.db_id)
    }

    pub fn messages(&self) -> &[Message] {
        self.active
            .as_ref()
            .map(|s| s.messages.as_slice())
            .unwrap_or_default()
    }
}

/// Returns the input unchanged unless it is blank. Whitespace only decides
/// whether anything is sent; the text itself is sent and stored as typed.
pub fn submittable_input(input: &str) -> Option<&str> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input)
    }
}
