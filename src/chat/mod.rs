//! Interaction handlers.
//!
//! Each method corresponds to one user action. Backend calls are awaited one
//! after another, and any failure is logged and replaced with a safe default
//! so the UI never sees an error.

use std::sync::Arc;

use crate::backend::Backend;
use crate::core::message::Message;
use crate::core::session::SessionSummary;
use crate::core::state::{submittable_input, ChatState};

/// Shown as the agent reply when the send call fails.
pub const UNREACHABLE_REPLY: &str = "\u{26A0}\u{FE0F} Unable to reach AI service.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was sent.
    Ignored,
    /// No session is active; nothing was sent.
    NoSession,
    /// The exchange that was appended to the transcript.
    Sent(Message),
}

pub struct Chat {
    backend: Arc<dyn Backend>,
    state: ChatState,
}

impl Chat {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: ChatState::new(),
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Current session list; empty when the backend is unreachable.
    pub async fn sessions(&self) -> Vec<SessionSummary> {
        match self.backend.list_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list sessions");
                Vec::new()
            }
        }
    }

    pub fn new_session(&mut self) -> String {
        let token = self.state.start_new().to_string();
        tracing::info!(session_id = %token, "started new session");
        token
    }

    /// Switches to a persisted session and reloads its transcript.
    pub async fn open_session(&mut self, summary: &SessionSummary) {
        let messages = match self.backend.fetch_messages(summary.db_id).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(db_id = summary.db_id, error = %e, "failed to fetch messages");
                Vec::new()
            }
        };
        tracing::info!(
            db_id = summary.db_id,
            messages = messages.len(),
            "opened session"
        );
        self.state
            .select_existing(summary.db_id, summary.session_token.clone(), messages);
    }

    /// Opens the session with the given record id if the backend lists it.
    pub async fn open_session_by_id(&mut self, db_id: i64) -> Option<SessionSummary> {
        let summary = self.sessions().await.into_iter().find(|s| s.db_id == db_id)?;
        self.open_session(&summary).await;
        Some(summary)
    }

    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        let Some(text) = submittable_input(input).map(str::to_string) else {
            return SubmitOutcome::Ignored;
        };
        let Some(token) = self.state.current_session_id().map(str::to_string) else {
            return SubmitOutcome::NoSession;
        };

        let reply = match self.backend.send_message(&token, &text).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(session_id = %token, error = %e, "failed to send message");
                UNREACHABLE_REPLY.to_string()
            }
        };

        self.state.append_exchange(text.clone(), reply.clone());
        SubmitOutcome::Sent(Message::new(text, reply))
    }
}

#[cfg(test)]
mod tests;
