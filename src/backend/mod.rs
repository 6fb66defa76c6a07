//! Access to the remote chatbot backend.
//!
//! The backend owns session records, transcripts and the agent itself. Every
//! call reports failure explicitly; deciding what the user sees when a call
//! fails is left to the caller.

mod http;

pub use http::HttpBackend;

use async_trait::async_trait;

use crate::core::error::BackendError;
use crate::core::message::Message;
use crate::core::session::SessionSummary;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Sessions belonging to the configured user.
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError>;

    /// Full transcript of a persisted session, oldest exchange first.
    async fn fetch_messages(&self, db_id: i64) -> Result<Vec<Message>, BackendError>;

    /// Sends one user message and returns the agent's reply. The backend may
    /// create the session record if it does not know the token yet.
    async fn send_message(&self, session_token: &str, text: &str) -> Result<String, BackendError>;
}
