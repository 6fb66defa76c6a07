use super::*;
use crate::core::error::BackendError;
use crate::core::state::View;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct MockBackend {
    sessions: Option<Vec<SessionSummary>>,
    transcripts: HashMap<i64, Vec<Message>>,
    reply: Option<String>,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    fn unreachable() -> Self {
        Self::default()
    }

    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Default::default()
        }
    }

    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError> {
        self.sessions
            .clone()
            .ok_or_else(|| BackendError::Http("connection refused".into()))
    }

    async fn fetch_messages(&self, db_id: i64) -> Result<Vec<Message>, BackendError> {
        self.transcripts
            .get(&db_id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 404,
                message: "not found".into(),
            })
    }

    async fn send_message(&self, session_token: &str, text: &str) -> Result<String, BackendError> {
        self.sent
            .lock()
            .unwrap()
            .push((session_token.to_string(), text.to_string()));
        self.reply
            .clone()
            .ok_or_else(|| BackendError::Decode("missing field `ai_response`".into()))
    }
}

fn chat_with(backend: MockBackend) -> (Chat, Arc<MockBackend>) {
    let backend = Arc::new(backend);
    (Chat::new(backend.clone()), backend)
}

#[tokio::test]
async fn test_fresh_session_hello() {
    let (mut chat, backend) = chat_with(MockBackend::replying("hi there"));
    let token = chat.new_session();

    let outcome = chat.submit("hello").await;

    assert_eq!(outcome, SubmitOutcome::Sent(Message::new("hello", "hi there")));
    assert_eq!(chat.state().messages(), &[Message::new("hello", "hi there")]);
    assert_eq!(backend.sent(), vec![(token, "hello".to_string())]);
}

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let (mut chat, backend) = chat_with(MockBackend::replying("unused"));
    chat.new_session();

    for input in ["", "   ", "\n\t  "] {
        assert_eq!(chat.submit(input).await, SubmitOutcome::Ignored);
    }

    assert!(chat.state().messages().is_empty());
    assert!(backend.sent().is_empty());
}

#[tokio::test]
async fn test_submit_without_session_sends_nothing() {
    let (mut chat, backend) = chat_with(MockBackend::replying("unused"));

    assert_eq!(chat.submit("hello").await, SubmitOutcome::NoSession);
    assert_eq!(chat.state().view(), View::NoSession);
    assert!(backend.sent().is_empty());
}

#[tokio::test]
async fn test_send_failure_appends_placeholder() {
    let (mut chat, _backend) = chat_with(MockBackend::unreachable());
    chat.new_session();

    let outcome = chat.submit("are you there?").await;

    assert_eq!(
        outcome,
        SubmitOutcome::Sent(Message::new("are you there?", UNREACHABLE_REPLY))
    );
    assert_eq!(chat.state().messages().len(), 1);
    assert_eq!(chat.state().messages()[0].ai_text, UNREACHABLE_REPLY);
}

#[tokio::test]
async fn test_submit_sends_text_as_typed() {
    let (mut chat, backend) = chat_with(MockBackend::replying("ok"));
    chat.new_session();

    chat.submit("  headache since monday \n").await;

    assert_eq!(backend.sent()[0].1, "  headache since monday \n");
    assert_eq!(chat.state().messages()[0].user_text, "  headache since monday \n");
}

#[tokio::test]
async fn test_unreachable_backend_lists_no_sessions() {
    let (chat, _backend) = chat_with(MockBackend::unreachable());
    assert!(chat.sessions().await.is_empty());
}

#[tokio::test]
async fn test_open_session_reproduces_backend_transcript() {
    let transcript = vec![
        Message::new("first", "one"),
        Message::new("second", "two"),
        Message::new("third", ""),
    ];
    let summary = SessionSummary::new(7, "4f6c2d1e-aaaa-bbbb-cccc-000000000007");
    let (mut chat, _backend) = chat_with(MockBackend {
        sessions: Some(vec![summary.clone()]),
        transcripts: HashMap::from([(7, transcript.clone())]),
        ..Default::default()
    });

    chat.new_session();
    chat.open_session(&summary).await;

    assert_eq!(chat.state().messages(), transcript.as_slice());
    assert_eq!(chat.state().current_chat_db_id(), Some(7));
    assert_eq!(
        chat.state().current_session_id(),
        Some(summary.session_token.as_str())
    );
}

#[tokio::test]
async fn test_open_session_replaces_instead_of_merging() {
    let a = SessionSummary::new(1, "token-a");
    let b = SessionSummary::new(2, "token-b");
    let (mut chat, _backend) = chat_with(MockBackend {
        sessions: Some(vec![a.clone(), b.clone()]),
        transcripts: HashMap::from([
            (1, vec![Message::new("a1", "r1"), Message::new("a2", "r2")]),
            (2, vec![Message::new("b1", "r1")]),
        ]),
        reply: Some("later".into()),
        ..Default::default()
    });

    chat.open_session(&a).await;
    chat.submit("a3").await;
    assert_eq!(chat.state().messages().len(), 3);

    chat.open_session(&b).await;
    assert_eq!(chat.state().messages(), &[Message::new("b1", "r1")]);
}

#[tokio::test]
async fn test_open_session_with_failed_fetch_shows_empty_transcript() {
    let summary = SessionSummary::new(99, "token-99");
    let (mut chat, _backend) = chat_with(MockBackend {
        sessions: Some(vec![summary.clone()]),
        ..Default::default()
    });

    chat.open_session(&summary).await;

    assert!(chat.state().messages().is_empty());
    assert_eq!(chat.state().current_chat_db_id(), Some(99));
}

#[tokio::test]
async fn test_open_session_by_id() {
    let summary = SessionSummary::new(12, "token-12");
    let (mut chat, _backend) = chat_with(MockBackend {
        sessions: Some(vec![summary.clone()]),
        transcripts: HashMap::from([(12, vec![Message::new("q", "a")])]),
        ..Default::default()
    });

    assert!(chat.open_session_by_id(13).await.is_none());
    assert_eq!(chat.state().view(), View::NoSession);

    assert_eq!(chat.open_session_by_id(12).await, Some(summary));
    assert_eq!(chat.state().messages().len(), 1);
}

#[tokio::test]
async fn test_new_session_after_existing_clears_ids() {
    let summary = SessionSummary::new(3, "token-3");
    let (mut chat, _backend) = chat_with(MockBackend {
        sessions: Some(vec![summary.clone()]),
        transcripts: HashMap::from([(3, vec![Message::new("q", "a")])]),
        ..Default::default()
    });

    chat.open_session(&summary).await;
    let token = chat.new_session();

    assert_eq!(chat.state().current_chat_db_id(), None);
    assert_eq!(chat.state().current_session_id(), Some(token.as_str()));
    assert_ne!(token, summary.session_token);
    assert!(chat.state().messages().is_empty());
}
