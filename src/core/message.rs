use serde::{Deserialize, Serialize};

/// One user utterance paired with the agent's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "user_message")]
    pub user_text: String,

    /// Empty until the reply is known; older records may omit it entirely.
    #[serde(rename = "ai_response", default, deserialize_with = "null_as_empty")]
    pub ai_text: String,
}

impl Message {
    pub fn new(user_text: impl Into<String>, ai_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            ai_text: ai_text.into(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
