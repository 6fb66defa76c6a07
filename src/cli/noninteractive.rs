use anyhow::{bail, Result};

use crate::chat::{Chat, SubmitOutcome};

pub async fn run(
    mut chat: Chat,
    prompt: String,
    session: Option<i64>,
    output_format: super::OutputFormat,
) -> Result<()> {
    match session {
        Some(db_id) => {
            if chat.open_session_by_id(db_id).await.is_none() {
                bail!("Session {db_id} not found for this user.");
            }
        }
        None => {
            chat.new_session();
        }
    }

    let SubmitOutcome::Sent(message) = chat.submit(&prompt).await else {
        bail!("Prompt is empty, nothing to send.");
    };

    match output_format {
        super::OutputFormat::Text => println!("{}", message.ai_text),
        super::OutputFormat::Json => {
            let output = serde_json::json!({
                "session_id": chat.state().current_session_id(),
                "chat_session_id": chat.state().current_chat_db_id(),
                "user_message": message.user_text,
                "ai_response": message.ai_text,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
