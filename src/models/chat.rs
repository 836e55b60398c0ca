//! Chat log models.

use serde::{Deserialize, Serialize};

/// A message in a chat session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub sender: String,
    pub content: String,
    pub created_at: String,
}

/// Request body for appending a chat message to a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostChatMessageRequest {
    pub sender: String,
    pub content: String,
}
