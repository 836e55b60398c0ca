//! Chat log endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{ChatMessage, PostChatMessageRequest};
use crate::AppState;

/// Cap on session id length; anything longer is a malformed client.
const MAX_SESSION_ID_LEN: usize = 128;

/// POST /api/chat/messages/:sessionId - Append a message to a session log.
pub async fn post_chat_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<PostChatMessageRequest>,
) -> ApiResult<ChatMessage> {
    validate_session_id(&session_id)?;
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("Message content is required".to_string()));
    }
    if request.sender.trim().is_empty() {
        return Err(AppError::Validation("Sender is required".to_string()));
    }

    let message = state.repo.add_chat_message(&session_id, &request).await?;
    success(message)
}

/// GET /api/chat/messages/:sessionId - Messages for a session, oldest first.
pub async fn list_chat_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Vec<ChatMessage>> {
    validate_session_id(&session_id)?;
    success(state.repo.list_chat_messages(&session_id).await?)
}

fn validate_session_id(session_id: &str) -> Result<(), AppError> {
    if session_id.trim().is_empty() || session_id.len() > MAX_SESSION_ID_LEN {
        return Err(AppError::Validation("Invalid session id".to_string()));
    }
    Ok(())
}
