//! Chat endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Request body for the chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,

    /// Optional session ID. If not provided, a new session is created.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response from the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The agent's reply text, unmodified model output.
    pub reply: String,

    /// The session ID (new or existing). Clients echo this back to
    /// continue the conversation.
    pub session_id: String,
}

/// POST /api/chat - run one conversation turn.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    if request.message.trim().is_empty() {
        return Err(ServerError::BadRequest("message is empty".to_string()));
    }

    let outcome = state
        .agent
        .respond(request.session_id, &request.message)
        .await?;

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        session_id: outcome.session_id.to_string(),
    }))
}
