//! Chat relay handler.
//!
//! `POST /chat` takes `{ message, sessionId?, language? }`, runs one turn
//! against the hosted assistant, and answers `{ response, sessionId }`.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use tracing::debug;

use relay_core::relay::{self, ChatTurn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ChatRequest, ChatResponse};

/// `POST /chat` — relay a user message and return the sanitized reply.
///
/// The body is parsed by hand so malformed JSON gets the same error shape as
/// every other failure.
pub async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ChatResponse>> {
    let request: ChatRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!("rejecting chat body: {e}");
        AppError::Validation("Invalid request body".into())
    })?;

    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::Validation("Message is required".into()))?;

    let turn = ChatTurn {
        message,
        session_id: request.session_id,
        language: request.language,
    };
    let reply = relay::relay(state.assistant.as_ref(), &state.settings, turn).await?;

    Ok(Json(ChatResponse {
        response: reply.response,
        session_id: reply.session_id,
    }))
}

/// Any other method on the chat route.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
