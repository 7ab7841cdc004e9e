//! Per-request relay procedure.
//!
//! One chat turn runs these steps in order, each awaited before the next:
//! 1. Resolve the caller's session to a thread (creating one if needed)
//! 2. Append the language-tagged user message
//! 3. Start a streaming run and drain it, sanitizing as text arrives
//! 4. Sanitize the full reply once more and return it with the thread id

use futures_util::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assistant::{AssistantApi, AssistantError, EventStream, MessageRole, ThreadLookup};
use crate::sanitize::strip_markers;

/// Language code used when the caller sends none.
pub const DEFAULT_LANGUAGE: &str = "ja";

/// Run events after which the assistant produces no further text.
const TERMINAL_RUN_EVENTS: &[&str] = &[
    "thread.run.failed",
    "thread.run.cancelled",
    "thread.run.expired",
    "thread.run.incomplete",
    "thread.run.requires_action",
];

/// Errors that fail a chat turn. Each variant names the step that failed.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Thread creation failed: {0}")]
    CreateThread(#[source] AssistantError),

    #[error("Message submission failed: {0}")]
    SubmitMessage(#[source] AssistantError),

    #[error("Run start failed: {0}")]
    StartRun(#[source] AssistantError),

    #[error("Run stream failed: {0}")]
    Stream(#[source] AssistantError),
}

/// Fixed relay settings, resolved once at startup.
#[derive(Clone, Debug)]
pub struct RelaySettings {
    /// Assistant every run is created against.
    pub assistant_id: String,
    /// Language tag applied when a turn has none.
    pub default_language: String,
}

impl RelaySettings {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// A validated inbound chat turn.
#[derive(Clone, Debug, Default)]
pub struct ChatTurn {
    pub message: String,
    pub session_id: Option<String>,
    pub language: Option<String>,
}

/// Sanitized assistant reply and the thread it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayReply {
    pub response: String,
    pub session_id: String,
}

/// Run one chat turn against the assistant service.
pub async fn relay(
    api: &dyn AssistantApi,
    settings: &RelaySettings,
    turn: ChatTurn,
) -> Result<RelayReply, RelayError> {
    let thread_id = resolve_thread(api, turn.session_id.as_deref()).await?;

    let content = language_tagged(
        &turn.message,
        turn.language.as_deref(),
        &settings.default_language,
    );
    api.create_message(&thread_id, MessageRole::User, &content)
        .await
        .map_err(RelayError::SubmitMessage)?;

    let stream = api
        .stream_run(&thread_id, &settings.assistant_id)
        .await
        .map_err(RelayError::StartRun)?;
    let response = collect_reply(stream).await.map_err(RelayError::Stream)?;

    Ok(RelayReply {
        response,
        session_id: thread_id,
    })
}

/// Map a caller-supplied session to a live thread id.
///
/// A missing or empty session creates a thread. A session the service does not
/// know, or cannot look up, is replaced by a new thread without surfacing the
/// lookup failure.
pub async fn resolve_thread(
    api: &dyn AssistantApi,
    session_id: Option<&str>,
) -> Result<String, RelayError> {
    let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
        let thread = api.create_thread().await.map_err(RelayError::CreateThread)?;
        info!(thread_id = %thread.id, "new thread created");
        return Ok(thread.id);
    };

    match api.retrieve_thread(session_id).await {
        Ok(ThreadLookup::Found(thread)) => {
            info!(thread_id = %thread.id, "using existing thread");
            return Ok(thread.id);
        }
        Ok(ThreadLookup::NotFound) => {
            warn!(session_id, "thread not found, creating a new one");
        }
        Err(e) => {
            warn!(session_id, "thread lookup failed, creating a new one: {e}");
        }
    }

    let thread = api.create_thread().await.map_err(RelayError::CreateThread)?;
    info!(thread_id = %thread.id, replaced = session_id, "new thread created");
    Ok(thread.id)
}

/// Prefix a message with its `[LANGUAGE: <code>]` tag.
///
/// An absent or empty `language` falls back to `default_language`.
pub fn language_tagged(message: &str, language: Option<&str>, default_language: &str) -> String {
    let code = language
        .filter(|code| !code.is_empty())
        .unwrap_or(default_language);
    format!("[LANGUAGE: {code}] {message}")
}

/// Drain a run stream into one sanitized reply.
///
/// Fragments are sanitized as they arrive and the accumulated text is
/// sanitized again at the end, which catches markers split across fragments.
pub async fn collect_reply(mut stream: EventStream) -> Result<String, AssistantError> {
    let mut reply = String::new();

    while let Some(event) = stream.next().await {
        let event = event?;

        if let Some(kind) = event.kind.as_deref()
            && TERMINAL_RUN_EVENTS.contains(&kind)
        {
            warn!(event = kind, "run ended without completing");
        }

        for fragment in &event.fragments {
            reply.push_str(&strip_markers(fragment));
        }
    }

    debug!(chars = reply.chars().count(), "run stream drained");
    Ok(strip_markers(&reply).into_owned())
}
