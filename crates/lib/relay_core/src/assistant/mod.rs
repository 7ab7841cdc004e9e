//! Hosted-assistant abstraction.
//!
//! The relay talks to the assistant service exclusively through
//! [`AssistantApi`], which mirrors the four calls it needs:
//!
//! - [`AssistantApi::create_thread`] — start a new conversation thread
//! - [`AssistantApi::retrieve_thread`] — look up a caller-supplied thread
//! - [`AssistantApi::create_message`] — append a message to a thread
//! - [`AssistantApi::stream_run`] — run the assistant and stream its output
//!
//! Threads, messages, and runs live entirely in the external service.

pub mod openai;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while talking to the assistant service.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Assistant service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// A conversation thread held by the assistant service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: String,
}

/// Outcome of looking up a thread by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadLookup {
    Found(Thread),
    NotFound,
}

/// Author of a thread message. The relay only ever writes user turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

/// One event from a streaming run.
///
/// Most events carry no text; message deltas carry one fragment per text
/// content block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEvent {
    /// Event name as sent by the service (e.g. `thread.message.delta`).
    pub kind: Option<String>,
    /// Text fragments in block order.
    pub fragments: Vec<String>,
}

impl StreamEvent {
    /// Event carrying only text fragments.
    pub fn text<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: Some("thread.message.delta".to_string()),
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Finite, non-restartable sequence of run events in arrival order.
pub type EventStream = BoxStream<'static, Result<StreamEvent, AssistantError>>;

/// Operations the relay needs from the hosted-assistant service.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Create an empty thread.
    async fn create_thread(&self) -> Result<Thread, AssistantError>;

    /// Look up an existing thread. Unknown ids yield [`ThreadLookup::NotFound`].
    async fn retrieve_thread(&self, thread_id: &str) -> Result<ThreadLookup, AssistantError>;

    /// Append a message to a thread.
    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), AssistantError>;

    /// Start a run of `assistant_id` on the thread and stream its events.
    async fn stream_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<EventStream, AssistantError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
    }

    #[test]
    fn status_error_display() {
        let e = AssistantError::Status {
            status: 401,
            body: "bad key".into(),
        };
        assert_eq!(e.to_string(), "Assistant service returned 401: bad key");
    }
}
