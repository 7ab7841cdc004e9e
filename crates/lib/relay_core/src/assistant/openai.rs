//! OpenAI Assistants (v2) client.
//!
//! Talks to the `/threads` family of endpoints and decodes streaming runs
//! from server-sent events. No retries: a failed call fails the request.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use sse_stream::{Sse, SseStream};
use tracing::debug;
use url::Url;

use super::{
    AssistantApi, AssistantError, EventStream, MessageRole, StreamEvent, Thread, ThreadLookup,
};

/// Public OpenAI API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const BETA_HEADER_NAME: &str = "OpenAI-Beta";
const BETA_HEADER_VALUE: &str = "assistants=v2";

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Deserialize)]
struct EventPayload {
    delta: Option<MessageDelta>,
}

#[derive(Deserialize)]
struct MessageDelta {
    #[serde(default)]
    content: Vec<DeltaBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DeltaBlock {
    Text { text: Option<TextDelta> },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct TextDelta {
    value: Option<String>,
}

impl EventPayload {
    fn into_fragments(self) -> Vec<String> {
        let Some(delta) = self.delta else {
            return Vec::new();
        };
        delta
            .content
            .into_iter()
            .filter_map(|block| match block {
                DeltaBlock::Text { text: Some(text) } => text.value,
                _ => None,
            })
            .filter(|value| !value.is_empty())
            .collect()
    }
}

/// Assistants API client authenticated with a single API key.
#[derive(Clone)]
pub struct OpenAiAssistants {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl OpenAiAssistants {
    /// Create a client for `base_url` (e.g. [`DEFAULT_BASE_URL`]).
    pub fn new(api_key: impl Into<String>, base_url: Url) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url,
        }
    }

    /// Build `{base}/{segments...}`, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AssistantError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AssistantError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER_NAME, BETA_HEADER_VALUE)
    }
}

#[async_trait]
impl AssistantApi for OpenAiAssistants {
    async fn create_thread(&self) -> Result<Thread, AssistantError> {
        let url = self.endpoint(&["threads"])?;
        let resp = self
            .request(Method::POST, url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| AssistantError::Request(format!("thread create failed: {e}")))?;

        let thread: ThreadObject = ensure_success(resp)
            .await?
            .json()
            .await
            .map_err(|e| AssistantError::Decode(format!("thread object: {e}")))?;

        Ok(Thread { id: thread.id })
    }

    async fn retrieve_thread(&self, thread_id: &str) -> Result<ThreadLookup, AssistantError> {
        let url = self.endpoint(&["threads", thread_id])?;
        let resp = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| AssistantError::Request(format!("thread retrieve failed: {e}")))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(ThreadLookup::NotFound);
        }

        let thread: ThreadObject = ensure_success(resp)
            .await?
            .json()
            .await
            .map_err(|e| AssistantError::Decode(format!("thread object: {e}")))?;

        Ok(ThreadLookup::Found(Thread { id: thread.id }))
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), AssistantError> {
        let url = self.endpoint(&["threads", thread_id, "messages"])?;
        let resp = self
            .request(Method::POST, url)
            .json(&CreateMessageRequest { role, content })
            .send()
            .await
            .map_err(|e| AssistantError::Request(format!("message create failed: {e}")))?;

        ensure_success(resp).await?;
        Ok(())
    }

    async fn stream_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<EventStream, AssistantError> {
        let url = self.endpoint(&["threads", thread_id, "runs"])?;
        let resp = self
            .request(Method::POST, url)
            .header(ACCEPT, "text/event-stream")
            .json(&CreateRunRequest {
                assistant_id,
                stream: true,
            })
            .send()
            .await
            .map_err(|e| AssistantError::Request(format!("run create failed: {e}")))?;

        let resp = ensure_success(resp).await?;

        let events = SseStream::from_byte_stream(resp.bytes_stream())
            .filter_map(|item| async move {
                match item {
                    Ok(sse) => parse_event(&sse).transpose(),
                    Err(e) => Some(Err(AssistantError::Stream(e.to_string()))),
                }
            })
            .boxed();

        Ok(events)
    }
}

/// Turn a non-2xx response into [`AssistantError::Status`].
async fn ensure_success(resp: Response) -> Result<Response, AssistantError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    Err(AssistantError::Status { status, body })
}

/// Decode one SSE frame of a run stream.
///
/// Returns `Ok(None)` for the `[DONE]` sentinel, an error for `event: error`,
/// and otherwise an event whose fragments are the text deltas it carries.
fn parse_event(sse: &Sse) -> Result<Option<StreamEvent>, AssistantError> {
    let data = sse.data.as_deref().unwrap_or_default();
    if data.trim() == "[DONE]" {
        return Ok(None);
    }
    if sse.event.as_deref() == Some("error") {
        return Err(AssistantError::Stream(data.to_string()));
    }

    let fragments = match serde_json::from_str::<EventPayload>(data) {
        Ok(payload) => payload.into_fragments(),
        Err(e) => {
            debug!(event = ?sse.event, "skipping undecodable SSE payload: {e}");
            Vec::new()
        }
    };

    Ok(Some(StreamEvent {
        kind: sse.event.clone(),
        fragments,
    }))
}
