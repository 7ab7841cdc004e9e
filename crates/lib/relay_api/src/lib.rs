//! # relay_api
//!
//! HTTP API library for the chat relay.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use relay_core::assistant::AssistantApi;
use relay_core::assistant::openai::OpenAiAssistants;
use relay_core::relay::RelaySettings;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::chat;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Hosted-assistant service client.
    pub assistant: Arc<dyn AssistantApi>,
    /// Fixed relay settings.
    pub settings: RelaySettings,
    /// Attach a permissive CORS layer.
    pub permissive_cors: bool,
}

impl AppState {
    /// Builds state backed by the OpenAI Assistants API.
    pub fn from_config(config: &ApiConfig) -> Self {
        let assistant = OpenAiAssistants::new(
            config.openai_api_key.clone().unwrap_or_default(),
            config.openai_base_url.clone(),
        );
        Self {
            assistant: Arc::new(assistant),
            settings: config.relay_settings(),
            permissive_cors: config.permissive_cors,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Non-POST methods get the JSON 405 body instead of axum's empty one.
    let chat_route = post(chat::chat_handler).fallback(chat::method_not_allowed);

    let mut app = Router::new()
        .route(routes::POST_CHAT, chat_route.clone())
        .route(routes::POST_FUNCTIONS_CHAT, chat_route)
        .layer(TraceLayer::new_for_http());

    if state.permissive_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.with_state(state)
}
