//! Chat relay server binary.
//!
//! Serves `POST /chat`, relaying each turn to the configured OpenAI assistant.

use clap::Parser;
use tracing::{info, warn};
use url::Url;

use relay_api::AppState;
use relay_api::config::ApiConfig;
use relay_core::assistant::openai::DEFAULT_BASE_URL;
use relay_core::relay::DEFAULT_LANGUAGE;

/// CLI arguments for the relay server.
#[derive(Parser, Debug)]
#[command(name = "relay_server", about = "Chat relay server", version)]
struct Args {
    /// Address to bind the HTTP listener.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3100")]
    bind_addr: String,

    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Assistant id every run is created against.
    #[arg(long, env = "OPENAI_ASSISTANT_ID")]
    assistant_id: Option<String>,

    /// Assistants API root (override for proxies or local mocks).
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    openai_base_url: Url,

    /// Language tag applied when a request carries none.
    #[arg(long, env = "DEFAULT_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    default_language: String,

    /// Allow cross-origin requests from any origin.
    #[arg(long, env = "PERMISSIVE_CORS", default_value_t = false)]
    permissive_cors: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,relay_api=debug,relay_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    info!(
        version = relay_core::version(),
        bind_addr = %args.bind_addr,
        base_url = %args.openai_base_url,
        "starting relay_server"
    );

    // Left for the upstream to reject; the server still starts.
    if args.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; assistant calls will fail");
    }
    if args.assistant_id.is_none() {
        warn!("OPENAI_ASSISTANT_ID is not set; runs will fail");
    }

    let config = ApiConfig {
        bind_addr: args.bind_addr,
        openai_api_key: args.openai_api_key,
        assistant_id: args.assistant_id,
        openai_base_url: args.openai_base_url,
        default_language: args.default_language,
        permissive_cors: args.permissive_cors,
    };

    let app = relay_api::router(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "chat relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("chat relay stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
