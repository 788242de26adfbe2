//! Cybersecurity assistant chat client
//!
//! Keeps a locally persisted list of conversations for a single signed-in
//! user and forwards each message to a remote webhook that answers as the
//! assistant. The browser front end talks to this process over HTTP.

mod api;
mod auth;
mod chat;
mod config;
mod controller;
mod reply;
mod store;

use api::{create_router, AppState};
use chat::ConversationStore;
use config::AppConfig;
use controller::ChatController;
use reply::{LoggingService, ReplyService, WebhookClient};
use std::net::SocketAddr;
use std::sync::Arc;
use store::LocalStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cybersec_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    // Ensure store directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening local store");
    let local = LocalStore::open(&config.db_path)?;
    let conversations = ConversationStore::load(local);

    let webhook: Arc<dyn ReplyService> = Arc::new(WebhookClient::new(&config.webhook)?);
    let reply = Arc::new(LoggingService::new(webhook));
    tracing::info!(
        endpoint = %config.webhook.url,
        failure_policy = ?config.webhook.failure_policy,
        "Reply service configured"
    );

    let controller = ChatController::new(conversations, reply, config.login.clone());
    let state = AppState::new(controller);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
