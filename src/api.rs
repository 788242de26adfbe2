//! HTTP API for the chat presentation layer

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::controller::ChatController;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ChatController>,
}

impl AppState {
    pub fn new(controller: ChatController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}
