//! Server-Sent Events support

use crate::controller::{ChatEvent, ChatSnapshot};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Stream a full snapshot first, then every change event
pub fn sse_stream(
    snapshot: ChatSnapshot,
    broadcast_rx: broadcast::Receiver<ChatEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        let data = serde_json::to_value(&snapshot).unwrap_or(Value::Null);
        Ok(sse_event("init", json!({ "type": "init", "state": data })))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(chat_event_to_sse(event))),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn chat_event_to_sse(event: ChatEvent) -> Event {
    let (event_type, data) = match event {
        ChatEvent::UserChanged { user } => (
            "user_changed",
            json!({ "type": "user_changed", "user": user }),
        ),
        ChatEvent::ConversationsChanged { current_id } => (
            "conversations_changed",
            json!({ "type": "conversations_changed", "currentConversationId": current_id }),
        ),
        ChatEvent::MessageAppended {
            conversation_id,
            message,
        } => (
            "message",
            json!({
                "type": "message",
                "conversationId": conversation_id,
                "message": message
            }),
        ),
        ChatEvent::LoadingChanged { is_loading } => (
            "loading",
            json!({ "type": "loading", "isLoading": is_loading }),
        ),
    };

    sse_event(event_type, data)
}

#[allow(clippy::needless_pass_by_value)] // data is consumed into the event body
fn sse_event(event_type: &str, data: Value) -> Event {
    Event::default().event(event_type).data(data.to_string())
}
