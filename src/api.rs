//! Inbound webhook surface
//!
//! The inbound half of the transport adapter: the platform adapter POSTs
//! chat events here as JSON; they are translated into engine events and
//! routed to the session manager. Unknown callback data never becomes an
//! event.

use crate::runtime::ProductionManager;
use crate::state_machine::event::{Button, Event, MessageId, MessageRef};
use crate::state_machine::state::{BlobHandle, ChatId};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<ProductionManager>,
}

/// Wire format of inbound platform events.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Text {
        chat_id: i64,
        text: String,
    },
    Photo {
        chat_id: i64,
        blob: String,
    },
    Button {
        chat_id: i64,
        data: String,
        #[serde(default)]
        message_id: Option<i64>,
        #[serde(default)]
        has_photo: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    accepted: bool,
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/events", post(receive_event))
        .route("/healthz", get(healthz))
        .route("/version", get(version))
        .with_state(state)
}

/// Translate a wire event into an engine event. Button presses are stamped
/// at ingestion; unrecognized callback data yields `None`.
fn translate(event: InboundEvent) -> Option<(ChatId, Event)> {
    match event {
        InboundEvent::Text { chat_id, text } => Some((ChatId(chat_id), Event::Text { text })),
        InboundEvent::Photo { chat_id, blob } => Some((
            ChatId(chat_id),
            Event::Photo {
                handle: BlobHandle(blob),
            },
        )),
        InboundEvent::Button {
            chat_id,
            data,
            message_id,
            has_photo,
        } => {
            let press = Button::parse(&data)?;
            let origin = message_id.map(|id| MessageRef {
                id: MessageId(id),
                has_photo,
            });
            Some((
                ChatId(chat_id),
                Event::Button {
                    press,
                    origin,
                    at: Utc::now(),
                },
            ))
        }
    }
}

async fn receive_event(
    State(state): State<AppState>,
    Json(inbound): Json<InboundEvent>,
) -> (StatusCode, Json<EventResponse>) {
    match translate(inbound) {
        Some((chat_id, event)) => {
            state.sessions.dispatch(chat_id, event).await;
            (StatusCode::OK, Json(EventResponse { accepted: true }))
        }
        None => {
            tracing::debug!("Dropping event with unknown callback data");
            (StatusCode::OK, Json(EventResponse { accepted: false }))
        }
    }
}

async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.sessions.session_count().await,
    }))
}

async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_text_events() {
        let inbound: InboundEvent = serde_json::from_value(serde_json::json!({
            "type": "text",
            "chat_id": 42,
            "text": "hello"
        }))
        .unwrap();
        let (chat_id, event) = translate(inbound).unwrap();
        assert_eq!(chat_id, ChatId(42));
        assert!(matches!(event, Event::Text { text } if text == "hello"));
    }

    #[test]
    fn translates_button_events_with_origin() {
        let inbound: InboundEvent = serde_json::from_value(serde_json::json!({
            "type": "button",
            "chat_id": 42,
            "data": "confirm_checkin_yes",
            "message_id": 7,
            "has_photo": true
        }))
        .unwrap();
        let (_, event) = translate(inbound).unwrap();
        let Event::Button { press, origin, .. } = event else {
            panic!("expected button event");
        };
        assert_eq!(press, Button::parse("confirm_checkin_yes").unwrap());
        assert_eq!(
            origin,
            Some(MessageRef {
                id: MessageId(7),
                has_photo: true
            })
        );
    }

    #[test]
    fn unknown_callback_data_is_dropped() {
        let inbound: InboundEvent = serde_json::from_value(serde_json::json!({
            "type": "button",
            "chat_id": 42,
            "data": "launch_rocket"
        }))
        .unwrap();
        assert!(translate(inbound).is_none());
    }
}
