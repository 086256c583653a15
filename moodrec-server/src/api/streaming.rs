//! WebSocket adapters for streaming inference sessions
//!
//! Each upgraded socket gets its own [`StreamingSession`]. Text and binary
//! frames become chunks; ping/pong frames are skipped; a close frame ends
//! the incoming stream. Labels go back as text frames.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{future, SinkExt, StreamExt};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::inference::{EmotionClassifier, Modality};
use crate::streaming::{Chunk, SessionState, StreamingSession};
use crate::AppState;

fn parse_modality(segment: &str) -> Option<Modality> {
    match segment.to_ascii_lowercase().as_str() {
        "face" => Some(Modality::Face),
        "voice" => Some(Modality::Voice),
        _ => None,
    }
}

/// Adapt socket messages into chunks; `None` for control frames
fn message_to_chunk(message: Message) -> Option<Chunk> {
    match message {
        Message::Text(text) => Some(Chunk::Text(text)),
        Message::Binary(bytes) => Some(Chunk::Binary(bytes)),
        _ => None,
    }
}

fn upgrade(ws: WebSocketUpgrade, state: &AppState, modality: Modality) -> ApiResult<Response> {
    let classifier = state.classifier(modality).ok_or_else(|| {
        ApiError::Unavailable(format!("No {} classifier configured", modality))
    })?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, modality, classifier)))
}

async fn handle_socket(socket: WebSocket, modality: Modality, classifier: Arc<dyn EmotionClassifier>) {
    let (sink, stream) = socket.split();

    let incoming = stream
        .take_while(|msg| future::ready(!matches!(msg, Ok(Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(message) => message_to_chunk(message).map(Ok),
                Err(e) => Some(Err(e)),
            })
        });
    let outgoing = sink.with(|label: String| future::ready(Ok::<_, axum::Error>(Message::Text(label))));

    let session = StreamingSession::new(modality, classifier);
    let session_id = session.id();
    let state = session.run(incoming, outgoing).await;

    if state == SessionState::Errored {
        tracing::info!(session_id = %session_id, modality = %modality, "Socket closed after session error");
    }
}

/// GET /ws/analyze_face
pub async fn analyze_face(ws: WebSocketUpgrade, State(state): State<AppState>) -> ApiResult<Response> {
    upgrade(ws, &state, Modality::Face)
}

/// GET /ws/analyze_voice
pub async fn analyze_voice(ws: WebSocketUpgrade, State(state): State<AppState>) -> ApiResult<Response> {
    upgrade(ws, &state, Modality::Voice)
}

/// GET /ws/analyze/:modality
pub async fn analyze_modality(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(modality): Path<String>,
) -> ApiResult<Response> {
    let modality = parse_modality(&modality)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown modality '{}'", modality)))?;
    upgrade(ws, &state, modality)
}

/// Build streaming routes
pub fn streaming_routes() -> Router<AppState> {
    Router::new()
        .route("/ws/analyze_face", get(analyze_face))
        .route("/ws/analyze_voice", get(analyze_voice))
        .route("/ws/analyze/:modality", get(analyze_modality))
}
