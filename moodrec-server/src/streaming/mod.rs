//! Streaming inference sessions
//!
//! One session per long-lived connection, bound to a single modality:
//!
//! ```text
//! Open ──(chunk → decode → classify → emit)*──▶ Closed
//!   └──────── decode/classify failure ────────▶ Errored
//! ```
//!
//! Chunks are handled strictly in arrival order; chunk N is classified and
//! its message sent before chunk N+1 is read. Each chunk is classified on
//! its own, nothing carries over between chunks.

pub mod decode;

use crate::inference::{dominant, ClassifyError, EmotionClassifier, Modality, Sample};
use decode::DecodeError;
use futures::{Sink, SinkExt, Stream, StreamExt};
use moodrec_common::Mood;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Raw chunk as received from the connection
#[derive(Debug, Clone)]
pub enum Chunk {
    /// Text frame, e.g. `data:image/jpeg;base64,...`
    Text(String),
    /// Binary frame holding encoded media
    Binary(Vec<u8>),
}

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
    Errored,
}

/// Session-terminating errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Classification failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Decode task aborted: {0}")]
    Worker(String),
}

/// Map a voice classifier short code to a mood
///
/// Unrecognized codes map to neutral.
pub fn voice_code_to_mood(code: &str) -> Mood {
    match code.trim().to_ascii_lowercase().as_str() {
        "ang" => Mood::Angry,
        "hap" => Mood::Happy,
        "sad" => Mood::Sad,
        "neu" => Mood::Neutral,
        _ => Mood::Neutral,
    }
}

/// Map a face classifier emotion label to a mood
///
/// Unrecognized labels map to neutral.
pub fn face_label_to_mood(label: &str) -> Mood {
    Mood::parse_label(label).unwrap_or(Mood::Neutral)
}

/// Decode a chunk into the modality's sample buffer
pub fn decode_chunk(modality: Modality, chunk: Chunk) -> Result<Sample, DecodeError> {
    let bytes = match chunk {
        Chunk::Text(text) => decode::decode_data_url(&text)?,
        Chunk::Binary(bytes) => bytes,
    };
    match modality {
        Modality::Face => decode::decode_face_frame(&bytes).map(Sample::Face),
        Modality::Voice => decode::decode_voice_clip(&bytes).map(Sample::Voice),
    }
}

/// Per-connection streaming session
pub struct StreamingSession {
    id: Uuid,
    modality: Modality,
    state: SessionState,
    classifier: Arc<dyn EmotionClassifier>,
}

impl StreamingSession {
    pub fn new(modality: Modality, classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self {
            id: Uuid::new_v4(),
            modality,
            state: SessionState::Open,
            classifier,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Decode and classify one chunk
    ///
    /// Returns `Ok(None)` when nothing was detected; that is not an error.
    pub async fn process_chunk(&self, chunk: Chunk) -> Result<Option<Mood>, SessionError> {
        let modality = self.modality;
        let sample = tokio::task::spawn_blocking(move || decode_chunk(modality, chunk))
            .await
            .map_err(|e| SessionError::Worker(e.to_string()))??;

        let estimates = self.classifier.classify(&sample).await?;
        let Some(best) = dominant(&estimates) else {
            return Ok(None);
        };

        let mood = match modality {
            Modality::Face => face_label_to_mood(&best.label),
            Modality::Voice => voice_code_to_mood(&best.label),
        };
        Ok(Some(mood))
    }

    /// Drive the session until the connection ends or a chunk fails
    ///
    /// Emits one text message per classified chunk on `outgoing`. Returns the
    /// terminal state: `Closed` when the peer goes away (end of stream,
    /// receive error, or send failure), `Errored` when decoding or
    /// classification fails.
    pub async fn run<S, E, K>(mut self, incoming: S, outgoing: K) -> SessionState
    where
        S: Stream<Item = Result<Chunk, E>>,
        E: Display,
        K: Sink<String>,
        K::Error: Display,
    {
        let mut incoming = std::pin::pin!(incoming);
        let mut outgoing = std::pin::pin!(outgoing);
        let mut processed: u64 = 0;
        let mut emitted: u64 = 0;

        info!(session_id = %self.id, modality = %self.modality, "Streaming session opened");

        while self.state == SessionState::Open {
            let chunk = match incoming.next().await {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    debug!(session_id = %self.id, error = %e, "Receive failed, closing session");
                    self.state = SessionState::Closed;
                    break;
                }
                None => {
                    self.state = SessionState::Closed;
                    break;
                }
            };

            processed += 1;
            match self.process_chunk(chunk).await {
                Ok(Some(mood)) => {
                    if let Err(e) = outgoing.send(mood.to_string()).await {
                        debug!(session_id = %self.id, error = %e, "Send failed, closing session");
                        self.state = SessionState::Closed;
                        break;
                    }
                    emitted += 1;
                }
                Ok(None) => {
                    debug!(session_id = %self.id, chunk = processed, "Nothing detected, skipping chunk");
                }
                Err(e) => {
                    warn!(
                        session_id = %self.id,
                        modality = %self.modality,
                        chunk = processed,
                        error = %e,
                        "Streaming session failed"
                    );
                    self.state = SessionState::Errored;
                }
            }
        }

        let _ = outgoing.close().await;

        info!(
            session_id = %self.id,
            modality = %self.modality,
            state = ?self.state,
            processed,
            emitted,
            "Streaming session ended"
        );
        self.state
    }
}
