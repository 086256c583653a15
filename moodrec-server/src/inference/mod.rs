//! Emotion inference collaborators
//!
//! Face and voice models are consumed only through [`EmotionClassifier`].
//! Implementations may run in-process, in a sidecar, or remotely; the
//! service builds them once at startup and shares them read-only across
//! every streaming session.

pub mod http_classifier;

pub use http_classifier::HttpClassifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Media modality of a streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Face,
    Voice,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Face => "face",
            Modality::Voice => "voice",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded still image, packed RGB8
#[derive(Debug, Clone)]
pub struct FaceFrame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Decoded mono audio, f32 in `[-1.0, 1.0]`
#[derive(Debug, Clone)]
pub struct VoiceClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Modality-appropriate sample buffer handed to a classifier
#[derive(Debug, Clone)]
pub enum Sample {
    Face(FaceFrame),
    Voice(VoiceClip),
}

impl Sample {
    pub fn modality(&self) -> Modality {
        match self {
            Sample::Face(_) => Modality::Face,
            Sample::Voice(_) => Modality::Voice,
        }
    }
}

/// One labeled confidence estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Classifier returned {0}: {1}")]
    Status(u16, String),

    #[error("Malformed classifier response: {0}")]
    Parse(String),

    #[error("Classifier does not accept {0} samples")]
    UnsupportedModality(Modality),
}

/// Emotion classifier collaborator
///
/// An empty result means nothing was detected (e.g. no face in frame).
/// Face classifiers return one entry per detected face holding that
/// face's dominant emotion; voice classifiers return scores over their
/// short-code vocabulary.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, sample: &Sample) -> Result<Vec<LabelScore>, ClassifyError>;
}

/// Highest-confidence estimate, first wins on equal scores
pub fn dominant(estimates: &[LabelScore]) -> Option<&LabelScore> {
    estimates.iter().fold(None, |best: Option<&LabelScore>, candidate| match best {
        Some(b) if b.score >= candidate.score => Some(b),
        _ => Some(candidate),
    })
}
