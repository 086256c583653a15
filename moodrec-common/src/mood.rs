//! Mood vocabulary
//!
//! Every label that leaves fusion or a streaming session is one of these
//! variants. Upstream strings (request bodies, classifier output) pass
//! through [`Mood::parse_label`]; anything outside the vocabulary is treated
//! as an unresolved observation rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Fixed mood enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Fear,
    Surprise,
    Disgust,
    Calm,
    Neutral,
}

impl Mood {
    /// Fallback when no usable signal exists
    pub const DEFAULT: Mood = Mood::Neutral;

    /// All variants in declaration order
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Angry,
        Mood::Fear,
        Mood::Surprise,
        Mood::Disgust,
        Mood::Calm,
        Mood::Neutral,
    ];

    /// Lowercase wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Fear => "fear",
            Mood::Surprise => "surprise",
            Mood::Disgust => "disgust",
            Mood::Calm => "calm",
            Mood::Neutral => "neutral",
        }
    }

    /// Parse a loosely formatted label
    ///
    /// Case-insensitive and whitespace-tolerant. Returns `None` for unknown
    /// labels and for the `"..."` placeholder clients send before the first
    /// observation arrives.
    pub fn parse_label(label: &str) -> Option<Mood> {
        let normalized = label.trim().to_ascii_lowercase();
        Mood::ALL
            .iter()
            .copied()
            .find(|mood| mood.as_str() == normalized)
    }

    /// Whether an observation of this mood from a face or voice signal
    /// counts as a vote during fusion
    pub fn is_vote_bearing(&self) -> bool {
        !matches!(self, Mood::Neutral)
    }
}

impl Default for Mood {
    fn default() -> Self {
        Mood::DEFAULT
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::parse_label(s).ok_or_else(|| Error::InvalidInput(format!("unknown mood label: {s}")))
    }
}
