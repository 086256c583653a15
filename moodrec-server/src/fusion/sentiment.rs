//! Text sentiment scoring
//!
//! The scorer is a collaborator behind [`SentimentScorer`]; the built-in
//! [`LexiconScorer`] is a small valence-lexicon model producing a compound
//! score in `[-1.0, 1.0]`. Classification into a mood uses fixed thresholds
//! and leaves the neutral band as "no text mood".

use moodrec_common::Mood;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Compound score at or above which text is positive
pub const POSITIVE_THRESHOLD: f64 = 0.05;

/// Compound score at or below which text is negative
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Normalisation constant for the compound score
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Valence scaling applied after a negator
const NEGATION_SCALAR: f64 = -0.74;

/// Valence increment contributed by a booster word
const BOOSTER_INCREMENT: f64 = 0.293;

/// How many preceding tokens a negator or booster reaches
const MODIFIER_WINDOW: usize = 3;

/// Text sentiment scorer
pub trait SentimentScorer: Send + Sync {
    /// Compound sentiment score in `[-1.0, 1.0]`
    fn compound(&self, text: &str) -> f64;
}

/// Map free text to a mood
///
/// Empty or whitespace-only text and scores inside the neutral band yield
/// `None`, which contributes nothing to fusion.
pub fn text_mood(scorer: &dyn SentimentScorer, text: Option<&str>) -> Option<Mood> {
    let text = text.map(str::trim).filter(|t| !t.is_empty())?;
    let score = scorer.compound(text);
    tracing::debug!(score = score, "Scored text sentiment");
    classify_compound(score)
}

/// Threshold a compound score
pub fn classify_compound(score: f64) -> Option<Mood> {
    if score >= POSITIVE_THRESHOLD {
        Some(Mood::Happy)
    } else if score <= NEGATIVE_THRESHOLD {
        Some(Mood::Sad)
    } else {
        None
    }
}

static VALENCE: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("good", 1.9),
        ("great", 3.1),
        ("happy", 2.7),
        ("glad", 2.0),
        ("joy", 2.8),
        ("joyful", 2.9),
        ("love", 3.2),
        ("loved", 2.9),
        ("lovely", 2.8),
        ("awesome", 3.1),
        ("amazing", 2.8),
        ("excellent", 2.7),
        ("fantastic", 2.6),
        ("wonderful", 2.7),
        ("fun", 2.3),
        ("funny", 1.9),
        ("excited", 1.4),
        ("exciting", 2.2),
        ("nice", 1.8),
        ("cool", 1.3),
        ("best", 3.2),
        ("calm", 1.3),
        ("relaxed", 2.2),
        ("peaceful", 2.2),
        ("cheerful", 2.5),
        ("smile", 1.5),
        ("laugh", 2.6),
        ("like", 1.5),
        ("enjoy", 2.2),
        ("thrilled", 2.1),
        ("bad", -2.5),
        ("sad", -2.1),
        ("unhappy", -1.8),
        ("terrible", -2.1),
        ("awful", -2.0),
        ("horrible", -2.5),
        ("hate", -2.7),
        ("angry", -2.3),
        ("mad", -2.2),
        ("upset", -1.6),
        ("depressed", -2.3),
        ("miserable", -2.2),
        ("lonely", -1.5),
        ("tired", -1.9),
        ("bored", -1.1),
        ("boring", -1.3),
        ("worst", -3.1),
        ("cry", -2.1),
        ("crying", -2.1),
        ("afraid", -1.9),
        ("scared", -1.9),
        ("anxious", -1.0),
        ("stressed", -1.4),
        ("worried", -1.2),
        ("annoyed", -1.6),
        ("frustrated", -1.5),
        ("hurt", -2.4),
        ("pain", -2.3),
        ("broken", -1.9),
        ("down", -0.8),
    ]
    .into_iter()
    .collect()
});

const NEGATORS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "none", "neither", "nor", "without", "cannot",
];

const BOOSTERS: &[&str] = &[
    "very", "really", "so", "extremely", "incredibly", "totally", "absolutely", "super", "quite",
];

/// Lexicon-based sentiment scorer
///
/// Per-token valence from a fixed lexicon, flipped by a preceding negator
/// and amplified by a preceding booster within a three-token window.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    fn is_negator(token: &str) -> bool {
        NEGATORS.contains(&token) || token.ends_with("n't")
    }

    fn is_booster(token: &str) -> bool {
        BOOSTERS.contains(&token)
    }
}

impl SentimentScorer for LexiconScorer {
    fn compound(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .collect();

        let mut sum = 0.0;
        for (idx, token) in tokens.iter().enumerate() {
            let Some(&base) = VALENCE.get(*token) else {
                continue;
            };

            let window = &tokens[idx.saturating_sub(MODIFIER_WINDOW)..idx];
            let mut valence = base;
            let boosts = window.iter().filter(|t| Self::is_booster(t)).count();
            valence += base.signum() * BOOSTER_INCREMENT * boosts as f64;
            if window.iter().any(|t| Self::is_negator(t)) {
                valence *= NEGATION_SCALAR;
            }
            sum += valence;
        }

        if sum == 0.0 {
            return 0.0;
        }
        let compound = sum / (sum * sum + NORMALIZATION_ALPHA).sqrt();
        compound.clamp(-1.0, 1.0)
    }
}
