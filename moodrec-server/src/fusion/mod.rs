//! Mood fusion
//!
//! Reconciles up to three independently produced mood signals into one
//! label by weighted majority vote:
//! - Text, when present, votes twice
//! - Face and voice vote once each, unless neutral
//! - Ties go to the label inserted first (pool order: text, text, face, voice)
//! - An empty pool yields [`Mood::DEFAULT`]

pub mod sentiment;

pub use sentiment::{text_mood, LexiconScorer, SentimentScorer};

use moodrec_common::Mood;
use serde::Serialize;

/// Weight of the text signal in the voting pool
pub const TEXT_VOTE_WEIGHT: usize = 2;

/// Origin of a mood signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    Text,
    Face,
    Voice,
}

/// One modality's observation; `label` is `None` when the signal is absent
/// or unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodSignal {
    pub source: SignalSource,
    pub label: Option<Mood>,
}

impl MoodSignal {
    pub fn new(source: SignalSource, label: Option<Mood>) -> Self {
        Self { source, label }
    }

    /// Votes this signal contributes to the pool
    fn votes(&self) -> usize {
        match (self.source, self.label) {
            (_, None) => 0,
            (SignalSource::Text, Some(_)) => TEXT_VOTE_WEIGHT,
            (_, Some(mood)) if mood.is_vote_bearing() => 1,
            _ => 0,
        }
    }
}

/// Build the voting pool in insertion order
pub fn vote_pool(signals: &[MoodSignal]) -> Vec<Mood> {
    signals
        .iter()
        .flat_map(|signal| {
            let votes = signal.votes();
            signal.label.into_iter().flat_map(move |m| std::iter::repeat(m).take(votes))
        })
        .collect()
}

/// Fuse text, face and voice observations into one mood
pub fn fuse(text: Option<Mood>, face: Option<Mood>, voice: Option<Mood>) -> Mood {
    fuse_signals(&[
        MoodSignal::new(SignalSource::Text, text),
        MoodSignal::new(SignalSource::Face, face),
        MoodSignal::new(SignalSource::Voice, voice),
    ])
}

/// Fuse an ordered list of signals
///
/// Order matters only for tie-breaking.
pub fn fuse_signals(signals: &[MoodSignal]) -> Mood {
    let pool = vote_pool(signals);

    // (mood, count) in first-occurrence order
    let mut tally: Vec<(Mood, usize)> = Vec::with_capacity(pool.len());
    for mood in pool {
        match tally.iter_mut().find(|(m, _)| *m == mood) {
            Some((_, count)) => *count += 1,
            None => tally.push((mood, 1)),
        }
    }

    let mut winner: Option<(Mood, usize)> = None;
    for (mood, count) in tally {
        // strict comparison keeps the earlier label on ties
        if winner.map_or(true, |(_, best)| count > best) {
            winner = Some((mood, count));
        }
    }

    let fused = winner.map(|(mood, _)| mood).unwrap_or(Mood::DEFAULT);
    tracing::debug!(
        text = ?signals.first().and_then(|s| s.label),
        fused = %fused,
        "Fused mood signals"
    );
    fused
}
