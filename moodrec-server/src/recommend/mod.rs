//! Recommendation pipeline
//!
//! sentiment → fusion → aggregation → enrichment, for one request.
//! Request-wide failures (missing credentials, search failure) come back as
//! [`RecommendError`]; per-item lookup failures never do.

pub mod aggregator;
pub mod enrichment;

pub use aggregator::{aggregate, aggregate_with_rng, MAX_RECOMMENDATIONS};
pub use enrichment::enrich;

use crate::catalog::{CatalogError, CatalogKind, CatalogSearch, EnrichedItem, SecondaryLookup};
use crate::fusion::{fuse, text_mood, SentimentScorer};
use moodrec_common::Mood;
use std::sync::Arc;
use thiserror::Error;

/// Request-wide recommendation failures
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("{}", not_configured_message(*.0))]
    NotConfigured(CatalogKind),

    #[error("{}: {}", upstream_prefix(*.0), .1)]
    Upstream(CatalogKind, #[source] CatalogError),
}

fn not_configured_message(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Movie => "TMDb API Key not configured.",
        CatalogKind::Game => "RAWG API Key is not configured.",
    }
}

fn upstream_prefix(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Movie => "Failed to fetch from TMDb",
        CatalogKind::Game => "Failed to fetch games from RAWG",
    }
}

/// Search + lookup collaborators for one catalog kind
#[derive(Clone)]
pub struct CatalogBackend {
    pub search: Arc<dyn CatalogSearch>,
    pub lookup: Arc<dyn SecondaryLookup>,
}

impl CatalogBackend {
    pub fn new(search: Arc<dyn CatalogSearch>, lookup: Arc<dyn SecondaryLookup>) -> Self {
        Self { search, lookup }
    }
}

/// Raw mood inputs of one request
#[derive(Debug, Clone, Default)]
pub struct MoodInputs {
    pub text: Option<String>,
    pub face_mood: Option<Mood>,
    pub voice_mood: Option<Mood>,
}

/// Successful pipeline output
#[derive(Debug, Clone)]
pub struct Recommendations {
    pub mood: Mood,
    pub items: Vec<EnrichedItem>,
}

/// Composes the pipeline from shared, read-only collaborators
#[derive(Clone)]
pub struct RecommendationService {
    scorer: Arc<dyn SentimentScorer>,
    movies: Option<CatalogBackend>,
    games: Option<CatalogBackend>,
}

impl RecommendationService {
    /// A `None` backend means the provider is unconfigured
    pub fn new(
        scorer: Arc<dyn SentimentScorer>,
        movies: Option<CatalogBackend>,
        games: Option<CatalogBackend>,
    ) -> Self {
        Self {
            scorer,
            movies,
            games,
        }
    }

    fn backend(&self, kind: CatalogKind) -> Option<&CatalogBackend> {
        match kind {
            CatalogKind::Movie => self.movies.as_ref(),
            CatalogKind::Game => self.games.as_ref(),
        }
    }

    /// Fuse the request's signals into one mood
    pub fn resolve_mood(&self, inputs: &MoodInputs) -> Mood {
        let text = text_mood(self.scorer.as_ref(), inputs.text.as_deref());
        fuse(text, inputs.face_mood, inputs.voice_mood)
    }

    /// Run the full pipeline for `kind`
    ///
    /// Credentials are checked before any work is done.
    pub async fn recommend(
        &self,
        kind: CatalogKind,
        inputs: &MoodInputs,
        excluded_genres: &[u32],
    ) -> Result<Recommendations, RecommendError> {
        let backend = self
            .backend(kind)
            .ok_or(RecommendError::NotConfigured(kind))?;

        let mood = self.resolve_mood(inputs);

        let items = aggregate(backend.search.as_ref(), mood, excluded_genres, kind)
            .await
            .map_err(|e| RecommendError::Upstream(kind, e))?;

        let items = enrich(backend.lookup.as_ref(), items).await;

        tracing::info!(
            kind = %kind,
            mood = %mood,
            count = items.len(),
            "Recommendations ready"
        );

        Ok(Recommendations { mood, items })
    }
}
