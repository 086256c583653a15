//! moodrec-server library interface
//!
//! Exposes the pipeline components and the router for integration testing.

pub mod api;
pub mod catalog;
pub mod error;
pub mod fusion;
pub mod inference;
pub mod recommend;
pub mod streaming;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use moodrec_common::config::TomlConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::http::{build_http_client, ProviderHttp};
use crate::catalog::{CatalogError, RawgClient, ReviewSource, TmdbClient};
use crate::fusion::LexiconScorer;
use crate::inference::{EmotionClassifier, HttpClassifier, Modality};
use crate::recommend::{CatalogBackend, RecommendationService};

/// Application state shared across handlers
///
/// Every collaborator is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
    /// `None` when TMDb credentials are missing
    pub reviews: Option<Arc<dyn ReviewSource>>,
    pub face_classifier: Option<Arc<dyn EmotionClassifier>>,
    pub voice_classifier: Option<Arc<dyn EmotionClassifier>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(recommendations: RecommendationService, reviews: Option<Arc<dyn ReviewSource>>) -> Self {
        Self {
            recommendations: Arc::new(recommendations),
            reviews,
            face_classifier: None,
            voice_classifier: None,
            startup_time: Utc::now(),
        }
    }

    /// Attach the classifier serving `modality`
    pub fn with_classifier(mut self, modality: Modality, classifier: Arc<dyn EmotionClassifier>) -> Self {
        match modality {
            Modality::Face => self.face_classifier = Some(classifier),
            Modality::Voice => self.voice_classifier = Some(classifier),
        }
        self
    }

    pub fn classifier(&self, modality: Modality) -> Option<Arc<dyn EmotionClassifier>> {
        match modality {
            Modality::Face => self.face_classifier.clone(),
            Modality::Voice => self.voice_classifier.clone(),
        }
    }

    /// Wire production collaborators from bootstrap configuration
    ///
    /// Missing API keys leave the matching catalog unconfigured; requests
    /// for it then fail in-band instead of at startup.
    pub fn from_config(config: &TomlConfig) -> Result<Self, CatalogError> {
        let upstream = &config.upstream;
        let client = build_http_client(Duration::from_secs(upstream.timeout_secs))?;

        let tmdb = config.resolve_tmdb_api_key().map(|key| {
            let http = ProviderHttp::new(client.clone(), upstream.requests_per_second);
            Arc::new(TmdbClient::new(http, &upstream.tmdb_base_url, key))
        });
        let rawg = config.resolve_rawg_api_key().map(|key| {
            let http = ProviderHttp::new(client.clone(), upstream.requests_per_second);
            Arc::new(RawgClient::new(http, &upstream.rawg_base_url, key))
        });

        if tmdb.is_none() {
            tracing::warn!("TMDb API key not configured; movie recommendations disabled");
        }
        if rawg.is_none() {
            tracing::warn!("RAWG API key not configured; game recommendations disabled");
        }

        let movies = tmdb
            .clone()
            .map(|client| CatalogBackend::new(client.clone(), client));
        let games = rawg.map(|client| CatalogBackend::new(client.clone(), client));
        let reviews = tmdb.map(|client| client as Arc<dyn ReviewSource>);

        let service = RecommendationService::new(Arc::new(LexiconScorer::new()), movies, games);
        let mut state = Self::new(service, reviews);

        let endpoints = [
            (Modality::Face, config.inference.face_url.as_deref()),
            (Modality::Voice, config.inference.voice_url.as_deref()),
        ];
        for (modality, url) in endpoints {
            match url {
                Some(url) => {
                    tracing::info!(modality = %modality, endpoint = url, "Inference classifier configured");
                    let classifier = HttpClassifier::new(client.clone(), url, modality);
                    state = state.with_classifier(modality, Arc::new(classifier));
                }
                None => {
                    tracing::warn!(modality = %modality, "No inference endpoint; streaming route disabled");
                }
            }
        }

        Ok(state)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::recommendation_routes())
        .merge(api::review_routes())
        .merge(api::streaming_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
