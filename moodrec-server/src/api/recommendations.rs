//! Recommendation endpoints
//!
//! Pipeline failures (missing credentials, upstream search failure) are
//! reported in the body as `{error, recommendations: []}` with status 200,
//! so clients inspect payload content rather than the status code.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use moodrec_common::Mood;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogKind, EnrichedItem};
use crate::error::{ApiError, ApiResult};
use crate::recommend::MoodInputs;
use crate::AppState;

/// POST body for every recommendation route
///
/// Field names are accepted in snake_case or camelCase.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub text: Option<String>,

    /// Latest face label seen by the client, `"..."` when none yet
    #[serde(default, alias = "faceMood")]
    pub face_mood: Option<String>,

    #[serde(default, alias = "voiceMood")]
    pub voice_mood: Option<String>,

    /// TMDb genre ids to leave out (ignored for games)
    #[serde(default, alias = "excludeGenres")]
    pub exclude_genres: Option<Vec<u32>>,
}

impl RecommendationRequest {
    fn mood_inputs(&self) -> MoodInputs {
        MoodInputs {
            text: self.text.clone(),
            face_mood: self.face_mood.as_deref().and_then(Mood::parse_label),
            voice_mood: self.voice_mood.as_deref().and_then(Mood::parse_label),
        }
    }
}

/// Response body: success or in-band failure
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecommendationResponse {
    Success {
        mood: Mood,
        recommendations: Vec<EnrichedItem>,
    },
    Failure {
        error: String,
        recommendations: Vec<EnrichedItem>,
    },
}

/// Parse the `{kind}` path segment (singular or plural)
fn parse_kind(segment: &str) -> Option<CatalogKind> {
    match segment.to_ascii_lowercase().as_str() {
        "movie" | "movies" => Some(CatalogKind::Movie),
        "game" | "games" => Some(CatalogKind::Game),
        _ => None,
    }
}

async fn recommend(
    state: &AppState,
    kind: CatalogKind,
    request: RecommendationRequest,
) -> Json<RecommendationResponse> {
    let inputs = request.mood_inputs();
    let excluded = request.exclude_genres.unwrap_or_default();

    let response = match state
        .recommendations
        .recommend(kind, &inputs, &excluded)
        .await
    {
        Ok(recs) => RecommendationResponse::Success {
            mood: recs.mood,
            recommendations: recs.items,
        },
        Err(e) => {
            tracing::warn!(kind = %kind, error = %e, "Recommendation request failed");
            RecommendationResponse::Failure {
                error: e.to_string(),
                recommendations: Vec::new(),
            }
        }
    };

    Json(response)
}

/// POST /get_recommendations
pub async fn movie_recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Json<RecommendationResponse> {
    recommend(&state, CatalogKind::Movie, request).await
}

/// POST /get_game_recommendations
pub async fn game_recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Json<RecommendationResponse> {
    recommend(&state, CatalogKind::Game, request).await
}

/// POST /recommendations/:kind
pub async fn kind_recommendations(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<RecommendationRequest>,
) -> ApiResult<Json<RecommendationResponse>> {
    let kind = parse_kind(&kind)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown catalog kind '{}'", kind)))?;
    Ok(recommend(&state, kind, request).await)
}

/// Build recommendation routes
pub fn recommendation_routes() -> Router<AppState> {
    Router::new()
        .route("/get_recommendations", post(movie_recommendations))
        .route("/get_game_recommendations", post(game_recommendations))
        .route("/recommendations/:kind", post(kind_recommendations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_accepts_both_casings() {
        let snake: RecommendationRequest = serde_json::from_value(json!({
            "text": "hi",
            "face_mood": "happy",
            "voice_mood": "sad",
            "exclude_genres": [27]
        }))
        .unwrap();
        let camel: RecommendationRequest = serde_json::from_value(json!({
            "faceMood": "happy",
            "voiceMood": "sad",
            "excludeGenres": [27]
        }))
        .unwrap();

        assert_eq!(snake.face_mood, camel.face_mood);
        assert_eq!(snake.voice_mood, camel.voice_mood);
        assert_eq!(snake.exclude_genres, Some(vec![27]));
        assert_eq!(camel.exclude_genres, Some(vec![27]));
    }

    #[test]
    fn test_placeholder_labels_are_unresolved() {
        let request: RecommendationRequest = serde_json::from_value(json!({
            "face_mood": "...",
            "voice_mood": "Angry"
        }))
        .unwrap();
        let inputs = request.mood_inputs();
        assert_eq!(inputs.face_mood, None);
        assert_eq!(inputs.voice_mood, Some(Mood::Angry));
    }

    #[test]
    fn test_empty_body_defaults() {
        let request: RecommendationRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.text.is_none());
        assert!(request.exclude_genres.is_none());
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("movie"), Some(CatalogKind::Movie));
        assert_eq!(parse_kind("Games"), Some(CatalogKind::Game));
        assert_eq!(parse_kind("books"), None);
    }

    #[test]
    fn test_failure_serializes_with_empty_list() {
        let body = serde_json::to_value(RecommendationResponse::Failure {
            error: "TMDb API Key not configured.".to_string(),
            recommendations: Vec::new(),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"error": "TMDb API Key not configured.", "recommendations": []})
        );
    }
}
