//! Read-through movie reviews

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::AppState;

/// GET /movie/:id/reviews
///
/// Upstream failures yield an empty list; missing credentials yield
/// `{error}`.
pub async fn movie_reviews(State(state): State<AppState>, Path(movie_id): Path<i64>) -> Json<Value> {
    let Some(source) = state.reviews.as_ref() else {
        return Json(json!({ "error": "TMDb API Key not configured." }));
    };

    match source.reviews(movie_id).await {
        Ok(reviews) => Json(Value::Array(reviews)),
        Err(e) => {
            tracing::warn!(item_id = movie_id, error = %e, "Review lookup failed");
            Json(json!([]))
        }
    }
}

/// Build review routes
pub fn review_routes() -> Router<AppState> {
    Router::new().route("/movie/:id/reviews", get(movie_reviews))
}
