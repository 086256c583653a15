//! Integration tests for moodrec-server API endpoints
//!
//! Catalog providers are replaced with in-memory fakes; the router is
//! driven with `oneshot`.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use moodrec_server::catalog::{
    CatalogCriteria, CatalogError, CatalogSearch, Category, Provider, ReviewSource, SecondaryLookup,
};
use moodrec_server::fusion::LexiconScorer;
use moodrec_server::recommend::{CatalogBackend, RecommendationService};
use moodrec_server::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

/// Serves a fixed page and records every search criteria
#[derive(Default)]
struct FakeCatalog {
    page: Vec<Value>,
    seen: Mutex<Vec<CatalogCriteria>>,
    fail: bool,
}

#[async_trait]
impl CatalogSearch for FakeCatalog {
    async fn search(&self, criteria: &CatalogCriteria) -> Result<Vec<Value>, CatalogError> {
        self.seen.lock().unwrap().push(criteria.clone());
        if self.fail {
            return Err(CatalogError::Status(401, "Invalid API key".to_string()));
        }
        Ok(self.page.clone())
    }
}

/// Even ids get one provider, odd ids fail
struct FakeProviders;

#[async_trait]
impl SecondaryLookup for FakeProviders {
    async fn lookup(&self, item_id: i64) -> Result<Vec<Provider>, CatalogError> {
        if item_id % 2 == 1 {
            return Err(CatalogError::Network("timed out".to_string()));
        }
        Ok(vec![Provider {
            provider_id: 8,
            provider_name: "Netflix".to_string(),
            logo_path: Some("/netflix.png".to_string()),
            display_priority: Some(1),
            link: None,
        }])
    }
}

struct FakeReviews {
    fail: bool,
}

#[async_trait]
impl ReviewSource for FakeReviews {
    async fn reviews(&self, item_id: i64) -> Result<Vec<Value>, CatalogError> {
        if self.fail {
            return Err(CatalogError::Status(404, "not found".to_string()));
        }
        Ok(vec![json!({"author": "critic", "content": format!("Review of {item_id}")})])
    }
}

fn movie_page(n: i64) -> Vec<Value> {
    (1..=n)
        .map(|id| json!({"id": id, "title": format!("Movie {id}"), "poster_path": format!("/{id}.jpg")}))
        .collect()
}

fn game_page(n: i64) -> Vec<Value> {
    (1..=n)
        .map(|id| json!({"id": id, "name": format!("Game {id}"), "background_image": format!("https://img/{id}.jpg")}))
        .collect()
}

/// Test helper: app with no catalog credentials at all
fn unconfigured_app() -> axum::Router {
    let service = RecommendationService::new(Arc::new(LexiconScorer::new()), None, None);
    build_router(AppState::new(service, None))
}

/// Test helper: app wired to fakes; returns the search fakes for inspection
fn configured_app(
    movies: FakeCatalog,
    games: FakeCatalog,
    reviews_fail: bool,
) -> (axum::Router, Arc<FakeCatalog>, Arc<FakeCatalog>) {
    let movies = Arc::new(movies);
    let games = Arc::new(games);
    let service = RecommendationService::new(
        Arc::new(LexiconScorer::new()),
        Some(CatalogBackend::new(movies.clone(), Arc::new(FakeProviders))),
        Some(CatalogBackend::new(games.clone(), Arc::new(FakeProviders))),
    );
    let reviews: Arc<dyn ReviewSource> = Arc::new(FakeReviews { fail: reviews_fail });
    let app = build_router(AppState::new(service, Some(reviews)));
    (app, movies, games)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = unconfigured_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "moodrec-server");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_missing_tmdb_key_is_reported_in_band() {
    let response = unconfigured_app()
        .oneshot(post_json("/get_recommendations", json!({"text": "great"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"], "TMDb API Key not configured.");
    assert_eq!(body["recommendations"], json!([]));
}

#[tokio::test]
async fn test_missing_rawg_key_is_reported_in_band() {
    let response = unconfigured_app()
        .oneshot(post_json("/get_game_recommendations", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"], "RAWG API Key is not configured.");
    assert_eq!(body["recommendations"], json!([]));
}

#[tokio::test]
async fn test_movie_recommendations_happy_path() {
    let movies = FakeCatalog {
        page: movie_page(20),
        ..Default::default()
    };
    let (app, movies, _) = configured_app(movies, FakeCatalog::default(), false);

    let response = app
        .oneshot(post_json(
            "/get_recommendations",
            json!({"text": "I love this wonderful day", "face_mood": "...", "voice_mood": "sad"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["mood"], "happy");

    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 12);
    for rec in recs {
        let id = rec["id"].as_i64().unwrap();
        let providers = rec["watch_providers"].as_array().unwrap();
        if id % 2 == 0 {
            assert_eq!(providers.len(), 1);
            assert_eq!(providers[0]["provider_name"], "Netflix");
        } else {
            assert!(providers.is_empty(), "failed lookup yields empty list");
        }
        assert!(rec["poster_path"].is_string(), "provider fields passed through");
    }

    let seen = movies.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].category, Category::MovieGenre(35));
}

#[tokio::test]
async fn test_camel_case_body_and_exclusions() {
    let movies = FakeCatalog {
        page: movie_page(3),
        ..Default::default()
    };
    let (app, movies, _) = configured_app(movies, FakeCatalog::default(), false);

    let response = app
        .oneshot(post_json(
            "/get_recommendations",
            json!({"faceMood": "angry", "voiceMood": "angry", "excludeGenres": [27, 53]}),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["mood"], "angry");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);

    let seen = movies.seen.lock().unwrap();
    assert_eq!(seen[0].category, Category::MovieGenre(28));
    assert_eq!(seen[0].excluded_genres, vec![27, 53]);
}

#[tokio::test]
async fn test_no_signals_defaults_to_neutral() {
    let (app, movies, _) = configured_app(
        FakeCatalog {
            page: movie_page(1),
            ..Default::default()
        },
        FakeCatalog::default(),
        false,
    );

    let body = body_json(app.oneshot(post_json("/get_recommendations", json!({}))).await.unwrap()).await;
    assert_eq!(body["mood"], "neutral");
    assert_eq!(movies.seen.lock().unwrap()[0].category, Category::MovieGenre(99));
}

#[tokio::test]
async fn test_game_recommendations_by_kind_path() {
    let games = FakeCatalog {
        page: game_page(25),
        ..Default::default()
    };
    let (app, _, games) = configured_app(FakeCatalog::default(), games, false);

    let response = app
        .oneshot(post_json("/recommendations/games", json!({"face_mood": "fear"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["mood"], "fear");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 12);

    let seen = games.seen.lock().unwrap();
    assert_eq!(seen[0].category, Category::GameGenre("adventure"));
    assert!((1..=20).contains(&seen[0].page));
}

#[tokio::test]
async fn test_unknown_kind_is_not_found() {
    let response = unconfigured_app()
        .oneshot(post_json("/recommendations/books", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_upstream_failure_is_reported_in_band() {
    let movies = FakeCatalog {
        fail: true,
        ..Default::default()
    };
    let (app, _, _) = configured_app(movies, FakeCatalog::default(), false);

    let response = app
        .oneshot(post_json("/get_recommendations", json!({"text": "fine"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to fetch from TMDb"));
    assert_eq!(body["recommendations"], json!([]));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/get_recommendations")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = unconfigured_app().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_reviews_without_key() {
    let response = unconfigured_app()
        .oneshot(Request::builder().uri("/movie/550/reviews").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"], "TMDb API Key not configured.");
}

#[tokio::test]
async fn test_reviews_read_through() {
    let (app, _, _) = configured_app(FakeCatalog::default(), FakeCatalog::default(), false);
    let response = app
        .oneshot(Request::builder().uri("/movie/550/reviews").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body[0]["content"], "Review of 550");
}

#[tokio::test]
async fn test_reviews_upstream_failure_is_empty_list() {
    let (app, _, _) = configured_app(FakeCatalog::default(), FakeCatalog::default(), true);
    let response = app
        .oneshot(Request::builder().uri("/movie/550/reviews").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}
