//! HTTP API handlers for moodrec-server
//!
//! REST routes for recommendations and reviews, WebSocket routes for the
//! streaming inference sessions.

pub mod health;
pub mod recommendations;
pub mod reviews;
pub mod streaming;

pub use health::health_routes;
pub use recommendations::recommendation_routes;
pub use reviews::review_routes;
pub use streaming::streaming_routes;
