//! External content catalogs
//!
//! Two catalog kinds (films via TMDb, games via RAWG), each with its own
//! mood→category table, page range and required display-media field.
//! Providers are consumed through three narrow traits:
//! - [`CatalogSearch`]: one page of raw, possibly malformed entries
//! - [`SecondaryLookup`]: per-item provider/availability data
//! - [`ReviewSource`]: read-through item reviews

pub mod http;
pub mod rawg_client;
pub mod tmdb_client;

pub use rawg_client::RawgClient;
pub use tmdb_client::TmdbClient;

use async_trait::async_trait;
use moodrec_common::Mood;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Upstream catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Content domain being recommended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Movie,
    Game,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Movie => "movie",
            CatalogKind::Game => "game",
        }
    }

    /// Field an entry must carry (non-empty) to be displayable
    pub fn media_field(&self) -> &'static str {
        match self {
            CatalogKind::Movie => "poster_path",
            CatalogKind::Game => "background_image",
        }
    }

    /// Pages sampled uniformly on every aggregation
    pub fn page_range(&self) -> RangeInclusive<u32> {
        match self {
            CatalogKind::Movie => 1..=10,
            CatalogKind::Game => 1..=20,
        }
    }

    /// Category used when the mood has no table entry
    pub fn default_category(&self) -> Category {
        match self {
            CatalogKind::Movie => Category::MovieGenre(99),
            CatalogKind::Game => Category::GameGenre("simulation"),
        }
    }

    /// Map a mood to this catalog's genre/category key
    pub fn category_for(&self, mood: Mood) -> Category {
        let mapped = match self {
            CatalogKind::Movie => movie_genre(mood).map(Category::MovieGenre),
            CatalogKind::Game => game_genre(mood).map(Category::GameGenre),
        };
        mapped.unwrap_or_else(|| self.default_category())
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TMDb genre ids
fn movie_genre(mood: Mood) -> Option<u32> {
    match mood {
        Mood::Happy => Some(35),
        Mood::Sad => Some(18),
        Mood::Angry => Some(28),
        Mood::Fear => Some(27),
        Mood::Surprise => Some(9648),
        Mood::Neutral => Some(99),
        Mood::Calm => Some(10749),
        Mood::Disgust => None,
    }
}

/// RAWG genre slugs
fn game_genre(mood: Mood) -> Option<&'static str> {
    match mood {
        Mood::Happy => Some("action"),
        Mood::Sad => Some("role-playing-games-rpg"),
        Mood::Angry => Some("shooter"),
        Mood::Fear => Some("adventure"),
        Mood::Surprise => Some("puzzle"),
        Mood::Neutral => Some("simulation"),
        Mood::Calm | Mood::Disgust => None,
    }
}

/// Provider-specific genre/category key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    MovieGenre(u32),
    GameGenre(&'static str),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::MovieGenre(id) => write!(f, "{}", id),
            Category::GameGenre(slug) => f.write_str(slug),
        }
    }
}

/// One search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCriteria {
    pub kind: CatalogKind,
    pub category: Category,
    pub excluded_genres: Vec<u32>,
    pub page: u32,
}

/// Displayable catalog entry
///
/// Keeps the provider's fields verbatim so clients see the same shape the
/// provider returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    #[serde(skip)]
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogItem {
    /// Build from a raw entry
    ///
    /// Returns `None` for entries that are not objects or lack an integer
    /// `id`.
    pub fn from_raw(raw: Value) -> Option<Self> {
        let Value::Object(fields) = raw else {
            return None;
        };
        let id = fields.get("id")?.as_i64()?;
        Some(Self { id, fields })
    }

    /// Whether the entry carries non-empty display media for its kind
    pub fn has_required_media(&self, kind: CatalogKind) -> bool {
        match self.fields.get(kind.media_field()) {
            Some(Value::String(path)) => !path.trim().is_empty(),
            _ => false,
        }
    }
}

/// Secondary availability entry (streaming service or store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub provider_id: i64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Catalog item plus its secondary data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Empty (never absent) when lookup failed or found nothing
    pub watch_providers: Vec<Provider>,
}

/// Catalog search collaborator
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Fetch one result page as raw entries
    async fn search(&self, criteria: &CatalogCriteria) -> Result<Vec<Value>, CatalogError>;
}

/// Per-item secondary data collaborator
#[async_trait]
pub trait SecondaryLookup: Send + Sync {
    async fn lookup(&self, item_id: i64) -> Result<Vec<Provider>, CatalogError>;
}

/// Item review collaborator
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn reviews(&self, item_id: i64) -> Result<Vec<Value>, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_movie_genre_table() {
        let kind = CatalogKind::Movie;
        assert_eq!(kind.category_for(Mood::Happy), Category::MovieGenre(35));
        assert_eq!(kind.category_for(Mood::Sad), Category::MovieGenre(18));
        assert_eq!(kind.category_for(Mood::Angry), Category::MovieGenre(28));
        assert_eq!(kind.category_for(Mood::Fear), Category::MovieGenre(27));
        assert_eq!(kind.category_for(Mood::Surprise), Category::MovieGenre(9648));
        assert_eq!(kind.category_for(Mood::Neutral), Category::MovieGenre(99));
        assert_eq!(kind.category_for(Mood::Calm), Category::MovieGenre(10749));
        // no entry → default
        assert_eq!(kind.category_for(Mood::Disgust), Category::MovieGenre(99));
    }

    #[test]
    fn test_game_genre_table() {
        let kind = CatalogKind::Game;
        assert_eq!(kind.category_for(Mood::Happy), Category::GameGenre("action"));
        assert_eq!(
            kind.category_for(Mood::Sad),
            Category::GameGenre("role-playing-games-rpg")
        );
        assert_eq!(kind.category_for(Mood::Angry), Category::GameGenre("shooter"));
        assert_eq!(kind.category_for(Mood::Calm), Category::GameGenre("simulation"));
        assert_eq!(kind.category_for(Mood::Disgust), Category::GameGenre("simulation"));
    }

    #[test]
    fn test_page_ranges() {
        assert_eq!(CatalogKind::Movie.page_range(), 1..=10);
        assert_eq!(CatalogKind::Game.page_range(), 1..=20);
    }

    #[test]
    fn test_from_raw_requires_integer_id() {
        assert!(CatalogItem::from_raw(json!({"id": 7, "title": "x"})).is_some());
        assert!(CatalogItem::from_raw(json!({"id": "7"})).is_none());
        assert!(CatalogItem::from_raw(json!({"title": "no id"})).is_none());
        assert!(CatalogItem::from_raw(json!([1, 2, 3])).is_none());
    }

    #[test]
    fn test_required_media() {
        let item = CatalogItem::from_raw(json!({"id": 1, "poster_path": "/a.jpg"})).unwrap();
        assert!(item.has_required_media(CatalogKind::Movie));
        assert!(!item.has_required_media(CatalogKind::Game));

        let blank = CatalogItem::from_raw(json!({"id": 2, "poster_path": ""})).unwrap();
        assert!(!blank.has_required_media(CatalogKind::Movie));

        let null = CatalogItem::from_raw(json!({"id": 3, "poster_path": null})).unwrap();
        assert!(!null.has_required_media(CatalogKind::Movie));
    }

    #[test]
    fn test_enriched_item_serializes_flat() {
        let item = CatalogItem::from_raw(json!({"id": 9, "title": "Up", "poster_path": "/u.jpg"}))
            .unwrap();
        let enriched = EnrichedItem {
            item,
            watch_providers: vec![],
        };
        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["id"], 9);
        assert_eq!(value["title"], "Up");
        assert_eq!(value["watch_providers"], json!([]));
    }
}
