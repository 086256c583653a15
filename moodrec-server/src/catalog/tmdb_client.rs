//! TMDb API client
//!
//! Movie discovery, watch-provider lookup and reviews.

use super::http::{results_array, ProviderHttp};
use super::{CatalogCriteria, CatalogError, CatalogSearch, Provider, ReviewSource, SecondaryLookup};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Minimum vote count for discovered movies
const MIN_VOTE_COUNT: u32 = 100;

/// Watch-provider regions, in preference order
const PROVIDER_REGIONS: [&str; 2] = ["IN", "US"];

#[derive(Debug, Deserialize)]
struct WatchProvidersResponse {
    #[serde(default)]
    results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Default, Deserialize)]
struct RegionProviders {
    #[serde(default)]
    flatrate: Vec<Provider>,
    /// Any other key (link, rent, buy, ...)
    #[serde(flatten)]
    other: HashMap<String, Value>,
}

impl RegionProviders {
    fn is_empty(&self) -> bool {
        self.flatrate.is_empty() && self.other.is_empty()
    }
}

/// First non-empty region in preference order
fn preferred_region(mut parsed: WatchProvidersResponse) -> RegionProviders {
    PROVIDER_REGIONS
        .iter()
        .filter_map(|code| parsed.results.remove(*code))
        .find(|region| !region.is_empty())
        .unwrap_or_default()
}

/// TMDb API client
pub struct TmdbClient {
    http: ProviderHttp,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(http: ProviderHttp, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn discover_query(&self, criteria: &CatalogCriteria) -> Vec<(&'static str, String)> {
        let without_genres = criteria
            .excluded_genres
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");

        vec![
            ("api_key", self.api_key.clone()),
            ("sort_by", "popularity.desc".to_string()),
            ("page", criteria.page.to_string()),
            ("with_genres", criteria.category.to_string()),
            ("without_genres", without_genres),
            ("vote_count.gte", MIN_VOTE_COUNT.to_string()),
        ]
    }
}

#[async_trait]
impl CatalogSearch for TmdbClient {
    async fn search(&self, criteria: &CatalogCriteria) -> Result<Vec<Value>, CatalogError> {
        let url = format!("{}/discover/movie", self.base_url);
        tracing::debug!(
            category = %criteria.category,
            page = criteria.page,
            excluded = ?criteria.excluded_genres,
            "Querying TMDb discover"
        );

        let body = self.http.get_json(&url, &self.discover_query(criteria)).await?;
        let results = results_array(body)?;

        tracing::info!(
            category = %criteria.category,
            page = criteria.page,
            count = results.len(),
            "Retrieved movies from TMDb"
        );
        Ok(results)
    }
}

#[async_trait]
impl SecondaryLookup for TmdbClient {
    /// Flat-rate streaming providers, India first then US
    async fn lookup(&self, item_id: i64) -> Result<Vec<Provider>, CatalogError> {
        let url = format!("{}/movie/{}/watch/providers", self.base_url, item_id);
        let body = self
            .http
            .get_json(&url, &[("api_key", self.api_key.clone())])
            .await?;

        let parsed: WatchProvidersResponse =
            serde_json::from_value(body).map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(preferred_region(parsed).flatrate)
    }
}

#[async_trait]
impl ReviewSource for TmdbClient {
    async fn reviews(&self, item_id: i64) -> Result<Vec<Value>, CatalogError> {
        let url = format!("{}/movie/{}/reviews", self.base_url, item_id);
        let body = self
            .http
            .get_json(&url, &[("api_key", self.api_key.clone())])
            .await?;
        results_array(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::http::build_http_client;
    use crate::catalog::{CatalogKind, Category};
    use std::time::Duration;

    fn client() -> TmdbClient {
        let http = ProviderHttp::new(build_http_client(Duration::from_secs(1)).unwrap(), 10);
        TmdbClient::new(http, "https://api.themoviedb.org/3/", "k3y")
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client().base_url, "https://api.themoviedb.org/3");
    }

    #[test]
    fn test_discover_query() {
        let criteria = CatalogCriteria {
            kind: CatalogKind::Movie,
            category: Category::MovieGenre(35),
            excluded_genres: vec![27, 53],
            page: 4,
        };
        let query: HashMap<_, _> = client().discover_query(&criteria).into_iter().collect();
        assert_eq!(query["with_genres"], "35");
        assert_eq!(query["without_genres"], "27,53");
        assert_eq!(query["page"], "4");
        assert_eq!(query["sort_by"], "popularity.desc");
        assert_eq!(query["vote_count.gte"], "100");
        assert_eq!(query["api_key"], "k3y");
    }

    #[test]
    fn test_region_fallback_skips_empty_region() {
        let body = serde_json::json!({
            "id": 1,
            "results": {
                "IN": {},
                "US": {"link": "x", "flatrate": [{"provider_id": 8, "provider_name": "Netflix", "logo_path": "/n.png"}]}
            }
        });
        let parsed: WatchProvidersResponse = serde_json::from_value(body).unwrap();
        let region = preferred_region(parsed);
        assert_eq!(region.flatrate.len(), 1);
        assert_eq!(region.flatrate[0].provider_name, "Netflix");
    }

    #[test]
    fn test_region_prefers_india_when_present() {
        let body = serde_json::json!({
            "results": {
                "US": {"flatrate": [{"provider_id": 8, "provider_name": "Netflix"}]},
                "IN": {"link": "y"}
            }
        });
        let region = preferred_region(serde_json::from_value(body).unwrap());
        assert!(region.flatrate.is_empty());
    }

    #[test]
    fn test_no_regions_yields_empty() {
        let body = serde_json::json!({"id": 5});
        let region = preferred_region(serde_json::from_value(body).unwrap());
        assert!(region.flatrate.is_empty());
    }
}
