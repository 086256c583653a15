//! RAWG API client
//!
//! Game listing by genre and per-game store links.

use super::http::{results_array, ProviderHttp};
use super::{CatalogCriteria, CatalogError, CatalogSearch, Provider, SecondaryLookup};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Games requested per page
pub const PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize)]
struct StoreLink {
    store_id: i64,
    #[serde(default)]
    url: Option<String>,
}

/// Display name for a RAWG store id
pub fn store_name(store_id: i64) -> &'static str {
    match store_id {
        1 => "Steam",
        2 => "Xbox Store",
        3 => "PlayStation Store",
        4 => "App Store",
        5 => "GOG",
        6 => "Nintendo Store",
        7 => "Xbox 360 Store",
        8 => "Google Play",
        9 => "itch.io",
        11 => "Epic Games",
        _ => "Other store",
    }
}

/// RAWG API client
pub struct RawgClient {
    http: ProviderHttp,
    base_url: String,
    api_key: String,
}

impl RawgClient {
    pub fn new(http: ProviderHttp, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// RAWG has no genre exclusion filter; `excluded_genres` is not sent.
    fn games_query(&self, criteria: &CatalogCriteria) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.api_key.clone()),
            ("genres", criteria.category.to_string()),
            ("ordering", "-rating".to_string()),
            ("page_size", PAGE_SIZE.to_string()),
            ("page", criteria.page.to_string()),
        ]
    }
}

#[async_trait]
impl CatalogSearch for RawgClient {
    async fn search(&self, criteria: &CatalogCriteria) -> Result<Vec<Value>, CatalogError> {
        let url = format!("{}/games", self.base_url);
        tracing::debug!(
            category = %criteria.category,
            page = criteria.page,
            "Querying RAWG games"
        );

        let body = self.http.get_json(&url, &self.games_query(criteria)).await?;
        let results = results_array(body)?;

        tracing::info!(
            category = %criteria.category,
            page = criteria.page,
            count = results.len(),
            "Retrieved games from RAWG"
        );
        Ok(results)
    }
}

#[async_trait]
impl SecondaryLookup for RawgClient {
    async fn lookup(&self, item_id: i64) -> Result<Vec<Provider>, CatalogError> {
        let url = format!("{}/games/{}/stores", self.base_url, item_id);
        let body = self.http.get_json(&url, &[("key", self.api_key.clone())]).await?;

        results_array(body)?
            .into_iter()
            .map(|raw| {
                let link: StoreLink =
                    serde_json::from_value(raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
                Ok(Provider {
                    provider_id: link.store_id,
                    provider_name: store_name(link.store_id).to_string(),
                    logo_path: None,
                    display_priority: None,
                    link: link.url,
                })
            })
            .collect()
    }
}
