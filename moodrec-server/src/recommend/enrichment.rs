//! Enrichment fan-out
//!
//! One secondary lookup per item, all in flight at once. Lookups complete
//! in any order, so each result is tagged with its item's input position
//! and re-attached there afterwards. Items sharing an id still get their
//! own lookup and their own result. A failed lookup costs only that item
//! its provider list.

use crate::catalog::{CatalogItem, EnrichedItem, Provider, SecondaryLookup};
use futures::stream::{FuturesUnordered, StreamExt};

/// Attach secondary data to every item, preserving input order
pub async fn enrich(lookup: &dyn SecondaryLookup, items: Vec<CatalogItem>) -> Vec<EnrichedItem> {
    let mut pending: FuturesUnordered<_> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let id = item.id;
            async move { (index, id, lookup.lookup(id).await) }
        })
        .collect();

    let mut by_index: Vec<Vec<Provider>> = vec![Vec::new(); items.len()];
    let mut failures = 0usize;
    while let Some((index, id, result)) = pending.next().await {
        match result {
            Ok(providers) => by_index[index] = providers,
            Err(e) => {
                failures += 1;
                tracing::debug!(item_id = id, error = %e, "Secondary lookup failed, using empty list");
            }
        }
    }

    if failures > 0 {
        tracing::warn!(
            failures,
            total = items.len(),
            "Some secondary lookups failed"
        );
    }

    items
        .into_iter()
        .zip(by_index)
        .map(|(item, watch_providers)| EnrichedItem {
            item,
            watch_providers,
        })
        .collect()
}
