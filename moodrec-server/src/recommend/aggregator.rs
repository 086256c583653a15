//! Catalog aggregation
//!
//! One randomly chosen page per call, media-less and malformed entries
//! dropped, survivors shuffled and capped. No page state is kept between
//! calls; repeated calls with identical inputs are expected to differ.

use crate::catalog::{CatalogCriteria, CatalogError, CatalogItem, CatalogKind, CatalogSearch};
use moodrec_common::Mood;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Upper bound on returned items
pub const MAX_RECOMMENDATIONS: usize = 12;

/// Aggregate a candidate set for `mood` using entropy-seeded randomness
pub async fn aggregate(
    search: &dyn CatalogSearch,
    mood: Mood,
    excluded_genres: &[u32],
    kind: CatalogKind,
) -> Result<Vec<CatalogItem>, CatalogError> {
    let mut rng = StdRng::from_entropy();
    aggregate_with_rng(search, mood, excluded_genres, kind, &mut rng).await
}

/// Aggregate with a caller-supplied random source
///
/// A search failure is returned as-is; there is no retry.
pub async fn aggregate_with_rng<R: Rng + Send>(
    search: &dyn CatalogSearch,
    mood: Mood,
    excluded_genres: &[u32],
    kind: CatalogKind,
    rng: &mut R,
) -> Result<Vec<CatalogItem>, CatalogError> {
    let criteria = CatalogCriteria {
        kind,
        category: kind.category_for(mood),
        excluded_genres: excluded_genres.to_vec(),
        page: rng.gen_range(kind.page_range()),
    };

    let raw = search.search(&criteria).await.map_err(|e| {
        tracing::warn!(
            kind = %kind,
            category = %criteria.category,
            page = criteria.page,
            error = %e,
            "Catalog search failed"
        );
        e
    })?;

    let fetched = raw.len();
    let mut items: Vec<CatalogItem> = raw
        .into_iter()
        .filter_map(CatalogItem::from_raw)
        .filter(|item| item.has_required_media(kind))
        .collect();

    items.shuffle(rng);
    items.truncate(MAX_RECOMMENDATIONS);

    tracing::debug!(
        kind = %kind,
        mood = %mood,
        page = criteria.page,
        fetched,
        kept = items.len(),
        "Aggregated catalog candidates"
    );

    Ok(items)
}
