//! Barcode and fuzzy-name resolution against the reference catalog.

use std::collections::HashMap;

use promodb_core::CatalogEntry;
use sqlx::PgPool;

use crate::barcode::barcode_variants;
use crate::error::CatalogError;
use crate::remote::OffClient;

/// An exact barcode hit, local or remote, is fully trusted.
const EXACT_MATCH_SCORE: f64 = 100.0;

/// Resolves scraped barcodes and names to catalog entries.
///
/// Holds the shared read-only pool and the remote fallback client; both are
/// injected at construction so tests can point them anywhere.
pub struct CatalogMatcher {
    pool: PgPool,
    remote: OffClient,
}

impl CatalogMatcher {
    #[must_use]
    pub fn new(pool: PgPool, remote: OffClient) -> Self {
        Self { pool, remote }
    }

    /// Resolves a barcode to a catalog entry, trying every variant form
    /// locally before falling back to the remote API.
    ///
    /// Remote failures (timeout, malformed body) degrade to `Ok(None)` with
    /// a warning — a flaky upstream must not fail the group being matched.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Db`] if a local catalog query fails.
    pub async fn match_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<CatalogEntry>, CatalogError> {
        for variant in barcode_variants(barcode) {
            if let Some(row) = promodb_db::get_catalog_entry(&self.pool, &variant).await? {
                return Ok(Some(row.into_entry(EXACT_MATCH_SCORE)));
            }
        }

        match self.remote.fetch_by_barcode(barcode.trim()).await {
            Ok(entry) => Ok(entry),
            Err(e) => {
                tracing::warn!(
                    barcode,
                    error = %e,
                    "remote catalog lookup failed; treating as no match"
                );
                Ok(None)
            }
        }
    }

    /// Fuzzy name search over the local catalog.
    ///
    /// Exact case-insensitive matches score 100 and short-circuit. Otherwise
    /// candidates are gathered by substring and per-word containment, scored
    /// with [`name_match_score`], filtered by `min_score`, and returned best
    /// first (ties keep catalog iteration order).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Db`] if a catalog query fails.
    pub async fn match_by_name(
        &self,
        name: &str,
        limit: usize,
        min_score: f64,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let search = name.trim().to_lowercase();
        if search.is_empty() {
            return Ok(Vec::new());
        }
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);

        let exact = promodb_db::catalog_entries_by_exact_name(&self.pool, &search, limit_i64).await?;
        if !exact.is_empty() {
            return Ok(exact
                .into_iter()
                .map(|row| row.into_entry(EXACT_MATCH_SCORE))
                .collect());
        }

        // Candidate pool: full-phrase containment plus rows containing every
        // search word. Over-fetch so scoring has something to discard.
        let fetch_limit = limit_i64.saturating_mul(2);
        let mut candidates = promodb_db::catalog_entries_by_fragments(
            &self.pool,
            &[like_pattern(&search)],
            fetch_limit,
        )
        .await?;

        let words: Vec<&str> = search.split_whitespace().collect();
        if words.len() >= 2 {
            let patterns: Vec<String> = words.iter().map(|w| like_pattern(w)).collect();
            candidates.extend(
                promodb_db::catalog_entries_by_fragments(&self.pool, &patterns, fetch_limit)
                    .await?,
            );
        }

        // Score, deduplicate by barcode keeping the best score, preserve
        // first-seen order for deterministic ties.
        let mut by_barcode: HashMap<String, usize> = HashMap::new();
        let mut scored: Vec<CatalogEntry> = Vec::new();
        for row in candidates {
            let score = name_match_score(&search, &row.product_name);
            if score < min_score {
                continue;
            }
            if let Some(&idx) = by_barcode.get(&row.barcode) {
                if score > scored[idx].match_score {
                    scored[idx].match_score = score;
                }
            } else {
                by_barcode.insert(row.barcode.clone(), scored.len());
                scored.push(row.into_entry(score));
            }
        }

        scored.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);

        Ok(scored)
    }
}

/// Scores how well `search` refers to `candidate`, 0–100.
///
/// - exact (case-insensitive) match: 100
/// - candidate contains the full search term: 70–90, longer candidates
///   scoring lower
/// - word overlap: fraction of search words present, scaled to 0–70
#[must_use]
pub fn name_match_score(search: &str, candidate: &str) -> f64 {
    let search_lower = search.trim().to_lowercase();
    let name_lower = candidate.trim().to_lowercase();

    if search_lower.is_empty() || name_lower.is_empty() {
        return 0.0;
    }

    if search_lower == name_lower {
        return 100.0;
    }

    if name_lower.contains(&search_lower) {
        #[allow(clippy::cast_precision_loss)]
        let ratio = search_lower.len() as f64 / name_lower.len() as f64;
        return 70.0 + ratio * 20.0;
    }

    let search_words: Vec<&str> = search_lower.split_whitespace().collect();
    if search_words.is_empty() {
        return 0.0;
    }
    let matching = search_words
        .iter()
        .filter(|w| name_lower.split_whitespace().any(|nw| nw == **w))
        .count();

    #[allow(clippy::cast_precision_loss)]
    let word_ratio = matching as f64 / search_words.len() as f64;
    word_ratio * 70.0
}

/// Builds a `%...%` LIKE pattern with LIKE metacharacters escaped.
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
