//! Reference-catalog fact sheet as seen by the matcher.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A nutrition fact sheet from the reference catalog, keyed by barcode.
///
/// The catalog is owned by the import job and read-only from the pipeline's
/// perspective. `match_score` is assigned at match time: 100 for an exact
/// barcode hit (local or remote), lower for fuzzy name matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub barcode: String,
    pub product_name: String,
    pub brand: Option<String>,
    pub energy_kcal_100g: Option<Decimal>,
    pub proteins_100g: Option<Decimal>,
    pub carbohydrates_100g: Option<Decimal>,
    pub fat_100g: Option<Decimal>,
    pub sugars_100g: Option<Decimal>,
    pub fiber_100g: Option<Decimal>,
    pub salt_100g: Option<Decimal>,
    /// Confidence (0–100) that this entry is the scraped product.
    pub match_score: f64,
}

impl CatalogEntry {
    /// Returns `true` when at least one macro field is known.
    #[must_use]
    pub fn has_macros(&self) -> bool {
        self.energy_kcal_100g.is_some()
            || self.proteins_100g.is_some()
            || self.carbohydrates_100g.is_some()
            || self.fat_100g.is_some()
            || self.sugars_100g.is_some()
            || self.fiber_100g.is_some()
            || self.salt_100g.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_without_macros() -> CatalogEntry {
        CatalogEntry {
            barcode: "5410228112345".to_string(),
            product_name: "Jupiler Pils".to_string(),
            brand: Some("Jupiler".to_string()),
            energy_kcal_100g: None,
            proteins_100g: None,
            carbohydrates_100g: None,
            fat_100g: None,
            sugars_100g: None,
            fiber_100g: None,
            salt_100g: None,
            match_score: 100.0,
        }
    }

    #[test]
    fn has_macros_false_when_all_absent() {
        assert!(!entry_without_macros().has_macros());
    }

    #[test]
    fn has_macros_true_when_any_present() {
        let mut entry = entry_without_macros();
        entry.energy_kcal_100g = Some("43.0".parse().unwrap());
        assert!(entry.has_macros());
    }
}
