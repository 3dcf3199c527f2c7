//! Core record types flowing through the reconciliation pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One retailer page observation, exactly as the scraper hands it over.
///
/// Wire shape: `{"url", "name", "discount", "barcode", "price"}`. The item is
/// ephemeral — it is grouped, reconciled, and discarded within a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawScrapeItem {
    /// Canonical product-page URL; the grouping key for a run.
    #[serde(rename = "url")]
    pub source_url: String,
    /// Retailer page title, when the scraper captured one.
    #[serde(rename = "name")]
    pub scraped_name: Option<String>,
    /// Free-text discount label, e.g. `"1+1 GRATIS"` or `"-50%"`.
    #[serde(rename = "discount")]
    pub discount_label: String,
    /// Barcode as scraped; may be partial or invalid, validated downstream.
    #[serde(rename = "barcode")]
    pub barcode_candidate: Option<String>,
    /// Regular shelf price, when visible on the page.
    #[serde(rename = "price")]
    pub scraped_price: Option<Decimal>,
}

/// Closed product-category set used by the shopping-list client.
///
/// Labels are the Dutch strings the enrichment oracle answers with; anything
/// it invents outside the set collapses to [`Category::Overig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Category {
    Groenten,
    Fruit,
    #[serde(rename = "Vlees_Vis_Vega")]
    VleesVisVega,
    Zuivel,
    Koolhydraten,
    Pantry,
    Snacks,
    Drinken,
    Huishouden,
    #[default]
    Overig,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Groenten => "Groenten",
            Category::Fruit => "Fruit",
            Category::VleesVisVega => "Vlees_Vis_Vega",
            Category::Zuivel => "Zuivel",
            Category::Koolhydraten => "Koolhydraten",
            Category::Pantry => "Pantry",
            Category::Snacks => "Snacks",
            Category::Drinken => "Drinken",
            Category::Huishouden => "Huishouden",
            Category::Overig => "Overig",
        }
    }

    /// Maps a free-form label onto the closed set; unknown labels become
    /// [`Category::Overig`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Groenten" => Category::Groenten,
            "Fruit" => Category::Fruit,
            "Vlees_Vis_Vega" => Category::VleesVisVega,
            "Zuivel" => Category::Zuivel,
            "Koolhydraten" => Category::Koolhydraten,
            "Pantry" => Category::Pantry,
            "Snacks" => Category::Snacks,
            "Drinken" => Category::Drinken,
            "Huishouden" => Category::Huishouden,
            _ => Category::Overig,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dominant macro-nutrient classification assigned by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrimaryMacro {
    Protein,
    Carbs,
    Fat,
    Balanced,
    #[default]
    None,
}

impl PrimaryMacro {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PrimaryMacro::Protein => "Protein",
            PrimaryMacro::Carbs => "Carbs",
            PrimaryMacro::Fat => "Fat",
            PrimaryMacro::Balanced => "Balanced",
            PrimaryMacro::None => "None",
        }
    }

    /// Maps a free-form label onto the closed set; unknown labels become
    /// [`PrimaryMacro::None`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Protein" => PrimaryMacro::Protein,
            "Carbs" => PrimaryMacro::Carbs,
            "Fat" => PrimaryMacro::Fat,
            "Balanced" => PrimaryMacro::Balanced,
            _ => PrimaryMacro::None,
        }
    }
}

impl std::fmt::Display for PrimaryMacro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-product output of the enrichment oracle.
///
/// All of this is advisory. The neutral default (also used when the oracle is
/// unavailable) carries `None` for the multi-unit pair so a degraded batch can
/// never override the deterministic discount parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnrichmentResult {
    pub clean_name: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub primary_macro: PrimaryMacro,
    #[serde(default)]
    pub is_healthy: bool,
    /// Oracle-computed effective price per unit; trusted when present.
    pub promo_price: Option<Decimal>,
    /// Advisory multi-unit flag; wire name kept from the oracle contract.
    #[serde(rename = "is_meerdere_artikels")]
    pub is_multi_unit: Option<bool>,
    /// Advisory total units per deal cycle.
    pub deal_quantity: Option<u32>,
}

/// Final, persisted unit of output: one priced, categorized promotion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionRecord {
    pub store_id: Uuid,
    /// Owning product row; filled in once the product upsert has run.
    pub product_id: Option<Uuid>,
    pub barcode: String,
    pub display_name: String,
    pub discount_label: String,
    pub original_price: Option<Decimal>,
    pub promo_price: Option<Decimal>,
    pub equivalent_percentage: Option<f64>,
    pub is_multi_unit: bool,
    pub deal_quantity: u32,
    pub category: Category,
    pub primary_macro: PrimaryMacro,
    pub is_healthy: bool,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_scrape_item_deserializes_wire_shape() {
        let json = r#"{
            "url": "https://www.colruyt.be/nl/producten/jupiler",
            "name": "Jupiler Pils Bak 24x25cl",
            "discount": "1+1 GRATIS",
            "barcode": "5410228112345",
            "price": 19.99
        }"#;
        let item: RawScrapeItem = serde_json::from_str(json).expect("deserialize");
        assert_eq!(item.source_url, "https://www.colruyt.be/nl/producten/jupiler");
        assert_eq!(item.scraped_name.as_deref(), Some("Jupiler Pils Bak 24x25cl"));
        assert_eq!(item.discount_label, "1+1 GRATIS");
        assert_eq!(item.barcode_candidate.as_deref(), Some("5410228112345"));
        assert_eq!(item.scraped_price, Some("19.99".parse().unwrap()));
    }

    #[test]
    fn raw_scrape_item_tolerates_null_name_and_price() {
        let json = r#"{"url": "u", "name": null, "discount": "-20%", "barcode": null, "price": null}"#;
        let item: RawScrapeItem = serde_json::from_str(json).expect("deserialize");
        assert!(item.scraped_name.is_none());
        assert!(item.barcode_candidate.is_none());
        assert!(item.scraped_price.is_none());
    }

    #[test]
    fn category_unknown_label_collapses_to_overig() {
        assert_eq!(Category::from_label("Sterke drank"), Category::Overig);
        assert_eq!(Category::from_label(""), Category::Overig);
        assert_eq!(Category::from_label("Zuivel"), Category::Zuivel);
    }

    #[test]
    fn category_serde_uses_dutch_labels() {
        let json = serde_json::to_string(&Category::VleesVisVega).unwrap();
        assert_eq!(json, "\"Vlees_Vis_Vega\"");
        let back: Category = serde_json::from_str("\"Drinken\"").unwrap();
        assert_eq!(back, Category::Drinken);
    }

    #[test]
    fn primary_macro_unknown_label_collapses_to_none() {
        assert_eq!(PrimaryMacro::from_label("Fiber"), PrimaryMacro::None);
        assert_eq!(PrimaryMacro::from_label("Protein"), PrimaryMacro::Protein);
    }

    #[test]
    fn enrichment_result_default_is_neutral() {
        let result = EnrichmentResult::default();
        assert!(result.clean_name.is_none());
        assert_eq!(result.category, Category::Overig);
        assert_eq!(result.primary_macro, PrimaryMacro::None);
        assert!(!result.is_healthy);
        assert!(result.promo_price.is_none());
        assert!(result.is_multi_unit.is_none());
        assert!(result.deal_quantity.is_none());
    }

    #[test]
    fn enrichment_result_reads_dutch_wire_field() {
        let json = r#"{
            "clean_name": "Coca-Cola 1.5L",
            "category": "Drinken",
            "primary_macro": "Carbs",
            "is_healthy": false,
            "promo_price": 1.49,
            "is_meerdere_artikels": true,
            "deal_quantity": 2
        }"#;
        let result: EnrichmentResult = serde_json::from_str(json).expect("deserialize");
        assert_eq!(result.is_multi_unit, Some(true));
        assert_eq!(result.deal_quantity, Some(2));
        assert_eq!(result.promo_price, Some("1.49".parse().unwrap()));
    }

    #[test]
    fn enrichment_result_missing_fields_fall_back_to_defaults() {
        let result: EnrichmentResult = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(result, EnrichmentResult::default());
    }
}
