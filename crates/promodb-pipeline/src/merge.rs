//! Signal merging: one [`PromotionRecord`] out of a group's scraped text,
//! its catalog resolution, and the oracle's advisory enrichment.

use promodb_core::{parse_discount_label, EnrichmentResult, PromotionRecord};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::group::placeholder_barcode;
use crate::types::{CatalogResolution, OfferGroup, PromotionPeriod};

/// Merges all signals for one group under the strict priority order.
///
/// - Barcode: the matched catalog barcode, else a placeholder from the URL.
/// - Display name: oracle `clean_name` > scraped name > catalog name >
///   synthesized `"Unknown Product (<barcode>)"`.
/// - Deal shape: the regex parser's rule, overridden only when the oracle
///   supplied BOTH advisory fields.
/// - Price: oracle promo price (2 dp) when present, else computed from the
///   scraped price and the rule's percentage, else none.
///
/// `product_id` is left empty; the persistence step fills it in after the
/// product upsert.
pub(crate) fn build_record(
    group: &OfferGroup,
    resolution: &CatalogResolution,
    enrichment: &EnrichmentResult,
    store_id: Uuid,
    period: PromotionPeriod,
) -> PromotionRecord {
    let rule = parse_discount_label(&group.discount_label);

    let (is_multi_unit, deal_quantity) = match (enrichment.is_multi_unit, enrichment.deal_quantity)
    {
        (Some(multi), Some(quantity)) => (multi, quantity.max(1)),
        _ => (rule.is_multi_unit, rule.deal_quantity),
    };

    let barcode = match resolution {
        CatalogResolution::Matched(entry) => entry.barcode.clone(),
        CatalogResolution::Placeholder => placeholder_barcode(&group.source_url),
    };

    let catalog_name = match resolution {
        CatalogResolution::Matched(entry) => Some(entry.product_name.as_str()),
        CatalogResolution::Placeholder => None,
    };
    let display_name = first_non_blank(&[
        enrichment.clean_name.as_deref(),
        group.scraped_name.as_deref(),
        catalog_name,
    ])
    .map_or_else(|| format!("Unknown Product ({barcode})"), ToOwned::to_owned);

    let promo_price = enrichment
        .promo_price
        .map(|p| p.round_dp(2))
        .or_else(|| computed_promo_price(group.scraped_price, rule.equivalent_percentage));

    PromotionRecord {
        store_id,
        product_id: None,
        barcode,
        display_name,
        discount_label: group.discount_label.clone(),
        original_price: group.scraped_price,
        promo_price,
        equivalent_percentage: rule.equivalent_percentage,
        is_multi_unit,
        deal_quantity,
        category: enrichment.category,
        primary_macro: enrichment.primary_macro,
        is_healthy: enrichment.is_healthy,
        valid_from: period.valid_from,
        valid_until: period.valid_until,
        is_active: true,
    }
}

fn first_non_blank<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}

/// `original · (1 − pct/100)`, rounded to 2 decimals; `None` unless both
/// inputs are known.
fn computed_promo_price(original: Option<Decimal>, percentage: Option<f64>) -> Option<Decimal> {
    let original = original?;
    let percentage = Decimal::from_f64(percentage?)?;
    let factor = Decimal::ONE - percentage / Decimal::ONE_HUNDRED;
    Some((original * factor).round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use promodb_core::{Category, CatalogEntry, PrimaryMacro};

    fn period() -> PromotionPeriod {
        PromotionPeriod {
            valid_from: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2026, 7, 14).unwrap(),
        }
    }

    fn store_id() -> Uuid {
        Uuid::nil()
    }

    fn group(name: Option<&str>, discount: &str, price: Option<&str>) -> OfferGroup {
        OfferGroup {
            source_url: "https://www.colruyt.be/nl/producten/x".to_string(),
            scraped_name: name.map(ToOwned::to_owned),
            discount_label: discount.to_string(),
            barcode_candidates: vec!["5410228112345".to_string()],
            scraped_price: price.map(|p| p.parse().unwrap()),
        }
    }

    fn catalog_entry(name: &str) -> CatalogEntry {
        CatalogEntry {
            barcode: "5000112345678".to_string(),
            product_name: name.to_string(),
            brand: None,
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

    // -----------------------------------------------------------------------
    // Name resolution priority
    // -----------------------------------------------------------------------

    #[test]
    fn oracle_clean_name_beats_scraped_and_catalog() {
        let enrichment = EnrichmentResult {
            clean_name: Some("Coca-Cola 1.5L".to_string()),
            ..EnrichmentResult::default()
        };
        let record = build_record(
            &group(Some("PROMO Coca-Cola 1.5L"), "-20%", None),
            &CatalogResolution::Matched(catalog_entry("Coca Cola Regular")),
            &enrichment,
            store_id(),
            period(),
        );
        assert_eq!(record.display_name, "Coca-Cola 1.5L");
    }

    #[test]
    fn scraped_name_beats_catalog_name() {
        let record = build_record(
            &group(Some("PROMO Coca-Cola 1.5L"), "-20%", None),
            &CatalogResolution::Matched(catalog_entry("Coca Cola Regular")),
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );
        assert_eq!(record.display_name, "PROMO Coca-Cola 1.5L");
    }

    #[test]
    fn catalog_name_used_when_nothing_else_available() {
        let record = build_record(
            &group(None, "-20%", None),
            &CatalogResolution::Matched(catalog_entry("Coca Cola Regular")),
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );
        assert_eq!(record.display_name, "Coca Cola Regular");
    }

    #[test]
    fn unknown_product_synthesized_as_last_resort() {
        let record = build_record(
            &group(None, "-20%", None),
            &CatalogResolution::Placeholder,
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );
        assert!(
            record.display_name.starts_with("Unknown Product (URL-"),
            "got {}",
            record.display_name
        );
    }

    // -----------------------------------------------------------------------
    // Barcode resolution
    // -----------------------------------------------------------------------

    #[test]
    fn matched_entry_supplies_the_barcode() {
        let record = build_record(
            &group(None, "-20%", None),
            &CatalogResolution::Matched(catalog_entry("X")),
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );
        assert_eq!(record.barcode, "5000112345678");
    }

    #[test]
    fn placeholder_barcode_is_derived_from_url() {
        let record = build_record(
            &group(None, "-20%", None),
            &CatalogResolution::Placeholder,
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );
        assert_eq!(record.barcode, placeholder_barcode("https://www.colruyt.be/nl/producten/x"));
    }

    // -----------------------------------------------------------------------
    // Deal shape: parser vs oracle
    // -----------------------------------------------------------------------

    #[test]
    fn oracle_overrides_deal_shape_only_when_both_fields_present() {
        let both = EnrichmentResult {
            is_multi_unit: Some(true),
            deal_quantity: Some(6),
            ..EnrichmentResult::default()
        };
        let record = build_record(
            &group(None, "-20%", None),
            &CatalogResolution::Placeholder,
            &both,
            store_id(),
            period(),
        );
        assert!(record.is_multi_unit);
        assert_eq!(record.deal_quantity, 6);
    }

    #[test]
    fn oracle_with_one_advisory_field_does_not_override_parser() {
        let only_flag = EnrichmentResult {
            is_multi_unit: Some(true),
            deal_quantity: None,
            ..EnrichmentResult::default()
        };
        let record = build_record(
            &group(None, "1+1 GRATIS", None),
            &CatalogResolution::Placeholder,
            &only_flag,
            store_id(),
            period(),
        );
        // Parser values survive: 1+1 means 2 units.
        assert!(record.is_multi_unit);
        assert_eq!(record.deal_quantity, 2);
    }

    #[test]
    fn degraded_enrichment_keeps_parser_values_and_neutral_tags() {
        let record = build_record(
            &group(None, "2de AAN -50%", None),
            &CatalogResolution::Placeholder,
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );
        assert!(record.is_multi_unit);
        assert_eq!(record.deal_quantity, 2);
        assert_eq!(record.equivalent_percentage, Some(25.0));
        assert_eq!(record.category, Category::Overig);
        assert_eq!(record.primary_macro, PrimaryMacro::None);
        assert!(!record.is_healthy);
    }

    // -----------------------------------------------------------------------
    // Price resolution
    // -----------------------------------------------------------------------

    #[test]
    fn oracle_promo_price_wins_and_is_rounded() {
        let enrichment = EnrichmentResult {
            promo_price: Some("9.995".parse().unwrap()),
            ..EnrichmentResult::default()
        };
        let record = build_record(
            &group(None, "-20%", Some("19.99")),
            &CatalogResolution::Placeholder,
            &enrichment,
            store_id(),
            period(),
        );
        assert_eq!(record.promo_price, Some("10.00".parse().unwrap()));
    }

    #[test]
    fn price_computed_from_rule_when_oracle_silent() {
        let record = build_record(
            &group(None, "1+1 GRATIS", Some("19.99")),
            &CatalogResolution::Placeholder,
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );
        // 19.99 · (1 − 0.5) = 9.995 → 10.00 at two decimals.
        assert_eq!(record.promo_price, Some("10.00".parse().unwrap()));
        assert_eq!(record.original_price, Some("19.99".parse().unwrap()));
    }

    #[test]
    fn plain_percentage_price_computation() {
        let record = build_record(
            &group(None, "-20%", Some("10.00")),
            &CatalogResolution::Placeholder,
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );
        assert_eq!(record.promo_price, Some("8.00".parse().unwrap()));
    }

    #[test]
    fn no_price_when_original_unknown() {
        let record = build_record(
            &group(None, "-20%", None),
            &CatalogResolution::Placeholder,
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );
        assert!(record.promo_price.is_none());
    }

    #[test]
    fn no_price_when_label_unparseable() {
        let record = build_record(
            &group(None, "ACTIE", Some("10.00")),
            &CatalogResolution::Placeholder,
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );
        assert!(record.promo_price.is_none());
        assert!(record.equivalent_percentage.is_none());
    }

    // -----------------------------------------------------------------------
    // End-to-end shape of the Jupiler scenario
    // -----------------------------------------------------------------------

    #[test]
    fn jupiler_one_plus_one_without_catalog_match() {
        let record = build_record(
            &group(Some("Jupiler Pils Bak 24x25cl"), "1+1 GRATIS", Some("19.99")),
            &CatalogResolution::Placeholder,
            &EnrichmentResult::default(),
            store_id(),
            period(),
        );

        assert_eq!(record.display_name, "Jupiler Pils Bak 24x25cl");
        assert_eq!(record.deal_quantity, 2);
        assert!(record.is_multi_unit);
        assert_eq!(record.equivalent_percentage, Some(50.0));
        assert_eq!(record.promo_price, Some("10.00".parse().unwrap()));
        assert!(record.barcode.starts_with("URL-"));
        assert!(record.is_active);
    }
}
