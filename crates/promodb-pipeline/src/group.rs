//! Grouping of raw scrape rows by canonical page URL.

use std::collections::HashMap;

use promodb_core::RawScrapeItem;
use sha2::{Digest, Sha256};

use crate::types::OfferGroup;

/// Groups raw items by `source_url`, preserving first-seen order.
///
/// Items without a discount label are dropped at this boundary — a row the
/// scraper could not read a discount from has nothing to price. Within a
/// group, the first non-blank name and price win and barcode candidates are
/// collected distinct, in listed order.
#[must_use]
pub fn group_items(items: Vec<RawScrapeItem>) -> Vec<OfferGroup> {
    let mut groups: Vec<OfferGroup> = Vec::new();
    let mut index_by_url: HashMap<String, usize> = HashMap::new();

    for item in items {
        if item.discount_label.trim().is_empty() {
            tracing::debug!(url = %item.source_url, "skipping item without discount label");
            continue;
        }

        let idx = match index_by_url.get(&item.source_url) {
            Some(&idx) => idx,
            None => {
                index_by_url.insert(item.source_url.clone(), groups.len());
                groups.push(OfferGroup {
                    source_url: item.source_url.clone(),
                    scraped_name: None,
                    discount_label: item.discount_label.clone(),
                    barcode_candidates: Vec::new(),
                    scraped_price: None,
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[idx];
        if group.scraped_name.is_none() {
            group.scraped_name = item.scraped_name.filter(|n| !n.trim().is_empty());
        }
        if group.scraped_price.is_none() {
            group.scraped_price = item.scraped_price;
        }
        if let Some(barcode) = item.barcode_candidate {
            let barcode = barcode.trim().to_owned();
            if !barcode.is_empty() && !group.barcode_candidates.contains(&barcode) {
                group.barcode_candidates.push(barcode);
            }
        }
    }

    groups
}

/// Deterministic placeholder barcode for a group that matched nothing.
///
/// Derived from the page URL (the group's technical identifier) so repeated
/// runs upsert the same placeholder product instead of multiplying rows.
#[must_use]
pub fn placeholder_barcode(source_url: &str) -> String {
    let digest = Sha256::digest(source_url.as_bytes());
    let hex = format!("{digest:x}");
    format!("URL-{}", &hex[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str, name: Option<&str>, discount: &str, barcode: Option<&str>) -> RawScrapeItem {
        RawScrapeItem {
            source_url: url.to_string(),
            scraped_name: name.map(ToOwned::to_owned),
            discount_label: discount.to_string(),
            barcode_candidate: barcode.map(ToOwned::to_owned),
            scraped_price: None,
        }
    }

    #[test]
    fn groups_by_url_preserving_first_seen_order() {
        let groups = group_items(vec![
            item("u2", Some("B"), "-20%", Some("2222")),
            item("u1", Some("A"), "-10%", Some("1111")),
            item("u2", None, "-20%", Some("3333")),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].source_url, "u2");
        assert_eq!(groups[1].source_url, "u1");
    }

    #[test]
    fn merges_barcode_candidates_distinct_in_order() {
        let groups = group_items(vec![
            item("u1", None, "-10%", Some("1111")),
            item("u1", None, "-10%", Some("2222")),
            item("u1", None, "-10%", Some("1111")),
            item("u1", None, "-10%", None),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].barcode_candidates, vec!["1111", "2222"]);
    }

    #[test]
    fn first_non_blank_name_wins() {
        let groups = group_items(vec![
            item("u1", None, "-10%", None),
            item("u1", Some("  "), "-10%", None),
            item("u1", Some("Jupiler"), "-10%", None),
            item("u1", Some("Other"), "-10%", None),
        ]);

        assert_eq!(groups[0].scraped_name.as_deref(), Some("Jupiler"));
    }

    #[test]
    fn items_without_discount_are_dropped() {
        let groups = group_items(vec![
            item("u1", Some("A"), "", None),
            item("u2", Some("B"), "  ", None),
            item("u3", Some("C"), "-10%", None),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].source_url, "u3");
    }

    #[test]
    fn first_price_wins() {
        let mut first = item("u1", None, "-10%", None);
        first.scraped_price = Some("19.99".parse().unwrap());
        let mut second = item("u1", None, "-10%", None);
        second.scraped_price = Some("24.99".parse().unwrap());

        let groups = group_items(vec![first, second]);
        assert_eq!(groups[0].scraped_price, Some("19.99".parse().unwrap()));
    }

    #[test]
    fn placeholder_barcode_is_deterministic_and_distinct() {
        let a1 = placeholder_barcode("https://example.com/a");
        let a2 = placeholder_barcode("https://example.com/a");
        let b = placeholder_barcode("https://example.com/b");

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert!(a1.starts_with("URL-"));
        assert_eq!(a1.len(), "URL-".len() + 16);
    }
}
