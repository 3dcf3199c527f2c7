//! Parser for retailer discount labels.
//!
//! Turns free text like `"-20%"`, `"1+1 GRATIS"`, `"2de aan -50%"`, or
//! `"-40% VANAF 6 ST"` into a normalized [`DiscountRule`]. Parsing is total:
//! a label the grammar does not recognize yields the no-discount rule rather
//! than an error, and re-parsing the same label always yields the same rule.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Normalized decomposition of a discount label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRule {
    /// The label exactly as scraped.
    pub raw_label: String,
    /// Per-unit discount expressed as a percentage, rounded to 2 decimals.
    /// `None` when the label is unparseable.
    pub equivalent_percentage: Option<f64>,
    /// Whether more than one unit must be bought to realize the rate.
    pub is_multi_unit: bool,
    /// Total units in one complete deal cycle; always at least 1.
    pub deal_quantity: u32,
}

impl DiscountRule {
    fn unparsed(raw_label: &str) -> Self {
        Self {
            raw_label: raw_label.to_owned(),
            equivalent_percentage: None,
            is_multi_unit: false,
            deal_quantity: 1,
        }
    }
}

// Grammar, in order of precedence. Numeric tokens accept `.` or `,` as the
// decimal separator; "2de"/"2e" spellings are both recognized.
static NTH_AT_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*d?e\s+aan\s+-?\s*(\d+(?:[.,]\d+)?)\s*%").expect("valid regex")
});
static NTH_AT_HALF_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*d?e\s+aan\s+halve\s+prijs").expect("valid regex"));
static NTH_FREE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*d?e\s+gratis").expect("valid regex"));
static N_PLUS_M_FREE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*\+\s*(\d+)\s*gratis").expect("valid regex"));
static PERCENT_FROM_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)-?\s*(\d+(?:[.,]\d+)?)\s*%\s+vanaf\s+(\d+)\s*st").expect("valid regex")
});
static PLAIN_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*%").expect("valid regex"));

/// Parses a free-text discount label into a [`DiscountRule`].
///
/// Never fails: unrecognized input yields `equivalent_percentage = None`,
/// `is_multi_unit = false`, `deal_quantity = 1`.
#[must_use]
pub fn parse_discount_label(raw_label: &str) -> DiscountRule {
    let label = raw_label.trim();

    // "2de aan -50%": one of N units discounted by X, averaged over N.
    if let Some(caps) = NTH_AT_PERCENT.captures(label) {
        if let (Some(n), Some(pct)) = (parse_count(&caps[1]), parse_number(&caps[2])) {
            return DiscountRule {
                raw_label: raw_label.to_owned(),
                equivalent_percentage: Some(round2(pct / f64::from(n))),
                is_multi_unit: n > 1,
                deal_quantity: n,
            };
        }
    }

    // "2de aan halve prijs": one of N units at -50%.
    if let Some(caps) = NTH_AT_HALF_PRICE.captures(label) {
        if let Some(n) = parse_count(&caps[1]) {
            return DiscountRule {
                raw_label: raw_label.to_owned(),
                equivalent_percentage: Some(round2(50.0 / f64::from(n))),
                is_multi_unit: n > 1,
                deal_quantity: n,
            };
        }
    }

    // "2de gratis": one of N units free.
    if let Some(caps) = NTH_FREE.captures(label) {
        if let Some(n) = parse_count(&caps[1]) {
            return DiscountRule {
                raw_label: raw_label.to_owned(),
                equivalent_percentage: Some(round2(100.0 / f64::from(n))),
                is_multi_unit: n > 1,
                deal_quantity: n,
            };
        }
    }

    // "1+1 gratis": pay N, receive N+M.
    if let Some(caps) = N_PLUS_M_FREE.captures(label) {
        if let (Some(n), Some(m)) = (parse_u32(&caps[1]), parse_u32(&caps[2])) {
            let total = n.saturating_add(m);
            if total >= 1 {
                return DiscountRule {
                    raw_label: raw_label.to_owned(),
                    equivalent_percentage: Some(round2(
                        f64::from(m) / f64::from(total) * 100.0,
                    )),
                    is_multi_unit: total > 1,
                    deal_quantity: total,
                };
            }
        }
    }

    // "-40% vanaf 6 st": threshold discount, active from N units.
    if let Some(caps) = PERCENT_FROM_QUANTITY.captures(label) {
        if let (Some(pct), Some(n)) = (parse_number(&caps[1]), parse_count(&caps[2])) {
            return DiscountRule {
                raw_label: raw_label.to_owned(),
                equivalent_percentage: Some(round2(pct)),
                is_multi_unit: true,
                deal_quantity: n,
            };
        }
    }

    // "-20%", "30% KORTING": plain per-unit percentage.
    if let Some(caps) = PLAIN_PERCENT.captures(label) {
        if let Some(pct) = parse_number(&caps[1]) {
            return DiscountRule {
                raw_label: raw_label.to_owned(),
                equivalent_percentage: Some(round2(pct)),
                is_multi_unit: false,
                deal_quantity: 1,
            };
        }
    }

    DiscountRule::unparsed(raw_label)
}

/// Parses a numeric token, normalizing `,` to `.` first.
fn parse_number(token: &str) -> Option<f64> {
    token.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_u32(token: &str) -> Option<u32> {
    token.parse::<u32>().ok()
}

/// Parses a unit count, clamping 0 up to 1 so `deal_quantity >= 1` holds.
fn parse_count(token: &str) -> Option<u32> {
    parse_u32(token).map(|n| n.max(1))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
