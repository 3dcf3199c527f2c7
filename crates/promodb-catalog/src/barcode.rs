//! Barcode variant generation bridging UPC-A and EAN-13.
//!
//! Retail barcodes for the same product differ only in leading zeros across
//! standards (see the zero-padding relationship between 12-digit UPC-A and
//! 13-digit EAN-13). Lookups therefore try, in order: the exact input, the
//! input with leading zeros stripped, and the stripped digits left-padded
//! back to the 12- and 13-digit canonical widths. GTIN-14 and EAN-8
//! renumbering is not attempted.

/// Returns the ordered, deduplicated list of barcode forms to try.
///
/// Non-numeric input (e.g. a placeholder key) yields only the exact form.
/// Empty input yields nothing.
#[must_use]
pub fn barcode_variants(barcode: &str) -> Vec<String> {
    let exact = barcode.trim();
    if exact.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![exact.to_owned()];

    if !exact.bytes().all(|b| b.is_ascii_digit()) {
        return variants;
    }

    let stripped = exact.trim_start_matches('0');
    if !stripped.is_empty() {
        push_unique(&mut variants, stripped.to_owned());
        if stripped.len() < 12 {
            push_unique(&mut variants, pad_to(stripped, 12));
        }
        if stripped.len() < 13 {
            push_unique(&mut variants, pad_to(stripped, 13));
        }
    }

    variants
}

fn pad_to(digits: &str, width: usize) -> String {
    let zeros = width.saturating_sub(digits.len());
    let mut padded = "0".repeat(zeros);
    padded.push_str(digits);
    padded
}

fn push_unique(variants: &mut Vec<String>, candidate: String) {
    if !variants.contains(&candidate) {
        variants.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_form_comes_first() {
        let variants = barcode_variants("5410228112345");
        assert_eq!(variants[0], "5410228112345");
    }

    #[test]
    fn upc_a_input_produces_ean_13_variant() {
        // 12-digit UPC-A must also find a row stored in 13-digit EAN-13 form.
        let variants = barcode_variants("032456789012");
        assert!(variants.contains(&"0032456789012".to_string()));
    }

    #[test]
    fn ean_13_input_produces_upc_a_variant() {
        // ...and vice versa.
        let variants = barcode_variants("0032456789012");
        assert!(variants.contains(&"032456789012".to_string()));
    }

    #[test]
    fn leading_zeros_are_stripped() {
        let variants = barcode_variants("0005410228112345");
        assert!(variants.contains(&"5410228112345".to_string()));
    }

    #[test]
    fn thirteen_digit_without_leading_zero_has_no_padding_variants() {
        let variants = barcode_variants("5410228112345");
        assert_eq!(variants, vec!["5410228112345".to_string()]);
    }

    #[test]
    fn variants_are_deduplicated_and_ordered() {
        // pad-to-12 of the stripped form equals the exact input and must not
        // appear twice.
        let variants = barcode_variants("032456789012");
        assert_eq!(
            variants,
            vec![
                "032456789012".to_string(),
                "32456789012".to_string(),
                "0032456789012".to_string(),
            ]
        );
    }

    #[test]
    fn non_numeric_input_passes_through_untouched() {
        let variants = barcode_variants("URL-9f86d081884c7d65");
        assert_eq!(variants, vec!["URL-9f86d081884c7d65".to_string()]);
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert!(barcode_variants("").is_empty());
        assert!(barcode_variants("   ").is_empty());
    }

    #[test]
    fn input_is_trimmed() {
        let variants = barcode_variants(" 5410228112345 ");
        assert_eq!(variants[0], "5410228112345");
    }
}
