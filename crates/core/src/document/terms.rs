//! Payment terms parsing.

/// Parses a payment terms string into a number of days.
///
/// Accepted forms (case-insensitive): `"Net N"`, `"N days"`, `"N"` and
/// `"Due on receipt"` (0 days). Anything else yields `None`.
#[must_use]
pub fn parse_payment_terms(terms: &str) -> Option<i64> {
    let normalized = terms.trim().to_lowercase();
    if normalized == "due on receipt" {
        return Some(0);
    }

    let number = normalized
        .strip_prefix("net")
        .or_else(|| normalized.strip_suffix("days"))
        .or_else(|| normalized.strip_suffix("day"))
        .unwrap_or(&normalized)
        .trim();

    number.parse::<u32>().ok().map(i64::from)
}

/// Days until due for optional terms, falling back to `default_days`.
#[must_use]
pub fn days_from_terms(terms: Option<&str>, default_days: i64) -> i64 {
    terms.and_then(parse_payment_terms).unwrap_or(default_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Net 30", Some(30))]
    #[case("net 15", Some(15))]
    #[case("NET45", Some(45))]
    #[case("60 days", Some(60))]
    #[case("1 day", Some(1))]
    #[case("10", Some(10))]
    #[case("Due on receipt", Some(0))]
    #[case("  DUE ON RECEIPT ", Some(0))]
    #[case("2/10 Net 30", None)]
    #[case("Net -5", None)]
    #[case("", None)]
    #[case("whenever", None)]
    fn test_parse_payment_terms(#[case] terms: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_payment_terms(terms), expected);
    }

    #[test]
    fn test_default_when_unparsable() {
        assert_eq!(days_from_terms(Some("whenever"), 30), 30);
        assert_eq!(days_from_terms(None, 30), 30);
        assert_eq!(days_from_terms(Some("Net 10"), 30), 10);
    }
}
