use std::sync::LazyLock;

use regex::Regex;

use super::codes::{self, Series, X3_WINDOW, X5_WINDOW};

// 1980-2009; manuals outside that window are not in the catalog anyway.
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19[89]\d|200\d)\b").unwrap());

// Model-number shapes on the uppercased text: "325I", "318IS", "535I", "750IL".
static THREE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b3\d\d[A-Z]{0,3}\b").unwrap());
static FIVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b5\d\d[A-Z]{0,3}\b").unwrap());
static SEVEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b7\d\d[A-Z]{0,3}\b").unwrap());

/// Recover a chassis code from contextual clues alone: a production year
/// plus a series signal. Neither is sufficient by itself -- a "325i" exists
/// across the E30, E36 and E46 eras -- so a missing year is an immediate
/// miss, even for the short-circuit tokens.
pub fn infer(text: &str) -> Option<&'static str> {
    let upper = text.to_uppercase();

    let year = extract_year(&upper)?;

    if THREE_RE.is_match(&upper) || upper.contains("M3") || upper.contains("3-SERIES") {
        return codes::range_lookup(Series::Three, year);
    }
    if FIVE_RE.is_match(&upper) || upper.contains("M5") || upper.contains("5-SERIES") {
        return codes::range_lookup(Series::Five, year);
    }
    if SEVEN_RE.is_match(&upper) || upper.contains("7-SERIES") {
        return codes::range_lookup(Series::Seven, year);
    }
    if upper.contains("850") || upper.contains("840") || upper.contains("8-SERIES") {
        return codes::range_lookup(Series::Eight, year);
    }

    // Narrow production windows: token presence is decisive, no range table.
    if upper.contains("Z3") || upper.contains("M ROADSTER") || upper.contains("M COUPE") {
        return Some("Z3");
    }
    if upper.contains("Z8") {
        return Some("Z8");
    }
    if upper.contains("X5") {
        return in_window(year, X5_WINDOW).then_some("E53");
    }
    if upper.contains("X3") {
        return in_window(year, X3_WINDOW).then_some("E83");
    }

    None
}

fn extract_year(upper: &str) -> Option<u16> {
    YEAR_RE.find(upper).and_then(|m| m.as_str().parse().ok())
}

fn in_window(year: u16, (start, end): (u16, u16)) -> bool {
    start <= year && year <= end
}

// ── Tests ──
