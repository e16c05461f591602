use super::codes;

/// First catalog code occurring literally in the text, case-insensitive.
/// The scan order is specificity-ranked, so colliding prefixes resolve to
/// the longer code. Absence of a match is not an error; the inferrer gets
/// the next look.
pub fn find(text: &str) -> Option<&'static str> {
    let upper = text.to_uppercase();
    codes::by_specificity()
        .iter()
        .copied()
        .find(|code| upper.contains(code))
}

// ── Tests ──
