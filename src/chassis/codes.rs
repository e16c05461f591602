use std::sync::LazyLock;

/// Recognized chassis codes, 1980s-2000s focus.
pub const FOCUS_CODES: &[&str] = &[
    "E24", "E28", "E30", "E31", "E32", "E34",
    "E36-7", "E36-8", "E36",
    "E38", "E39", "E46",
    "E52", "E53", "E83",
    "Z1", "Z3", "Z8",
];

// Longer codes must be tried before shorter ones that are their substrings
// (E36-7 before E36), or a Z3 manual mislabels as the base 3-Series. The
// scan order is derived once: specificity = token length, declaration order
// breaks ties (sort_by is stable).
static BY_SPECIFICITY: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut codes = FOCUS_CODES.to_vec();
    codes.sort_by(|a, b| b.len().cmp(&a.len()));
    codes
});

pub fn by_specificity() -> &'static [&'static str] {
    &BY_SPECIFICITY
}

/// One production run: inclusive year range mapping to a chassis code.
#[derive(Debug, Clone, Copy)]
pub struct ProductionRange {
    pub start: u16,
    pub end: u16,
    pub code: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Three,
    Five,
    Seven,
    Eight,
}

// US production years, approximate. Ranges overlap at the generation
// boundaries (1991-93 E30 convertibles vs E36 sedans, 1999 E36 vs E46);
// first-declared-range-wins is the tie-break.
const THREE_SERIES: &[ProductionRange] = &[
    ProductionRange { start: 1984, end: 1991, code: "E30" },
    ProductionRange { start: 1992, end: 1999, code: "E36" },
    ProductionRange { start: 1999, end: 2006, code: "E46" },
];

const FIVE_SERIES: &[ProductionRange] = &[
    ProductionRange { start: 1982, end: 1988, code: "E28" },
    ProductionRange { start: 1989, end: 1995, code: "E34" },
    ProductionRange { start: 1996, end: 2003, code: "E39" },
];

const SEVEN_SERIES: &[ProductionRange] = &[
    ProductionRange { start: 1988, end: 1994, code: "E32" },
    ProductionRange { start: 1995, end: 2001, code: "E38" },
];

const EIGHT_SERIES: &[ProductionRange] = &[
    ProductionRange { start: 1990, end: 1999, code: "E31" },
];

// X-car tokens are only decisive inside their production windows.
pub const X5_WINDOW: (u16, u16) = (2000, 2006);
pub const X3_WINDOW: (u16, u16) = (2004, 2010);

impl Series {
    pub fn ranges(self) -> &'static [ProductionRange] {
        match self {
            Series::Three => THREE_SERIES,
            Series::Five => FIVE_SERIES,
            Series::Seven => SEVEN_SERIES,
            Series::Eight => EIGHT_SERIES,
        }
    }
}

/// First declared range containing the year wins.
pub fn range_lookup(series: Series, year: u16) -> Option<&'static str> {
    series
        .ranges()
        .iter()
        .find(|r| r.start <= year && year <= r.end)
        .map(|r| r.code)
}

/// Externally published guide slug for a chassis code. The guide blog files
/// Z- and X-cars under their model names, so distinct internal codes can
/// share one slug (E36-7 and E36-8 are both z3).
pub fn guide_slug(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "e36-7" | "e36-8" => "z3".to_string(),
        "e52" => "z8".to_string(),
        "e53" => "x5".to_string(),
        "e83" => "x3".to_string(),
        other => other.to_string(),
    }
}

// ── Tests ──
