//! UN/ECE Recommendation 20 unit codes.
//!
//! Callers often supply business unit names ("hour", "pcs") instead of
//! Rec 20 codes; [`unit_code_for`] maps the small closed set the invoicing
//! forms offer. Values that already are codes pass through.

/// Generic "each" code used when a line carries no unit.
pub const DEFAULT_UNIT_CODE: &str = "EA";

/// Business unit names and their Rec 20 code. Sorted by name for binary search.
static UNIT_NAMES: &[(&str, &str)] = &[
    ("box", "BX"),
    ("day", "DAY"),
    ("days", "DAY"),
    ("each", "EA"),
    ("hour", "HUR"),
    ("hours", "HUR"),
    ("hr", "HUR"),
    ("kg", "KGM"),
    ("kilogram", "KGM"),
    ("liter", "LTR"),
    ("litre", "LTR"),
    ("lot", "LS"),
    ("lump sum", "LS"),
    ("m", "MTR"),
    ("meter", "MTR"),
    ("metre", "MTR"),
    ("month", "MON"),
    ("months", "MON"),
    ("pc", "H87"),
    ("pcs", "H87"),
    ("piece", "H87"),
    ("set", "SET"),
    ("unit", "C62"),
    ("units", "C62"),
    ("week", "WEE"),
    ("year", "ANN"),
];

/// Rec 20 codes accepted as-is. Sorted for binary search.
static KNOWN_CODES: &[&str] = &[
    "ANN", "BX", "C62", "DAY", "EA", "H87", "HUR", "KGM", "LS", "LTR", "MIN", "MON", "MTK", "MTR",
    "PR", "SET", "WEE", "XPK",
];

/// Map a business unit name or code to a Rec 20 code.
///
/// Blank input yields [`DEFAULT_UNIT_CODE`]. Unknown values are returned
/// trimmed but otherwise untouched.
pub fn unit_code_for(unit: &str) -> String {
    let trimmed = unit.trim();
    if trimmed.is_empty() {
        return DEFAULT_UNIT_CODE.to_string();
    }
    let lower = trimmed.to_ascii_lowercase();
    if let Ok(i) = UNIT_NAMES.binary_search_by(|(name, _)| (*name).cmp(lower.as_str())) {
        return UNIT_NAMES[i].1.to_string();
    }
    let upper = trimmed.to_ascii_uppercase();
    if is_known_unit_code(&upper) {
        return upper;
    }
    trimmed.to_string()
}

/// Check whether `code` is one of the Rec 20 codes this profile emits.
pub fn is_known_unit_code(code: &str) -> bool {
    KNOWN_CODES.binary_search(&code).is_ok()
}
