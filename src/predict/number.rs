//! Locale-aware number normalization.
//!
//! Accepts the digit-grouping conventions commonly found in exported data:
//!
//! | Convention | Example |
//! |------------|---------|
//! | plain | `1234567.89` |
//! | US | `1,234,567.89` |
//! | EU | `1.234.567,89` |
//! | space | `1 234 567,89` (also NBSP / narrow NBSP) |
//! | Swiss | `1'234'567.89` |
//! | Indian | `12,34,567.89` |
//! | comma decimal | `1234,5` |
//!
//! Anything ambiguous (mixed group sizes, more than one decimal separator)
//! is rejected so the value falls through to the non-numeric checks.

use once_cell::sync::Lazy;
use regex::Regex;

static PLAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)(?:\.([0-9]+))?$").unwrap());
static US: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,3}(?:,[0-9]{3})+)(?:\.([0-9]+))?$").unwrap());
static INDIAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2}(?:,[0-9]{2})+,[0-9]{3})(?:\.([0-9]+))?$").unwrap()
});
static EU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,3}(?:\.[0-9]{3})+)(?:,([0-9]+))?$").unwrap());
static SPACED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,3}(?:[ \x{00A0}\x{202F}][0-9]{3})+)(?:[.,]([0-9]+))?$").unwrap()
});
static SWISS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,3}(?:['\x{2019}][0-9]{3})+)(?:\.([0-9]+))?$").unwrap());
static COMMA_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+),([0-9]+)$").unwrap());

/// A number split into its sign, integer digits and fractional digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedNumber {
    pub negative: bool,
    /// Integer digits with grouping separators removed.
    pub integer: String,
    /// Fractional digits, if a decimal separator was present.
    pub fraction: Option<String>,
}

impl NormalizedNumber {
    /// Whether the number has no fractional part.
    pub fn is_integer(&self) -> bool {
        self.fraction.is_none()
    }

    /// Number of digits before the decimal separator.
    pub fn integer_digits(&self) -> u64 {
        self.integer.len() as u64
    }

    /// Number of digits after the decimal separator.
    pub fn decimal_digits(&self) -> u32 {
        self.fraction.as_ref().map_or(0, |f| f.len() as u32)
    }

    /// The number in plain `-1234.56` form.
    pub fn canonical(&self) -> String {
        let sign = if self.negative { "-" } else { "" };
        match &self.fraction {
            Some(fraction) => format!("{sign}{}.{fraction}", self.integer),
            None => format!("{sign}{}", self.integer),
        }
    }
}

/// Normalize a numeric-looking string.
///
/// Returns `None` when the text is not an unambiguous number.
pub fn normalize_number(s: &str) -> Option<NormalizedNumber> {
    let trimmed = s.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if body.is_empty() {
        return None;
    }

    // Order matters: `1,234` is read as US grouping, not a comma decimal.
    let patterns: [&Regex; 7] = [&PLAIN, &US, &INDIAN, &EU, &SPACED, &SWISS, &COMMA_DECIMAL];
    let caps = patterns.iter().find_map(|re| re.captures(body))?;

    let integer: String = caps
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if integer.len() > 1 && integer.starts_with('0') {
        return None;
    }

    Some(NormalizedNumber {
        negative,
        integer,
        fraction: caps.get(2).map(|m| m.as_str().to_string()),
    })
}
