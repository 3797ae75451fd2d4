//! Value-level type prediction.
//!
//! Classifies one raw value into a canonical [`ColumnType`]. The checks form a
//! cascade where the first match wins:
//!
//! ```text
//! boolean → binary → integer → decimal → exponent
//!         → datetimetz → datetime → date → time → json → text
//! ```
//!
//! Integers are refined by range (tinyint … bigint) and text/json by length
//! (varchar … longtext). `None` means "no observation": it never narrows or
//! widens a running column type.

pub mod number;
pub mod temporal;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};
use crate::types::{ColumnType, LONGTEXT_CEILING};

pub use number::{normalize_number, NormalizedNumber};
pub use temporal::TemporalMatch;

static BINARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[01]+$").unwrap());
static EXPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)[eE][+-]?[0-9]+$").unwrap()
});

/// Render a value the way it is measured and stored.
///
/// Strings are taken verbatim, structured values are serialized as JSON.
/// Returns `None` for JSON null.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Predict the type of a JSON value.
pub fn predict_type(value: &Value) -> SchemaResult<Option<ColumnType>> {
    match value_to_string(value) {
        Some(s) => predict_str(&s),
        None => Ok(None),
    }
}

/// Predict the type of a raw textual value.
pub fn predict_str(raw: &str) -> SchemaResult<Option<ColumnType>> {
    let s = raw.trim();

    if is_boolean(s) {
        return Ok(Some(ColumnType::Boolean));
    }
    if BINARY.is_match(s) {
        return Ok(Some(ColumnType::Binary));
    }

    if let Some(number) = normalize_number(s) {
        if number.is_integer() {
            if let Some(ty) = integer_type(&number) {
                return Ok(Some(ty));
            }
            // Out of 64-bit range: store the digits as text.
            return text_type(raw).map(Some);
        }
        return Ok(Some(ColumnType::Decimal));
    }

    if EXPONENT.is_match(s) {
        return Ok(Some(ColumnType::Exponent));
    }

    match temporal::detect(s) {
        TemporalMatch::Kind(ty) => return Ok(Some(ty)),
        TemporalMatch::Invalid => return Ok(None),
        TemporalMatch::NoMatch => {}
    }

    if is_json(s) {
        let length = char_length(raw);
        if length >= LONGTEXT_CEILING {
            return Err(SchemaError::data_too_long(raw, length));
        }
        return Ok(Some(ColumnType::Json));
    }

    text_type(raw).map(Some)
}

/// Character length used for all length accounting.
pub fn char_length(s: &str) -> u64 {
    s.chars().count() as u64
}

fn is_boolean(s: &str) -> bool {
    matches!(s, "0" | "1") || s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")
}

fn is_json(s: &str) -> bool {
    let structured = (s.starts_with('{') && s.ends_with('}'))
        || (s.starts_with('[') && s.ends_with(']'));
    structured && serde_json::from_str::<Value>(s).is_ok()
}

fn integer_type(number: &NormalizedNumber) -> Option<ColumnType> {
    let value: i128 = number.canonical().parse().ok()?;
    let ty = if (i8::MIN as i128..=i8::MAX as i128).contains(&value) {
        ColumnType::Tinyint
    } else if (i16::MIN as i128..=i16::MAX as i128).contains(&value) {
        ColumnType::Smallint
    } else if (i32::MIN as i128..=i32::MAX as i128).contains(&value) {
        ColumnType::Int
    } else if (i64::MIN as i128..=i64::MAX as i128).contains(&value) {
        ColumnType::Bigint
    } else {
        return None;
    };
    Some(ty)
}

fn text_type(raw: &str) -> SchemaResult<ColumnType> {
    let length = char_length(raw);
    ColumnType::text_for_length(length).ok_or_else(|| SchemaError::data_too_long(raw, length))
}
