//! Date and time detection.
//!
//! Recognizes the formats that show up in exported row data and validates
//! the calendar values with `chrono`. A value that has the *shape* of a date
//! but is not a real calendar value (`2023-02-30`, `25:00`) is reported as
//! [`TemporalMatch::Invalid`] so the caller can treat it as "no observation"
//! rather than silently widening the column to text.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::types::ColumnType;

/// Outcome of temporal detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalMatch {
    /// The value is a valid date/time of the given type.
    Kind(ColumnType),
    /// The value looks like a date/time but does not name a real instant.
    Invalid,
    /// The value is not temporal.
    NoMatch,
}

const ZONE_ABBREVIATIONS: &[&str] = &[
    "UTC", "GMT", "UT", "Z", "EST", "EDT", "CST", "CDT", "MST", "MDT", "PST", "PDT", "AKST",
    "AKDT", "HST", "CET", "CEST", "EET", "EEST", "WET", "WEST", "BST", "IST", "JST", "KST",
    "AEST", "AEDT", "ACST", "AWST", "NZST", "NZDT", "MSK",
];

static LEGACY_EPOCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/Date\((-?[0-9]+)([+-][0-9]{4})?\)/$").unwrap());

static ISO_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})[Tt ]([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:[.,][0-9]{1,9})?)?\s*([Zz]|[+-][0-9]{2}(?::?[0-9]{2})?)?$",
    )
    .unwrap()
});

static ISO_DATETIME_ABBREV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})[Tt ]([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:\.[0-9]{1,9})?)?\s+([A-Za-z]{1,5})$",
    )
    .unwrap()
});

static RFC2822_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z]{3},\s*)?[0-9]{1,2}\s+[A-Za-z]{3}\s+[0-9]{4}\s+[0-9]{2}:[0-9]{2}").unwrap()
});

static JS_DATE_STRING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z]{3} ([A-Za-z]{3}) ([0-9]{1,2}) ([0-9]{4}) ([0-9]{2}):([0-9]{2}):([0-9]{2}) GMT[+-][0-9]{4}(?: \(.*\))?$",
    )
    .unwrap()
});

static SLASH_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})[ Tt,]+([0-9]{1,2}):([0-9]{2})(?::([0-9]{2}))?(?:\s*([AaPp][Mm]))?$",
    )
    .unwrap()
});

static DOT_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2})\.([0-9]{1,2})\.([0-9]{4})[ Tt]+([0-9]{1,2}):([0-9]{2})(?::([0-9]{2}))?$")
        .unwrap()
});

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})[-/]([0-9]{1,2})[-/]([0-9]{1,2})$").unwrap());
static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})$").unwrap());
static DOT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})\.([0-9]{1,2})\.([0-9]{4})$").unwrap());
static MONTH_FIRST_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{3,9})\.? ([0-9]{1,2}),? ([0-9]{4})$").unwrap());
static DAY_FIRST_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2}) ([A-Za-z]{3,9})\.?,? ([0-9]{4})$").unwrap());

static TIME_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2}):([0-9]{2})(?::([0-9]{2})(?:\.[0-9]{1,9})?)?(?:\s*([AaPp][Mm]))?$")
        .unwrap()
});

/// Classify a value as date-with-zone, date-time, date, time, or none.
pub fn detect(value: &str) -> TemporalMatch {
    let s = value.trim();
    if s.is_empty() || !s.bytes().any(|b| b.is_ascii_digit()) {
        return TemporalMatch::NoMatch;
    }

    if let Some(caps) = LEGACY_EPOCH.captures(s) {
        let millis = caps[1].parse::<i64>().ok();
        let valid = millis.and_then(DateTime::<Utc>::from_timestamp_millis).is_some();
        let kind = if caps.get(2).is_some() {
            ColumnType::Datetimetz
        } else {
            ColumnType::Datetime
        };
        return verdict(valid, kind);
    }

    if let Some(caps) = ISO_DATETIME.captures(s) {
        let valid = valid_ymd_caps(&caps, 1, 2, 3) && valid_hms_caps(&caps, 4, 5, 6, None);
        let kind = if caps.get(7).is_some() {
            ColumnType::Datetimetz
        } else {
            ColumnType::Datetime
        };
        return verdict(valid, kind);
    }

    if let Some(caps) = ISO_DATETIME_ABBREV.captures(s) {
        let zone = caps[7].to_ascii_uppercase();
        if ZONE_ABBREVIATIONS.contains(&zone.as_str()) {
            let valid = valid_ymd_caps(&caps, 1, 2, 3) && valid_hms_caps(&caps, 4, 5, 6, None);
            return verdict(valid, ColumnType::Datetimetz);
        }
        return TemporalMatch::NoMatch;
    }

    if RFC2822_SHAPE.is_match(s) {
        let valid = DateTime::<FixedOffset>::parse_from_rfc2822(s).is_ok();
        return verdict(valid, ColumnType::Datetimetz);
    }

    if let Some(caps) = JS_DATE_STRING.captures(s) {
        let valid = match (month_from_name(&caps[1]), caps[2].parse(), caps[3].parse()) {
            (Some(month), Ok(day), Ok(year)) => {
                valid_ymd(year, month, day) && valid_hms_caps(&caps, 4, 5, 6, None)
            }
            _ => false,
        };
        return verdict(valid, ColumnType::Datetimetz);
    }

    if let Some(caps) = SLASH_DATETIME.captures(s) {
        let valid = valid_month_day_caps(&caps, 3, 1, 2)
            && valid_hms_caps(&caps, 4, 5, 6, caps.get(7).map(|m| m.as_str()));
        return verdict(valid, ColumnType::Datetime);
    }

    if let Some(caps) = DOT_DATETIME.captures(s) {
        let valid = valid_ymd_caps(&caps, 3, 2, 1) && valid_hms_caps(&caps, 4, 5, 6, None);
        return verdict(valid, ColumnType::Datetime);
    }

    if let Some(caps) = ISO_DATE.captures(s) {
        return verdict(valid_ymd_caps(&caps, 1, 2, 3), ColumnType::Date);
    }

    if let Some(caps) = SLASH_DATE.captures(s) {
        return verdict(valid_month_day_caps(&caps, 3, 1, 2), ColumnType::Date);
    }

    if let Some(caps) = DOT_DATE.captures(s) {
        return verdict(valid_ymd_caps(&caps, 3, 2, 1), ColumnType::Date);
    }

    if let Some(caps) = MONTH_FIRST_DATE.captures(s) {
        return match month_from_name(&caps[1]) {
            Some(month) => verdict(
                parse_ymd(&caps[3], month, &caps[2]).is_some(),
                ColumnType::Date,
            ),
            None => TemporalMatch::NoMatch,
        };
    }

    if let Some(caps) = DAY_FIRST_DATE.captures(s) {
        return match month_from_name(&caps[2]) {
            Some(month) => verdict(
                parse_ymd(&caps[3], month, &caps[1]).is_some(),
                ColumnType::Date,
            ),
            None => TemporalMatch::NoMatch,
        };
    }

    if let Some(caps) = TIME_ONLY.captures(s) {
        let valid = valid_hms_caps(&caps, 1, 2, 3, caps.get(4).map(|m| m.as_str()));
        return verdict(valid, ColumnType::Time);
    }

    TemporalMatch::NoMatch
}

fn verdict(valid: bool, kind: ColumnType) -> TemporalMatch {
    if valid {
        TemporalMatch::Kind(kind)
    } else {
        TemporalMatch::Invalid
    }
}

fn valid_ymd(year: i32, month: u32, day: u32) -> bool {
    NaiveDate::from_ymd_opt(year, month, day).is_some()
}

fn parse_ymd(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}

fn cap_u32(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx).and_then(|m| m.as_str().parse().ok())
}

fn valid_ymd_caps(caps: &Captures<'_>, y: usize, m: usize, d: usize) -> bool {
    let year = caps.get(y).and_then(|v| v.as_str().parse::<i32>().ok());
    match (year, cap_u32(caps, m), cap_u32(caps, d)) {
        (Some(year), Some(month), Some(day)) => valid_ymd(year, month, day),
        _ => false,
    }
}

/// Month-first dates fall back to day-first when the month is out of range.
fn valid_month_day_caps(caps: &Captures<'_>, y: usize, first: usize, second: usize) -> bool {
    let year = caps.get(y).and_then(|v| v.as_str().parse::<i32>().ok());
    match (year, cap_u32(caps, first), cap_u32(caps, second)) {
        (Some(year), Some(a), Some(b)) => {
            valid_ymd(year, a, b) || (a > 12 && valid_ymd(year, b, a))
        }
        _ => false,
    }
}

fn valid_hms_caps(
    caps: &Captures<'_>,
    h: usize,
    m: usize,
    s: usize,
    meridiem: Option<&str>,
) -> bool {
    let (Some(mut hour), Some(minute)) = (cap_u32(caps, h), cap_u32(caps, m)) else {
        return false;
    };
    let second = cap_u32(caps, s).unwrap_or(0);

    if let Some(meridiem) = meridiem {
        if !(1..=12).contains(&hour) {
            return false;
        }
        let pm = meridiem.eq_ignore_ascii_case("pm");
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, second).is_some()
}

fn month_from_name(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
