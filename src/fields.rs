//! Field extraction and lenient type coercion for raw crawler records.
//! None of these functions fail: unusable values degrade to empty/zero/None.

use serde_json::{Map, Value};
use time::macros::format_description;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Value of the first listed field that is present and not null.
pub fn get_first_present<'a>(record: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    first_present_named(record, names).map(|(_, v)| v)
}

/// Like [`get_first_present`], also returning which alias matched.
pub(crate) fn first_present_named<'a, 'n>(
    record: &'a Map<String, Value>,
    names: &[&'n str],
) -> Option<(&'n str, &'a Value)> {
    names.iter().find_map(|name| match record.get(*name) {
        Some(Value::Null) | None => None,
        Some(v) => Some((*name, v)),
    })
}

/// Render a scalar as text. Objects and arrays have no text form.
pub fn coerce_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Interaction counter: integers pass through, numeric strings are parsed,
/// everything else (including negatives) is 0.
pub fn coerce_count(v: &Value) -> u64 {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().map(|i| i.max(0) as u64).unwrap_or(0),
        _ => 0,
    }
}

/// Absolute time from Unix seconds (number or numeric string) or an ISO-8601 string.
pub fn coerce_timestamp(v: &Value) -> Option<OffsetDateTime> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                from_unix_seconds(i)
            } else {
                n.as_f64().and_then(from_unix_seconds_f64)
            }
        }
        Value::String(s) => parse_time_text(s.trim()),
        _ => None,
    }
}

/// Integer epoch (any unit) used by the crawler's `last_modify_ts` bookkeeping.
pub fn coerce_epoch(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Picture/URL list from either a JSON array or a comma-separated string.
pub fn coerce_pictures(v: &Value) -> Vec<String> {
    match v {
        Value::Array(items) => items
            .iter()
            .filter_map(|x| x.as_str())
            .map(|s| s.to_string())
            .collect(),
        Value::String(s) => split_url_list(s),
        _ => Vec::new(),
    }
}

/// Split `a, b,,c` into `["a", "b", "c"]`.
pub fn split_url_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn from_unix_seconds(secs: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(secs).ok()
}

fn from_unix_seconds_f64(secs: f64) -> Option<OffsetDateTime> {
    if !secs.is_finite() {
        return None;
    }
    let nanos = (secs * 1_000_000_000f64) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

fn parse_time_text(s: &str) -> Option<OffsetDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return from_unix_seconds(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return from_unix_seconds_f64(f);
    }
    parse_iso8601(s)
}

/// ISO-8601 with an offset (`Z` included), or naive forms taken as UTC.
pub(crate) fn parse_iso8601(s: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt);
    }
    // offset forms RFC 3339 does not cover: no seconds, or a space separator
    let offset = [
        format_description!("[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"),
    ];
    for fmt in offset {
        if let Ok(dt) = OffsetDateTime::parse(s, fmt) {
            return Some(dt);
        }
    }
    let naive = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ];
    for fmt in naive {
        if let Ok(dt) = PrimitiveDateTime::parse(s, fmt) {
            return Some(dt.assume_utc());
        }
    }
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}
