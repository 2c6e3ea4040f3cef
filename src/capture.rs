//! Capture-time inference from crawler output file names.
//!
//! The crawler stamps its output like `douyin_contents_2024_0221_143052.json` or
//! `report_2026-02-22.json`. Patterns are tried in order and the first match wins,
//! even if a later pattern would fit better. A match whose numbers do not form a
//! valid date falls through to the next pattern.

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use time::{Date, Month, OffsetDateTime};

struct Patterns {
    full: [Regex; 2],
    date_only: [Regex; 2],
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        full: [
            // _YYYY_MM_DD_HH_MM_SS, _YYYYMMDD_HHMMSS and mixes of the two
            Regex::new(r"_(\d{4})_?(\d{2})_?(\d{2})_?(\d{2})_?(\d{2})_?(\d{2})").unwrap(),
            Regex::new(r"_(\d{4})-(\d{2})-(\d{2})-(\d{2})-(\d{2})-(\d{2})").unwrap(),
        ],
        date_only: [
            Regex::new(r"_(\d{4})-(\d{2})-(\d{2})(?:\.|_|$)").unwrap(),
            Regex::new(r"_(\d{4})_(\d{2})_(\d{2})(?:\.|_|$)").unwrap(),
        ],
    })
}

/// Capture time encoded in a file name, without touching the filesystem.
pub fn capture_time_from_name(name: impl AsRef<Path>) -> Option<OffsetDateTime> {
    let stem = name.as_ref().file_stem()?.to_str()?;
    let p = patterns();

    for re in &p.full {
        if let Some(caps) = re.captures(stem) {
            let n: Vec<u32> = (1..=6).filter_map(|i| caps[i].parse().ok()).collect();
            if let Some(dt) = n.get(..6).and_then(|n| build(n[0], n[1], n[2], n[3], n[4], n[5])) {
                return Some(dt);
            }
        }
    }
    for re in &p.date_only {
        if let Some(caps) = re.captures(stem) {
            let n: Vec<u32> = (1..=3).filter_map(|i| caps[i].parse().ok()).collect();
            if let Some(dt) = n.get(..3).and_then(|n| build(n[0], n[1], n[2], 0, 0, 0)) {
                return Some(dt);
            }
        }
    }
    None
}

/// Capture time for a file on disk: the name first, then its modification time.
pub fn capture_time_for_path(path: &Path) -> Option<OffsetDateTime> {
    capture_time_from_name(path).or_else(|| {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(OffsetDateTime::from)
    })
}

fn build(year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<OffsetDateTime> {
    let month = Month::try_from(u8::try_from(month).ok()?).ok()?;
    let date = Date::from_calendar_date(i32::try_from(year).ok()?, month, u8::try_from(day).ok()?).ok()?;
    let dt = date
        .with_hms(u8::try_from(hour).ok()?, u8::try_from(minute).ok()?, u8::try_from(second).ok()?)
        .ok()?;
    Some(dt.assume_utc())
}
