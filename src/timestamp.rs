//! Timestamp normalization.
//!
//! Source platforms hand us creation times in a handful of text formats.
//! Everything is reduced to a timezone-naive [`NaiveDateTime`]: values that
//! carry an offset keep their printed wall-clock time and lose the offset.
//! That assumes every post in a run comes from one consistent source
//! timezone.

use chrono::{DateTime, NaiveDateTime, Utc, Weekday};
use tracing::warn;

/// Native platform format after the leading weekday name, e.g.
/// `Aug 12 13:11:03 +0000 2025` from `Tue Aug 12 13:11:03 +0000 2025`.
const PLATFORM_FORMAT: &str = "%b %d %H:%M:%S %z %Y";

/// ISO-8601 with fractional seconds, e.g. `2025-08-12T13:11:03.000Z`.
const ISO_FRACTIONAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// ISO-8601 without fractional seconds, e.g. `2025-08-12T13:11:03Z`.
const ISO_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Try each supported format in priority order.
///
/// Returns `None` for empty input or when no format matches.
#[must_use]
pub fn try_parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(instant) = parse_platform(raw) {
        return Some(instant);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, ISO_FRACTIONAL_FORMAT) {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(raw, ISO_SECONDS_FORMAT).ok()
}

/// The weekday name must be a weekday but need not agree with the date.
fn parse_platform(raw: &str) -> Option<NaiveDateTime> {
    let (weekday, rest) = raw.split_once(' ')?;
    weekday.parse::<Weekday>().ok()?;
    DateTime::parse_from_str(rest.trim_start(), PLATFORM_FORMAT)
        .ok()
        .map(|dt| dt.naive_local())
}

/// Parse a timestamp, substituting `fallback` when nothing matches.
///
/// The returned flag is `true` when the fallback was used. A warning is
/// logged in that case; this never fails.
#[must_use]
pub fn parse_timestamp_or(raw: &str, fallback: NaiveDateTime) -> (NaiveDateTime, bool) {
    match try_parse_timestamp(raw) {
        Some(instant) => (instant, false),
        None => {
            warn!(raw = %raw, "Could not parse timestamp, falling back to current time");
            (fallback, true)
        }
    }
}

/// Parse a timestamp, falling back to the current wall-clock time.
#[must_use]
pub fn normalize_timestamp(raw: &str) -> NaiveDateTime {
    parse_timestamp_or(raw, now()).0
}

/// Current wall-clock time in the naive representation used for instants.
///
/// Platform timestamps arrive as `+0000`, so UTC keeps fallback instants
/// comparable with parsed ones.
#[must_use]
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 12)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_platform_format() {
        assert_eq!(
            try_parse_timestamp("Tue Aug 12 13:11:03 +0000 2025"),
            Some(at(13, 11, 3))
        );
    }

    #[test]
    fn test_platform_format_drops_offset() {
        // Wall-clock time is kept as printed, the offset is discarded
        assert_eq!(
            try_parse_timestamp("Tue Aug 12 13:11:03 +0200 2025"),
            Some(at(13, 11, 3))
        );
    }

    #[test]
    fn test_platform_format_ignores_weekday_mismatch() {
        // 2025-08-12 is a Tuesday
        assert_eq!(
            try_parse_timestamp("Mon Aug 12 13:11:03 +0000 2025"),
            Some(at(13, 11, 3))
        );
        assert_eq!(try_parse_timestamp("Xyz Aug 12 13:11:03 +0000 2025"), None);
        assert_eq!(try_parse_timestamp("Aug 12 13:11:03 +0000 2025"), None);
    }

    #[test]
    fn test_iso_with_fraction() {
        assert_eq!(
            try_parse_timestamp("2025-08-12T13:11:03.000Z"),
            Some(at(13, 11, 3))
        );
        let parsed = try_parse_timestamp("2025-08-12T13:11:03.250Z").unwrap();
        assert_eq!(parsed.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_iso_without_fraction() {
        assert_eq!(
            try_parse_timestamp("2025-08-12T13:11:03Z"),
            Some(at(13, 11, 3))
        );
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(
            try_parse_timestamp("  2025-08-12T13:11:03Z\n"),
            Some(at(13, 11, 3))
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(try_parse_timestamp(""), None);
        assert_eq!(try_parse_timestamp("   "), None);
        assert_eq!(try_parse_timestamp("yesterday-ish"), None);
        assert_eq!(try_parse_timestamp("2025-08-12 13:11:03"), None);
    }

    #[test]
    fn test_fallback_used() {
        let fallback = at(0, 0, 0);
        assert_eq!(parse_timestamp_or("garbage", fallback), (fallback, true));
        assert_eq!(
            parse_timestamp_or("2025-08-12T13:11:03Z", fallback),
            (at(13, 11, 3), false)
        );
    }

    #[test]
    fn test_normalize_never_panics() {
        let before = now();
        let parsed = normalize_timestamp("not a date");
        assert!(parsed >= before);
    }
}
