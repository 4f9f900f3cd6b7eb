//! Entry timestamps and their display projection.
//!
//! The Journal API serializes `created_at` without a zone designator
//! (`2026-01-14T16:00:00`). Such values are assumed to be UTC. Nothing
//! upstream guarantees this, so the assumption is kept in one function,
//! [`assume_utc_if_unzoned`], and never leaks into stored values.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::borrow::Cow;

pub const DEFAULT_DISPLAY_TIMEZONE: &str = "Asia/Kolkata";

/// True when the time part carries `Z` or a `+hh:mm`/`-hh:mm` offset.
fn has_zone_designator(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.ends_with('Z') || raw.ends_with('z') {
        return true;
    }
    // Skip the date part, its dashes are not offsets
    match raw.find(['T', 't', ' ']) {
        Some(split) => raw[split + 1..].contains(['+', '-']),
        None => false,
    }
}

/// Append the UTC designator to a timestamp that has no zone information.
pub fn assume_utc_if_unzoned(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim();
    if has_zone_designator(trimmed) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("{}Z", trimmed))
    }
}

/// Resolve a raw API timestamp to an instant, using the client clock when absent.
pub fn resolve_instant(raw: Option<&str>) -> DateTime<Utc> {
    resolve_instant_at(raw, Utc::now())
}

/// Same as [`resolve_instant`] with an explicit "now".
///
/// Never fails: values that still don't parse after the UTC fallback resolve
/// to `now`.
pub fn resolve_instant_at(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return now;
    };

    let normalized = assume_utc_if_unzoned(raw);
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return parsed.with_timezone(&Utc);
    }

    // Space-separated SQL style, e.g. "2026-01-14 16:00:00.123456"
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f") {
        return naive.and_utc();
    }

    log::debug!("Unparseable timestamp {:?}, using client clock", raw);
    now
}

/// Zone every timestamp is projected into for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone(Tz);

impl DisplayZone {
    pub fn parse(name: &str) -> Result<Self, String> {
        name.trim()
            .parse::<Tz>()
            .map(DisplayZone)
            .map_err(|e| format!("Unknown timezone '{}': {}", name, e))
    }

    /// `9:30 PM`
    pub fn format_time(&self, raw: Option<&str>) -> String {
        resolve_instant(raw).with_timezone(&self.0).format("%-I:%M %p").to_string()
    }

    /// `14 Jan`
    pub fn format_date(&self, raw: Option<&str>) -> String {
        resolve_instant(raw).with_timezone(&self.0).format("%d %b").to_string()
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        DisplayZone(chrono_tz::Asia::Kolkata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn unzoned_value_gets_utc_designator() {
        assert_eq!(assume_utc_if_unzoned("2026-01-14T16:00:00"), "2026-01-14T16:00:00Z");
        assert_eq!(assume_utc_if_unzoned("2026-01-14T16:00:00.532"), "2026-01-14T16:00:00.532Z");
    }

    #[test]
    fn zoned_values_are_left_alone() {
        assert_eq!(assume_utc_if_unzoned("2026-01-14T16:00:00Z"), "2026-01-14T16:00:00Z");
        assert_eq!(assume_utc_if_unzoned("2026-01-14T16:00:00+05:30"), "2026-01-14T16:00:00+05:30");
        assert_eq!(assume_utc_if_unzoned("2026-01-14T16:00:00-04:00"), "2026-01-14T16:00:00-04:00");
    }

    #[test]
    fn unzoned_value_resolves_as_utc_and_projects_to_kolkata() {
        let instant = resolve_instant(Some("2026-01-14T16:00:00"));
        assert_eq!(instant, Utc.with_ymd_and_hms(2026, 1, 14, 16, 0, 0).unwrap());

        let local = instant.with_timezone(&chrono_tz::Asia::Kolkata);
        assert_eq!((local.hour(), local.minute()), (21, 30));

        let zone = DisplayZone::default();
        assert_eq!(zone.format_time(Some("2026-01-14T16:00:00")), "9:30 PM");
        assert_eq!(zone.format_date(Some("2026-01-14T16:00:00")), "14 Jan");
    }

    #[test]
    fn explicit_offset_is_honoured() {
        let instant = resolve_instant(Some("2026-01-14T16:00:00+05:30"));
        assert_eq!(instant, Utc.with_ymd_and_hms(2026, 1, 14, 10, 30, 0).unwrap());
    }

    #[test]
    fn missing_or_garbage_resolves_to_now() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(resolve_instant_at(None, now), now);
        assert_eq!(resolve_instant_at(Some(""), now), now);
        assert_eq!(resolve_instant_at(Some("yesterday-ish"), now), now);
    }

    #[test]
    fn space_separated_timestamp_is_accepted() {
        let now = Utc::now();
        let instant = resolve_instant_at(Some("2026-01-14 16:00:00.250"), now);
        assert_eq!(instant.hour(), 16);
        assert_eq!(instant.date_naive().to_string(), "2026-01-14");
    }

    #[test]
    fn display_zone_rejects_unknown_names() {
        assert!(DisplayZone::parse("Mars/Olympus_Mons").is_err());
        assert_eq!(DisplayZone::parse("Asia/Kolkata").unwrap(), DisplayZone::default());
    }
}
