//! Event scheduling rules — date/time validation and conflict detection.
//!
//! Pure functions, no I/O. Dates are accepted in ISO (`yyyy-mm-dd`) or
//! regional (`dd/mm/yyyy`) form and normalized to `NaiveDate`; times are
//! zero-padded `HH:mm` normalized to minutes since midnight. Conflict
//! detection is a half-open interval scan over one professional's bookings
//! on one calendar date.
//!
//! Past dates are accepted on purpose: historical events are part of the
//! record. The future horizon is two years.

use std::sync::LazyLock;

use chrono::{Months, NaiveDate};
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

/// How far into the future an event may be scheduled.
const HORIZON_MONTHS: u32 = 24;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());
static REGIONAL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").unwrap());
static TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{2}):(\d{2})$").unwrap());

// ─── Parsing ──────────────────────────────────────────────────────────────────

/// Parse a calendar date in either supported textual form.
///
/// Returns `None` when the text matches neither pattern or the
/// year/month/day triple does not exist on the Gregorian calendar
/// (month 13, day 32, Feb 29 outside a leap year).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let (year, month, day) = if let Some(cap) = ISO_DATE.captures(text) {
        (cap[1].parse().ok()?, cap[2].parse().ok()?, cap[3].parse().ok()?)
    } else if let Some(cap) = REGIONAL_DATE.captures(text) {
        (cap[3].parse().ok()?, cap[2].parse().ok()?, cap[1].parse().ok()?)
    } else {
        return None;
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a zero-padded `HH:mm` time-of-day to minutes since midnight.
pub fn parse_time(text: &str) -> Option<u16> {
    let cap = TIME.captures(text)?;
    let hour: u16 = cap[1].parse().ok()?;
    let minute: u16 = cap[2].parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(hour * 60 + minute)
}

/// Render minutes since midnight back to `HH:mm` for messages.
pub fn format_minutes(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

// ─── Field validators ─────────────────────────────────────────────────────────

/// Validate an event date against a reference "today".
///
/// Rejects blank input, malformed patterns, impossible calendar dates, and
/// dates more than [`HORIZON_MONTHS`] after `today`. `today` is a parameter
/// so the horizon rule can be tested against a fixed clock.
pub fn validate_date(text: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    if text.trim().is_empty() {
        return Err("Date is required".into());
    }
    let date = parse_date(text)
        .ok_or_else(|| format!("'{text}' is not a valid date (use dd/mm/yyyy or yyyy-mm-dd)"))?;
    let horizon = today
        .checked_add_months(Months::new(HORIZON_MONTHS))
        .unwrap_or(NaiveDate::MAX);
    if date > horizon {
        return Err("Date is more than two years ahead".into());
    }
    Ok(date)
}

/// Validate a start time. Returns minutes since midnight.
pub fn validate_start_time(text: &str) -> Result<u16, String> {
    if text.trim().is_empty() {
        return Err("Start time is required".into());
    }
    parse_time(text).ok_or_else(|| format!("'{text}' is not a valid time (use HH:mm)"))
}

/// Validate an end time. Returns minutes since midnight.
///
/// When `start` is known, the end must be strictly later — events never
/// span midnight.
pub fn validate_end_time(text: &str, start: Option<u16>) -> Result<u16, String> {
    if text.trim().is_empty() {
        return Err("End time is required".into());
    }
    let end =
        parse_time(text).ok_or_else(|| format!("'{text}' is not a valid time (use HH:mm)"))?;
    if let Some(start) = start {
        if end <= start {
            return Err("End time must be after the start time".into());
        }
    }
    Ok(end)
}

// ─── Aggregate validation ─────────────────────────────────────────────────────

/// Normalized date/time triple for a validated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSchedule {
    pub date: NaiveDate,
    pub start_min: u16,
    pub end_min: u16,
}

/// Per-field validation failures. A field is `None` when it passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl ScheduleErrors {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.start_time.is_none() && self.end_time.is_none()
    }

    /// Joined field messages for a single human-readable line.
    pub fn summary(&self) -> String {
        [&self.date, &self.start_time, &self.end_time]
            .into_iter()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validate the full date/start/end triple of an event.
///
/// The three fields are checked independently so one failure does not hide
/// another. The only coupling: the end-after-start comparison is skipped
/// when the start itself is malformed, since there is no canonical start
/// to compare against.
pub fn validate_event_datetime(
    date: &str,
    start_time: &str,
    end_time: &str,
    today: NaiveDate,
) -> Result<EventSchedule, ScheduleErrors> {
    let mut errors = ScheduleErrors::default();

    let date = match validate_date(date, today) {
        Ok(d) => Some(d),
        Err(e) => {
            errors.date = Some(e);
            None
        }
    };
    let start_min = match validate_start_time(start_time) {
        Ok(m) => Some(m),
        Err(e) => {
            errors.start_time = Some(e);
            None
        }
    };
    let end_min = match validate_end_time(end_time, start_min) {
        Ok(m) => Some(m),
        Err(e) => {
            errors.end_time = Some(e);
            None
        }
    };

    match (date, start_min, end_min) {
        (Some(date), Some(start_min), Some(end_min)) => Ok(EventSchedule {
            date,
            start_min,
            end_min,
        }),
        _ => Err(errors),
    }
}

// ─── Conflict detection ───────────────────────────────────────────────────────

/// An existing booking for one professional on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub event_id: Uuid,
    pub title: String,
    pub start_min: u16,
    pub end_min: u16,
}

/// Find the first existing booking whose time window intersects the
/// candidate window.
///
/// Half-open semantics: a booking ending exactly when the candidate starts
/// (or starting exactly when it ends) is not a conflict.
pub fn find_conflict(start_min: u16, end_min: u16, existing: &[Booking]) -> Option<&Booking> {
    existing
        .iter()
        .find(|b| start_min < b.end_min && end_min > b.start_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Fixed reference clock for the horizon rule.
    fn today() -> NaiveDate {
        date(2025, 1, 15)
    }

    // ── parse_date ──

    #[test]
    fn parse_date_accepts_both_forms() {
        assert_eq!(parse_date("2025-01-14"), Some(date(2025, 1, 14)));
        assert_eq!(parse_date("14/01/2025"), Some(date(2025, 1, 14)));
    }

    #[test]
    fn parse_date_iso_round_trip_is_identity() {
        for text in ["14/01/2025", "2025-01-14", "29/02/2024"] {
            let parsed = parse_date(text).unwrap();
            assert_eq!(parse_date(&parsed.to_string()), Some(parsed));
        }
    }

    #[test]
    fn parse_date_rejects_malformed_patterns() {
        for text in ["", "  ", "2025/01/14", "14-01-2025", "2025-1-4", "1/1/2025", "tomorrow"] {
            assert_eq!(parse_date(text), None, "{text:?} should not parse");
        }
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        for text in ["2025-13-01", "32/01/2025", "2025-02-30", "30/04/2025-x", "2025-04-31"] {
            assert_eq!(parse_date(text), None, "{text:?} should not parse");
        }
    }

    #[test]
    fn parse_date_knows_leap_years() {
        assert_eq!(parse_date("29/02/2024"), Some(date(2024, 2, 29)));
        assert_eq!(parse_date("29/02/2025"), None);
    }

    // ── parse_time ──

    #[test]
    fn parse_time_accepts_padded_hh_mm() {
        assert_eq!(parse_time("00:00"), Some(0));
        assert_eq!(parse_time("09:30"), Some(570));
        assert_eq!(parse_time("23:59"), Some(1439));
    }

    #[test]
    fn parse_time_rejects_out_of_range_and_malformed() {
        for text in ["24:00", "25:00", "10:60", "9:30", "10:5", "10h30", "", "10:30:00"] {
            assert_eq!(parse_time(text), None, "{text:?} should not parse");
        }
    }

    #[test]
    fn format_minutes_round_trip() {
        assert_eq!(format_minutes(570), "09:30");
        assert_eq!(parse_time(&format_minutes(1439)), Some(1439));
    }

    // ── validate_date ──

    #[test]
    fn validate_date_rejects_blank() {
        assert!(validate_date("", today()).is_err());
        assert!(validate_date("  ", today()).is_err());
    }

    #[test]
    fn validate_date_rejects_impossible_dates() {
        for text in ["2025-13-01", "32/01/2025", "2025-02-30", "29/02/2025"] {
            assert!(validate_date(text, today()).is_err(), "{text:?} should fail");
        }
    }

    #[test]
    fn validate_date_accepts_leap_day_and_past_dates() {
        assert_eq!(validate_date("29/02/2024", today()), Ok(date(2024, 2, 29)));
        // Historical events are allowed: 2025-01-14 is in the past
        // relative to the reference clock.
        assert_eq!(validate_date("2025-01-14", today()), Ok(date(2025, 1, 14)));
    }

    #[test]
    fn validate_date_two_year_horizon() {
        // Two years minus one day: fine.
        assert!(validate_date("2027-01-14", today()).is_ok());
        // Exactly two years: still inside the horizon.
        assert!(validate_date("2027-01-15", today()).is_ok());
        // Two years and one month: out.
        assert!(validate_date("2027-02-15", today()).is_err());
    }

    // ── validate_start_time / validate_end_time ──

    #[test]
    fn validate_start_time_rejects_blank_and_malformed() {
        assert!(validate_start_time("").is_err());
        assert!(validate_start_time("25:00").is_err());
        assert_eq!(validate_start_time("10:00"), Ok(600));
    }

    #[test]
    fn validate_end_time_requires_strictly_later_end() {
        let start = parse_time("10:00");
        assert_eq!(validate_end_time("11:00", start), Ok(660));
        assert!(validate_end_time("10:00", start).is_err());
        assert!(validate_end_time("09:30", start).is_err());
    }

    #[test]
    fn validate_end_time_without_start_checks_shape_only() {
        assert_eq!(validate_end_time("09:30", None), Ok(570));
        assert!(validate_end_time("24:00", None).is_err());
    }

    // ── validate_event_datetime ──

    #[test]
    fn aggregate_reports_all_three_fields() {
        let errors = validate_event_datetime("", "25:00", "24:00", today()).unwrap_err();
        assert!(errors.date.is_some());
        assert!(errors.start_time.is_some());
        assert!(errors.end_time.is_some());
    }

    #[test]
    fn aggregate_end_check_skipped_when_start_malformed() {
        // "09:00" is earlier than any plausible start, but with a malformed
        // start only the shape of the end is checked.
        let errors = validate_event_datetime("2025-01-20", "banana", "09:00", today()).unwrap_err();
        assert!(errors.start_time.is_some());
        assert!(errors.end_time.is_none());
    }

    #[test]
    fn aggregate_end_before_start_is_reported_alongside_other_fields() {
        let errors = validate_event_datetime("2025-02-30", "10:00", "09:30", today()).unwrap_err();
        assert!(errors.date.is_some());
        assert!(errors.start_time.is_none());
        assert!(errors.end_time.is_some());
        assert!(errors.summary().contains("after the start"));
    }

    #[test]
    fn aggregate_success_normalizes() {
        let schedule =
            validate_event_datetime("15/01/2025", "10:00", "11:00", today()).unwrap();
        assert_eq!(
            schedule,
            EventSchedule {
                date: date(2025, 1, 15),
                start_min: 600,
                end_min: 660,
            }
        );
    }

    // ── find_conflict ──

    fn booking(start: &str, end: &str) -> Booking {
        Booking {
            event_id: Uuid::new_v4(),
            title: "Cardiology follow-up".into(),
            start_min: parse_time(start).unwrap(),
            end_min: parse_time(end).unwrap(),
        }
    }

    #[test]
    fn overlapping_window_conflicts() {
        let existing = vec![booking("10:00", "11:00")];
        let hit = find_conflict(parse_time("10:30").unwrap(), parse_time("11:30").unwrap(), &existing);
        assert_eq!(hit, existing.first());
    }

    #[test]
    fn touching_windows_do_not_conflict() {
        let existing = vec![booking("10:00", "11:00")];
        // Starts exactly when the existing one ends.
        assert!(find_conflict(660, 720, &existing).is_none());
        // Ends exactly when the existing one starts.
        assert!(find_conflict(540, 600, &existing).is_none());
    }

    #[test]
    fn contained_and_containing_windows_conflict() {
        let existing = vec![booking("10:00", "11:00")];
        assert!(find_conflict(615, 645, &existing).is_some());
        assert!(find_conflict(540, 720, &existing).is_some());
    }

    #[test]
    fn first_conflicting_booking_wins() {
        let existing = vec![booking("08:00", "09:00"), booking("10:00", "11:00")];
        let hit = find_conflict(630, 690, &existing).unwrap();
        assert_eq!(hit.start_min, 600);
    }

    #[test]
    fn empty_schedule_never_conflicts() {
        assert!(find_conflict(0, 1439, &[]).is_none());
    }
}
