//! Post date parsing
//!
//! The forum renders dates in two shapes:
//!
//! - Absolute: `Monday, March 20th 2017, 3:37pm`
//! - Relative: `Yesterday, 11:15am` or `<Weekday>, 11:15am` for today
//!
//! Both use a 12-hour clock. For relative dates only the literal
//! `Yesterday` moves the date; any other token means the date of `now`.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A date string that matched neither shape or named an impossible date
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized date string: {0:?}")]
pub struct TimestampError(pub String);

fn absolute_re() -> &'static Regex {
    static ABSOLUTE_RE_LOCK: OnceLock<Regex> = OnceLock::new();
    ABSOLUTE_RE_LOCK.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*[a-z]+,\s*(?P<month>[a-z]+)\s+(?P<day>\d{1,2})(?:st|nd|rd|th)?\s+(?P<year>\d{4}),\s*(?P<hour>\d{1,2}):(?P<minute>\d{2})\s*(?P<suffix>am|pm)\s*$",
        )
        .unwrap()
    })
}

fn relative_re() -> &'static Regex {
    static RELATIVE_RE_LOCK: OnceLock<Regex> = OnceLock::new();
    RELATIVE_RE_LOCK.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(?P<day>[a-z]+),\s*(?P<hour>\d{1,2}):(?P<minute>\d{2})\s*(?P<suffix>am|pm)\s*$",
        )
        .unwrap()
    })
}

/// Parses a forum date string relative to the local clock
///
/// See [`parse_timestamp_at`].
pub fn parse_timestamp(date: &str) -> Result<i64, TimestampError> {
    parse_timestamp_at(date, &chrono::Local::now())
}

/// Parses a forum date string into epoch seconds
///
/// The wall-clock time is interpreted in the time zone of `now`, which is
/// also the reference for relative dates.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use forum_archive::crawler::parse_timestamp_at;
///
/// let now = Utc.with_ymd_and_hms(2017, 3, 22, 9, 0, 0).unwrap();
/// let ts = parse_timestamp_at("Monday, March 20th 2017, 3:37pm", &now).unwrap();
/// assert_eq!(ts, Utc.with_ymd_and_hms(2017, 3, 20, 15, 37, 0).unwrap().timestamp());
/// ```
pub fn parse_timestamp_at<Tz: TimeZone>(
    date: &str,
    now: &DateTime<Tz>,
) -> Result<i64, TimestampError> {
    let fail = || TimestampError(date.to_string());

    let (day, hour, minute, suffix) = if let Some(caps) = absolute_re().captures(date) {
        // Ordinal suffix already stripped by the pattern; %B also takes "Mar"
        let calendar = format!("{} {} {}", &caps["day"], &caps["month"], &caps["year"]);
        let day = NaiveDate::parse_from_str(&calendar, "%d %B %Y").map_err(|_| fail())?;
        (day, caps["hour"].to_string(), caps["minute"].to_string(), caps["suffix"].to_string())
    } else if let Some(caps) = relative_re().captures(date) {
        let today = now.naive_local().date();
        let day = if &caps["day"] == "Yesterday" {
            today - Duration::days(1)
        } else {
            today
        };
        (day, caps["hour"].to_string(), caps["minute"].to_string(), caps["suffix"].to_string())
    } else {
        return Err(fail());
    };

    let mut hour: u32 = hour.parse().map_err(|_| fail())?;
    let minute: u32 = minute.parse().map_err(|_| fail())?;
    if suffix.eq_ignore_ascii_case("pm") && hour < 12 {
        hour += 12;
    }

    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(fail)?;
    let naive = NaiveDateTime::new(day, time);

    match now.timezone().from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.timestamp()),
        // Clocks went back: take the earlier instant
        LocalResult::Ambiguous(earlier, _) => Ok(earlier.timestamp()),
        LocalResult::None => Err(fail()),
    }
}
