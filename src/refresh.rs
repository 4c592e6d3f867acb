//! Staleness gate for genre refreshes.
//!
//! An album remembers when its genre was last fetched in the `genreupdated`
//! field, stored as a `DD/MM/YYYY` date.  The date is read as midnight of that
//! day.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::debug;

pub const STAMP_FORMAT: &str = "%d/%m/%Y";

/// Parse a stored `genreupdated` value.
pub fn parse_stamp(stamp: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(stamp.trim(), STAMP_FORMAT).ok()
}

/// Format the date part of `now` the way `genreupdated` stores it.
pub fn format_stamp(now: NaiveDateTime) -> String {
    now.date().format(STAMP_FORMAT).to_string()
}

/// Decide whether an album's genre should be fetched again.
///
/// True when forced, when the album was never refreshed (or its stamp cannot
/// be read), or when more than `max_age_days` have passed since the stamp.
pub fn should_refresh(genre_updated: Option<&str>, force: bool, max_age_days: u32, now: NaiveDateTime) -> bool {
    if force {
        return true;
    }

    let Some(stamp) = genre_updated else {
        return true;
    };

    let Some(updated) = parse_stamp(stamp) else {
        debug!("Unreadable genreupdated value {:?}, treating as stale", stamp);
        return true;
    };

    let age = now - updated.and_time(NaiveTime::MIN);
    age > TimeDelta::days(i64::from(max_age_days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_stamp_round_trip_format() {
        assert_eq!(format_stamp(at(2024, 3, 7, 15)), "07/03/2024");
        assert_eq!(parse_stamp("07/03/2024"), NaiveDate::from_ymd_opt(2024, 3, 7));
        assert_eq!(parse_stamp("2024-03-07"), None);
    }

    #[test]
    fn test_force_always_refreshes() {
        assert!(should_refresh(Some("07/03/2024"), true, 7, at(2024, 3, 7, 12)));
    }

    #[test]
    fn test_missing_stamp_refreshes() {
        assert!(should_refresh(None, false, 7, at(2024, 3, 7, 12)));
    }

    #[test]
    fn test_unreadable_stamp_refreshes() {
        assert!(should_refresh(Some("yesterday"), false, 7, at(2024, 3, 7, 12)));
    }

    #[test]
    fn test_fresh_stamp_blocks_refresh() {
        assert!(!should_refresh(Some("07/03/2024"), false, 7, at(2024, 3, 7, 12)));
        assert!(!should_refresh(Some("01/03/2024"), false, 7, at(2024, 3, 7, 23)));
    }

    #[test]
    fn test_stale_after_window() {
        // Seven days after the stamp, any time past midnight is beyond the window.
        assert!(should_refresh(Some("01/03/2024"), false, 7, at(2024, 3, 8, 1)));
        assert!(!should_refresh(Some("01/03/2024"), false, 7, at(2024, 3, 8, 0)));
        assert!(should_refresh(Some("01/01/2024"), false, 7, at(2024, 3, 8, 0)));
    }

    #[test]
    fn test_zero_window_refreshes_same_day() {
        assert!(should_refresh(Some("07/03/2024"), false, 0, at(2024, 3, 7, 9)));
    }
}
