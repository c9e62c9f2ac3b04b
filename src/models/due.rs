//! Calendar-day due-date arithmetic.
//!
//! Due dates are plain calendar dates. "Now" is reduced to the local calendar
//! day before any comparison, and differences are counted in whole days, so a
//! 23 or 25 hour day around a DST change still counts as exactly one day.

use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Current local calendar day.
pub fn today() -> NaiveDate {
    calendar_day(&Local::now())
}

/// Drops the time of day from a timestamp, in the timestamp's own time zone.
pub fn calendar_day<Tz: TimeZone>(at: &DateTime<Tz>) -> NaiveDate {
    at.date_naive()
}

/// Days from today until `next_review_date`. Zero or negative means due.
pub fn days_until_due(next_review_date: NaiveDate) -> i64 {
    days_until_due_from(next_review_date, today())
}

pub fn days_until_due_from(next_review_date: NaiveDate, today: NaiveDate) -> i64 {
    next_review_date.signed_duration_since(today).num_days()
}

/// True when the card is due today or overdue.
pub fn is_due(next_review_date: NaiveDate) -> bool {
    is_due_on(next_review_date, today())
}

pub fn is_due_on(next_review_date: NaiveDate, today: NaiveDate) -> bool {
    days_until_due_from(next_review_date, today) <= 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, FixedOffset};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_today_is_due() {
        let today = date(2024, 5, 10);
        assert_eq!(days_until_due_from(today, today), 0);
        assert!(is_due_on(today, today));
    }

    #[test]
    fn test_tomorrow_is_not_due() {
        let today = date(2024, 5, 10);
        let tomorrow = date(2024, 5, 11);
        assert_eq!(days_until_due_from(tomorrow, today), 1);
        assert!(!is_due_on(tomorrow, today));
    }

    #[test]
    fn test_overdue_is_negative() {
        let today = date(2024, 5, 10);
        assert_eq!(days_until_due_from(date(2024, 5, 3), today), -7);
        assert!(is_due_on(date(2024, 5, 3), today));
    }

    #[test]
    fn test_is_due_consistent_with_days_until_due() {
        let today = date(2024, 2, 27);
        for offset in -10_i64..=10 {
            let d = if offset < 0 {
                today - Days::new(offset.unsigned_abs())
            } else {
                today + Days::new(offset as u64)
            };
            assert_eq!(is_due_on(d, today), days_until_due_from(d, today) <= 0);
            assert_eq!(days_until_due_from(d, today), offset);
        }
    }

    #[test]
    fn test_leap_day_and_year_boundary() {
        assert_eq!(days_until_due_from(date(2024, 3, 1), date(2024, 2, 28)), 2);
        assert_eq!(days_until_due_from(date(2025, 1, 1), date(2024, 12, 31)), 1);
    }

    #[test]
    fn test_calendar_day_ignores_time_of_day() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let late = tz.with_ymd_and_hms(2024, 5, 10, 23, 59, 59).unwrap();
        let early = tz.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        assert_eq!(calendar_day(&late), calendar_day(&early));
        assert_eq!(calendar_day(&late), date(2024, 5, 10));
    }

    #[test]
    fn test_calendar_day_across_midnight() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let before = tz.with_ymd_and_hms(2024, 5, 10, 23, 59, 0).unwrap();
        let after = tz.with_ymd_and_hms(2024, 5, 11, 0, 1, 0).unwrap();
        // Two minutes apart, one calendar day apart.
        assert_eq!(
            days_until_due_from(calendar_day(&after), calendar_day(&before)),
            1
        );
    }

    #[test]
    fn test_dst_spring_forward_counts_one_day() {
        // Central European spring-forward: midnight on 2024-03-31 is +01:00,
        // midnight on 2024-04-01 is +02:00, only 23 hours later.
        let cet = FixedOffset::east_opt(3600).unwrap();
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = cet.with_ymd_and_hms(2024, 3, 31, 0, 30, 0).unwrap();
        let next = cest.with_ymd_and_hms(2024, 4, 1, 0, 30, 0).unwrap();

        assert_eq!((next - start).num_hours(), 23);
        assert_eq!(
            days_until_due_from(calendar_day(&next), calendar_day(&start)),
            1
        );
    }

    #[test]
    fn test_dst_fall_back_counts_one_day() {
        // Fall-back: a 25 hour day must not become two days.
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        let cet = FixedOffset::east_opt(3600).unwrap();
        let start = cest.with_ymd_and_hms(2024, 10, 27, 0, 0, 0).unwrap();
        let next = cet.with_ymd_and_hms(2024, 10, 28, 0, 0, 0).unwrap();

        assert_eq!((next - start).num_hours(), 25);
        assert_eq!(
            days_until_due_from(calendar_day(&next), calendar_day(&start)),
            1
        );
    }

    #[test]
    fn test_clock_reading_versions_agree() {
        let now = today();
        assert!(is_due(now));
        assert_eq!(days_until_due(now), 0);
        assert!(!is_due(now + Days::new(1)));
    }
}
