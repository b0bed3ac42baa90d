use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Inclusive start and exclusive end of the calendar month containing `at`.
pub fn month_bounds(at: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let first = NaiveDate::from_ymd_opt(at.year(), at.month(), 1)
        .expect("first day of a valid month always exists");
    let next_month = if at.month() == 12 {
        NaiveDate::from_ymd_opt(at.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(at.year(), at.month() + 1, 1)
    }
    .expect("first day of a valid month always exists");

    (
        first.and_time(NaiveTime::MIN),
        next_month.and_time(NaiveTime::MIN),
    )
}

/// Inclusive start and exclusive end of the calendar day containing `at`.
pub fn day_bounds(at: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let start = at.date().and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// Whole days elapsed between two instants, truncated toward zero.
pub fn days_between(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    (later - earlier).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn month_bounds_handles_december_rollover() {
        let (start, end) = month_bounds(at(2025, 12, 15, 9));
        assert_eq!(start, at(2025, 12, 1, 0));
        assert_eq!(end, at(2026, 1, 1, 0));
    }

    #[test]
    fn day_bounds_cover_exactly_one_day() {
        let (start, end) = day_bounds(at(2025, 3, 8, 23));
        assert_eq!(start, at(2025, 3, 8, 0));
        assert_eq!(end, at(2025, 3, 9, 0));
    }

    #[test]
    fn days_between_truncates_partial_days() {
        assert_eq!(days_between(at(2025, 1, 1, 12), at(2025, 1, 2, 11)), 0);
        assert_eq!(days_between(at(2025, 1, 1, 12), at(2025, 1, 2, 12)), 1);
    }
}
