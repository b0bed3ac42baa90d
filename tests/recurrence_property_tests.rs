//! Property-based tests for the recurrence due-date rules.
//!
//! These verify that the schedule decision holds across all valid date
//! pairs, using the `proptest` crate for random test case generation.

use budgetwise_core::recurrence::is_due;
use budgetwise_core::transactions::RecurringPeriod;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

/// Generates a random recurrence period.
fn arb_period() -> impl Strategy<Value = RecurringPeriod> {
    prop_oneof![
        Just(RecurringPeriod::Daily),
        Just(RecurringPeriod::Weekly),
        Just(RecurringPeriod::Monthly),
        Just(RecurringPeriod::Yearly),
    ]
}

/// Generates a random timestamp between 2020 and 2030, day capped at 28 so
/// every (year, month, day) triple is a real date.
fn arb_datetime() -> impl Strategy<Value = NaiveDateTime> {
    (2020i32..2030, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60).prop_map(
        |(y, m, d, h, min)| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap()
        },
    )
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A template with no instance yet is due regardless of period or time.
    #[test]
    fn prop_first_run_is_due(period in arb_period(), now in arb_datetime()) {
        prop_assert!(is_due(period, None, now));
    }

    /// An instance created at the current instant is never due again — the
    /// guard a doubled scheduler run relies on.
    #[test]
    fn prop_same_instant_is_never_due(period in arb_period(), now in arb_datetime()) {
        prop_assert!(!is_due(period, Some(now), now));
    }

    /// Daily templates are due exactly when the last instance is from an
    /// earlier calendar day.
    #[test]
    fn prop_daily_tracks_the_calendar_day(last in arb_datetime(), now in arb_datetime()) {
        prop_assert_eq!(
            is_due(RecurringPeriod::Daily, Some(last), now),
            last.date() < now.date()
        );
    }

    /// Weekly templates are due exactly when seven or more whole days have
    /// elapsed.
    #[test]
    fn prop_weekly_needs_seven_days(last in arb_datetime(), days in 0i64..30, hours in 0i64..24) {
        let now = last + Duration::days(days) + Duration::hours(hours);
        let elapsed_days = (now - last).num_days();
        prop_assert_eq!(
            is_due(RecurringPeriod::Weekly, Some(last), now),
            elapsed_days >= 7
        );
    }

    /// Monthly templates are due exactly in a strictly later (year, month)
    /// pair — including December into January.
    #[test]
    fn prop_monthly_orders_year_month_pairs(last in arb_datetime(), now in arb_datetime()) {
        prop_assert_eq!(
            is_due(RecurringPeriod::Monthly, Some(last), now),
            (now.year(), now.month()) > (last.year(), last.month())
        );
    }

    /// Yearly templates fire only on the anniversary day in a later year.
    #[test]
    fn prop_yearly_fires_on_anniversary_only(last in arb_datetime(), now in arb_datetime()) {
        let expected = now.year() > last.year()
            && now.month() == last.month()
            && now.day() == last.day();
        prop_assert_eq!(is_due(RecurringPeriod::Yearly, Some(last), now), expected);
    }

    /// Whatever fired today cannot fire again today: evaluating with the
    /// just-created instance as `last` yields not-due for every period.
    #[test]
    fn prop_second_same_day_evaluation_is_idempotent(
        period in arb_period(),
        last in arb_datetime(),
        now in arb_datetime(),
    ) {
        if is_due(period, Some(last), now) {
            prop_assert!(!is_due(period, Some(now), now));
        }
    }
}
