//! Property tests for business-day arithmetic, deadline chains and the
//! milestone cycle.

use chrono::{Days, NaiveDate, TimeZone, Utc};
use drop_sheet_engine::date_utils::is_business_day;
use drop_sheet_engine::{
    calculate_milestone_dates, subtract_business_days, toggle_milestone, DependencyGraph,
    FixedClock, HolidayCalendar, LeadTimes, MilestoneKey, MilestoneStatus, Milestones,
};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..3 * 366).prop_map(|offset| base() + Days::new(offset))
}

fn mail_type_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "Core/Newsletter",
        "CORE/NEWSLETTER",
        "6x9 Postcard",
        "Postcard",
        "",
        "Monthly Newsletter",
    ])
}

proptest! {
    #[test]
    fn business_days_move_backward(date in date_strategy(), n in 0u32..40) {
        let calendar = HolidayCalendar::us_postal();
        let result = subtract_business_days(date, n, &calendar);
        prop_assert!(result <= date);
        if n > 0 {
            prop_assert!(result < date);
        } else {
            prop_assert_eq!(result, date);
        }
    }

    #[test]
    fn business_days_land_on_business_days(date in date_strategy(), n in 1u32..40) {
        let calendar = HolidayCalendar::us_postal();
        let result = subtract_business_days(date, n, &calendar);
        prop_assert!(is_business_day(&result, &calendar));
    }

    #[test]
    fn chain_is_ordered(date in date_strategy(), mail_type in mail_type_strategy()) {
        let calendar = HolidayCalendar::us_postal();
        let chain = calculate_milestone_dates(
            &date.format("%Y-%m-%d").to_string(),
            mail_type,
            &calendar,
            &LeadTimes::default(),
        );

        let mail_drop = chain.mail_drop_date.unwrap();
        let art_due = chain.art_due_date.unwrap();
        let art_submission = chain.art_submission_due_date.unwrap();
        prop_assert!(art_due <= mail_drop);
        prop_assert!(mail_drop <= date);
        prop_assert!(art_submission <= mail_drop);
    }

    #[test]
    fn mail_type_case_does_not_matter(date in date_strategy()) {
        let calendar = HolidayCalendar::empty();
        let lead = LeadTimes::default();
        let date_str = date.format("%Y-%m-%d").to_string();

        let upper = calculate_milestone_dates(&date_str, "CORE/NEWSLETTER", &calendar, &lead);
        let lower = calculate_milestone_dates(&date_str, "core/newsletter", &calendar, &lead);
        let postcard = calculate_milestone_dates(&date_str, "6x9 Postcard", &calendar, &lead);

        prop_assert_eq!(upper, lower);
        prop_assert_ne!(upper.art_submission_due_date, postcard.art_submission_due_date);
        prop_assert_eq!(upper.mail_drop_date, postcard.mail_drop_date);
    }

    #[test]
    fn three_toggles_close_the_cycle(
        key in prop::sample::select(vec![
            MilestoneKey::OutlineGiven,
            MilestoneKey::DataReceived,
            MilestoneKey::CreativeReceived,
        ]),
        hour in 0u32..24,
    ) {
        let graph = DependencyGraph::standard();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 6, hour, 0, 0).unwrap());
        let start = Milestones::new();

        let mut current = start.clone();
        for _ in 0..3 {
            current = toggle_milestone(&current, key, &graph, &clock).unwrap();
        }
        prop_assert_eq!(current.status(key), MilestoneStatus::Pending);
        prop_assert_eq!(current, start);
    }
}
