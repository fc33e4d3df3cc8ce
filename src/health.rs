//! Schedule health classification
//!
//! Decision order, first match wins:
//! 1. `mailed` completed           -> complete
//! 2. vendor mailed after drop     -> late (with lag in calendar days)
//! 3. past deadline, data pending  -> behind_schedule
//! 4. otherwise                    -> on_track

use chrono::NaiveDate;

use crate::date_utils::{get_lag_days, parse_date};
use crate::types::{DeadlineChain, MilestoneKey, Milestones, ScheduleHealth};

/// True when `today` is strictly past `deadline` and data has not been approved.
/// No deadline (campaign without an in-home date) is never behind.
pub fn is_behind_schedule(
    milestones: &Milestones,
    deadline: Option<NaiveDate>,
    today: NaiveDate,
) -> bool {
    match deadline {
        Some(deadline) => today > deadline && !milestones.is_completed(MilestoneKey::DataApproved),
        None => false,
    }
}

/// Calendar days the vendor mailed after the mail drop date.
/// `None` unless the vendor date is valid and strictly later than the drop.
pub fn late_by_days(chain: &DeadlineChain, vendor_mail_date_str: Option<&str>) -> Option<i64> {
    let mail_drop = chain.mail_drop_date?;
    let vendor_mail = vendor_mail_date_str.and_then(parse_date)?;
    let lag = get_lag_days(mail_drop, vendor_mail);
    (lag > 0).then_some(lag)
}

pub fn compute_schedule_health(
    milestones: &Milestones,
    chain: &DeadlineChain,
    vendor_mail_date_str: Option<&str>,
    today: NaiveDate,
) -> ScheduleHealth {
    if milestones.is_completed(MilestoneKey::Mailed) {
        return ScheduleHealth::Complete;
    }

    if let Some(lag_days) = late_by_days(chain, vendor_mail_date_str) {
        return ScheduleHealth::Late { lag_days };
    }

    if is_behind_schedule(milestones, chain.behind_schedule_deadline(), today) {
        return ScheduleHealth::BehindSchedule;
    }

    ScheduleHealth::OnTrack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MilestoneStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn chain() -> DeadlineChain {
        DeadlineChain {
            mail_drop_date: Some(d(2026, 1, 1)),
            art_due_date: Some(d(2025, 12, 25)),
            art_submission_due_date: Some(d(2025, 11, 27)),
        }
    }

    fn completed() -> MilestoneStatus {
        MilestoneStatus::Completed { at: None }
    }

    #[test]
    fn behind_only_strictly_after_deadline() {
        let empty = Milestones::new();
        let deadline = Some(d(2025, 12, 25));
        assert!(!is_behind_schedule(&empty, deadline, d(2025, 12, 25)));
        assert!(is_behind_schedule(&empty, deadline, d(2025, 12, 26)));
        assert!(!is_behind_schedule(&empty, None, d(2030, 1, 1)));

        let approved = empty.with_status(MilestoneKey::DataApproved, completed());
        assert!(!is_behind_schedule(&approved, deadline, d(2025, 12, 26)));
    }

    #[test]
    fn complete_beats_late() {
        let milestones = Milestones::new().with_status(MilestoneKey::Mailed, completed());
        let health = compute_schedule_health(
            &milestones,
            &chain(),
            Some("2026-03-01"),
            d(2026, 3, 2),
        );
        assert_eq!(health, ScheduleHealth::Complete);
    }

    #[test]
    fn late_reports_lag() {
        let health = compute_schedule_health(
            &Milestones::new(),
            &chain(),
            Some("2026-01-04"),
            d(2026, 1, 5),
        );
        assert_eq!(health, ScheduleHealth::Late { lag_days: 3 });
        assert_eq!(health.lag_days(), Some(3));
    }

    #[test]
    fn mailing_on_the_drop_date_is_not_late() {
        let health = compute_schedule_health(
            &Milestones::new(),
            &chain(),
            Some("2026-01-01"),
            d(2025, 12, 1),
        );
        assert_eq!(health, ScheduleHealth::OnTrack);
    }

    #[test]
    fn invalid_vendor_date_falls_through() {
        let health = compute_schedule_health(
            &Milestones::new(),
            &chain(),
            Some("soon"),
            d(2025, 12, 26),
        );
        assert_eq!(health, ScheduleHealth::BehindSchedule);
    }

    #[test]
    fn behind_uses_art_due_before_submission_date() {
        // Past art submission (Nov 27) but not past art due (Dec 25)
        let health = compute_schedule_health(&Milestones::new(), &chain(), None, d(2025, 12, 10));
        assert_eq!(health, ScheduleHealth::OnTrack);

        let without_art_due = DeadlineChain {
            art_due_date: None,
            ..chain()
        };
        let health = compute_schedule_health(
            &Milestones::new(),
            &without_art_due,
            None,
            d(2025, 12, 10),
        );
        assert_eq!(health, ScheduleHealth::BehindSchedule);
    }

    #[test]
    fn unknown_chain_is_on_track() {
        let health = compute_schedule_health(
            &Milestones::new(),
            &DeadlineChain::default(),
            Some("2026-01-04"),
            d(2030, 1, 1),
        );
        assert_eq!(health, ScheduleHealth::OnTrack);
    }
}
