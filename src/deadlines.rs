//! Deadline chain calculation
//!
//! in-home date
//!   -> mail drop        (business days back)
//!   -> art submission   (calendar days back from mail drop, by mail-type class)
//!   -> art due / vendor (business days back from mail drop)

use tracing::debug;

use crate::config::LeadTimes;
use crate::date_utils::{parse_date, subtract_business_days, subtract_calendar_days};
use crate::holidays::HolidayCalendar;
use crate::types::{DeadlineChain, FirstValidDates};

use chrono::NaiveDate;

/// Lead-time class derived from the free-text mail type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MailTypeClass {
    /// Core mailers and newsletters
    Core,
    /// Everything else, postcards included
    Standard,
}

impl MailTypeClass {
    /// Case-insensitive substring match. Empty or unknown types are standard.
    pub fn classify(mail_type: &str) -> Self {
        let lowered = mail_type.to_lowercase();
        if lowered.contains("core") || lowered.contains("newsletter") {
            MailTypeClass::Core
        } else {
            MailTypeClass::Standard
        }
    }

    pub fn art_submission_days(&self, lead_times: &LeadTimes) -> u32 {
        match self {
            MailTypeClass::Core => lead_times.core_art_submission_days,
            MailTypeClass::Standard => lead_times.standard_art_submission_days,
        }
    }

    pub fn first_valid_offset_days(&self, lead_times: &LeadTimes) -> u32 {
        match self {
            MailTypeClass::Core => lead_times.core_first_valid_offset_days,
            MailTypeClass::Standard => lead_times.standard_first_valid_offset_days,
        }
    }
}

/// Build the chain from an already parsed in-home date
pub fn chain_from_in_home(
    in_home: NaiveDate,
    class: MailTypeClass,
    calendar: &HolidayCalendar,
    lead_times: &LeadTimes,
) -> DeadlineChain {
    let mail_drop = subtract_business_days(in_home, lead_times.mail_drop_business_days, calendar);
    let art_submission_due =
        subtract_calendar_days(mail_drop, class.art_submission_days(lead_times));
    let art_due = subtract_business_days(mail_drop, lead_times.art_due_business_days, calendar);

    DeadlineChain {
        mail_drop_date: Some(mail_drop),
        art_due_date: Some(art_due),
        art_submission_due_date: art_submission_due,
    }
}

/// Derive the deadline chain from an in-home date string and mail type.
/// Missing or unparseable dates give a chain of `None`s.
pub fn calculate_milestone_dates(
    in_home_date_str: &str,
    mail_type: &str,
    calendar: &HolidayCalendar,
    lead_times: &LeadTimes,
) -> DeadlineChain {
    let in_home = match parse_date(in_home_date_str) {
        Some(d) => d,
        None => return DeadlineChain::default(),
    };

    let class = MailTypeClass::classify(mail_type);
    let chain = chain_from_in_home(in_home, class, calendar, lead_times);
    debug!(%in_home, ?class, ?chain, "calculated deadline chain");
    chain
}

/// Derive the in-home date from a first valid (in-market) date, then the chain.
/// Returns `None` if the date is missing or unparseable.
pub fn calculate_dates_from_first_valid(
    first_valid_date_str: &str,
    mail_type: &str,
    calendar: &HolidayCalendar,
    lead_times: &LeadTimes,
) -> Option<FirstValidDates> {
    let first_valid = parse_date(first_valid_date_str)?;
    let class = MailTypeClass::classify(mail_type);
    let in_home_date =
        subtract_calendar_days(first_valid, class.first_valid_offset_days(lead_times))?;

    Some(FirstValidDates {
        in_home_date,
        chain: chain_from_in_home(in_home_date, class, calendar, lead_times),
    })
}
