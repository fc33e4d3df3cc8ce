//! Drop Sheet engine
//!
//! Deadline and milestone logic for direct-mail campaigns. Given a campaign's
//! in-home date, mail type and a holiday calendar it derives the mail drop,
//! art submission and vendor handover deadlines, runs the per-campaign
//! milestone state machine and classifies schedule health.
//!
//! Everything here is synchronous and deterministic: "today" and "now" are
//! always passed in.
//!
//! ```
//! use drop_sheet_engine::{DropSheetEngine, EngineConfig, HolidayCalendar};
//!
//! let engine = DropSheetEngine::new(EngineConfig::with_holidays(HolidayCalendar::empty()));
//! let chain = engine.calculate_milestone_dates("2026-01-15", "Core/Newsletter");
//! assert_eq!(chain.mail_drop_date.map(|d| d.to_string()).as_deref(), Some("2026-01-01"));
//! ```

pub mod clock;
pub mod config;
pub mod date_utils;
pub mod deadlines;
pub mod engine;
pub mod engine_state;
pub mod error;
pub mod health;
pub mod holidays;
pub mod milestones;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{EngineConfig, LeadTimes};
pub use date_utils::{get_lag_days, is_holiday, subtract_business_days};
pub use deadlines::{calculate_dates_from_first_valid, calculate_milestone_dates, MailTypeClass};
pub use engine::DropSheetEngine;
pub use engine_state::CampaignBoard;
pub use error::{EngineError, Result};
pub use health::{compute_schedule_health, is_behind_schedule};
pub use holidays::HolidayCalendar;
pub use milestones::{is_step_enabled, toggle_milestone, DependencyGraph};
pub use types::{
    Campaign, CampaignSummary, DeadlineChain, FirstValidDates, MilestoneKey, MilestoneStatus,
    Milestones, ScheduleHealth, StatusTag, StepView,
};
