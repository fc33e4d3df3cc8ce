//! Engine configuration
//!
//! Holiday calendar, lead-time constants and the milestone dependency graph
//! are injected as one value, so tests can swap any of them.
//! Received from the UI as JSON; every key is optional.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::holidays::HolidayCalendar;
use crate::milestones::DependencyGraph;

/// Lead-time constants for the deadline chain
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadTimes {
    /// Postal transit: in-home date back to mail drop (business days)
    pub mail_drop_business_days: u32,

    /// Vendor handover before mail drop (business days)
    pub art_due_business_days: u32,

    /// Art submission before mail drop for core/newsletter pieces (calendar days)
    pub core_art_submission_days: u32,

    /// Art submission before mail drop for everything else (calendar days)
    pub standard_art_submission_days: u32,

    /// First valid date back to in-home date, core/newsletter (calendar days)
    pub core_first_valid_offset_days: u32,

    /// First valid date back to in-home date, everything else (calendar days)
    pub standard_first_valid_offset_days: u32,
}

impl Default for LeadTimes {
    fn default() -> Self {
        Self {
            mail_drop_business_days: 10,
            art_due_business_days: 5,
            core_art_submission_days: 35,
            standard_art_submission_days: 28,
            core_first_valid_offset_days: 14,
            standard_first_valid_offset_days: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub holidays: HolidayCalendar,
    pub lead_times: LeadTimes,
    pub dependencies: DependencyGraph,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            holidays: HolidayCalendar::us_postal(),
            lead_times: LeadTimes::default(),
            dependencies: DependencyGraph::standard(),
        }
    }
}

impl EngineConfig {
    /// Parse a config document. Missing keys fall back to the defaults.
    pub fn from_json(config_json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(config_json)?;
        Ok(config)
    }

    /// Default lead times and graph with a caller-supplied calendar
    pub fn with_holidays(holidays: HolidayCalendar) -> Self {
        Self {
            holidays,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::types::MilestoneKey;

    #[test]
    fn empty_document_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(!config.holidays.is_empty());
    }

    #[test]
    fn partial_overrides() {
        let config = EngineConfig::from_json(
            r#"{ "holidays": [], "leadTimes": { "mailDropBusinessDays": 8 } }"#,
        )
        .unwrap();
        assert!(config.holidays.is_empty());
        assert_eq!(config.lead_times.mail_drop_business_days, 8);
        assert_eq!(config.lead_times.core_art_submission_days, 35);
        assert_eq!(
            config.dependencies.requires(MilestoneKey::DataApproved),
            &[MilestoneKey::DataReceived]
        );
    }

    #[test]
    fn custom_dependency_graph() {
        let config = EngineConfig::from_json(
            r#"{ "dependencies": { "mailed": ["sent_to_vendor"] } }"#,
        )
        .unwrap();
        assert_eq!(
            config.dependencies.requires(MilestoneKey::Mailed),
            &[MilestoneKey::SentToVendor]
        );
        assert!(config.dependencies.requires(MilestoneKey::DataApproved).is_empty());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            EngineConfig::from_json("{ holidays"),
            Err(EngineError::Config(_))
        ));
    }
}
