//! Error type for the Drop Sheet engine
//!
//! Date arithmetic never fails: malformed dates degrade to `None`.
//! The variants here cover the few places where a caller needs a reason back.

use thiserror::Error;

use crate::types::MilestoneKey;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine configuration JSON could not be parsed
    #[error("Failed to parse engine config: {0}")]
    Config(#[from] serde_json::Error),

    /// A milestone toggle was rejected because a prerequisite is not completed.
    /// The message is shown inline next to the step.
    #[error("Complete \"{}\" before starting \"{}\"", .missing.label(), .step.label())]
    DependencyNotMet {
        step: MilestoneKey,
        missing: MilestoneKey,
    },

    #[error("Unknown milestone: {0}")]
    UnknownMilestone(String),

    #[error("Campaign {0} not found")]
    CampaignNotFound(String),

    #[error("Invalid campaign update: {0}")]
    InvalidUpdate(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
