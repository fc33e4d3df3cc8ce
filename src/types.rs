//! Type definitions for the Drop Sheet engine
//!
//! Wire shapes match the campaign documents the web UI persists.
//! IMPORTANT: Field names use camelCase via serde rename to match JS

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::date_utils::parse_timestamp;
use crate::error::EngineError;

/// One step of a mail campaign's production pipeline
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKey {
    OutlineGiven,
    DataReceived,
    DataApproved,
    CreativeReceived,
    CreativeApproved,
    Mailed,
    /// Kept for older documents. Not part of the active pipeline.
    SentToVendor,
}

impl MilestoneKey {
    /// Every key the data model knows about
    pub const ALL: [MilestoneKey; 7] = [
        MilestoneKey::OutlineGiven,
        MilestoneKey::DataReceived,
        MilestoneKey::DataApproved,
        MilestoneKey::CreativeReceived,
        MilestoneKey::CreativeApproved,
        MilestoneKey::Mailed,
        MilestoneKey::SentToVendor,
    ];

    /// The six steps shown on the drop sheet, in pipeline order
    pub const ACTIVE: [MilestoneKey; 6] = [
        MilestoneKey::OutlineGiven,
        MilestoneKey::DataReceived,
        MilestoneKey::DataApproved,
        MilestoneKey::CreativeReceived,
        MilestoneKey::CreativeApproved,
        MilestoneKey::Mailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneKey::OutlineGiven => "outline_given",
            MilestoneKey::DataReceived => "data_received",
            MilestoneKey::DataApproved => "data_approved",
            MilestoneKey::CreativeReceived => "creative_received",
            MilestoneKey::CreativeApproved => "creative_approved",
            MilestoneKey::Mailed => "mailed",
            MilestoneKey::SentToVendor => "sent_to_vendor",
        }
    }

    /// Display label used in blocking messages and step views
    pub fn label(&self) -> &'static str {
        match self {
            MilestoneKey::OutlineGiven => "Outline Given",
            MilestoneKey::DataReceived => "Data Received",
            MilestoneKey::DataApproved => "Data Approved",
            MilestoneKey::CreativeReceived => "Creative Received",
            MilestoneKey::CreativeApproved => "Creative Approved",
            MilestoneKey::Mailed => "Mailed",
            MilestoneKey::SentToVendor => "Sent to Vendor",
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, MilestoneKey::SentToVendor)
    }
}

impl fmt::Display for MilestoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilestoneKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        MilestoneKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| EngineError::UnknownMilestone(s.to_string()))
    }
}

/// Status tag as it appears in persisted documents
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusTag {
    Pending,
    InProgress,
    Completed,
}

impl StatusTag {
    fn parse_lenient(raw: &str) -> Option<StatusTag> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(StatusTag::Pending),
            "in_progress" => Some(StatusTag::InProgress),
            "completed" => Some(StatusTag::Completed),
            _ => None,
        }
    }
}

/// Canonical in-memory state of a single milestone
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MilestoneStatus {
    #[default]
    Pending,
    InProgress,
    /// `at` is `None` only for legacy documents that carried a completed
    /// tag (or an unreadable timestamp) without a usable completion time.
    Completed { at: Option<DateTime<Utc>> },
}

impl MilestoneStatus {
    pub fn tag(&self) -> StatusTag {
        match self {
            MilestoneStatus::Pending => StatusTag::Pending,
            MilestoneStatus::InProgress => StatusTag::InProgress,
            MilestoneStatus::Completed { .. } => StatusTag::Completed,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, MilestoneStatus::Completed { .. })
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            MilestoneStatus::Completed { at } => *at,
            _ => None,
        }
    }
}

// === Persisted milestone document ===

/// One milestone entry in a persisted document.
/// Older documents store a bare timestamp, flag or null instead of an object.
/// Any JSON value is accepted so one bad entry never rejects the whole map.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum MilestoneValue {
    Entry(MilestoneEntry),
    Bare(serde_json::Value),
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct MilestoneEntry {
    #[serde(default)]
    timestamp: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<serde_json::Value>,
}

/// Completion recorded by a timestamp value, if it records one.
/// Strings are parsed, numbers are epoch milliseconds, `true` is a bare flag.
fn decode_timestamp(key: MilestoneKey, value: &serde_json::Value) -> Option<MilestoneStatus> {
    use serde_json::Value;

    let at = match value {
        Value::Null | Value::Bool(false) => return None,
        Value::String(raw) if raw.trim().is_empty() => return None,
        Value::String(raw) => parse_timestamp(raw),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::Bool(true) => None,
        Value::Array(_) | Value::Object(_) => {
            warn!(milestone = %key, "ignoring structured milestone timestamp");
            return None;
        }
    };

    if at.is_none() && !value.is_boolean() {
        warn!(milestone = %key, timestamp = %value, "unparseable milestone timestamp");
    }
    Some(MilestoneStatus::Completed { at })
}

impl MilestoneValue {
    fn decode(self, key: MilestoneKey) -> MilestoneStatus {
        let (timestamp, status) = match self {
            MilestoneValue::Entry(entry) => (entry.timestamp, entry.status),
            MilestoneValue::Bare(value) => (Some(value), None),
        };

        // A recorded timestamp always means completed
        if let Some(completed) = timestamp.as_ref().and_then(|t| decode_timestamp(key, t)) {
            return completed;
        }

        match status.as_ref().and_then(|s| s.as_str()).and_then(StatusTag::parse_lenient) {
            Some(StatusTag::Completed) => MilestoneStatus::Completed { at: None },
            Some(StatusTag::InProgress) => MilestoneStatus::InProgress,
            _ => MilestoneStatus::Pending,
        }
    }

    fn encode(status: &MilestoneStatus) -> Option<MilestoneValue> {
        let entry = match status {
            MilestoneStatus::Pending => return None,
            MilestoneStatus::InProgress => MilestoneEntry {
                timestamp: None,
                status: Some("in_progress".into()),
            },
            MilestoneStatus::Completed { at } => MilestoneEntry {
                timestamp: at.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true).into()),
                status: Some("completed".into()),
            },
        };
        Some(MilestoneValue::Entry(entry))
    }
}

/// Whole milestone document. Anything other than an object decodes as empty.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum MilestoneDocument {
    Map(BTreeMap<String, MilestoneValue>),
    Other(serde_json::Value),
}

/// Milestone map for one campaign. Keys not present are pending.
///
/// Operations never mutate a map in place; they return a new one so the
/// caller can keep the previous version for rollback.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(
    from = "MilestoneDocument",
    into = "BTreeMap<String, MilestoneValue>"
)]
pub struct Milestones(BTreeMap<MilestoneKey, MilestoneStatus>);

impl Milestones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, key: MilestoneKey) -> MilestoneStatus {
        self.0.get(&key).copied().unwrap_or_default()
    }

    pub fn is_completed(&self, key: MilestoneKey) -> bool {
        self.status(key).is_completed()
    }

    /// Copy of this map with one key replaced. Setting `Pending` removes the key.
    pub fn with_status(&self, key: MilestoneKey, status: MilestoneStatus) -> Milestones {
        let mut next = self.0.clone();
        match status {
            MilestoneStatus::Pending => {
                next.remove(&key);
            }
            other => {
                next.insert(key, other);
            }
        }
        Milestones(next)
    }

    /// Number of the given keys that are completed
    pub fn completed_count(&self, keys: &[MilestoneKey]) -> usize {
        keys.iter().filter(|k| self.is_completed(**k)).count()
    }

    /// Non-pending entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (MilestoneKey, MilestoneStatus)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(MilestoneKey, MilestoneStatus)> for Milestones {
    fn from_iter<I: IntoIterator<Item = (MilestoneKey, MilestoneStatus)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Milestones::new(), |acc, (key, status)| acc.with_status(key, status))
    }
}

impl From<MilestoneDocument> for Milestones {
    fn from(doc: MilestoneDocument) -> Self {
        let doc = match doc {
            MilestoneDocument::Map(doc) => doc,
            MilestoneDocument::Other(value) => {
                if !value.is_null() {
                    warn!(document = %value, "milestone document is not an object");
                }
                return Milestones::new();
            }
        };

        let mut map = BTreeMap::new();
        for (raw_key, value) in doc {
            match raw_key.parse::<MilestoneKey>() {
                Ok(key) => {
                    let status = value.decode(key);
                    if status != MilestoneStatus::Pending {
                        map.insert(key, status);
                    }
                }
                Err(_) => {
                    warn!(key = %raw_key, "dropping unknown milestone key");
                }
            }
        }
        Milestones(map)
    }
}

impl From<Milestones> for BTreeMap<String, MilestoneValue> {
    fn from(milestones: Milestones) -> Self {
        milestones
            .0
            .iter()
            .filter_map(|(key, status)| {
                MilestoneValue::encode(status).map(|v| (key.as_str().to_string(), v))
            })
            .collect()
    }
}

// === Derived dates ===

/// Deadlines derived from a campaign's in-home date and mail type.
/// All fields are `None` when the in-home date is missing or unparseable.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineChain {
    /// In-home date minus the postal transit business days
    pub mail_drop_date: Option<NaiveDate>,

    /// Vendor handover, business days before the mail drop
    pub art_due_date: Option<NaiveDate>,

    /// Internal creative submission, calendar days before the mail drop
    pub art_submission_due_date: Option<NaiveDate>,
}

impl DeadlineChain {
    pub fn is_known(&self) -> bool {
        self.mail_drop_date.is_some()
    }

    /// Deadline that governs the behind-schedule check.
    /// Prefers the vendor handover date, falling back to art submission.
    pub fn behind_schedule_deadline(&self) -> Option<NaiveDate> {
        self.art_due_date.or(self.art_submission_due_date)
    }
}

/// Result of deriving the chain from a first valid (in-market) date
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FirstValidDates {
    pub in_home_date: NaiveDate,

    #[serde(flatten)]
    pub chain: DeadlineChain,
}

/// Derived schedule classification, recomputed on every read
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleHealth {
    Complete,
    Late {
        #[serde(rename = "lagDays")]
        lag_days: i64,
    },
    BehindSchedule,
    OnTrack,
}

impl ScheduleHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleHealth::Complete => "complete",
            ScheduleHealth::Late { .. } => "late",
            ScheduleHealth::BehindSchedule => "behind_schedule",
            ScheduleHealth::OnTrack => "on_track",
        }
    }

    /// Lateness magnitude in calendar days, only for `Late`
    pub fn lag_days(&self) -> Option<i64> {
        match self {
            ScheduleHealth::Late { lag_days } => Some(*lag_days),
            _ => None,
        }
    }
}

impl fmt::Display for ScheduleHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === Campaigns ===

/// Campaign record as persisted by the web UI
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Free-text mail type, e.g. "Core/Newsletter" or "6x9 Postcard"
    #[serde(default)]
    pub mail_type: String,

    #[serde(default)]
    pub in_home_date: Option<String>,

    /// In-market date. Used to derive the in-home date when none is set.
    #[serde(default)]
    pub first_valid_date: Option<String>,

    /// Date the vendor actually mailed the piece
    #[serde(default)]
    pub vendor_mail_date: Option<String>,

    #[serde(default)]
    pub milestones: Milestones,

    #[serde(default)]
    pub notes: String,
}

/// One active step as rendered on the drop sheet
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub key: MilestoneKey,
    pub label: String,
    pub state: StatusTag,
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether all prerequisites are completed
    pub enabled: bool,
}

/// Everything the drop sheet row needs for one campaign
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub id: String,
    pub in_home_date: Option<NaiveDate>,
    pub dates: DeadlineChain,
    pub health: ScheduleHealth,

    // Independent badges; a campaign can be both late and behind
    pub is_late: bool,
    pub lag_days: Option<i64>,
    pub is_behind_schedule: bool,

    pub steps: Vec<StepView>,
    pub completed_count: usize,
    pub total_steps: usize,
}
