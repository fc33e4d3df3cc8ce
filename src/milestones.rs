//! Milestone state machine
//!
//! pending --toggle (deps met)--> in_progress --toggle--> completed --toggle--> pending
//!
//! A toggle on a pending step with unmet prerequisites is rejected and the
//! caller's map is left as it was. `completed` is not terminal so that
//! data-entry mistakes can be reverted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{EngineError, Result};
use crate::types::{MilestoneKey, MilestoneStatus, Milestones};

/// Prerequisites per milestone. Keys not listed have none.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct DependencyGraph {
    requires: BTreeMap<MilestoneKey, Vec<MilestoneKey>>,
}

impl DependencyGraph {
    /// The drop sheet pipeline: data and creative each need receipt before
    /// approval, and mailing needs the outline plus both approvals.
    pub fn standard() -> Self {
        use MilestoneKey::*;

        let requires = BTreeMap::from([
            (OutlineGiven, vec![]),
            (DataReceived, vec![]),
            (DataApproved, vec![DataReceived]),
            (CreativeReceived, vec![]),
            (CreativeApproved, vec![CreativeReceived]),
            (Mailed, vec![OutlineGiven, DataApproved, CreativeApproved]),
            (SentToVendor, vec![]),
        ]);
        Self { requires }
    }

    pub fn requires(&self, step: MilestoneKey) -> &[MilestoneKey] {
        self.requires.get(&step).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// First prerequisite of `step` that is not completed, in declared order
pub fn first_unmet_dependency(
    milestones: &Milestones,
    step: MilestoneKey,
    graph: &DependencyGraph,
) -> Option<MilestoneKey> {
    graph
        .requires(step)
        .iter()
        .copied()
        .find(|dep| !milestones.is_completed(*dep))
}

/// A step is actionable when every prerequisite is completed
pub fn is_step_enabled(
    milestones: &Milestones,
    step: MilestoneKey,
    graph: &DependencyGraph,
) -> bool {
    first_unmet_dependency(milestones, step, graph).is_none()
}

/// Advance `step` one position around the cycle and return the new map.
///
/// Completing records `clock.now()` as the completion time. Reverting a
/// completed step clears both its status and timestamp.
pub fn toggle_milestone<C: Clock + ?Sized>(
    milestones: &Milestones,
    step: MilestoneKey,
    graph: &DependencyGraph,
    clock: &C,
) -> Result<Milestones> {
    let next = match milestones.status(step) {
        MilestoneStatus::Pending => {
            if let Some(missing) = first_unmet_dependency(milestones, step, graph) {
                warn!(%step, %missing, "milestone toggle blocked by dependency");
                return Err(EngineError::DependencyNotMet { step, missing });
            }
            MilestoneStatus::InProgress
        }
        MilestoneStatus::InProgress => MilestoneStatus::Completed {
            at: Some(clock.now()),
        },
        MilestoneStatus::Completed { .. } => MilestoneStatus::Pending,
    };

    debug!(%step, from = ?milestones.status(step).tag(), to = ?next.tag(), "milestone toggled");
    Ok(milestones.with_status(step, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 6, 14, 0, 0).unwrap())
    }

    #[test]
    fn independent_steps_are_always_enabled() {
        let graph = DependencyGraph::standard();
        let empty = Milestones::new();
        assert!(is_step_enabled(&empty, MilestoneKey::OutlineGiven, &graph));
        assert!(is_step_enabled(&empty, MilestoneKey::DataReceived, &graph));
        assert!(is_step_enabled(&empty, MilestoneKey::CreativeReceived, &graph));
        assert!(is_step_enabled(&empty, MilestoneKey::SentToVendor, &graph));
        assert!(!is_step_enabled(&empty, MilestoneKey::DataApproved, &graph));
        assert!(!is_step_enabled(&empty, MilestoneKey::Mailed, &graph));
    }

    #[test]
    fn in_progress_does_not_satisfy_a_dependency() {
        let graph = DependencyGraph::standard();
        let milestones =
            Milestones::new().with_status(MilestoneKey::DataReceived, MilestoneStatus::InProgress);
        assert!(!is_step_enabled(&milestones, MilestoneKey::DataApproved, &graph));
    }

    #[test]
    fn legacy_completed_tag_satisfies_a_dependency() {
        let graph = DependencyGraph::standard();
        let milestones = Milestones::new()
            .with_status(MilestoneKey::DataReceived, MilestoneStatus::Completed { at: None });
        assert!(is_step_enabled(&milestones, MilestoneKey::DataApproved, &graph));
    }

    #[test]
    fn full_cycle_returns_to_pending() {
        let graph = DependencyGraph::standard();
        let clock = clock();
        let start = Milestones::new();

        let one = toggle_milestone(&start, MilestoneKey::OutlineGiven, &graph, &clock).unwrap();
        assert_eq!(one.status(MilestoneKey::OutlineGiven), MilestoneStatus::InProgress);

        let two = toggle_milestone(&one, MilestoneKey::OutlineGiven, &graph, &clock).unwrap();
        assert_eq!(
            two.status(MilestoneKey::OutlineGiven),
            MilestoneStatus::Completed { at: Some(clock.0) }
        );

        let three = toggle_milestone(&two, MilestoneKey::OutlineGiven, &graph, &clock).unwrap();
        assert_eq!(three, start);
        // Inputs are never touched
        assert_eq!(one.status(MilestoneKey::OutlineGiven), MilestoneStatus::InProgress);
    }

    #[test]
    fn blocked_toggle_names_first_missing_dependency() {
        let graph = DependencyGraph::standard();
        let milestones = Milestones::new().with_status(
            MilestoneKey::OutlineGiven,
            MilestoneStatus::Completed { at: Some(clock().0) },
        );

        let err =
            toggle_milestone(&milestones, MilestoneKey::Mailed, &graph, &clock()).unwrap_err();
        match err {
            EngineError::DependencyNotMet { step, missing } => {
                assert_eq!(step, MilestoneKey::Mailed);
                assert_eq!(missing, MilestoneKey::DataApproved);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blocked_message_uses_labels() {
        let graph = DependencyGraph::standard();
        let err = toggle_milestone(&Milestones::new(), MilestoneKey::DataApproved, &graph, &clock())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Complete \"Data Received\" before starting \"Data Approved\""
        );
    }

    #[test]
    fn reverting_a_completed_step_ignores_dependencies() {
        // Prerequisite later reverted; the dependent step can still be undone
        let graph = DependencyGraph::standard();
        let milestones = Milestones::new().with_status(
            MilestoneKey::DataApproved,
            MilestoneStatus::Completed { at: Some(clock().0) },
        );
        let next =
            toggle_milestone(&milestones, MilestoneKey::DataApproved, &graph, &clock()).unwrap();
        assert_eq!(next.status(MilestoneKey::DataApproved), MilestoneStatus::Pending);
    }

    #[test]
    fn closure_clock() {
        let graph = DependencyGraph::standard();
        let at = Utc.with_ymd_and_hms(2026, 2, 2, 9, 15, 0).unwrap();
        let started =
            Milestones::new().with_status(MilestoneKey::Mailed, MilestoneStatus::InProgress);
        let done = toggle_milestone(&started, MilestoneKey::Mailed, &graph, &|| at).unwrap();
        assert_eq!(done.status(MilestoneKey::Mailed).completed_at(), Some(at));
    }
}
