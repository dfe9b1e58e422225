//! Status history reconstruction for the citizen-facing progress tracker.
//!
//! A stored status may be revisited (reopened then resolved again), so a slot
//! can have several candidate updates. The caller picks which one wins via
//! [`TimelineTieBreak`]; `FirstOccurrence` is the long-standing behavior and
//! stays the default until the intended semantics are confirmed.

use super::status::LifecycleStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: LifecycleStatus,
    pub changed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineSlot {
    Received,
    Assigned,
    InProgress,
    AwaitingApproval,
    Resolved,
    Closed,
}

impl TimelineSlot {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Received,
            Self::Assigned,
            Self::InProgress,
            Self::AwaitingApproval,
            Self::Resolved,
            Self::Closed,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::Assigned => "Assigned",
            Self::InProgress => "In Progress",
            Self::AwaitingApproval => "Awaiting Approval",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    /// Side branches (rejected, reopened) have no slot on the tracker.
    pub const fn for_status(status: LifecycleStatus) -> Option<Self> {
        match status {
            LifecycleStatus::NotStarted | LifecycleStatus::Received => Some(Self::Received),
            LifecycleStatus::Assigned => Some(Self::Assigned),
            LifecycleStatus::InProgress => Some(Self::InProgress),
            LifecycleStatus::AwaitingApproval | LifecycleStatus::WorkCompleted => {
                Some(Self::AwaitingApproval)
            }
            LifecycleStatus::Resolved | LifecycleStatus::Completed => Some(Self::Resolved),
            LifecycleStatus::Closed => Some(Self::Closed),
            LifecycleStatus::Rejected | LifecycleStatus::Reopened => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineTieBreak {
    #[default]
    FirstOccurrence,
    LatestOccurrence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStep {
    pub slot: TimelineSlot,
    pub label: &'static str,
    pub reached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One step per tracker slot, in lifecycle order. Updates may arrive in any
/// order; they are sorted by `changed_at` (stable) before picking.
pub fn build_timeline(updates: &[StatusUpdate], tie_break: TimelineTieBreak) -> Vec<TimelineStep> {
    let mut chronological: Vec<&StatusUpdate> = updates.iter().collect();
    chronological.sort_by_key(|update| update.changed_at);

    TimelineSlot::ordered()
        .into_iter()
        .map(|slot| {
            let mut candidates = chronological
                .iter()
                .filter(|update| TimelineSlot::for_status(update.status) == Some(slot));
            let chosen = match tie_break {
                TimelineTieBreak::FirstOccurrence => candidates.next(),
                TimelineTieBreak::LatestOccurrence => candidates.last(),
            };
            TimelineStep {
                slot,
                label: slot.label(),
                reached: chosen.is_some(),
                changed_at: chosen.map(|update| update.changed_at),
                note: chosen.and_then(|update| update.note.clone()),
            }
        })
        .collect()
}

/// Slots with more than one stored update, where the tie-break matters.
pub fn revisited_slots(updates: &[StatusUpdate]) -> Vec<TimelineSlot> {
    TimelineSlot::ordered()
        .into_iter()
        .filter(|slot| {
            updates
                .iter()
                .filter(|update| TimelineSlot::for_status(update.status) == Some(*slot))
                .count()
                > 1
        })
        .collect()
}
