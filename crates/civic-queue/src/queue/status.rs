use serde::{Deserialize, Serialize};

/// Stored lifecycle status of a complaint or task.
///
/// Overdue is not a status; it is derived from the SLA deadline, see
/// [`crate::queue::QueueItem::is_overdue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    NotStarted,
    Received,
    Assigned,
    InProgress,
    AwaitingApproval,
    WorkCompleted,
    Resolved,
    Completed,
    Closed,
    Rejected,
    Reopened,
}

impl LifecycleStatus {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::NotStarted,
            Self::Received,
            Self::Assigned,
            Self::InProgress,
            Self::AwaitingApproval,
            Self::WorkCompleted,
            Self::Resolved,
            Self::Completed,
            Self::Closed,
            Self::Rejected,
            Self::Reopened,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Received => "received",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::AwaitingApproval => "awaiting_approval",
            Self::WorkCompleted => "work_completed",
            Self::Resolved => "resolved",
            Self::Completed => "completed",
            Self::Closed => "closed",
            Self::Rejected => "rejected",
            Self::Reopened => "reopened",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Received => "Received",
            Self::Assigned => "Assigned",
            Self::InProgress => "In Progress",
            Self::AwaitingApproval => "Awaiting Approval",
            Self::WorkCompleted => "Work Completed",
            Self::Resolved => "Resolved",
            Self::Completed => "Completed",
            Self::Closed => "Closed",
            Self::Rejected => "Rejected",
            Self::Reopened => "Reopened",
        }
    }

    /// Parses a backend status string. Case, surrounding whitespace, and
    /// space/hyphen separators are ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize_status_key(raw);
        Self::ordered()
            .into_iter()
            .find(|status| status.as_str() == key)
    }

    /// Total variant of [`LifecycleStatus::parse`]: unknown values land in
    /// `Received` so they still show up in the not-started bucket.
    pub fn from_raw(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            tracing::debug!(status = raw, "unrecognized lifecycle status, treating as received");
            Self::Received
        })
    }

    /// Completion freezes the SLA clock.
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed | Self::Resolved | Self::Closed)
    }

    pub const fn bucket(self) -> QueueBucket {
        classify(self)
    }

    pub const fn allowed_transitions(self) -> &'static [LifecycleStatus] {
        use LifecycleStatus::*;
        match self {
            NotStarted => &[Assigned, InProgress, Rejected],
            Received => &[Assigned, Rejected],
            Assigned => &[InProgress, Rejected, Reopened],
            InProgress => &[AwaitingApproval, WorkCompleted, Rejected],
            AwaitingApproval => &[Resolved, InProgress, Rejected],
            WorkCompleted => &[AwaitingApproval, Resolved, Rejected],
            Resolved | Completed => &[Closed, Reopened],
            Closed | Rejected => &[Reopened],
            Reopened => &[Assigned, InProgress, Rejected],
        }
    }

    pub fn can_transition_to(self, next: LifecycleStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI-facing status grouping. Every lifecycle status lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueBucket {
    NotStarted,
    InProgress,
    Awaiting,
    Completed,
}

impl QueueBucket {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Awaiting => "Awaiting",
            Self::Completed => "Completed",
        }
    }
}

pub const fn classify(status: LifecycleStatus) -> QueueBucket {
    match status {
        LifecycleStatus::InProgress => QueueBucket::InProgress,
        LifecycleStatus::AwaitingApproval | LifecycleStatus::WorkCompleted => {
            QueueBucket::Awaiting
        }
        LifecycleStatus::Completed | LifecycleStatus::Resolved | LifecycleStatus::Closed => {
            QueueBucket::Completed
        }
        LifecycleStatus::NotStarted
        | LifecycleStatus::Received
        | LifecycleStatus::Assigned
        | LifecycleStatus::Rejected
        | LifecycleStatus::Reopened => QueueBucket::NotStarted,
    }
}

pub fn classify_raw(raw: &str) -> QueueBucket {
    classify(LifecycleStatus::from_raw(raw))
}

fn normalize_status_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_case_and_separators() {
        assert_eq!(
            LifecycleStatus::parse(" In Progress "),
            Some(LifecycleStatus::InProgress)
        );
        assert_eq!(
            LifecycleStatus::parse("awaiting-approval"),
            Some(LifecycleStatus::AwaitingApproval)
        );
        assert_eq!(LifecycleStatus::parse("RESOLVED"), Some(LifecycleStatus::Resolved));
        assert_eq!(LifecycleStatus::parse("escalated"), None);
    }

    #[test]
    fn classify_raw_is_total() {
        for raw in ["", "   ", "escalated", "42", "in progress!", "\u{200b}"] {
            assert_eq!(classify_raw(raw), QueueBucket::NotStarted, "input {raw:?}");
        }
    }

    #[test]
    fn buckets_follow_taxonomy() {
        assert_eq!(classify_raw("received"), QueueBucket::NotStarted);
        assert_eq!(classify_raw("not_started"), QueueBucket::NotStarted);
        assert_eq!(classify_raw("in_progress"), QueueBucket::InProgress);
        assert_eq!(classify_raw("awaiting_approval"), QueueBucket::Awaiting);
        assert_eq!(classify_raw("work_completed"), QueueBucket::Awaiting);
        for raw in ["completed", "resolved", "closed"] {
            assert_eq!(classify_raw(raw), QueueBucket::Completed);
        }
    }

    #[test]
    fn completed_set_is_exactly_three_statuses() {
        let completed: Vec<_> = LifecycleStatus::ordered()
            .into_iter()
            .filter(|status| status.is_completed())
            .collect();
        assert_eq!(
            completed,
            vec![
                LifecycleStatus::Resolved,
                LifecycleStatus::Completed,
                LifecycleStatus::Closed
            ]
        );
    }

    #[test]
    fn every_status_round_trips_through_parse() {
        for status in LifecycleStatus::ordered() {
            assert_eq!(LifecycleStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn transitions_cover_side_branches() {
        assert!(LifecycleStatus::Received.can_transition_to(LifecycleStatus::Assigned));
        assert!(LifecycleStatus::InProgress.can_transition_to(LifecycleStatus::Rejected));
        assert!(LifecycleStatus::Resolved.can_transition_to(LifecycleStatus::Reopened));
        assert!(LifecycleStatus::Reopened.can_transition_to(LifecycleStatus::InProgress));
        assert!(!LifecycleStatus::Closed.can_transition_to(LifecycleStatus::InProgress));
        assert!(!LifecycleStatus::Received.can_transition_to(LifecycleStatus::Resolved));
    }
}
