use super::status::{LifecycleStatus, QueueBucket};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Complaint,
    Task,
}

impl ItemKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Complaint => "Complaint",
            Self::Task => "Task",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "complaint" => Some(Self::Complaint),
            "task" => Some(Self::Task),
            _ => None,
        }
    }
}

/// Ordinal severity; variants are declared from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
    Urgent,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
            Self::Urgent => "Urgent",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "normal" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn from_raw(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or_default()
    }
}

/// Weak reference to a staff identity. The queue never validates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Uniform unit of work shown in staff and supervisor queues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    pub kind: ItemKind,
    pub tracking_code: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub ward: String,
    pub status: LifecycleStatus,
    pub priority: Priority,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl QueueItem {
    pub fn bucket(&self) -> QueueBucket {
        self.status.bucket()
    }

    /// SLA breach: a deadline in the past on an item that is not completed.
    /// Items without a deadline are never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.status.is_completed() {
            return false;
        }
        self.due_at.is_some_and(|due| due < now)
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee.as_ref().map(|assignee| assignee.name.as_str())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{at, item};
    use super::*;

    #[test]
    fn past_deadline_marks_open_item_overdue() {
        let now = at(2025, 10, 10);
        let mut task = item("1", LifecycleStatus::InProgress);
        task.due_at = Some(at(2025, 10, 9));
        assert!(task.is_overdue(now));
        assert_eq!(task.bucket(), QueueBucket::InProgress);
    }

    #[test]
    fn completion_freezes_sla_clock() {
        let now = at(2025, 10, 10);
        for status in [
            LifecycleStatus::Completed,
            LifecycleStatus::Resolved,
            LifecycleStatus::Closed,
        ] {
            let mut done = item("2", status);
            done.due_at = Some(at(2020, 1, 1));
            assert!(!done.is_overdue(now), "{status} must never be overdue");
        }
    }

    #[test]
    fn missing_deadline_is_never_overdue() {
        let task = item("3", LifecycleStatus::Received);
        assert!(!task.is_overdue(at(2030, 1, 1)));
    }

    #[test]
    fn deadline_equal_to_now_is_not_overdue() {
        let now = at(2025, 10, 10);
        let mut task = item("4", LifecycleStatus::Assigned);
        task.due_at = Some(now);
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn priority_defaults_to_medium_and_orders_by_severity() {
        assert_eq!(Priority::from_raw(None), Priority::Medium);
        assert_eq!(Priority::from_raw(Some("bogus")), Priority::Medium);
        assert_eq!(Priority::from_raw(Some(" URGENT ")), Priority::Urgent);
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Critical < Priority::Urgent);
    }
}
