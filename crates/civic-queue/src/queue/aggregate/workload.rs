use super::super::item::{Assignee, QueueItem};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MODERATE_THRESHOLD: usize = 4;
const HIGH_THRESHOLD: usize = 7;
const AT_CAPACITY_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityBand {
    Available,
    Moderate,
    High,
    AtCapacity,
}

impl CapacityBand {
    /// Lower bounds are inclusive: exactly 10 active items is at capacity.
    pub const fn for_active_count(active: usize) -> Self {
        if active >= AT_CAPACITY_THRESHOLD {
            Self::AtCapacity
        } else if active >= HIGH_THRESHOLD {
            Self::High
        } else if active >= MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::Available
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::AtCapacity => "At Capacity",
        }
    }
}

/// Half-open `[start, end)` window used to count resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportingWindow {
    /// Calendar month (UTC) containing `now`.
    pub fn month_of(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let first = today - Duration::days(i64::from(today.day0()));
        let next = first
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self {
            start: first.and_time(NaiveTime::MIN).and_utc(),
            end: next.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffIdentity {
    pub staff_id: String,
    pub display_name: String,
    pub role_type: String,
}

impl StaffIdentity {
    fn from_assignee(key: &str, assignee: &Assignee) -> Self {
        Self {
            staff_id: key.to_string(),
            display_name: assignee.name.clone(),
            role_type: "staff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadSummary {
    pub staff_id: String,
    pub display_name: String,
    pub role_type: String,
    pub active_count: usize,
    pub completed_count: usize,
    pub overdue_count: usize,
    pub completion_rate: f64,
    pub capacity_band: CapacityBand,
}

impl WorkloadSummary {
    pub fn from_counts(
        staff: &StaffIdentity,
        active_count: usize,
        completed_count: usize,
        overdue_count: usize,
    ) -> Self {
        let denominator = completed_count + active_count;
        let completion_rate = if denominator == 0 {
            0.0
        } else {
            completed_count as f64 / denominator as f64
        };

        Self {
            staff_id: staff.staff_id.clone(),
            display_name: staff.display_name.clone(),
            role_type: staff.role_type.clone(),
            active_count,
            completed_count,
            overdue_count,
            completion_rate,
            capacity_band: CapacityBand::for_active_count(active_count),
        }
    }

    pub fn completion_pct(&self) -> f64 {
        self.completion_rate * 100.0
    }
}

#[derive(Debug, Default)]
struct Tally {
    active: usize,
    completed: usize,
    overdue: usize,
}

impl Tally {
    fn record(&mut self, item: &QueueItem, window: &ReportingWindow, now: DateTime<Utc>) {
        if item.status.is_completed() {
            if item.resolved_at.is_some_and(|at| window.contains(at)) {
                self.completed += 1;
            }
        } else {
            self.active += 1;
            if item.is_overdue(now) {
                self.overdue += 1;
            }
        }
    }
}

/// Workload for one staff member over the items assigned to them.
pub fn compute_workload(
    staff: &StaffIdentity,
    items: &[QueueItem],
    window: &ReportingWindow,
    now: DateTime<Utc>,
) -> WorkloadSummary {
    let mut tally = Tally::default();
    for item in items {
        tally.record(item, window, now);
    }
    WorkloadSummary::from_counts(staff, tally.active, tally.completed, tally.overdue)
}

/// Supervisor view: one summary per roster member plus any assignee found in
/// the snapshot but missing from the roster. Unassigned items are skipped.
/// Sorted by display name.
pub fn team_workload(
    items: &[QueueItem],
    roster: &[StaffIdentity],
    window: &ReportingWindow,
    now: DateTime<Utc>,
) -> Vec<WorkloadSummary> {
    let mut members: BTreeMap<String, (StaffIdentity, Tally)> = roster
        .iter()
        .map(|staff| (staff.staff_id.clone(), (staff.clone(), Tally::default())))
        .collect();

    for item in items {
        let Some(assignee) = item.assignee.as_ref() else {
            continue;
        };
        let Some(key) = assignee_key(assignee) else {
            continue;
        };
        let (_, tally) = members
            .entry(key.to_string())
            .or_insert_with(|| (StaffIdentity::from_assignee(key, assignee), Tally::default()));
        tally.record(item, window, now);
    }

    let mut summaries: Vec<WorkloadSummary> = members
        .into_values()
        .map(|(staff, tally)| {
            WorkloadSummary::from_counts(&staff, tally.active, tally.completed, tally.overdue)
        })
        .collect();
    summaries.sort_by(|a, b| {
        a.display_name
            .cmp(&b.display_name)
            .then_with(|| a.staff_id.cmp(&b.staff_id))
    });
    summaries
}

fn assignee_key(assignee: &Assignee) -> Option<&str> {
    assignee
        .id
        .as_deref()
        .or(Some(assignee.name.as_str()))
        .filter(|key| !key.is_empty())
}
