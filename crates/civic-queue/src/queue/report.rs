use super::aggregate::{
    compute_tab_counts, team_workload, ReportingWindow, StaffIdentity, TabCounts, WorkloadSummary,
};
use super::filter::{filter_items, QueueSelection, QueueTab};
use super::item::QueueItem;
use super::status::QueueBucket;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct QueueItemView {
    #[serde(flatten)]
    pub item: QueueItem,
    pub bucket: QueueBucket,
    pub bucket_label: &'static str,
    pub kind_label: &'static str,
    pub status_label: &'static str,
    pub priority_label: &'static str,
    pub overdue: bool,
}

impl QueueItemView {
    pub fn new(item: QueueItem, now: DateTime<Utc>) -> Self {
        Self {
            bucket: item.bucket(),
            bucket_label: item.bucket().label(),
            kind_label: item.kind.label(),
            status_label: item.status.label(),
            priority_label: item.priority.label(),
            overdue: item.is_overdue(now),
            item,
        }
    }
}

/// Everything a queue screen renders for one selection at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct QueueReport {
    pub generated_at: DateTime<Utc>,
    pub tab: QueueTab,
    pub search: String,
    pub counts: TabCounts,
    pub items: Vec<QueueItemView>,
    pub window: ReportingWindow,
    pub workload: Vec<WorkloadSummary>,
}

impl QueueReport {
    /// Counts and workloads cover the full snapshot; only `items` is narrowed
    /// by the selection.
    pub fn build(
        snapshot: &[QueueItem],
        selection: &QueueSelection,
        roster: &[StaffIdentity],
        now: DateTime<Utc>,
    ) -> Self {
        let window = ReportingWindow::month_of(now);
        let items = filter_items(snapshot, selection, now)
            .into_iter()
            .map(|item| QueueItemView::new(item, now))
            .collect();

        Self {
            generated_at: now,
            tab: selection.tab,
            search: selection.search.as_str().to_string(),
            counts: compute_tab_counts(snapshot, now),
            items,
            window,
            workload: team_workload(snapshot, roster, &window, now),
        }
    }
}
