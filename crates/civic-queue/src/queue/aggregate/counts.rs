use super::super::filter::QueueTab;
use super::super::item::QueueItem;
use super::super::status::QueueBucket;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Badge counts for every queue tab.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TabCounts {
    pub all: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub awaiting: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl TabCounts {
    pub fn get(&self, tab: QueueTab) -> usize {
        match tab {
            QueueTab::All => self.all,
            QueueTab::NotStarted => self.not_started,
            QueueTab::InProgress => self.in_progress,
            QueueTab::Awaiting => self.awaiting,
            QueueTab::Completed => self.completed,
            QueueTab::Overdue => self.overdue,
        }
    }

    fn record(&mut self, item: &QueueItem, now: DateTime<Utc>) {
        self.all += 1;
        match item.bucket() {
            QueueBucket::NotStarted => self.not_started += 1,
            QueueBucket::InProgress => self.in_progress += 1,
            QueueBucket::Awaiting => self.awaiting += 1,
            QueueBucket::Completed => self.completed += 1,
        }
        if item.is_overdue(now) {
            self.overdue += 1;
        }
    }
}

pub fn compute_tab_counts(items: &[QueueItem], now: DateTime<Utc>) -> TabCounts {
    items.iter().fold(TabCounts::default(), |mut counts, item| {
        counts.record(item, now);
        counts
    })
}
