use super::item::QueueItem;
use super::status::QueueBucket;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Queue tab selected in the UI. `Overdue` cuts across buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueTab {
    #[default]
    All,
    NotStarted,
    InProgress,
    Awaiting,
    Completed,
    Overdue,
}

impl QueueTab {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::All,
            Self::NotStarted,
            Self::InProgress,
            Self::Awaiting,
            Self::Completed,
            Self::Overdue,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Awaiting => "Awaiting",
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
        }
    }

    /// Unknown tab names fall back to `All`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "not_started" => Self::NotStarted,
            "in_progress" => Self::InProgress,
            "awaiting" => Self::Awaiting,
            "completed" => Self::Completed,
            "overdue" => Self::Overdue,
            _ => Self::All,
        }
    }

    pub const fn bucket(self) -> Option<QueueBucket> {
        match self {
            Self::NotStarted => Some(QueueBucket::NotStarted),
            Self::InProgress => Some(QueueBucket::InProgress),
            Self::Awaiting => Some(QueueBucket::Awaiting),
            Self::Completed => Some(QueueBucket::Completed),
            Self::All | Self::Overdue => None,
        }
    }

    pub fn matches(self, item: &QueueItem, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Overdue => item.is_overdue(now),
            tab => tab.bucket() == Some(item.bucket()),
        }
    }
}

/// Case-insensitive free-text query; blank input matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, item: &QueueItem) -> bool {
        if self.is_empty() {
            return true;
        }
        [&item.title, &item.tracking_code, &item.location]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&self.0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSelection {
    pub tab: QueueTab,
    pub search: SearchQuery,
}

impl QueueSelection {
    pub fn new(tab: QueueTab, search: &str) -> Self {
        Self {
            tab,
            search: SearchQuery::new(search),
        }
    }
}

/// Tab filter, then text filter. Surviving items keep their snapshot order.
pub fn filter_items(
    items: &[QueueItem],
    selection: &QueueSelection,
    now: DateTime<Utc>,
) -> Vec<QueueItem> {
    items
        .iter()
        .filter(|item| selection.tab.matches(item, now))
        .filter(|item| selection.search.matches(item))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::item::fixtures::{at, item};
    use crate::queue::status::LifecycleStatus;

    fn snapshot() -> Vec<QueueItem> {
        let mut pothole = item("1", LifecycleStatus::Received);
        pothole.title = "Pothole".to_string();
        pothole.location = "Ward 5, Lakeside".to_string();

        let mut streetlight = item("2", LifecycleStatus::InProgress);
        streetlight.title = "Broken streetlight".to_string();
        streetlight.due_at = Some(at(2025, 10, 1));

        let mut garbage = item("3", LifecycleStatus::Resolved);
        garbage.title = "Garbage pickup missed".to_string();
        garbage.due_at = Some(at(2025, 9, 1));

        let mut drain = item("4", LifecycleStatus::AwaitingApproval);
        drain.title = "Blocked drain".to_string();
        drain.tracking_code = "CMP-2025-0444".to_string();

        vec![pothole, streetlight, garbage, drain]
    }

    fn ids(items: &[QueueItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn all_tab_with_blank_search_returns_snapshot() {
        let items = snapshot();
        let selection = QueueSelection::new(QueueTab::All, "   ");
        assert_eq!(filter_items(&items, &selection, at(2025, 10, 10)), items);
    }

    #[test]
    fn bucket_tabs_filter_by_classification() {
        let items = snapshot();
        let now = at(2025, 10, 10);
        let cases = [
            (QueueTab::NotStarted, vec!["1"]),
            (QueueTab::InProgress, vec!["2"]),
            (QueueTab::Awaiting, vec!["4"]),
            (QueueTab::Completed, vec!["3"]),
        ];
        for (tab, expected) in cases {
            let filtered = filter_items(&items, &QueueSelection::new(tab, ""), now);
            assert_eq!(ids(&filtered), expected, "tab {tab:?}");
        }
    }

    #[test]
    fn overdue_tab_ignores_completed_items() {
        let items = snapshot();
        let filtered = filter_items(
            &items,
            &QueueSelection::new(QueueTab::Overdue, ""),
            at(2025, 10, 10),
        );
        assert_eq!(ids(&filtered), vec!["2"]);
    }

    #[test]
    fn search_matches_location_case_insensitively() {
        let items = snapshot();
        let filtered = filter_items(
            &items,
            &QueueSelection::new(QueueTab::All, "ward 5"),
            at(2025, 10, 10),
        );
        assert_eq!(ids(&filtered), vec!["1"]);
    }

    #[test]
    fn search_matches_tracking_code_and_title() {
        let items = snapshot();
        let now = at(2025, 10, 10);
        let by_code = filter_items(&items, &QueueSelection::new(QueueTab::All, "0444"), now);
        assert_eq!(ids(&by_code), vec!["4"]);
        let by_title = filter_items(&items, &QueueSelection::new(QueueTab::All, "STREET"), now);
        assert_eq!(ids(&by_title), vec!["2"]);
    }

    #[test]
    fn tab_and_search_combine() {
        let items = snapshot();
        let filtered = filter_items(
            &items,
            &QueueSelection::new(QueueTab::Completed, "pothole"),
            at(2025, 10, 10),
        );
        assert!(filtered.is_empty());
    }

    #[test]
    fn filtering_twice_is_a_no_op() {
        let items = snapshot();
        let now = at(2025, 10, 10);
        for tab in QueueTab::ordered() {
            for query in ["", "b", "cmp", "ward"] {
                let selection = QueueSelection::new(tab, query);
                let once = filter_items(&items, &selection, now);
                let twice = filter_items(&once, &selection, now);
                assert_eq!(once, twice, "tab {tab:?} query {query:?}");
            }
        }
    }

    #[test]
    fn tab_parse_falls_back_to_all() {
        assert_eq!(QueueTab::parse("in-progress"), QueueTab::InProgress);
        assert_eq!(QueueTab::parse("OVERDUE"), QueueTab::Overdue);
        assert_eq!(QueueTab::parse("mine"), QueueTab::All);
    }
}
