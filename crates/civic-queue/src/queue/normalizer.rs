//! Adapters that turn backend rows into [`QueueItem`]s.
//!
//! Rows are decoded leniently: ids may be numbers, blank strings count as
//! missing, unparseable timestamps are dropped, and nested references may be
//! null. Normalizing a row never fails.

use super::item::{Assignee, ItemKind, Priority, QueueItem};
use super::status::LifecycleStatus;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A backend row shape that can be mapped onto the uniform queue item.
pub trait Normalizable {
    fn kind(&self) -> ItemKind;
    fn normalize(&self) -> QueueItem;
}

/// Complaint row joined with its category, ward, and assigned staff.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplaintRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tracking_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub sla_due_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub ward: Option<WardRef>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub assigned_staff: Option<StaffRef>,
}

/// Staff task-assignment row joined with the task it points at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskAssignmentRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Assignment-level status; wins over the task's own status when set.
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub task: Option<TaskRef>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub staff: Option<StaffRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub task_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub ward: Option<WardRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WardRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ward_number: Option<String>,
}

impl WardRef {
    fn display(&self) -> String {
        match (&self.name, &self.ward_number) {
            (Some(name), _) => name.clone(),
            (None, Some(number)) => format!("Ward {number}"),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub avatar_url: Option<String>,
}

impl StaffRef {
    fn to_assignee(&self) -> Option<Assignee> {
        if self.id.is_none() && self.full_name.is_none() {
            return None;
        }
        Some(Assignee {
            id: self.id.clone(),
            name: self.full_name.clone().unwrap_or_default(),
            avatar_url: self.avatar_url.clone(),
        })
    }
}

impl Normalizable for ComplaintRow {
    fn kind(&self) -> ItemKind {
        ItemKind::Complaint
    }

    fn normalize(&self) -> QueueItem {
        let id = self.id.clone().unwrap_or_default();
        QueueItem {
            tracking_code: self.tracking_code.clone().unwrap_or_else(|| id.clone()),
            id,
            kind: self.kind(),
            title: self.title.clone().unwrap_or_default(),
            category: self.category.clone().unwrap_or_default(),
            ward: self.ward.as_ref().map(WardRef::display).unwrap_or_default(),
            status: status_or_default(self.status.as_deref()),
            priority: Priority::from_raw(self.priority.as_deref()),
            due_at: self.sla_due_at,
            location: self.address.clone().unwrap_or_default(),
            assignee: self.assigned_staff.as_ref().and_then(StaffRef::to_assignee),
            created_at: self.created_at,
            resolved_at: self.resolved_at,
        }
    }
}

impl Normalizable for TaskAssignmentRow {
    fn kind(&self) -> ItemKind {
        ItemKind::Task
    }

    fn normalize(&self) -> QueueItem {
        let task = self.task.clone().unwrap_or_default();
        let id = self.id.clone().or(task.id).unwrap_or_default();
        let status = self.status.as_deref().or(task.status.as_deref());

        QueueItem {
            tracking_code: task.task_number.unwrap_or_else(|| id.clone()),
            id,
            kind: self.kind(),
            title: task.title.unwrap_or_default(),
            category: task.category.unwrap_or_default(),
            ward: task.ward.as_ref().map(WardRef::display).unwrap_or_default(),
            status: status_or_default(status),
            priority: Priority::from_raw(task.priority.as_deref()),
            due_at: task.due_date,
            location: task.location.unwrap_or_default(),
            assignee: self.staff.as_ref().and_then(StaffRef::to_assignee),
            created_at: self.assigned_at,
            resolved_at: self.completed_at,
        }
    }
}

/// Flat row from a spreadsheet export of a queue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvQueueRow {
    #[serde(rename = "ID", default, deserialize_with = "empty_string_as_none")]
    pub id: Option<String>,
    #[serde(rename = "Kind", default, deserialize_with = "empty_string_as_none")]
    pub kind: Option<String>,
    #[serde(
        rename = "Tracking Code",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub tracking_code: Option<String>,
    #[serde(rename = "Title", default, deserialize_with = "empty_string_as_none")]
    pub title: Option<String>,
    #[serde(rename = "Category", default, deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
    #[serde(rename = "Ward", default, deserialize_with = "empty_string_as_none")]
    pub ward: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    pub status: Option<String>,
    #[serde(rename = "Priority", default, deserialize_with = "empty_string_as_none")]
    pub priority: Option<String>,
    #[serde(rename = "Due At", default, deserialize_with = "empty_string_as_none")]
    pub due_at: Option<String>,
    #[serde(rename = "Location", default, deserialize_with = "empty_string_as_none")]
    pub location: Option<String>,
    #[serde(
        rename = "Assignee ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub assignee_id: Option<String>,
    #[serde(rename = "Assignee", default, deserialize_with = "empty_string_as_none")]
    pub assignee: Option<String>,
    #[serde(rename = "Created At", default, deserialize_with = "empty_string_as_none")]
    pub created_at: Option<String>,
    #[serde(
        rename = "Resolved At",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub resolved_at: Option<String>,
}

impl Normalizable for CsvQueueRow {
    fn kind(&self) -> ItemKind {
        self.kind
            .as_deref()
            .and_then(ItemKind::parse)
            .unwrap_or(ItemKind::Complaint)
    }

    fn normalize(&self) -> QueueItem {
        let id = self.id.clone().unwrap_or_default();
        let assignee = match (&self.assignee_id, &self.assignee) {
            (None, None) => None,
            (id, name) => Some(Assignee {
                id: id.clone(),
                name: name.clone().unwrap_or_default(),
                avatar_url: None,
            }),
        };

        QueueItem {
            tracking_code: self.tracking_code.clone().unwrap_or_else(|| id.clone()),
            id,
            kind: self.kind(),
            title: self.title.clone().unwrap_or_default(),
            category: self.category.clone().unwrap_or_default(),
            ward: self.ward.clone().unwrap_or_default(),
            status: status_or_default(self.status.as_deref()),
            priority: Priority::from_raw(self.priority.as_deref()),
            due_at: self.due_at.as_deref().and_then(parse_timestamp),
            location: self.location.clone().unwrap_or_default(),
            assignee,
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            resolved_at: self.resolved_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("row has no recognizable kind tag")]
    UnknownKind,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One backend row together with its kind tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawRecord {
    Complaint(ComplaintRow),
    Task(TaskAssignmentRow),
}

impl RawRecord {
    /// Decodes an untagged JSON row for a known kind. Fails only when the
    /// value is not a JSON object.
    pub fn from_json(kind: ItemKind, value: Value) -> Result<Self, serde_json::Error> {
        match kind {
            ItemKind::Complaint => serde_json::from_value(value).map(Self::Complaint),
            ItemKind::Task => serde_json::from_value(value).map(Self::Task),
        }
    }

    /// Reads the `kind` tag leniently (case and padding ignored) before
    /// decoding the rest of the row.
    pub fn from_tagged_json(value: Value) -> Result<Self, RecordError> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .and_then(ItemKind::parse)
            .ok_or(RecordError::UnknownKind)?;
        Ok(Self::from_json(kind, value)?)
    }
}

impl Normalizable for RawRecord {
    fn kind(&self) -> ItemKind {
        match self {
            RawRecord::Complaint(row) => row.kind(),
            RawRecord::Task(row) => row.kind(),
        }
    }

    fn normalize(&self) -> QueueItem {
        match self {
            RawRecord::Complaint(row) => row.normalize(),
            RawRecord::Task(row) => row.normalize(),
        }
    }
}

pub fn normalize_all<N: Normalizable>(records: &[N]) -> Vec<QueueItem> {
    records.iter().map(Normalizable::normalize).collect()
}

fn status_or_default(raw: Option<&str>) -> LifecycleStatus {
    raw.map(LifecycleStatus::from_raw)
        .unwrap_or(LifecycleStatus::Received)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Accepts either a bare label or a joined object carrying a `name`.
fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Object(map) => map.get("name").and_then(value_to_string),
        other => value_to_string(other),
    })
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_timestamp))
}

/// RFC 3339, naive `YYYY-MM-DD HH:MM:SS` (read as UTC), or a bare date at
/// midnight UTC.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::item::fixtures::at;
    use serde_json::json;

    #[test]
    fn complaint_row_maps_nested_references() {
        let record: RawRecord = serde_json::from_value(json!({
            "kind": "complaint",
            "id": 101,
            "tracking_code": "CMP-2025-0101",
            "title": "Pothole on Main St",
            "status": "in_progress",
            "priority": "high",
            "sla_due_at": "2025-10-09T09:00:00Z",
            "address": "Ward 5, Lakeside",
            "category": { "name": "Roads" },
            "ward": { "name": "Lakeside", "ward_number": 5 },
            "assigned_staff": { "id": "staff-7", "full_name": "Asha Rao", "avatar_url": null }
        }))
        .expect("complaint decodes");

        let item = record.normalize();
        assert_eq!(item.id, "101");
        assert_eq!(item.kind, ItemKind::Complaint);
        assert_eq!(item.tracking_code, "CMP-2025-0101");
        assert_eq!(item.category, "Roads");
        assert_eq!(item.ward, "Lakeside");
        assert_eq!(item.status, LifecycleStatus::InProgress);
        assert_eq!(item.priority, Priority::High);
        assert_eq!(item.due_at, Some(at(2025, 10, 9)));
        assert_eq!(item.location, "Ward 5, Lakeside");
        let assignee = item.assignee.expect("assignee present");
        assert_eq!(assignee.id.as_deref(), Some("staff-7"));
        assert_eq!(assignee.name, "Asha Rao");
        assert!(assignee.avatar_url.is_none());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let record = RawRecord::from_json(
            ItemKind::Complaint,
            json!({ "id": "c-1", "category": null, "ward": null }),
        )
        .expect("object decodes");
        let item = record.normalize();

        assert_eq!(item.tracking_code, "c-1");
        assert_eq!(item.title, "");
        assert_eq!(item.category, "");
        assert_eq!(item.ward, "");
        assert_eq!(item.location, "");
        assert_eq!(item.priority, Priority::Medium);
        assert_eq!(item.status, LifecycleStatus::Received);
        assert!(item.assignee.is_none());
        assert!(item.due_at.is_none());
    }

    #[test]
    fn wrongly_typed_fields_do_not_fail_decoding() {
        let record = RawRecord::from_json(
            ItemKind::Complaint,
            json!({
                "id": "c-2",
                "title": ["not", "a", "string"],
                "sla_due_at": "next tuesday",
                "ward": "Lakeside",
                "assigned_staff": 17,
                "status": "escalated"
            }),
        )
        .expect("object decodes");
        let item = record.normalize();

        assert_eq!(item.title, "");
        assert!(item.due_at.is_none());
        assert_eq!(item.ward, "");
        assert!(item.assignee.is_none());
        assert_eq!(item.status, LifecycleStatus::Received);
    }

    #[test]
    fn ward_number_is_used_when_name_missing() {
        let record = RawRecord::from_json(
            ItemKind::Complaint,
            json!({ "id": "c-3", "ward": { "ward_number": "12" } }),
        )
        .expect("object decodes");
        assert_eq!(record.normalize().ward, "Ward 12");
    }

    #[test]
    fn task_assignment_status_overrides_task_status() {
        let record: RawRecord = serde_json::from_value(json!({
            "kind": "task",
            "id": "asg-9",
            "status": "work_completed",
            "completed_at": "2025-10-08",
            "task": {
                "id": "task-3",
                "task_number": "TSK-0003",
                "title": "Clear storm drain",
                "status": "in_progress",
                "priority": "urgent",
                "due_date": "2025-10-12 17:30:00",
                "location": "Canal Rd",
                "category": "Drainage"
            },
            "staff": { "id": 44, "full_name": "Jon Bell" }
        }))
        .expect("task decodes");

        assert_eq!(record.kind(), ItemKind::Task);
        let item = record.normalize();
        assert_eq!(item.id, "asg-9");
        assert_eq!(item.tracking_code, "TSK-0003");
        assert_eq!(item.status, LifecycleStatus::WorkCompleted);
        assert_eq!(item.priority, Priority::Urgent);
        assert_eq!(item.category, "Drainage");
        assert_eq!(item.location, "Canal Rd");
        assert_eq!(item.resolved_at, Some(at(2025, 10, 8) - chrono::Duration::hours(9)));
        assert_eq!(
            item.due_at,
            Some(at(2025, 10, 12) + chrono::Duration::minutes(8 * 60 + 30))
        );
        assert_eq!(item.assignee_name(), Some("Jon Bell"));
    }

    #[test]
    fn task_without_nested_task_still_normalizes() {
        let record = RawRecord::from_json(ItemKind::Task, json!({ "task": null }))
            .expect("object decodes");
        let item = record.normalize();
        assert_eq!(item.id, "");
        assert_eq!(item.kind, ItemKind::Task);
        assert_eq!(item.status, LifecycleStatus::Received);
    }

    #[test]
    fn non_object_rows_are_rejected_at_decode_time() {
        assert!(RawRecord::from_json(ItemKind::Task, json!("row")).is_err());
    }

    #[test]
    fn csv_row_normalizes_flat_columns() {
        let row = CsvQueueRow {
            id: Some("t-5".to_string()),
            kind: Some("TASK".to_string()),
            title: Some("Trim trees".to_string()),
            status: Some("Awaiting Approval".to_string()),
            due_at: Some("2025-10-20".to_string()),
            assignee: Some("Asha Rao".to_string()),
            ..CsvQueueRow::default()
        };
        let item = row.normalize();

        assert_eq!(item.kind, ItemKind::Task);
        assert_eq!(item.tracking_code, "t-5");
        assert_eq!(item.status, LifecycleStatus::AwaitingApproval);
        assert_eq!(item.due_at, Some(at(2025, 10, 20) - chrono::Duration::hours(9)));
        let assignee = item.assignee.expect("assignee");
        assert!(assignee.id.is_none());
        assert_eq!(assignee.name, "Asha Rao");
    }

    #[test]
    fn parse_timestamp_supports_common_formats() {
        assert_eq!(parse_timestamp("2025-10-09T09:00:00Z"), Some(at(2025, 10, 9)));
        assert_eq!(
            parse_timestamp("2025-10-09T14:30:00+05:30"),
            Some(at(2025, 10, 9))
        );
        assert_eq!(parse_timestamp("2025-10-09 09:00:00"), Some(at(2025, 10, 9)));
        assert!(parse_timestamp("  ").is_none());
        assert!(parse_timestamp("not-a-date").is_none());
    }

    #[test]
    fn kind_tag_ignores_case_and_padding() {
        let complaint = RawRecord::from_tagged_json(json!({ "kind": "Complaint", "id": 4 }))
            .expect("mixed case tag");
        assert_eq!(complaint.kind(), ItemKind::Complaint);
        assert_eq!(complaint.normalize().id, "4");

        let task = RawRecord::from_tagged_json(json!({ "kind": " task ", "id": "asg-4" }))
            .expect("padded tag");
        assert_eq!(task.kind(), ItemKind::Task);

        for row in [json!({ "kind": "memo" }), json!({ "id": 5 }), json!("garbage")] {
            assert!(matches!(
                RawRecord::from_tagged_json(row),
                Err(RecordError::UnknownKind)
            ));
        }
    }
}
