use super::item::{ItemKind, QueueItem};
use super::aggregate::StaffIdentity;
use super::normalizer::{CsvQueueRow, Normalizable, RawRecord};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotImportError {
    #[error("failed to read queue snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid queue snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid queue snapshot CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A record read from a snapshot file, either a tagged backend row or a flat
/// export row.
#[derive(Debug, Clone)]
pub enum SnapshotRecord {
    Backend(RawRecord),
    Export(CsvQueueRow),
}

impl Normalizable for SnapshotRecord {
    fn kind(&self) -> ItemKind {
        match self {
            SnapshotRecord::Backend(record) => record.kind(),
            SnapshotRecord::Export(row) => row.kind(),
        }
    }

    fn normalize(&self) -> QueueItem {
        match self {
            SnapshotRecord::Backend(record) => record.normalize(),
            SnapshotRecord::Export(row) => row.normalize(),
        }
    }
}

pub struct SnapshotImporter;

impl SnapshotImporter {
    /// Dispatches on extension: `.csv` is a flat export, anything else JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SnapshotRecord>, SnapshotImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            Ok(Self::from_csv_reader(file)?
                .into_iter()
                .map(SnapshotRecord::Export)
                .collect())
        } else {
            Ok(Self::from_json_reader(file)?
                .into_iter()
                .map(SnapshotRecord::Backend)
                .collect())
        }
    }

    /// Reads a JSON array of rows tagged with `kind`. Entries that are not
    /// objects or carry no recognizable kind are skipped.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Vec<RawRecord>, SnapshotImportError> {
        let rows: Vec<Value> = serde_json::from_reader(reader)?;
        Ok(Self::from_json_rows(rows))
    }

    pub fn from_json_rows(rows: Vec<Value>) -> Vec<RawRecord> {
        let total = rows.len();
        let records: Vec<RawRecord> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match RawRecord::from_tagged_json(row) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping unreadable snapshot row");
                    None
                }
            })
            .collect();

        if records.len() < total {
            tracing::warn!(
                kept = records.len(),
                skipped = total - records.len(),
                "queue snapshot contained unreadable rows"
            );
        }
        records
    }

    /// Staff roster: a JSON array of `{ staff_id, display_name, role_type }`.
    pub fn roster_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<StaffIdentity>, SnapshotImportError> {
        let file = std::fs::File::open(path)?;
        Self::roster_from_reader(file)
    }

    pub fn roster_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<StaffIdentity>, SnapshotImportError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<CsvQueueRow>, SnapshotImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rows = Vec::new();
        for row in csv_reader.deserialize::<CsvQueueRow>() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::status::LifecycleStatus;
    use std::io::Cursor;

    #[test]
    fn json_import_skips_untagged_and_non_object_rows() {
        let json = r#"[
            {"kind": "complaint", "id": 1, "title": "Pothole", "status": "received"},
            {"id": 2, "title": "No kind"},
            "garbage",
            {"kind": "task", "id": "asg-1", "task": {"title": "Sweep market", "status": "in_progress"}}
        ]"#;
        let records = SnapshotImporter::from_json_reader(Cursor::new(json)).expect("import");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind(), ItemKind::Complaint);
        let task = records[1].normalize();
        assert_eq!(task.title, "Sweep market");
        assert_eq!(task.status, LifecycleStatus::InProgress);
    }

    #[test]
    fn json_import_keeps_rows_with_mixed_case_kind_tags() {
        let json = r#"[
            {"kind": "Complaint", "id": 1, "status": "in_progress"},
            {"kind": " task ", "id": "asg-2", "task": {"title": "Trim hedges"}},
            {"kind": "COMPLAINT", "id": 3}
        ]"#;
        let records = SnapshotImporter::from_json_reader(Cursor::new(json)).expect("import");
        let kinds: Vec<_> = records.iter().map(Normalizable::kind).collect();
        assert_eq!(
            kinds,
            vec![ItemKind::Complaint, ItemKind::Task, ItemKind::Complaint]
        );
        assert_eq!(records[0].normalize().status, LifecycleStatus::InProgress);
        assert_eq!(records[1].normalize().title, "Trim hedges");
    }

    #[test]
    fn roster_reader_decodes_staff_identities() {
        let json = r#"[{"staff_id": "s-1", "display_name": "Asha Rao", "role_type": "field_officer"}]"#;
        let roster = SnapshotImporter::roster_from_reader(Cursor::new(json)).expect("roster");
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].role_type, "field_officer");

        let error = SnapshotImporter::roster_from_reader(Cursor::new("[{\"staff_id\": 1}]"))
            .expect_err("incomplete identity rejected");
        assert!(matches!(error, SnapshotImportError::Json(_)));
    }

    #[test]
    fn json_import_rejects_non_array_documents() {
        let error = SnapshotImporter::from_json_reader(Cursor::new("{\"kind\":\"task\"}"))
            .expect_err("object document rejected");
        assert!(matches!(error, SnapshotImportError::Json(_)));
    }

    #[test]
    fn csv_import_reads_export_columns() {
        let csv = "ID,Kind,Tracking Code,Title,Status,Priority,Due At,Location,Assignee ID,Assignee\n\
c-1,complaint,CMP-1,Pothole,received,high,2025-10-09T09:00:00Z,\"Ward 5, Lakeside\",s-1,Asha Rao\n\
c-2,complaint,CMP-2,Streetlight,,,,,,\n";
        let rows = SnapshotImporter::from_csv_reader(Cursor::new(csv)).expect("csv import");
        assert_eq!(rows.len(), 2);

        let first = rows[0].normalize();
        assert_eq!(first.location, "Ward 5, Lakeside");
        assert_eq!(first.assignee_name(), Some("Asha Rao"));

        let second = rows[1].normalize();
        assert_eq!(second.status, LifecycleStatus::Received);
        assert!(second.assignee.is_none());
        assert_eq!(second.location, "");
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = SnapshotImporter::from_path("./does-not-exist.json")
            .expect_err("expected io error");
        match error {
            SnapshotImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
