//! Complaint and task queue core: status taxonomy, row normalization,
//! tab/search filtering, and workload aggregation over a snapshot.
//!
//! Everything except [`snapshot`] is pure and synchronous. Callers own the
//! UI selection and pass it in; nothing here keeps filter state.

pub mod aggregate;
pub mod filter;
pub mod import;
mod item;
pub mod normalizer;
pub mod report;
pub mod snapshot;
pub mod status;
pub mod timeline;

pub use aggregate::{
    compute_tab_counts, compute_workload, team_workload, CapacityBand, ReportingWindow,
    StaffIdentity, TabCounts, WorkloadSummary,
};
pub use filter::{filter_items, QueueSelection, QueueTab, SearchQuery};
pub use import::{SnapshotImportError, SnapshotImporter, SnapshotRecord};
pub use item::{Assignee, ItemKind, Priority, QueueItem};
pub use normalizer::{Normalizable, RawRecord, RecordError};
pub use report::{QueueItemView, QueueReport};
pub use snapshot::{
    spawn_refresh_loop, FileSnapshotSource, QueueScope, Snapshot, SnapshotSource, SnapshotStore,
    SourceError,
};
pub use status::{classify, classify_raw, LifecycleStatus, QueueBucket};
pub use timeline::{
    build_timeline, revisited_slots, StatusUpdate, TimelineSlot, TimelineStep, TimelineTieBreak,
};
