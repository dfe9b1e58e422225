mod counts;
mod workload;

pub use counts::{compute_tab_counts, TabCounts};
pub use workload::{
    compute_workload, team_workload, CapacityBand, ReportingWindow, StaffIdentity,
    WorkloadSummary,
};
