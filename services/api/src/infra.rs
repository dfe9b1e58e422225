use chrono::{DateTime, NaiveDate, Utc};
use civic_queue::queue::{SnapshotStore, StaffIdentity};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) store: SnapshotStore,
    /// Labels workloads; assignees missing from it are reported with role `staff`.
    pub(crate) roster: Arc<Vec<StaffIdentity>>,
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_instant_accepts_dates_and_timestamps() {
        assert_eq!(
            parse_instant("2025-10-15").expect("date parses"),
            Utc.with_ymd_and_hms(2025, 10, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_instant("2025-10-15T12:30:00+02:00").expect("timestamp parses"),
            Utc.with_ymd_and_hms(2025, 10, 15, 10, 30, 0).unwrap()
        );
        assert!(parse_instant("yesterday").is_err());
    }
}
