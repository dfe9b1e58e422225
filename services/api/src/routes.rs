use crate::infra::AppState;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use civic_queue::queue::{
    build_timeline, revisited_slots, Normalizable, QueueItem, QueueReport, QueueSelection,
    QueueTab, ReportingWindow, SnapshotImporter, StatusUpdate, TimelineSlot, TimelineStep,
    StaffIdentity, TimelineTieBreak, WorkloadSummary,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub(crate) fn queue_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/queue", get(queue_endpoint))
        .route("/api/v1/queue/workload", get(workload_endpoint))
        .route("/api/v1/queue/evaluate", post(evaluate_endpoint))
        .route("/api/v1/queue/timeline", post(timeline_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QueueQuery {
    #[serde(default)]
    pub(crate) tab: Option<String>,
    #[serde(default)]
    pub(crate) q: Option<String>,
}

impl QueueQuery {
    fn selection(&self) -> QueueSelection {
        let tab = self.tab.as_deref().map(QueueTab::parse).unwrap_or_default();
        QueueSelection::new(tab, self.q.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QueueViewResponse {
    pub(crate) sequence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) refreshed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub(crate) report: QueueReport,
}

pub(crate) async fn queue_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<QueueQuery>,
) -> Json<QueueViewResponse> {
    let snapshot = state.store.current();
    let report = QueueReport::build(
        &snapshot.items,
        &query.selection(),
        &state.roster,
        Utc::now(),
    );

    Json(QueueViewResponse {
        sequence: snapshot.sequence,
        refreshed_at: snapshot.refreshed_at,
        report,
    })
}

#[derive(Debug, Serialize)]
pub(crate) struct WorkloadResponse {
    pub(crate) window: ReportingWindow,
    pub(crate) workload: Vec<WorkloadSummary>,
}

pub(crate) async fn workload_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<WorkloadResponse> {
    let snapshot = state.store.current();
    let report = QueueReport::build(
        &snapshot.items,
        &QueueSelection::default(),
        &state.roster,
        Utc::now(),
    );

    Json(WorkloadResponse {
        window: report.window,
        workload: report.workload,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateRequest {
    pub(crate) records: Vec<serde_json::Value>,
    #[serde(default)]
    pub(crate) tab: Option<String>,
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) roster: Vec<StaffIdentity>,
}

/// Stateless variant of the queue view over rows supplied in the request.
pub(crate) async fn evaluate_endpoint(Json(payload): Json<EvaluateRequest>) -> Json<QueueReport> {
    let EvaluateRequest {
        records,
        tab,
        search,
        now,
        roster,
    } = payload;

    let items: Vec<QueueItem> = SnapshotImporter::from_json_rows(records)
        .iter()
        .map(Normalizable::normalize)
        .collect();
    let tab = tab.as_deref().map(QueueTab::parse).unwrap_or_default();
    let selection = QueueSelection::new(tab, search.as_deref().unwrap_or_default());
    let now = now.unwrap_or_else(Utc::now);

    Json(QueueReport::build(&items, &selection, &roster, now))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimelineRequest {
    pub(crate) updates: Vec<StatusUpdate>,
    #[serde(default)]
    pub(crate) tie_break: TimelineTieBreak,
}

#[derive(Debug, Serialize)]
pub(crate) struct TimelineResponse {
    pub(crate) tie_break: TimelineTieBreak,
    pub(crate) steps: Vec<TimelineStep>,
    pub(crate) revisited: Vec<TimelineSlot>,
}

pub(crate) async fn timeline_endpoint(
    Json(payload): Json<TimelineRequest>,
) -> Json<TimelineResponse> {
    let TimelineRequest { updates, tie_break } = payload;
    Json(TimelineResponse {
        tie_break,
        steps: build_timeline(&updates, tie_break),
        revisited: revisited_slots(&updates),
    })
}
