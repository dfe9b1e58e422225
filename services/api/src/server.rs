use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::queue_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use civic_queue::config::{AppConfig, QueueConfig};
use civic_queue::error::AppError;
use civic_queue::queue::{
    spawn_refresh_loop, FileSnapshotSource, SnapshotImporter, SnapshotStore, StaffIdentity,
};
use civic_queue::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(snapshot) = args.snapshot.take() {
        config.queue.snapshot_path = Some(snapshot);
    }
    if let Some(roster) = args.roster.take() {
        config.queue.roster_path = Some(roster);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let store = SnapshotStore::new();
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        store: store.clone(),
        roster: Arc::new(load_roster(&config.queue)?),
    };

    let _refresh = start_snapshot_refresh(&config.queue, store);

    let app = queue_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "civic queue service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn load_roster(queue: &QueueConfig) -> Result<Vec<StaffIdentity>, AppError> {
    let Some(path) = queue.roster_path.as_ref() else {
        return Ok(Vec::new());
    };
    let roster = SnapshotImporter::roster_from_path(path)?;
    info!(path = %path.display(), staff = roster.len(), "staff roster loaded");
    Ok(roster)
}

/// Starts pulling the configured snapshot file for the configured scope.
/// Without a snapshot path the store stays empty.
fn start_snapshot_refresh(queue: &QueueConfig, store: SnapshotStore) -> Option<JoinHandle<()>> {
    let Some(path) = queue.snapshot_path.clone() else {
        warn!("no queue snapshot configured, serving an empty queue");
        return None;
    };

    info!(
        path = %path.display(),
        scope = ?queue.scope,
        interval_secs = queue.refresh_interval.as_secs(),
        "queue snapshot refresh enabled"
    );
    Some(spawn_refresh_loop(
        store,
        Arc::new(FileSnapshotSource::new(path)),
        queue.scope.clone(),
        queue.refresh_interval,
    ))
}
