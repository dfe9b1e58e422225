use chrono::{DateTime, Utc};
use civic_queue::error::AppError;
use civic_queue::queue::{
    Normalizable, QueueItem, QueueReport, QueueSelection, QueueTab, SnapshotImporter,
};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct QueueReportArgs {
    /// Snapshot file to read (JSON array of tagged rows, or a CSV export)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Tab to list: all, not_started, in_progress, awaiting, completed, overdue
    #[arg(long, default_value = "all")]
    pub(crate) tab: String,
    /// Free-text filter over title, tracking code, and location
    #[arg(long, default_value = "")]
    pub(crate) search: String,
    /// Evaluation instant, RFC 3339 or YYYY-MM-DD (defaults to now)
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Include the filtered item listing in the output
    #[arg(long)]
    pub(crate) list_items: bool,
    /// Staff roster used to label workloads; without it roles read `staff`
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) fn run_queue_report(args: QueueReportArgs) -> Result<(), AppError> {
    let QueueReportArgs {
        snapshot,
        tab,
        search,
        now,
        list_items,
        roster,
    } = args;

    let now = now.unwrap_or_else(Utc::now);
    let items: Vec<QueueItem> = SnapshotImporter::from_path(&snapshot)?
        .iter()
        .map(Normalizable::normalize)
        .collect();
    let roster = match roster {
        Some(path) => SnapshotImporter::roster_from_path(path)?,
        None => Vec::new(),
    };
    let selection = QueueSelection::new(QueueTab::parse(&tab), &search);
    let report = QueueReport::build(&items, &selection, &roster, now);

    println!("Queue report for {}", snapshot.display());
    render_queue_report(&report, list_items);
    Ok(())
}

pub(crate) fn render_queue_report(report: &QueueReport, list_items: bool) {
    println!("Evaluated {}", report.generated_at.to_rfc3339());

    println!("\nTab counts");
    for tab in QueueTab::ordered() {
        println!("- {}: {}", tab.label(), report.counts.get(tab));
    }

    if report.workload.is_empty() {
        println!("\nStaff workload: no assigned items");
    } else {
        println!(
            "\nStaff workload ({} to {})",
            report.window.start.date_naive(),
            report.window.end.date_naive()
        );
        for load in &report.workload {
            println!(
                "- {} ({}): {} active, {} resolved this period, {} overdue | {:.0}% completion | {}",
                load.display_name,
                load.role_type,
                load.active_count,
                load.completed_count,
                load.overdue_count,
                load.completion_pct(),
                load.capacity_band.label()
            );
        }
    }

    if !list_items {
        return;
    }

    let heading = if report.search.is_empty() {
        format!("\n{} items", report.tab.label())
    } else {
        format!("\n{} items matching '{}'", report.tab.label(), report.search)
    };
    println!("{heading}");
    if report.items.is_empty() {
        println!("- none");
    }
    for view in &report.items {
        let item = &view.item;
        let due = item
            .due_at
            .map(|due| due.date_naive().to_string())
            .unwrap_or_else(|| "no deadline".to_string());
        let assignee = item.assignee_name().unwrap_or("unassigned");
        let overdue_note = if view.overdue { " [OVERDUE]" } else { "" };
        println!(
            "- {} {} {} [{}: {}], {} priority, due {}, {}{}",
            view.kind_label,
            item.tracking_code,
            item.title,
            view.bucket_label,
            view.status_label,
            view.priority_label,
            due,
            assignee,
            overdue_note
        );
    }
}
