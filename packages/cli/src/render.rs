//! Plain-text tables for the dashboard views.

use pothole_admin_aggregate::view::Page;
use pothole_admin_aggregate::{RoadGroup, SummaryCounts};
use pothole_admin_api_models::ApiStatsOverview;
use pothole_admin_dashboard::{ActionOutcome, BatchOutcome, DashboardState, DataSource, LoadReport};
use pothole_admin_pothole_models::{Contractor, HistoryEntry, SeverityThresholds};

const RULE_WIDTH: usize = 96;

fn rule() {
    println!("{}", "-".repeat(RULE_WIDTH));
}

fn page_footer<T>(page: &Page<T>, noun: &str) {
    println!(
        "Page {}/{} ({} {noun}){}{}",
        page.page,
        page.total_pages,
        page.total_items,
        if page.has_previous() { "  [prev]" } else { "" },
        if page.has_next() { "  [next]" } else { "" },
    );
}

pub fn load_report(report: &LoadReport) {
    for (what, source) in [
        ("locations", report.records),
        ("contractors", report.contractors),
        ("history", report.history),
    ] {
        if source == DataSource::Fallback {
            println!("Backend unavailable for {what}; showing demo data.");
        }
    }
    if report.resolve.lookups > 0 {
        println!(
            "Resolved {} road names ({} from cache).",
            report.resolve.lookups, report.resolve.cache_hits
        );
    }
}

pub fn road_page(page: &Page<&RoadGroup>) {
    println!(
        "{:<32} {:>8} {:>7} {:<8} {:<20} {:<22} {:>7}",
        "ROAD", "POTHOLES", "DEFECTS", "SEVERITY", "REPORTED", "STATUS", "PATCHES"
    );
    rule();
    for group in &page.items {
        println!(
            "{:<32} {:>8} {:>7} {:<8} {:<20} {:<22} {:>7}",
            group.road_name,
            group.num_potholes,
            group.total_defects,
            group.avg_severity.as_ref(),
            group.reported_time.to_string(),
            group.status.to_string(),
            group.num_patches,
        );
    }
    if page.items.is_empty() {
        println!("No roads match.");
    }
    rule();
    page_footer(page, "roads");
}

pub fn road_detail(group: &RoadGroup, state: &DashboardState, thresholds: &SeverityThresholds) {
    println!("{}", group.road_name);
    println!("  Potholes:     {}", group.num_potholes);
    println!("  Defects:      {}", group.total_defects);
    println!("  Patches:      {}", group.num_patches);
    println!("  Avg severity: {}", group.avg_severity);
    println!("  Reported:     {}", group.reported_time);
    println!("  Status:       {}", group.status);
    println!();

    println!(
        "{:<16} {:<24} {:>6} {:<8} {:<22} CONTRACTOR",
        "ID", "LOCATION", "COUNT", "SEVERITY", "STATUS"
    );
    rule();
    for report in &group.reports {
        println!(
            "{:<16} {:<24} {:>6} {:<8} {:<22} {}",
            report.id,
            report.location,
            report.defect_count.unwrap_or(0),
            report.severity(thresholds).as_ref(),
            report.status.to_string(),
            state.contractor_label(report.contractor_id.as_deref()),
        );
    }
    for patch in &group.patches {
        println!(
            "{:<16} {:<24} {:>6} {:<8} {:<22} patched",
            patch.id, patch.location, "-", "-", "-"
        );
    }
}

pub fn summary(counts: &SummaryCounts) {
    println!("Reported:              {}", counts.reported);
    println!("Assigned:              {}", counts.assigned);
    println!("Pending verification:  {}", counts.pending_verification);
    println!("Verified:              {}", counts.verified);
    println!("Open:                  {}", counts.open());
}

pub fn remote_stats(stats: &ApiStatsOverview) {
    println!("Backend overview");
    println!("  Reported:    {}", stats.reported);
    println!("  Assigned:    {}", stats.assigned);
    println!("  In progress: {}", stats.in_progress);
    println!("  Pending:     {}", stats.pending);
    println!("  Verified:    {}", stats.verified);
}

pub fn history_page(page: &Page<&HistoryEntry>) {
    println!(
        "{:<14} {:<24} {:<24} {:<8} {:<20} CONTRACTOR",
        "ID", "ROAD", "LOCATION", "SEVERITY", "FIXED"
    );
    rule();
    for entry in &page.items {
        println!(
            "{:<14} {:<24} {:<24} {:<8} {:<20} {}",
            entry.id,
            entry.road_name,
            entry.location,
            entry.severity.as_ref(),
            entry.fixed_date,
            entry.contractor,
        );
    }
    if page.items.is_empty() {
        println!("No verified repairs match.");
    }
    rule();
    page_footer(page, "repairs");
}

pub fn contractors(contractors: &[Contractor]) {
    println!("{:<10} {:<20} COMPANY", "ID", "NAME");
    rule();
    for contractor in contractors {
        println!(
            "{:<10} {:<20} {}",
            contractor.id, contractor.name, contractor.company
        );
    }
}

pub fn outcome(action: &str, id: &str, outcome: ActionOutcome) {
    match outcome {
        ActionOutcome::Applied { confirmed: true } => println!("{action} {id}: done."),
        ActionOutcome::Applied { confirmed: false } => {
            println!("{action} {id}: applied locally; the backend did not confirm.");
        }
        ActionOutcome::NotApplied => {
            println!("{action} {id}: the backend rejected the change; nothing updated.");
        }
        ActionOutcome::Discarded => {
            println!("{action} {id}: the record changed meanwhile; result discarded.");
        }
    }
}

pub fn batch_outcome(action: &str, road: &str, outcome: &BatchOutcome) {
    if outcome.targeted.is_empty() {
        println!("{action} {road}: no eligible reports.");
        return;
    }
    println!(
        "{action} {road}: {} targeted, {} applied{}.",
        outcome.targeted.len(),
        outcome.applied.len(),
        if outcome.confirmed {
            ""
        } else {
            " (backend did not confirm)"
        }
    );
    if !outcome.discarded.is_empty() {
        println!("  Discarded: {}", outcome.discarded.join(", "));
    }
}
