//! Interactive menu over a single loaded session.
//!
//! Loads once, then loops over a `dialoguer` menu until the operator
//! quits or logs out. Summary cards are reprinted whenever a verification
//! lands in history.

use std::sync::Arc;

use dialoguer::{Confirm, Input, Select};
use pothole_admin_aggregate::RoadGroup;
use pothole_admin_aggregate::view::{self, HistoryFilter, RoadFilter, RoadSort};
use pothole_admin_cache::KeyValueStore;
use pothole_admin_cli_utils::{MultiProgress, prompt_number, prompt_optional};
use pothole_admin_dashboard::{
    ActionError, AssignDetails, DashboardConfig, DashboardEvent, Session,
};
use pothole_admin_pothole_models::{RecordStatus, Severity};
use tokio::sync::broadcast;

use crate::render;

/// Top-level actions available in the interactive menu.
enum MenuAction {
    BrowseRoads,
    RoadDetails,
    Summary,
    History,
    Contractors,
    AssignReport,
    VerifyReport,
    RejectReport,
    AssignRoad,
    VerifyRoad,
    Logout,
    Quit,
}

impl MenuAction {
    const ALL: &[Self] = &[
        Self::BrowseRoads,
        Self::RoadDetails,
        Self::Summary,
        Self::History,
        Self::Contractors,
        Self::AssignReport,
        Self::VerifyReport,
        Self::RejectReport,
        Self::AssignRoad,
        Self::VerifyRoad,
        Self::Logout,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::BrowseRoads => "Browse roads",
            Self::RoadDetails => "Road details",
            Self::Summary => "Summary",
            Self::History => "Repair history",
            Self::Contractors => "Contractors",
            Self::AssignReport => "Assign a report",
            Self::VerifyReport => "Verify a repair",
            Self::RejectReport => "Send a repair back",
            Self::AssignRoad => "Assign a whole road",
            Self::VerifyRoad => "Verify a whole road",
            Self::Logout => "Log out",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive menu loop.
///
/// # Errors
///
/// Returns an error if the session cannot be built or the terminal cannot
/// be read.
pub async fn run(
    config: &DashboardConfig,
    store: Arc<dyn KeyValueStore>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut session, _client) = crate::connect(config, store)?;
    crate::load(&mut session, multi).await;
    let mut events = session.subscribe();

    println!("Pothole Admin Dashboard");
    println!();
    render::summary(&session.summary());

    let labels: Vec<&str> = MenuAction::ALL.iter().map(MenuAction::label).collect();

    loop {
        println!();
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let result = match MenuAction::ALL[idx] {
            MenuAction::BrowseRoads => browse_roads(&session, config.page_size),
            MenuAction::RoadDetails => road_details(&session),
            MenuAction::Summary => {
                render::summary(&session.summary());
                Ok(())
            }
            MenuAction::History => browse_history(&session, config.page_size),
            MenuAction::Contractors => {
                render::contractors(session.contractors());
                Ok(())
            }
            MenuAction::AssignReport => assign_report(&mut session).await,
            MenuAction::VerifyReport => verify_report(&mut session).await,
            MenuAction::RejectReport => reject_report(&mut session).await,
            MenuAction::AssignRoad => assign_road(&mut session).await,
            MenuAction::VerifyRoad => verify_road(&mut session).await,
            MenuAction::Logout => {
                if Confirm::new()
                    .with_prompt("Log out and forget the stored token?")
                    .default(false)
                    .interact()?
                {
                    session.logout().await;
                    return Ok(());
                }
                Ok(())
            }
            MenuAction::Quit => break,
        };

        if let Err(e) = result {
            session.teardown().await;
            return Err(e);
        }
        drain_events(&session, &mut events);
    }

    session.teardown().await;
    Ok(())
}

fn drain_events(session: &Session, events: &mut broadcast::Receiver<DashboardEvent>) {
    let mut history_changed = false;
    while let Ok(event) = events.try_recv() {
        log::debug!("Dashboard event: {event:?}");
        if matches!(event, DashboardEvent::HistoryAppended { .. }) {
            history_changed = true;
        }
    }
    if history_changed {
        println!();
        render::summary(&session.summary());
    }
}

fn browse_roads(session: &Session, page_size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let query = prompt_optional("Search (empty for all)")?.unwrap_or_default();

    let severities = ["Any", "High", "Medium", "Low", "Unknown"];
    let severity = Select::new()
        .with_prompt("Severity")
        .items(&severities)
        .default(0)
        .interact()?;
    let severity = severities[severity].parse::<Severity>().ok();

    let statuses: Vec<String> = std::iter::once("Any".to_string())
        .chain(RecordStatus::all().iter().map(ToString::to_string))
        .collect();
    let status = Select::new()
        .with_prompt("Status")
        .items(&statuses)
        .default(0)
        .interact()?;
    let status = (status > 0).then(|| RecordStatus::all()[status - 1]);

    let sorts = [
        RoadSort::FirstSeen,
        RoadSort::RoadName,
        RoadSort::Potholes,
        RoadSort::Severity,
        RoadSort::ReportedTime,
    ];
    let sort_labels: Vec<String> = sorts.iter().map(ToString::to_string).collect();
    let sort = Select::new()
        .with_prompt("Sort by")
        .items(&sort_labels)
        .default(0)
        .interact()?;
    let descending = sorts[sort] != RoadSort::FirstSeen
        && Confirm::new()
            .with_prompt("Descending?")
            .default(true)
            .interact()?;

    let filter = RoadFilter {
        query,
        severity,
        status,
    };
    let groups = session.road_groups();
    let mut visible = filter.apply(&groups);
    view::sort_groups(&mut visible, sorts[sort], descending);

    let mut page = 1;
    loop {
        let current = view::paginate(&visible, page, page_size);
        render::road_page(&current);
        if !current.has_next() && !current.has_previous() {
            return Ok(());
        }
        page = prompt_number("Go to page", current.page)?;
        if page == current.page {
            return Ok(());
        }
    }
}

fn browse_history(session: &Session, page_size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let query = prompt_optional("Search (empty for all)")?.unwrap_or_default();
    let entries = session.history();
    let visible = HistoryFilter { query }.apply(&entries);

    let mut page = 1;
    loop {
        let current = view::paginate(&visible, page, page_size);
        render::history_page(&current);
        if !current.has_next() && !current.has_previous() {
            return Ok(());
        }
        page = prompt_number("Go to page", current.page)?;
        if page == current.page {
            return Ok(());
        }
    }
}

/// Asks for a road among the current groups. `None` when there are none.
fn pick_road(session: &Session) -> Result<Option<RoadGroup>, dialoguer::Error> {
    let groups = session.road_groups();
    if groups.is_empty() {
        println!("No roads loaded.");
        return Ok(None);
    }

    let labels: Vec<String> = groups
        .iter()
        .map(|g| format!("{} ({} potholes, {})", g.road_name, g.num_potholes, g.status))
        .collect();
    let idx = Select::new()
        .with_prompt("Select a road")
        .items(&labels)
        .default(0)
        .max_length(15)
        .interact()?;

    Ok(groups.into_iter().nth(idx))
}

/// Asks for a report whose status passes `eligible`.
fn pick_report(
    session: &Session,
    eligible: impl Fn(RecordStatus) -> bool,
) -> Result<Option<String>, dialoguer::Error> {
    let reports: Vec<_> = session
        .state()
        .working_set
        .reports()
        .iter()
        .filter(|r| eligible(r.status))
        .collect();
    if reports.is_empty() {
        println!("No eligible reports.");
        return Ok(None);
    }

    let labels: Vec<String> = reports
        .iter()
        .map(|r| {
            format!(
                "{} on {} ({})",
                r.id,
                r.road_name().unwrap_or(pothole_admin_pothole_models::UNKNOWN_ROAD),
                r.status
            )
        })
        .collect();
    let idx = Select::new()
        .with_prompt("Select a report")
        .items(&labels)
        .default(0)
        .max_length(15)
        .interact()?;

    Ok(Some(reports[idx].id.clone()))
}

fn road_details(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(group) = pick_road(session)? {
        render::road_detail(&group, session.state(), session.thresholds());
    }
    Ok(())
}

fn assignment_details() -> Result<AssignDetails, dialoguer::Error> {
    Ok(AssignDetails {
        due_date: prompt_optional("Due date (optional)")?,
        notes: prompt_optional("Notes (optional)")?,
    })
}

/// Prints input problems instead of failing the menu.
fn report_invalid(e: &ActionError) {
    println!("{e}");
}

async fn assign_report(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let Some(id) = pick_report(session, |s| s != RecordStatus::PendingVerification)? else {
        return Ok(());
    };
    let Some(contractor) = crate::contractor_or_prompt(session, None)? else {
        return Ok(());
    };
    let details = assignment_details()?;

    match session.assign(&id, &contractor, &details).await {
        Ok(outcome) => render::outcome("Assign", &id, outcome),
        Err(e) => report_invalid(&e),
    }
    Ok(())
}

async fn verify_report(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let Some(id) = pick_report(session, |s| s == RecordStatus::PendingVerification)? else {
        return Ok(());
    };
    let notes = prompt_optional("Notes (optional)")?;

    match session.verify(&id, notes.as_deref()).await {
        Ok(outcome) => render::outcome("Verify", &id, outcome),
        Err(e) => report_invalid(&e),
    }
    Ok(())
}

async fn reject_report(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let Some(id) = pick_report(session, |s| s == RecordStatus::PendingVerification)? else {
        return Ok(());
    };
    let reason: String = Input::new()
        .with_prompt("Reason")
        .allow_empty(true)
        .interact_text()?;

    match session.reject_verification(&id, &reason).await {
        Ok(outcome) => render::outcome("Reject", &id, outcome),
        Err(e) => report_invalid(&e),
    }
    Ok(())
}

async fn assign_road(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let Some(group) = pick_road(session)? else {
        return Ok(());
    };
    let Some(contractor) = crate::contractor_or_prompt(session, None)? else {
        return Ok(());
    };
    let details = assignment_details()?;

    match session
        .batch_assign(&group.road_name, &contractor, &details)
        .await
    {
        Ok(outcome) => render::batch_outcome("Assign", &group.road_name, &outcome),
        Err(e) => report_invalid(&e),
    }
    Ok(())
}

async fn verify_road(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let Some(group) = pick_road(session)? else {
        return Ok(());
    };
    let notes = prompt_optional("Notes (optional)")?;

    match session.batch_verify(&group.road_name, notes.as_deref()).await {
        Ok(outcome) => render::batch_outcome("Verify", &group.road_name, &outcome),
        Err(e) => report_invalid(&e),
    }
    Ok(())
}
