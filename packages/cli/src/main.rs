#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the pothole admin dashboard.
//!
//! Every dashboard view and operator action is a subcommand. Running with
//! no subcommand opens an interactive `dialoguer` menu over one loaded
//! session instead.
//!
//! Uses `indicatif-log-bridge` (via [`pothole_admin_cli_utils::init_logger`])
//! so log lines and the road-name progress bar never fight for the
//! terminal.

mod interactive;
mod render;

use std::io::IsTerminal as _;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use dialoguer::{Password, Select};
use pothole_admin_aggregate::view::{self, HistoryFilter, RoadFilter, RoadSort};
use pothole_admin_api::ApiClient;
use pothole_admin_api_models::HistoryQuery;
use pothole_admin_cache::{KeyValueStore, auth};
use pothole_admin_cli_utils::{IndicatifProgress, MultiProgress};
use pothole_admin_dashboard::{AssignDetails, DashboardConfig, Session};
use pothole_admin_geocoder::progress::LogProgress;
use pothole_admin_pothole_models::{RecordStatus, Severity};

/// Road-name lookups between progress log lines when not on a terminal.
const LOG_PROGRESS_EVERY: u64 = 25;

#[derive(Parser)]
#[command(name = "pothole_admin", about = "Road-level pothole admin dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List roads with aggregated pothole counts
    Roads(RoadsArgs),
    /// Show one road and the reports and patches on it
    Road {
        /// Road name (case-insensitive)
        name: String,
    },
    /// Show report counts by status
    Summary {
        /// Also fetch the backend's own overview counts
        #[arg(long)]
        remote: bool,
    },
    /// List verified repairs
    History(HistoryArgs),
    /// List contractors
    Contractors,
    /// Assign a contractor to one report
    Assign {
        /// Report id
        id: String,
        #[command(flatten)]
        assignment: AssignmentArgs,
    },
    /// Verify one completed repair
    Verify {
        /// Report id
        id: String,
        /// Notes sent with the verification
        #[arg(long)]
        notes: Option<String>,
    },
    /// Send a completed repair back to its contractor
    Reject {
        /// Report id
        id: String,
        /// Why the repair is being sent back
        #[arg(long)]
        reason: String,
    },
    /// Assign a contractor to every unassigned report on a road
    AssignRoad {
        /// Road name (case-insensitive)
        road: String,
        #[command(flatten)]
        assignment: AssignmentArgs,
    },
    /// Verify every pending repair on a road
    VerifyRoad {
        /// Road name (case-insensitive)
        road: String,
        /// Notes sent with the verification
        #[arg(long)]
        notes: Option<String>,
    },
    /// Log in to the backend and remember the token
    Login {
        /// Account email
        #[arg(long)]
        email: String,
    },
    /// Forget the stored token
    Logout,
}

#[derive(Args)]
struct RoadsArgs {
    /// Free-text search over road, ids, locations, severity, and status
    #[arg(long, default_value = "")]
    query: String,
    /// Only roads with this average severity (low, medium, high, unknown)
    #[arg(long)]
    severity: Option<Severity>,
    /// Only roads with this status (e.g., "pending verification")
    #[arg(long)]
    status: Option<String>,
    /// Column to sort by
    #[arg(long, default_value_t = RoadSort::FirstSeen)]
    sort: RoadSort,
    /// Sort in descending order
    #[arg(long)]
    desc: bool,
    #[command(flatten)]
    paging: PagingArgs,
}

#[derive(Args)]
struct HistoryArgs {
    /// Free-text search over id, location, road, contractor, and severity
    #[arg(long, default_value = "")]
    query: String,
    /// Ask the backend for repairs on this road
    #[arg(long)]
    road: Option<String>,
    /// Earliest fix date sent to the backend
    #[arg(long)]
    from: Option<String>,
    /// Latest fix date sent to the backend
    #[arg(long)]
    to: Option<String>,
    #[command(flatten)]
    paging: PagingArgs,
}

#[derive(Args)]
struct PagingArgs {
    /// 1-based page number
    #[arg(long, default_value = "1")]
    page: usize,
    /// Rows per page (defaults to `POTHOLE_ADMIN_PAGE_SIZE`)
    #[arg(long)]
    page_size: Option<usize>,
}

#[derive(Args)]
struct AssignmentArgs {
    /// Contractor id; prompts for one when omitted
    #[arg(long)]
    contractor: Option<String>,
    /// Due date sent with the assignment
    #[arg(long)]
    due: Option<String>,
    /// Notes sent with the assignment
    #[arg(long)]
    notes: Option<String>,
}

impl AssignmentArgs {
    fn details(&self) -> AssignDetails {
        AssignDetails {
            due_date: self.due.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = pothole_admin_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = DashboardConfig::from_env()?;
    let store = Session::open_store(&config);

    let Some(command) = cli.command else {
        return interactive::run(&config, store, &multi).await;
    };

    match command {
        Commands::Login { email } => login(&config, store.as_ref(), &email).await?,
        Commands::Logout => {
            let (session, _) = connect(&config, store)?;
            session.logout().await;
        }
        command => {
            let (mut session, client) = connect(&config, store)?;
            load(&mut session, &multi).await;
            let result = run_command(&mut session, &client, &config, command).await;
            session.teardown().await;
            result?;
        }
    }

    Ok(())
}

/// Builds an API client carrying the stored token and a session on top
/// of it.
fn connect(
    config: &DashboardConfig,
    store: Arc<dyn KeyValueStore>,
) -> Result<(Session, Arc<ApiClient>), Box<dyn std::error::Error>> {
    let client = Arc::new(
        ApiClient::new(&config.api_url)?.with_token(auth::load_token(store.as_ref())),
    );
    let session = Session::connect(config, client.clone(), store)?;
    Ok((session, client))
}

/// Loads the session, drawing a road-name progress bar when stderr is a
/// terminal and logging milestones otherwise.
async fn load(session: &mut Session, multi: &MultiProgress) {
    let progress = if std::io::stderr().is_terminal() {
        IndicatifProgress::lookups_bar(multi, "Loading dashboard data")
    } else {
        LogProgress::new(LOG_PROGRESS_EVERY)
    };
    let report = session.load(&progress).await;
    progress.finish_and_clear();
    render::load_report(&report);
}

async fn login(
    config: &DashboardConfig,
    store: &dyn KeyValueStore,
    email: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = Password::new().with_prompt("Password").interact()?;
    let mut client = ApiClient::new(&config.api_url)?;
    let response = client.login(email, &password).await?;

    match client.token() {
        Some(token) => {
            auth::save_token(store, Some(token));
            println!("Logged in as {email}.");
        }
        None => println!(
            "Login returned no token: {}",
            response.message.as_deref().unwrap_or("no message")
        ),
    }
    Ok(())
}

#[allow(clippy::too_many_lines)]
async fn run_command(
    session: &mut Session,
    client: &ApiClient,
    config: &DashboardConfig,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Roads(args) => {
            let filter = RoadFilter {
                query: args.query,
                severity: args.severity,
                status: args.status.as_deref().map(RecordStatus::parse_loose),
            };
            let groups = session.road_groups();
            let mut visible = filter.apply(&groups);
            view::sort_groups(&mut visible, args.sort, args.desc);
            let page = view::paginate(
                &visible,
                args.paging.page,
                args.paging.page_size.unwrap_or(config.page_size),
            );
            render::road_page(&page);
        }
        Commands::Road { name } => match session.road(&name) {
            Some(group) => render::road_detail(&group, session.state(), session.thresholds()),
            None => println!("No road named '{name}'."),
        },
        Commands::Summary { remote } => {
            render::summary(&session.summary());
            if remote {
                match client.dashboard_stats().await {
                    Ok(stats) => render::remote_stats(&stats),
                    Err(e) => println!("Backend overview unavailable: {e}"),
                }
            }
        }
        Commands::History(args) => {
            let entries = if args.road.is_some() || args.from.is_some() || args.to.is_some() {
                session
                    .query_history(&HistoryQuery {
                        start_date: args.from,
                        end_date: args.to,
                        road_name: args.road,
                    })
                    .await
            } else {
                session.history()
            };
            let filter = HistoryFilter { query: args.query };
            let visible = filter.apply(&entries);
            let page = view::paginate(
                &visible,
                args.paging.page,
                args.paging.page_size.unwrap_or(config.page_size),
            );
            render::history_page(&page);
        }
        Commands::Contractors => render::contractors(session.contractors()),
        Commands::Assign { id, assignment } => {
            let Some(contractor) = contractor_or_prompt(session, assignment.contractor.clone())?
            else {
                return Ok(());
            };
            let outcome = session
                .assign(&id, &contractor, &assignment.details())
                .await?;
            render::outcome("Assign", &id, outcome);
        }
        Commands::Verify { id, notes } => {
            let outcome = session.verify(&id, notes.as_deref()).await?;
            render::outcome("Verify", &id, outcome);
        }
        Commands::Reject { id, reason } => {
            let outcome = session.reject_verification(&id, &reason).await?;
            render::outcome("Reject", &id, outcome);
        }
        Commands::AssignRoad { road, assignment } => {
            let Some(contractor) = contractor_or_prompt(session, assignment.contractor.clone())?
            else {
                return Ok(());
            };
            let outcome = session
                .batch_assign(&road, &contractor, &assignment.details())
                .await?;
            render::batch_outcome("Assign", &road, &outcome);
        }
        Commands::VerifyRoad { road, notes } => {
            let outcome = session.batch_verify(&road, notes.as_deref()).await?;
            render::batch_outcome("Verify", &road, &outcome);
        }
        Commands::Login { .. } | Commands::Logout => {}
    }

    Ok(())
}

/// Returns the given contractor id, or asks for one. `None` means the
/// operator had nothing to pick from.
fn contractor_or_prompt(
    session: &Session,
    given: Option<String>,
) -> Result<Option<String>, dialoguer::Error> {
    if let Some(id) = given.filter(|id| !id.trim().is_empty()) {
        return Ok(Some(id));
    }

    let contractors = session.contractors();
    if contractors.is_empty() {
        println!("No contractors loaded to choose from.");
        return Ok(None);
    }

    let labels: Vec<String> = contractors.iter().map(|c| c.label()).collect();
    let idx = Select::new()
        .with_prompt("Select a contractor")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(Some(contractors[idx].id.clone()))
}
