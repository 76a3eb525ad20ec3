use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use dashboard_core::{
    AttendanceSession, BoardOutcome, DashboardClient, ListItem, ListName, PageAccumulator,
    RefreshOutcome, ReorderableListStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{domain::InstituteId, protocol::AttendanceQuery};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, load_settings_from, normalize_api_base_url};

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Institute dashboard data tools", long_about = None)]
struct Cli {
    /// Settings file; defaults to ./dashboard.toml when present
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every institute across all pages
    Institutes {
        #[arg(long)]
        search: Option<String>,
    },
    /// Fetch every entry of a paged collection as JSON lines
    List {
        collection: String,
        #[arg(long)]
        search: Option<String>,
    },
    /// Summarize attendance per date for one institute
    #[command(group(
        ArgGroup::new("period")
            .args(["month", "start_date"])
            .required(true)
            .multiple(false)
    ))]
    Attendance {
        #[arg(long)]
        institute_id: i64,
        #[arg(long, requires = "year")]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, requires = "end_date")]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Also list the records of this date
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Replay move/reorder operations over a two-list seed file
    Board {
        #[arg(long)]
        seed: PathBuf,
        /// `move:<id>:<from>:<to>` or `reorder:<list>:<drag>:<hover>`
        ops: Vec<String>,
    },
}

#[derive(Debug, Deserialize, Serialize)]
struct BoardSeed {
    #[serde(default)]
    available: Vec<ListItem>,
    #[serde(default, alias = "dropped")]
    placed: Vec<ListItem>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    if let Some(api_url) = &cli.api_url {
        settings.api_base_url = api_url.clone();
    }
    if let Some(page_size) = cli.page_size.filter(|size| *size > 0) {
        settings.page_size = page_size;
    }

    let filter =
        EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let api_base_url = normalize_api_base_url(&settings.api_base_url)?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()
        .context("failed to build http client")?;
    let client = DashboardClient::with_http_client(api_base_url, http)
        .with_accumulator(PageAccumulator::new().with_page_size(settings.page_size));
    info!(api = client.base_url(), page_size = settings.page_size, "dashboard client ready");

    match cli.command {
        Command::Institutes { search } => {
            let institutes = client.fetch_all_institutes(search.as_deref()).await?;
            for institute in &institutes {
                println!(
                    "{}\t{}\t{}",
                    institute.id.0,
                    institute.name,
                    institute.email.as_deref().unwrap_or("-")
                );
            }
            println!("{} institutes", institutes.len());
        }
        Command::List { collection, search } => {
            let entries: Vec<Value> = client.fetch_all(&collection, search.as_deref()).await?;
            for entry in &entries {
                println!("{}", serde_json::to_string(entry)?);
            }
            info!(collection = %collection, count = entries.len(), "listed collection");
        }
        Command::Attendance {
            institute_id,
            month,
            year,
            start_date,
            end_date,
            date,
            json,
        } => {
            let query = attendance_query(
                InstituteId(institute_id),
                month,
                year,
                start_date,
                end_date,
            )?;
            let session = AttendanceSession::new(Arc::new(client));
            if let RefreshOutcome::Superseded { .. } = session.refresh(query).await? {
                bail!("attendance request was superseded");
            }
            let snapshot = session.snapshot().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.events)?);
            } else {
                for summary in snapshot.aggregate.iter() {
                    println!(
                        "{}\t{} present\t{} absent\t{:?}",
                        summary.iso_date(),
                        summary.present_count,
                        summary.absent_count,
                        summary.color_tier()
                    );
                }
            }
            if snapshot.skipped_records > 0 {
                warn!(skipped = snapshot.skipped_records, "some attendance records were malformed");
            }

            if let Some(date) = date {
                let records = session.select_date(date).await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&records)?);
                } else {
                    println!("{date}: {} records", records.len());
                    for record in records {
                        println!(
                            "  {}\t{}\t{:?}",
                            record.student_id.0, record.student_name, record.status
                        );
                    }
                }
            }
        }
        Command::Board { seed, ops } => {
            let raw = fs::read_to_string(&seed)
                .with_context(|| format!("failed to read board seed '{}'", seed.display()))?;
            let seed: BoardSeed = serde_json::from_str(&raw).context("invalid board seed")?;
            let mut board = ReorderableListStore::new(seed.available, seed.placed)?;

            for op in &ops {
                let outcome = apply_board_op(&mut board, op)?;
                if let BoardOutcome::Unchanged(reason) = outcome {
                    warn!(op = %op, ?reason, "board operation had no effect");
                }
            }

            let state = BoardSeed {
                available: board.available().as_ref().clone(),
                placed: board.placed().as_ref().clone(),
            };
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }

    Ok(())
}

fn attendance_query(
    institute_id: InstituteId,
    month: Option<u32>,
    year: Option<i32>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<AttendanceQuery> {
    match (month, year, start_date, end_date) {
        (Some(month), Some(year), None, None) => {
            if !(1..=12).contains(&month) {
                bail!("month must be between 1 and 12, got {month}");
            }
            Ok(AttendanceQuery::Month {
                institute_id,
                month,
                year,
            })
        }
        (None, None, Some(start_date), Some(end_date)) => {
            if end_date < start_date {
                bail!("end date {end_date} is before start date {start_date}");
            }
            Ok(AttendanceQuery::Range {
                institute_id,
                start_date,
                end_date,
            })
        }
        _ => bail!("pass either --month with --year or --start-date with --end-date"),
    }
}

fn apply_board_op(board: &mut ReorderableListStore, op: &str) -> Result<BoardOutcome> {
    let parts: Vec<&str> = op.split(':').collect();
    let list = |raw: &str| raw.parse::<ListName>().map_err(anyhow::Error::msg);
    match parts.as_slice() {
        ["move", id, from, to] => Ok(board.move_item(*id, list(*from)?, list(*to)?)),
        ["reorder", name, drag, hover] => {
            let drag = drag
                .parse()
                .with_context(|| format!("invalid drag index '{drag}'"))?;
            let hover = hover
                .parse()
                .with_context(|| format!("invalid hover index '{hover}'"))?;
            Ok(board.reorder(list(*name)?, drag, hover))
        }
        _ => bail!("unrecognized board operation '{op}'"),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
