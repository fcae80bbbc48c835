//! tripcal - render trip month layouts
//!
//! Usage:
//!   tripcal layout --snapshot trip.json --month 2024-07   JSON layout
//!   tripcal layout ... --format text                      Plain-text agenda
//!   tripcal grid --month 2024-07                          Week rows of the month grid

use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use trip_calendar::week::{DAYS_PER_WEEK, WEEK_START};
use trip_calendar::{
    build_visible_days_with_options, compute_layout, parse_month, CalendarDay, CalendarLayout,
    GridOptions, LayoutOptions, SegmentPosition, TripSnapshot,
};

#[derive(Parser)]
#[command(name = "tripcal", version, about = "Render trip month layouts")]
struct Cli {
    /// Log pipeline decisions (skipped records, lane overflow) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out one month of a trip snapshot
    Layout {
        /// Trip snapshot JSON (trip, rooms, people, assignments, transports)
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Month to render, as YYYY-MM
        #[arg(short, long)]
        month: String,
        /// Day to flag as today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
        /// Layout options JSON; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Lanes shown per day
        #[arg(long)]
        max_slots: Option<usize>,
        /// Transport indicators shown per day
        #[arg(long)]
        max_transports: Option<usize>,
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Print the week rows of a month grid
    Grid {
        /// Month to render, as YYYY-MM
        #[arg(short, long)]
        month: String,
        /// Day to flag as today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Layout {
            snapshot,
            month,
            today,
            config,
            max_slots,
            max_transports,
            format,
        } => {
            let focus = parse_month(&month)?;
            let snapshot = load_snapshot(&snapshot)?;
            let mut options = match config {
                Some(path) => load_options(&path)?,
                None => LayoutOptions::default(),
            };
            if let Some(today) = today {
                options.today = Some(parse_day(&today)?);
            }
            if let Some(max_slots) = max_slots {
                options.max_visible_slots = max_slots;
            }
            if let Some(max_transports) = max_transports {
                options.max_visible_transports = max_transports;
            }

            let layout = compute_layout(focus, &snapshot, &options);
            match format {
                Format::Json => {
                    let out = layout_json(&month, &layout);
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                Format::Text => print!("{}", layout_text(&layout)),
            }
            Ok(())
        }
        Commands::Grid { month, today } => {
            let focus = parse_month(&month)?;
            let options = GridOptions {
                today: today.as_deref().map(parse_day).transpose()?,
                trip_bounds: None,
            };
            let days = build_visible_days_with_options(focus, &options);
            print!("{}", grid_text(&days));
            Ok(())
        }
    }
}

/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, falling
/// back to warnings only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_snapshot(path: &Path) -> Result<TripSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    TripSnapshot::from_json(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}

fn load_options(path: &Path) -> Result<LayoutOptions> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn layout_json(month: &str, layout: &CalendarLayout) -> Value {
    let weeks: Vec<Value> = layout
        .weeks()
        .map(|week| {
            Value::Array(
                week.iter()
                    .map(|day| {
                        let cell = layout.cell(day.date);
                        json!({
                            "date": day.date,
                            "isCurrentMonth": day.is_current_month,
                            "isToday": day.is_today,
                            "inTrip": day.in_trip,
                            "segments": cell.segments,
                            "transports": cell.transports,
                            "hiddenCount": cell.hidden_count,
                        })
                    })
                    .collect(),
            )
        })
        .collect();

    json!({
        "month": month,
        "weeks": weeks,
        "spans": layout.spans.iter().map(|span| span.as_ref()).collect::<Vec<_>>(),
        "slots": layout.slots,
    })
}

fn layout_text(layout: &CalendarLayout) -> String {
    let mut out = String::new();
    for day in &layout.days {
        let cell = layout.cell(day.date);
        if cell.segments.is_empty() && cell.transports.is_empty() && cell.hidden_count == 0 {
            continue;
        }
        let marker = if day.is_today { " (today)" } else { "" };
        out.push_str(&format!("{}{marker}\n", day.date.format("%a %Y-%m-%d")));
        for segment in cell.segments {
            let position = match segment.position {
                SegmentPosition::Single => "single",
                SegmentPosition::Start => "check-in",
                SegmentPosition::Middle => "staying",
                SegmentPosition::End => "last night",
            };
            out.push_str(&format!(
                "  [{}] {} ({position})\n",
                segment.slot, segment.span.label
            ));
        }
        for transport in cell.transports {
            let pickup = if transport.needs_pickup { ", needs pickup" } else { "" };
            out.push_str(&format!(
                "  {} {} {} {}{pickup}\n",
                transport.time,
                transport.transport_type.as_str(),
                transport.person_name,
                transport.location
            ));
        }
        if cell.hidden_count > 0 {
            out.push_str(&format!("  +{} more\n", cell.hidden_count));
        }
    }
    out
}

fn grid_text(days: &[CalendarDay]) -> String {
    let columns = DAYS_PER_WEEK as usize;
    let header: String = iter::successors(Some(WEEK_START), |day| Some(day.succ()))
        .take(columns)
        .map(|day| format!("{:>3} ", &day.to_string()[..2]))
        .collect();
    let mut out = format!("{}\n", header.trim_end());
    for week in days.chunks(columns) {
        let row: Vec<String> = week
            .iter()
            .map(|day| {
                let mark = if day.is_today {
                    '*'
                } else if day.is_current_month {
                    ' '
                } else {
                    '.'
                };
                format!("{:>3}{mark}", day.date.format("%-d"))
            })
            .collect();
        out.push_str(row.join("").trim_end());
        out.push('\n');
    }
    out
}
