//! `liturgy` CLI — expand, group and describe parish schedules from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Expand definitions (JSON array) into dated occurrences
//! liturgy generate -i events.json --start 2024-01-01 --end 2024-01-31
//!
//! # Only one church (plus parish-wide events), only Masses
//! liturgy generate -i events.json --start 2024-01-01 --end 2024-01-31 --church 2 --event-type mass
//!
//! # Weekly grid for the week containing a date
//! liturgy week -i events.json --week-of 2024-01-10 --church-names churches.json
//!
//! # Per-church schedule for a single day
//! liturgy day -i events.json --date 2024-01-07 --format json
//!
//! # Describe or sanitize a raw recurrence rule
//! echo '{"frequency":"weekly","days":["Sunday"]}' | liturgy describe
//! echo '{"frequency":"weekly","days":["sunday","Funday"]}' | liturgy normalize
//! ```

mod render;

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc, Weekday};
use clap::{Parser, Subcommand, ValueEnum};
use liturgy_engine::format::TimeStyle;
use liturgy_engine::grouping::week_start;
use liturgy_engine::window::parse_iso_date;
use liturgy_engine::{generate_records, ChurchId, DateWindow, EngineConfig, Schedule, ScheduleFilter};
use serde_json::Value;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "liturgy",
    version,
    about = "Parish liturgical schedule expansion CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (JSON); flags override its values
    #[arg(long, global = true)]
    config: Option<String>,

    /// Reject windows longer than this many days
    #[arg(long, global = true)]
    max_window_days: Option<u32>,

    /// Treat plain one-off definitions as single events instead of weekly
    #[arg(long, global = true)]
    no_legacy_weekday: bool,

    /// IANA timezone used to decide "today" (e.g. "America/Chicago")
    #[arg(long, global = true, default_value = "UTC")]
    timezone: String,

    /// Log filter directive (e.g. "debug"); defaults to RUST_LOG, then "warn"
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand definitions into a sorted JSON list of occurrences
    Generate {
        #[command(flatten)]
        source: SourceArgs,
        /// First date of the window (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Last date of the window, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Render the weekly grid for one week
    Week {
        #[command(flatten)]
        source: SourceArgs,
        /// Any date inside the week to show (defaults to today)
        #[arg(long)]
        week_of: Option<String>,
        /// Day the week starts on
        #[arg(long, value_enum, default_value_t = FirstDay::Sunday)]
        first_day: FirstDay,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Render one day's schedule grouped by church
    Day {
        #[command(flatten)]
        source: SourceArgs,
        /// Date to show (defaults to today)
        #[arg(long)]
        date: Option<String>,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Print the human-readable description of a raw recurrence rule
    Describe {
        /// Input rule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Describe the rule as belonging to a non-recurring definition
        #[arg(long)]
        one_time: bool,
    },
    /// Print the sanitized form of a raw recurrence rule
    Normalize {
        /// Input rule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Event definitions JSON file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Only this church, plus definitions for all churches
    #[arg(long)]
    church: Option<ChurchId>,
    /// Only this event type (exact match)
    #[arg(long)]
    event_type: Option<String>,
}

#[derive(clap::Args)]
struct ViewArgs {
    /// JSON object mapping church ids to display names
    #[arg(long)]
    church_names: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Use a 24-hour clock in text output
    #[arg(long)]
    clock_24h: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum FirstDay {
    Sunday,
    Monday,
}

impl From<FirstDay> for Weekday {
    fn from(day: FirstDay) -> Self {
        match day {
            FirstDay::Sunday => Weekday::Sun,
            FirstDay::Monday => Weekday::Mon,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let config = engine_config(&cli)?;
    let today = today_in(&cli.timezone)?;
    tracing::debug!(?config, %today, "configuration loaded");

    match cli.command {
        Commands::Generate {
            source,
            start,
            end,
            output,
        } => {
            let window = DateWindow::parse(&start, &end).context("Invalid date window")?;
            let schedule = load_schedule(&source, &window, &config)?;
            let json = serde_json::to_string_pretty(&schedule)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Week {
            source,
            week_of,
            first_day,
            view,
        } => {
            let anchor = date_or_today(week_of.as_deref(), today)?;
            let start = week_start(anchor, first_day.into());
            let window = DateWindow::week(start);
            let schedule = load_schedule(&source, &window, &config)?;
            let names = load_church_names(view.church_names.as_deref())?;
            let grid = liturgy_engine::group_by_week(&schedule.occurrences, start);
            let rendered = match view.format {
                OutputFormat::Json => serde_json::to_string_pretty(&grid)?,
                OutputFormat::Text => {
                    render::week_text(&grid, &names, today, time_style(view.clock_24h))
                }
            };
            println!("{}", rendered.trim_end());
        }
        Commands::Day { source, date, view } => {
            let date = date_or_today(date.as_deref(), today)?;
            let window = DateWindow::new(date, date)?;
            let schedule = load_schedule(&source, &window, &config)?;
            let names = load_church_names(view.church_names.as_deref())?;
            let groups = liturgy_engine::group_by_church(&schedule.occurrences, &names);
            let rendered = match view.format {
                OutputFormat::Json => serde_json::to_string_pretty(&groups)?,
                OutputFormat::Text => render::day_text(date, &groups, time_style(view.clock_24h)),
            };
            println!("{}", rendered.trim_end());
        }
        Commands::Describe { input, one_time } => {
            let raw = read_json(input.as_deref())?;
            println!("{}", liturgy_engine::describe_raw(&raw, !one_time));
        }
        Commands::Normalize { input } => {
            let raw = read_json(input.as_deref())?;
            let rule = liturgy_engine::normalize(&raw);
            println!("{}", serde_json::to_string_pretty(&rule)?);
        }
    }

    Ok(())
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("Invalid log level: {}", level))?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .init();
    Ok(())
}

/// Config file first, then flags on top.
fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid config file: {}", path))?
        }
        None => EngineConfig::default(),
    };
    if let Some(max) = cli.max_window_days {
        config.max_window_days = max;
    }
    if cli.no_legacy_weekday {
        config.infer_legacy_weekday = false;
    }
    Ok(config)
}

fn today_in(timezone: &str) -> Result<NaiveDate> {
    let tz: chrono_tz::Tz = timezone
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown timezone: '{}'", timezone))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}

fn date_or_today(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_iso_date(raw)
            .with_context(|| format!("Invalid date '{}': expected YYYY-MM-DD", raw)),
        None => Ok(today),
    }
}

fn time_style(clock_24h: bool) -> TimeStyle {
    if clock_24h {
        TimeStyle::TwentyFourHour
    } else {
        TimeStyle::TwelveHour
    }
}

fn load_schedule(
    source: &SourceArgs,
    window: &DateWindow,
    config: &EngineConfig,
) -> Result<Schedule> {
    let records = load_records(source.input.as_deref())?;
    let filter = ScheduleFilter {
        church_id: source.church,
        event_type: source.event_type.clone(),
    };
    let schedule = generate_records(records, window, &filter, config)
        .context("Failed to generate schedule")?;
    if !schedule.warnings.is_empty() {
        tracing::warn!(
            skipped = schedule.skipped_count(),
            "some event definitions were skipped"
        );
    }
    Ok(schedule)
}

/// Read the raw definition records. Records the engine cannot read are
/// reported in the schedule's warnings rather than failing the run.
fn load_records(path: Option<&str>) -> Result<Vec<Value>> {
    match read_json(path)? {
        Value::Array(records) => Ok(records),
        _ => anyhow::bail!("Event definitions must be a JSON array"),
    }
}

fn load_church_names(path: Option<&str>) -> Result<BTreeMap<ChurchId, String>> {
    match path {
        Some(path) => {
            let text = read_file(Path::new(path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Church names must map ids to names: {}", path))
        }
        None => Ok(BTreeMap::new()),
    }
}

fn read_json(path: Option<&str>) -> Result<Value> {
    let text = read_input(path)?;
    serde_json::from_str(&text).context("Failed to parse JSON input")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => read_file(Path::new(path)),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
