//! GTD Autolabel - Main Entry Point
//!
//! Parses the command line, sets up logging and runs the polling loop.
//! The actual implementation is in the `gtd_autolabel` library.

use anyhow::{Context, Result};
use clap::Parser;
use gtd_autolabel::config::Config;
use gtd_autolabel::formatting::format_modes;
use gtd_autolabel::runner::{self, Schedule};
use gtd_autolabel::{Reconciler, Storage, TodoistService};
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// GTD Autolabel - keeps a next-action label on the right Todoist tasks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Todoist API token
    #[arg(short = 'a', long, env = "TODOIST_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Name of the next-action label
    #[arg(short, long)]
    label: Option<String>,

    /// Hour (1-24) at which the day ends for recurring tasks
    #[arg(short, long)]
    end: Option<u8>,

    /// Seconds between cycles
    #[arg(short, long)]
    delay: Option<u64>,

    /// Marker character for parallel children
    #[arg(short = 'p', long = "p_suffix")]
    parallel_marker: Option<String>,

    /// Marker character for sequential children
    #[arg(short = 's', long = "s_suffix")]
    sequential_marker: Option<String>,

    /// chrono format of start=<DATE> directives
    #[arg(long)]
    dateformat: Option<String>,

    /// Do not label tasks due more than this many days ahead
    #[arg(long = "hide-future")]
    hide_future: Option<u32>,

    /// Label the inbox as "sequential" or "parallel"
    #[arg(long)]
    inbox: Option<String>,

    /// Path to the classification state file
    #[arg(long)]
    state: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    onetime: bool,

    /// Log at debug level and write debug.log
    #[arg(long)]
    debug: bool,
}

impl Args {
    /// Apply command-line flags on top of the file configuration
    fn merge_into(self, mut config: Config) -> Config {
        if self.api_key.is_some() {
            config.api_key = self.api_key;
        }
        if let Some(label) = self.label {
            config.label = label;
        }
        if self.end.is_some() {
            config.end_of_day = self.end;
        }
        if let Some(delay) = self.delay {
            config.delay = delay;
        }
        if let Some(marker) = self.sequential_marker {
            config.sequential_marker = marker;
        }
        if let Some(marker) = self.parallel_marker {
            config.parallel_marker = marker;
        }
        if let Some(format) = self.dateformat {
            config.date_format = format;
        }
        if let Some(days) = self.hide_future {
            config.hide_future = days;
        }
        if self.inbox.is_some() {
            config.inbox = self.inbox;
        }
        if let Some(state) = self.state {
            config.state_file = state;
        }
        config.onetime |= self.onetime;
        config.debug |= self.debug;
        config
    }
}

/// Set up tracing; the returned guard flushes debug.log on drop
fn init_logging(debug: bool) -> Option<WorkerGuard> {
    let default_filter = if debug {
        "gtd_autolabel=debug"
    } else {
        "gtd_autolabel=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, guard) = if debug {
        let appender = tracing_appender::rolling::never(".", "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_ansi(false).with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let config = args.merge_into(file_config);

    let _guard = init_logging(config.debug);

    let api_key = config.api_key()?;
    let settings = config.settings()?;
    info!("{}", format_modes(&settings));

    let service = TodoistService::with_base_url(api_key, &config.base_url);
    let storage = Storage::new(&config.state_file);
    let mut reconciler = Reconciler::new(service, storage, settings)
        .with_context(|| format!("failed to load {}", config.state_file.display()))?;

    reconciler
        .provision_label()
        .await
        .context("failed to provision the next-action label")?;

    let schedule = Schedule {
        delay: config.delay(),
        onetime: config.onetime,
    };
    runner::run(&mut reconciler, schedule).await
}
