#![forbid(unsafe_code)]

//! `triage-relay`: advisory triage relay binary.
//!
//! Loads configuration and credentials, then runs one of the sweep, watch,
//! or notify flows to completion on a single-threaded runtime.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use triage_relay::ack::actuator::WorkflowActuator;
use triage_relay::ack::poll::{self, SweepOptions, WatchOptions};
use triage_relay::ack::reconcile::Reconciler;
use triage_relay::config::GlobalConfig;
use triage_relay::feed::intake::{self, Intake};
use triage_relay::jira::client::JiraClient;
use triage_relay::persistence::mapping_store::MappingStore;
use triage_relay::persistence::seen_cache::SeenCache;
use triage_relay::slack::client::SlackService;
use triage_relay::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "triage-relay", about = "Security advisory triage relay", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile acknowledgments across recent channel history.
    Sweep,

    /// Poll one posted notification for an acknowledgment.
    Watch {
        /// Slack `ts` of the notification message.
        #[arg(long)]
        ts: String,
        /// Ticket key announced by the notification.
        #[arg(long)]
        ticket: String,
    },

    /// File tickets and post notifications for new relevant advisories.
    Notify {
        /// JSON array of advisory entries.
        #[arg(long)]
        entries: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials()?;
    info!("configuration loaded");

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(&config, args.command))
}

async fn run(config: &GlobalConfig, command: Command) -> Result<()> {
    let slack = SlackService::new(&config.slack)?;
    let jira = JiraClient::new(&config.jira)?;
    let store = MappingStore::new(&config.state_path);
    let reconciler = Reconciler::new(&slack, WorkflowActuator::new(&slack, &jira, &config.jira));

    match command {
        Command::Sweep => {
            let options = SweepOptions {
                history_limit: config.slack.history_limit,
                retention: config.retention(),
            };
            poll::sweep(&reconciler, &slack, &store, &options, Utc::now()).await?;
        }
        Command::Watch { ts, ticket } => {
            let options = WatchOptions {
                interval: config.watch.interval(),
                timeout: config.watch.timeout(),
            };
            let outcome = poll::watch(&reconciler, &store, &ts, &ticket, options).await?;
            info!(?outcome, "watch finished");
        }
        Command::Notify { entries } => {
            let entries = intake::load_entries(&entries)?;
            let mut seen = SeenCache::load(&config.seen_cache_path)?;
            let flow = Intake {
                config,
                chat: &slack,
                tickets: &jira,
                reconciler: &reconciler,
                store: &store,
            };
            flow.run(&entries, &mut seen).await?;
        }
    }

    Ok(())
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
