//! CrossAdmit CLI: register admission outcomes and query pairwise choice
//! statistics, or serve them over HTTP.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// CrossAdmit: where do students go when admitted to both?
#[derive(Parser, Debug)]
#[command(name = "crossadmit", version, about, long_about = None)]
struct Cli {
    /// Workspace directory
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Submission store file (overrides `[store] path`)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Register one student's admission outcome
    Register {
        /// Universities the student was admitted to
        #[arg(short, long, num_args = 1.., required = true)]
        admitted: Vec<String>,
        /// University the student enrolled at
        #[arg(short, long)]
        registered: String,
        /// Major per admitted university, as UNIVERSITY=MAJOR
        #[arg(short, long = "major", value_parser = commands::parse_major)]
        majors: Vec<(String, String)>,
        /// Major at the enrolled university
        #[arg(long)]
        registered_major: Option<String>,
    },
    /// List every pairwise comparison, most-supported first
    Comparisons {
        /// Show at most this many comparisons
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Compare two universities
    Compare {
        university1: String,
        university2: String,
        #[arg(long)]
        json: bool,
    },
    /// Show a comparison by its id (e.g. `kaist-vs-postech`)
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Major-level breakdown for two universities
    Majors {
        university1: String,
        university2: String,
        #[arg(long)]
        json: bool,
    },
    /// Raw submissions admitted to both universities, newest first
    Submissions {
        university1: String,
        university2: String,
        #[arg(long)]
        json: bool,
    },
    /// Start the HTTP API server
    Serve {
        /// Bind host (overrides `[server] host`)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides `[server] port`)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "crossadmit", "crossadmit")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "crossadmit.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace, cli.store.as_deref()).await
}
