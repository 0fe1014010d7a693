mod catalog;
mod command;
mod config;
mod event;
mod export;
mod metrics;
mod outcome;
#[cfg(feature = "serve")]
mod serve;
mod session;
mod shell;
mod table;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use config::PlaytagConfig;
use metrics::FoulPolicy;
use session::TaggingSession;
use std::path::PathBuf;

/// Tag basketball plays during a game and compute per-play efficiency:
/// points per possession, frequency and success rate.
#[derive(Parser, Debug)]
#[command(name = "playtag", version, about)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "playtag.toml", global = true)]
    config: PathBuf,

    /// Opponent name (overrides config)
    #[arg(long, global = true)]
    opponent: Option<String>,

    /// Game date, YYYY-MM-DD (overrides config)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    /// Whether fouls count as attempts: count | exclude (overrides config)
    #[arg(long, global = true)]
    foul_policy: Option<FoulPolicy>,

    /// Directory for CSV exports (overrides config)
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Interactive tagging shell (default)
    Tag,
    /// Serve the tagging session over a JSON API
    #[cfg(feature = "serve")]
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,
        /// Port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the resolved configuration and exit
    Config,
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_filter = if verbose {
        "playtag=debug"
    } else if quiet {
        "playtag=warn"
    } else {
        "playtag=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

/// Merge command-line overrides into the loaded config.
fn apply_overrides(cli: &Cli, config: &mut PlaytagConfig) {
    if let Some(opponent) = &cli.opponent {
        config.game.opponent = Some(opponent.clone());
    }
    if let Some(date) = cli.date {
        config.game.date = Some(date);
    }
    if let Some(policy) = cli.foul_policy {
        config.metrics.foul_policy = policy;
    }
    if let Some(dir) = &cli.export_dir {
        config.export.dir = dir.clone();
    }
    apply_serve_overrides(cli.command.as_ref(), config);
}

#[cfg(feature = "serve")]
fn apply_serve_overrides(command: Option<&Commands>, config: &mut PlaytagConfig) {
    if let Some(Commands::Serve { bind, port }) = command {
        if let Some(bind) = bind {
            config.serve.bind = bind.clone();
        }
        if let Some(port) = port {
            config.serve.port = *port;
        }
    }
}

#[cfg(not(feature = "serve"))]
fn apply_serve_overrides(_command: Option<&Commands>, _config: &mut PlaytagConfig) {}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = config::load_config(&cli.config).map_err(|e| e.to_string())?;
    apply_overrides(&cli, &mut config);
    tracing::debug!(?config, "resolved configuration");

    match cli.command.unwrap_or(Commands::Tag) {
        Commands::Tag => {
            let mut session = TaggingSession::from_config(&config);
            let export_dir = config.export.dir.clone();
            tokio::task::spawn_blocking(move || {
                let stdin = std::io::stdin();
                let mut stdout = std::io::stdout();
                shell::run(&mut session, stdin.lock(), &mut stdout, &export_dir)
            })
            .await
            .map_err(|e| format!("tagging shell stopped unexpectedly: {e}"))?
            .map_err(|e| format!("I/O error: {e}"))
        }
        #[cfg(feature = "serve")]
        Commands::Serve { .. } => {
            let session = TaggingSession::from_config(&config);
            serve::run(&config.serve, session)
                .await
                .map_err(|e| format!("serve failed: {e}"))
        }
        Commands::Config => {
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| format!("Failed to render config: {e}"))?;
            print!("{rendered}");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    tracing::debug!(?cli, "parsed CLI arguments");

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
