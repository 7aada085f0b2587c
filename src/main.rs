//! Strategy builder - main entry point
//!
//! Subcommands:
//! - schema: show indicators and their parameters
//! - build: apply an edit script and print the cleaned payload
//! - submit: build and create the strategy on the service
//! - list / whoami: read account data
//! - login / register / logout: manage the session

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strategy_builder::Settings;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "strategy-builder")]
#[command(about = "Author rule-based trading strategies and submit them to the strategy service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show indicator parameter schemas
    Schema {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply an edit script to a fresh draft and print the submission payload
    Build {
        /// Edit script (JSON array of edit commands)
        script: PathBuf,

        /// Write the payload to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the draft as edited, before cleaning
        #[arg(long)]
        raw: bool,
    },

    /// Build a draft from a script and submit it
    Submit {
        /// Edit script (JSON array of edit commands)
        script: PathBuf,
    },

    /// List your strategies
    List,

    /// Show the logged-in user and their portfolios
    Whoami,

    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Forget the stored session token
    Logout,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Schema { .. } => "schema",
            Commands::Build { .. } => "build",
            Commands::Submit { .. } => "submit",
            Commands::List => "list",
            Commands::Whoami => "whoami",
            Commands::Login { .. } => "login",
            Commands::Register { .. } => "register",
            Commands::Logout => "logout",
        }
    }
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    // Console goes to stderr so payloads on stdout stay pipeable
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Log file: {}", log_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.command.name())?;

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Schema { json } => commands::schema::run(json),
        Commands::Build { script, out, raw } => commands::build::run(script, out, raw),
        Commands::Submit { script } => commands::submit::run(&settings, script).await,
        Commands::List => commands::account::list(&settings).await,
        Commands::Whoami => commands::account::whoami(&settings).await,
        Commands::Login { email, password } => {
            commands::account::login(&settings, email, password).await
        }
        Commands::Register { email, password } => {
            commands::account::register(&settings, email, password).await
        }
        Commands::Logout => commands::account::logout(&settings),
    }
}
