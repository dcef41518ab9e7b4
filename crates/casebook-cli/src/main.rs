mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use casebook_core::{Config, Side, TestType};

#[derive(Parser)]
#[command(name = "casebook")]
#[command(about = "Manage test cases and sync them through a git-style workflow", long_about = None)]
struct Cli {
    /// Use a built-in sample store instead of the API (changes are not kept)
    #[arg(long, global = true)]
    offline: bool,

    /// Path to a config file (defaults to ./casebook.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Ui,
    Api,
}

impl From<KindArg> for TestType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Ui => TestType::Ui,
            KindArg::Api => TestType::Api,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Local,
    Remote,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Local => Side::Local,
            SideArg::Remote => Side::Remote,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List test cases
    List {
        /// Only show cases whose name or tags contain this text
        #[arg(short, long)]
        query: Option<String>,
    },
    /// List test suites with their aggregate status
    Suites,
    /// Show one test case with its steps
    Show {
        id: String,
        /// Print the stored JSON document instead
        #[arg(long)]
        json: bool,
    },
    /// Create a new test case
    New {
        #[arg(required = true)]
        name: Vec<String>,
        #[arg(long = "type", value_enum, default_value = "ui")]
        kind: KindArg,
        #[arg(short, long)]
        description: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Run one test case
    Run { id: String },
    /// Run every case in a suite
    RunSuite { id: String },
    /// Show uncommitted and conflicted cases
    Status,
    /// Commit and push every changed case
    Push {
        #[arg(short, long)]
        message: String,
    },
    /// Pull remote changes
    Pull {
        /// Resolve a conflict by keeping this side
        #[arg(long, value_enum)]
        keep: Option<SideArg>,
    },
    /// Show the commit history of a case
    History { id: String },
    /// Print the default configuration
    Config,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("CASEBOOK_LOG")
                .unwrap_or_else(|_| "casebook=info,casebook_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();

    if let Commands::Config = cli.command {
        println!("{}", Config::default_config_string());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    let mut manager = commands::connect(&config, cli.offline).await?;

    match cli.command {
        Commands::List { query } => commands::list(&manager, query.as_deref()),
        Commands::Suites => commands::suites(&manager),
        Commands::Show { id, json } => commands::show(&manager, &id, json)?,
        Commands::New {
            name,
            kind,
            description,
            tags,
        } => {
            commands::create(&mut manager, name.join(" "), kind.into(), description, tags).await?
        }
        Commands::Run { id } => commands::run(&mut manager, &id).await?,
        Commands::RunSuite { id } => commands::run_suite(&mut manager, &id).await?,
        Commands::Status => commands::status(&manager),
        Commands::Push { message } => commands::push(&mut manager, &message).await?,
        Commands::Pull { keep } => commands::pull(&mut manager, keep.map(Side::from)).await?,
        Commands::History { id } => commands::history(&manager, &id)?,
        Commands::Config => {}
    }

    Ok(())
}
