use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "acupress", version, about = "Guided acupressure sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run guided sessions
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Browse the technique catalog
    Technique {
        #[command(subcommand)]
        action: commands::technique::TechniqueAction,
    },
    /// Manage favorite techniques
    Favorite {
        #[command(subcommand)]
        action: commands::favorite::FavoriteAction,
    },
    /// Session history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Practice statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

async fn dispatch(command: Commands) -> commands::CliResult {
    match command {
        Commands::Session { action } => commands::session::run(action).await,
        Commands::Technique { action } => commands::technique::run(action).await,
        Commands::Favorite { action } => commands::favorite::run(action).await,
        Commands::History { action } => commands::history::run(action).await,
        Commands::Stats { json } => commands::stats::run(json),
        Commands::Config { action } => commands::config::run(action),
    }
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };
    let result = runtime.block_on(dispatch(cli.command));
    // A pending stdin read would otherwise hold up shutdown.
    runtime.shutdown_background();

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
