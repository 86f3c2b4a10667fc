use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "alarmtimer", version, about = "Countdown timer and stopwatch with sound alarms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage alarm sounds
    Sound {
        #[command(subcommand)]
        action: commands::sound::SoundAction,
    },
    /// Run a countdown timer
    Countdown(commands::run::CountdownArgs),
    /// Run a stopwatch
    Stopwatch(commands::run::StopwatchArgs),
    /// Convert between HH:MM:SS and seconds
    Time {
        #[command(subcommand)]
        action: commands::time::TimeAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Sound { action } => commands::sound::run(action),
        Commands::Countdown(args) => commands::run::countdown(args),
        Commands::Stopwatch(args) => commands::run::stopwatch(args),
        Commands::Time { action } => commands::time::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
