use alarmtimer_core::{seconds_to_time, time_to_seconds};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum TimeAction {
    /// HH:MM:SS to seconds
    ToSeconds {
        /// Time text, e.g. 01:30:00
        time: String,
    },
    /// Seconds to HH:MM:SS
    FromSeconds {
        /// Whole seconds
        seconds: u64,
    },
}

pub fn run(action: TimeAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimeAction::ToSeconds { time } => println!("{}", time_to_seconds(&time)?),
        TimeAction::FromSeconds { seconds } => println!("{}", seconds_to_time(seconds)),
    }
    Ok(())
}
