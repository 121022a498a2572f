//! Configuration and CLI argument handling

use clap::Parser;

use crate::state::PhaseDurations;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pause-tracker")]
#[command(about = "A drive/pause cycle timer server for long-haul drivers")]
#[command(version = "1.0.1")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Warm-up lead-in in seconds
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub warm_up: u64,

    /// Driving window in seconds
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u64).range(1..))]
    pub driving: u64,

    /// Pre-rest warning window in seconds
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub warning: u64,

    /// Mandatory rest in seconds
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    pub rest: u64,

    /// Do not ring the terminal bell (clients still receive tone events)
    #[arg(short, long)]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Phase lengths selected on the command line
    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations {
            warm_up: self.warm_up,
            driving: self.driving,
            warning: self.warning,
            rest: self.rest,
        }
    }
}
