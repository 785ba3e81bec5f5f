use std::path::PathBuf;

/// `sniper` (package `pool-sniper`): the discovery/enrichment/risk/alert
/// pipeline binary.
#[derive(clap::Parser)]
#[command(name = "sniper")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Runs the full pipeline until SIGINT/SIGTERM or a `sniper stop`.
    Start {
        #[clap(flatten)]
        settings: Box<config::Settings>,
    },
    /// Best-effort shutdown request to a running instance. Absence of a
    /// running instance is not an error.
    Stop {
        #[clap(long, env, default_value = "data")]
        data_dir: PathBuf,
    },
    /// One-shot configuration self-check when run standalone; queries the
    /// liveness registry of a running instance otherwise (§10, §15).
    Health {
        #[clap(flatten)]
        settings: Box<config::Settings>,
    },
}
