//! CLI definitions for locus-config
//!
//! Process-level options only; everything else happens in the interactive
//! command loop.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "locus-config",
    version,
    about = "Locus config tool",
    long_about = "Interactive configuration and deployment tool for Locus.\n\
                  Manages per-stage settings and deploys the API, websocket,\n\
                  scraper, web interface and SQL schema for a stage."
)]
pub struct Cli {
    /// Stage configuration file
    #[arg(long, env = "LOCUS_CONFIG", default_value = "../locus-custom.yml")]
    pub config: PathBuf,

    /// Project root containing api/, scrape/ and websocket/
    #[arg(long, env = "LOCUS_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Time limit for each external command (e.g. "15m"); unlimited when omitted
    #[arg(long, env = "LOCUS_STEP_TIMEOUT", value_parser = humantime::parse_duration)]
    pub step_timeout: Option<Duration>,

    /// Skip the AWS CLI check at startup
    #[arg(long)]
    pub skip_env_check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
