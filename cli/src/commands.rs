pub mod discover;
pub mod version;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use hwrev_common::config::{
    Config, DEFAULT_CHUNK_SIZE, DEFAULT_DEVICE_INFO_PATH, DEFAULT_DEVICE_PORT,
    DEFAULT_NAME_PATTERN, DEFAULT_RESTRICTED_MODELS, DEFAULT_WORKERS,
};

#[derive(Parser)]
#[command(name = "hwrev")]
#[command(about = "Finds phones whose hardware revision blocks a firmware migration.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Skip the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Correlate directory, registration status and device identity into a CSV report
    #[command(alias = "d")]
    Discover(DiscoverArgs),
    /// Show the cluster version and the AXL schema it maps to
    #[command(alias = "v")]
    Version(ServerArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Cluster publisher hostname or IP address
    #[arg(short = 's', long = "server")]
    pub host: String,

    /// Accept self-signed cluster certificates
    #[arg(short = 'k', long)]
    pub insecure: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DiscoverArgs {
    #[command(flatten)]
    pub server: ServerArgs,

    /// Administrative API user
    #[arg(short, long, env = "HWREV_USERNAME")]
    pub username: String,

    /// Administrative API password
    #[arg(short, long, env = "HWREV_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// CSV report to create; an existing file is never overwritten
    #[arg(short, long)]
    pub output: PathBuf,

    /// AXL schema version such as 14.0; detected from the cluster when omitted
    #[arg(long)]
    pub axl_version: Option<String>,

    /// Device name search pattern (`%` matches anything)
    #[arg(long, default_value = DEFAULT_NAME_PATTERN)]
    pub pattern: String,

    /// Restricted model, repeatable; replaces the built-in list
    #[arg(short, long = "model")]
    pub models: Vec<String>,

    /// Device names per status query, below the service cap of 1000
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Concurrent device queries
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-device timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,

    #[arg(long, default_value_t = DEFAULT_DEVICE_PORT)]
    pub device_port: u16,

    #[arg(long, default_value = DEFAULT_DEVICE_INFO_PATH)]
    pub device_path: String,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl DiscoverArgs {
    pub fn to_config(&self) -> Config {
        let restricted_models = if self.models.is_empty() {
            DEFAULT_RESTRICTED_MODELS.iter().map(|m| m.to_string()).collect()
        } else {
            self.models.clone()
        };

        Config {
            name_pattern: self.pattern.clone(),
            restricted_models,
            chunk_size: self.chunk_size,
            workers: self.workers,
            device_timeout: Duration::from_secs(self.timeout),
            device_port: self.device_port,
            device_info_path: self.device_path.clone(),
        }
    }
}
