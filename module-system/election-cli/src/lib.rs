#![doc = include_str!("../README.md")]

pub mod config;
pub mod workflows;

use std::path::PathBuf;

pub use clap;
use election_module::CallerContext;

use crate::config::CliConfig;
use crate::workflows::operations::OperationWorkflow;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "election_config.toml";

/// Run operations of the election ledger against a local store
#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct App {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// Caller identity, overriding `[caller] identity` of the configuration
    #[arg(long)]
    pub caller: Option<String>,
    /// The operation to run
    #[command(subcommand)]
    pub workflow: OperationWorkflow,
}

impl App {
    /// The caller of the operation: the `--caller` flag if given, otherwise
    /// the configured identity.
    pub fn caller_context(&self, config: &CliConfig) -> CallerContext {
        match &self.caller {
            Some(caller) => CallerContext::new(caller.as_str()),
            None => CallerContext::new(config.caller.identity.as_str()),
        }
    }
}
