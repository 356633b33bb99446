use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use election_state::config::StorageConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Identity used as the caller of the operations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallerConfig {
    /// Recorded as the organizer of the elections created by this client.
    pub identity: String,
}

/// Configuration of the command line client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
    /// Location of the ledger state.
    pub storage: StorageConfig,
    /// Caller identity.
    pub caller: CallerConfig,
}

/// Reads a TOML file into `R`.
pub fn from_toml_path<P: AsRef<Path>, R: DeserializeOwned>(path: P) -> anyhow::Result<R> {
    let mut contents = String::new();
    {
        let mut file = File::open(path)?;
        file.read_to_string(&mut contents)?;
    }

    let result: R = toml::from_str(&contents)?;

    Ok(result)
}
