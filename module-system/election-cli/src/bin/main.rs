use anyhow::Context;
use election_cli::clap::Parser;
use election_cli::config::{from_toml_path, CliConfig};
use election_cli::App;
use election_module::dispatch::TxEffect;
use election_state::{RocksDbStorage, Storage};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), anyhow::Error> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Unable to set global default subscriber")?;

    let app = App::parse();
    let config: CliConfig = from_toml_path(&app.config).with_context(|| {
        format!(
            "Failed to read configuration from {}",
            app.config.display()
        )
    })?;
    let caller = app.caller_context(&config);

    info!(path = %config.storage.path.display(), "Opening storage");
    let storage = RocksDbStorage::with_config(config.storage)?;

    let receipt = app.workflow.run(&storage, &caller)?;
    match receipt.effect {
        TxEffect::Successful | TxEffect::Rejected(_) => {
            println!("{}", String::from_utf8_lossy(&receipt.payload));
            Ok(())
        }
        TxEffect::Aborted(code) => anyhow::bail!("Transaction aborted: {code}"),
    }
}
