pub mod alert;
pub mod db;
pub mod distance;
pub mod error;
pub mod host;
pub mod models;
pub mod monitor;
pub mod sensing;
pub mod settings;
pub mod simulated;
pub mod stats;
pub mod timer;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::Local;
use log::{error, info};

use db::Database;
use monitor::{MonitorCore, MonitorHost};
use settings::SettingsStore;
use simulated::SimulatedHost;
use stats::StatRange;

pub use error::MonitorError;

fn data_dir() -> PathBuf {
    std::env::var_os("SAFEDISTANCE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("safedistance-data"))
}

/// Runs the monitoring core against the simulated host until Ctrl-C.
pub fn run() -> anyhow::Result<()> {
    let debug_mode = std::env::var("SAFEDISTANCE_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(if debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    info!("SafeDistance starting up...");

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async {
        let data_dir = data_dir();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let database = Database::new(data_dir.join("safedistance.sqlite3"))?;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        let simulated = Arc::new(SimulatedHost::new(rand::random()));
        let host = MonitorHost {
            cameras: simulated.clone(),
            detector: simulated.clone(),
            screen: simulated.clone(),
            notifier: simulated.clone(),
        };

        let core = MonitorCore::start(host, &settings, Arc::new(database.clone())).await?;

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C")?;
        info!("Ctrl-C received, stopping");

        let stats = core.stats();
        let today = Local::now().date_naive();
        for range in [StatRange::Today, StatRange::Week, StatRange::Month] {
            match stats.summary(range, today).await {
                Ok(summary) => info!(
                    "{range:?}: {} proximity alerts, {} screen-on reminders",
                    summary.proximity_count, summary.screen_on_count
                ),
                Err(err) => error!("failed to load {range:?} stats: {err:?}"),
            }
        }

        core.shutdown().await
    })
}
