mod alarm;
mod api;
mod config;
mod error;
mod http;
mod notify;
mod scheduler;
#[cfg(test)]
mod testutil;

use config::Config;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use notify::bark::mask_token;
use scheduler::GoldWatch;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

const CONFIG_ENV: &str = "GOLDWATCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "icbc.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Configure logger
    Builder::new()
        .filter_level(LevelFilter::Info) // reqwest and hyper stay at info
        .filter_module("goldwatch", LevelFilter::Debug) // cycle summaries are debug
        .parse_default_env() // RUST_LOG still wins
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}:{}] {}",
                ts,
                record.level(),
                record.target(),
                record.line().unwrap_or(0), // caller line, handy when tracing a cycle
                record.args()
            )
        })
        .target(env_logger::Target::Stderr) // stdout stays clean
        .init();

    info!("Starting goldwatch...");

    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = Config::load_or_default(&path)?;
    info!(
        "Loaded config from '{}' (seed {}, step {})",
        path.display(),
        config.alarm.seed,
        config.alarm.step
    );
    for token in &config.bark.token {
        info!("Bark token: {}", mask_token(token));
    }

    let watch = GoldWatch::from_config(&config)?;
    info!("{} notification channels ready", watch.notifier_count());

    // Cloned so the final threshold can still be logged on exit
    let scheduler_handle = tokio::spawn(watch.clone().run(config.schedule.interval()));

    // The scheduler never returns on its own; only a panic ends it early.
    tokio::select! {
        res = scheduler_handle => {
            if let Err(e) = res {
                error!("Scheduler stopped: {}", e);
            }
        },
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                error!("Failed to listen for Ctrl-C: {}", e);
            }
        },
    };

    info!(
        "Shutdown complete, alarm threshold was {}",
        watch.reference().await
    );
    Ok(())
}
