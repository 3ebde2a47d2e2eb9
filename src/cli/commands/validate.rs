//! Validate configuration command.

use anyhow::Result;
use governor_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Symbol: {}", config.engine.symbol);
            println!("Exchange connector: {}", config.exchange.connector);
            println!(
                "Admission: {} trades/hour, {} min cooldown",
                config.admission.max_trades_per_hour, config.admission.cooldown_minutes
            );
            println!(
                "Pause after {} losses for {} h",
                config.risk.pause_consecutive_losses, config.risk.pause_duration_hours
            );
            println!(
                "Daily loss limit: {} of equity, shutdown {} h",
                config.risk.daily_loss_limit_pct, config.risk.shutdown_duration_hours
            );
            println!(
                "Planner: {:?} entry, {}x ATR stop, min R:R {}",
                config.execution.entry_mode,
                config.execution.stop_atr_multiplier,
                config.execution.min_rr_ratio
            );
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
