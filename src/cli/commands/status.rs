//! Print the persisted risk state.

use anyhow::Result;
use chrono::Utc;
use governor_config::load_config;
use governor_risk::{RiskGovernor, StateStore};
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let store = StateStore::new(config.state.risk_state_path.clone());
    let governor = RiskGovernor::load(store);
    let state = governor.state();

    println!("Risk state ({})", config.state.risk_state_path);
    println!("{}", serde_json::to_string_pretty(state)?);
    println!();

    let now = Utc::now();
    println!("Day P&L: {}", governor.get_day_pnl());
    println!("Consecutive losses: {}", state.consecutive_losses);
    println!("Paused: {}", governor.is_paused_at(now));
    println!("Shut down: {}", governor.is_shutdown_at(now));

    Ok(())
}
