//! Configuration structures.

use governor_exec::{EntryMode, PlannerConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub exchange: ExchangeSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub signal: SignalSettings,
    #[serde(default)]
    pub admission: AdmissionSettings,
    #[serde(default)]
    pub risk: RiskSettings,
    #[serde(default)]
    pub execution: ExecutionSettings,
    #[serde(default)]
    pub engine: EngineLoopSettings,
    #[serde(default)]
    pub state: StateSettings,
    #[serde(default)]
    pub telegram: TelegramSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "trading-governor".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Exchange connector settings. Only the paper connector ships for now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeSettings {
    pub connector: String,
    pub initial_equity: Decimal,
    /// Paper fill slippage as a percentage of the mark price
    pub slippage_pct: f64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            connector: "paper".to_string(),
            initial_equity: dec!(10000),
            slippage_pct: 0.05,
        }
    }
}

/// Candle data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    /// CSV file the replay feed reads from
    pub candles_csv: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            candles_csv: "data/candles.csv".to_string(),
        }
    }
}

/// Signal-service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSettings {
    pub endpoint: String,
    /// Environment variable holding the API key, if the service needs one
    pub api_key_env: String,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8787/signal".to_string(),
            api_key_env: "SIGNAL_API_KEY".to_string(),
        }
    }
}

/// Trade-frequency admission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionSettings {
    pub max_trades_per_hour: usize,
    pub cooldown_minutes: i64,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            max_trades_per_hour: 2,
            cooldown_minutes: 30,
        }
    }
}

/// Circuit-breaker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskSettings {
    pub pause_consecutive_losses: u32,
    pub pause_duration_hours: i64,
    /// Daily loss limit as a fraction of starting equity
    pub daily_loss_limit_pct: Decimal,
    pub shutdown_duration_hours: i64,
    /// Hard cap on the signal's proposed position fraction
    pub max_position_fraction: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            pause_consecutive_losses: 3,
            pause_duration_hours: 4,
            daily_loss_limit_pct: dec!(0.06),
            shutdown_duration_hours: 24,
            max_position_fraction: 0.5,
        }
    }
}

/// Entry/exit planning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSettings {
    pub entry_mode: EntryMode,
    pub atr_period: usize,
    pub stop_atr_multiplier: f64,
    pub min_rr_ratio: f64,
    pub time_stop_candles: u32,
    pub retest_offset_bps: f64,
    pub stagnation_move_pct: f64,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        let planner = PlannerConfig::default();
        Self {
            entry_mode: planner.entry_mode,
            atr_period: planner.atr_period,
            stop_atr_multiplier: planner.stop_atr_multiplier,
            min_rr_ratio: planner.min_rr_ratio,
            time_stop_candles: planner.time_stop_candles,
            retest_offset_bps: planner.retest_offset_bps,
            stagnation_move_pct: planner.stagnation_move_pct,
        }
    }
}

impl ExecutionSettings {
    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            entry_mode: self.entry_mode,
            atr_period: self.atr_period,
            stop_atr_multiplier: self.stop_atr_multiplier,
            min_rr_ratio: self.min_rr_ratio,
            time_stop_candles: self.time_stop_candles,
            retest_offset_bps: self.retest_offset_bps,
            stagnation_move_pct: self.stagnation_move_pct,
        }
    }
}

/// Polling-loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineLoopSettings {
    pub symbol: String,
    pub poll_interval_secs: u64,
    /// Candle window size fetched each cycle
    pub candle_limit: usize,
}

impl Default for EngineLoopSettings {
    fn default() -> Self {
        Self {
            symbol: "ETH/USDC".to_string(),
            poll_interval_secs: 300,
            candle_limit: 120,
        }
    }
}

/// State persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSettings {
    pub risk_state_path: String,
}

impl Default for StateSettings {
    fn default() -> Self {
        Self {
            risk_state_path: "state/risk_state.json".to_string(),
        }
    }
}

/// Telegram notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    pub enabled: bool,
    pub bot_token_env: String,
    pub chat_id: String,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            chat_id: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_config;
    use rust_decimal_macros::dec;
    use std::io::Write as _;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.admission.max_trades_per_hour, 2);
        assert_eq!(config.admission.cooldown_minutes, 30);
        assert_eq!(config.risk.pause_consecutive_losses, 3);
        assert_eq!(config.risk.daily_loss_limit_pct, dec!(0.06));
        assert_eq!(config.execution.entry_mode, EntryMode::BreakRetest);
        assert_eq!(config.execution.time_stop_candles, 8);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[risk]\npause_consecutive_losses = 5\npause_duration_hours = 2\n\
             daily_loss_limit_pct = \"0.10\"\nshutdown_duration_hours = 12\n\
             max_position_fraction = 0.25\n\n[execution]\nentry_mode = \"pullback\"\n\
             atr_period = 20\nstop_atr_multiplier = 2.0\nmin_rr_ratio = 1.5\n\
             time_stop_candles = 12\nretest_offset_bps = 10.0\nstagnation_move_pct = 0.005"
        )
        .unwrap();
        file.flush().unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.risk.pause_consecutive_losses, 5);
        assert_eq!(config.risk.daily_loss_limit_pct, dec!(0.10));
        assert_eq!(config.execution.entry_mode, EntryMode::Pullback);
        // Sections absent from the file fall back to defaults
        assert_eq!(config.admission.max_trades_per_hour, 2);
        assert_eq!(config.engine.poll_interval_secs, 300);
    }
}
