//! Configuration management.

mod settings;

pub use settings::{
    AdmissionSettings, AppConfig, AppSettings, DataSettings, EngineLoopSettings,
    ExchangeSettings, ExecutionSettings, LoggingConfig, RiskSettings, SignalSettings,
    StateSettings, TelegramSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("GOVERNOR")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
