//! Discrete events exposed to the notification channel.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Direction;

/// An event the governor reports to the notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GovernorEvent {
    TradeOpened {
        direction: Direction,
        size: f64,
        entry: f64,
        stop: f64,
        target: f64,
    },
    TradeClosed {
        direction: Direction,
        size: f64,
        entry: f64,
        exit: f64,
        pnl: Decimal,
    },
    Paused {
        reason: String,
        #[serde(with = "duration_secs")]
        duration: Duration,
    },
    Shutdown {
        reason: String,
        #[serde(with = "duration_secs")]
        duration: Duration,
    },
}

impl GovernorEvent {
    /// Human-readable message for the notification channel.
    pub fn describe(&self) -> String {
        match self {
            GovernorEvent::TradeOpened {
                direction,
                size,
                entry,
                stop,
                target,
            } => format!(
                "Opened {direction} {size:.4} @ {entry:.2} (stop {stop:.2}, target {target:.2})"
            ),
            GovernorEvent::TradeClosed {
                direction,
                size,
                entry,
                exit,
                pnl,
            } => format!("Closed {direction} {size:.4} @ {exit:.2} (entry {entry:.2}, pnl {pnl:+})"),
            GovernorEvent::Paused { reason, duration } => {
                format!("Trading paused for {}m: {reason}", duration.num_minutes())
            }
            GovernorEvent::Shutdown { reason, duration } => {
                format!("Trading shut down for {}h: {reason}", duration.num_hours())
            }
        }
    }
}

mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(de)?;
        Ok(Duration::seconds(secs))
    }
}
