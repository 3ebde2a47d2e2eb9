//! Proposed decisions from the signal-generation service.

use serde::{Deserialize, Serialize};

/// Proposed side from the signal service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSide {
    Long,
    Short,
    Flat,
}

/// A proposed decision from the signal service.
///
/// All fields beyond `side` are advisory; the governor's own planner
/// decides the actual entry, stop, and target. The service's internal
/// reasoning is opaque to the governor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedSignal {
    pub side: SignalSide,
    /// Fraction of equity the service suggests allocating (0..=0.5)
    #[serde(default)]
    pub position_fraction: f64,
    /// Suggested stop distance as a percentage of entry
    #[serde(default)]
    pub stop_loss_pct: Option<f64>,
    /// Suggested target distance as a percentage of entry
    #[serde(default)]
    pub take_profit_pct: Option<f64>,
}

impl ProposedSignal {
    /// A flat proposal with no allocation.
    pub fn flat() -> Self {
        Self {
            side: SignalSide::Flat,
            position_fraction: 0.0,
            stop_loss_pct: None,
            take_profit_pct: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let signal: ProposedSignal = serde_json::from_str(r#"{"side":"long"}"#).unwrap();
        assert_eq!(signal.side, SignalSide::Long);
        assert_eq!(signal.position_fraction, 0.0);
        assert!(signal.stop_loss_pct.is_none());
    }

    #[test]
    fn test_deserialize_full() {
        let raw = r#"{"side":"short","position_fraction":0.25,"stop_loss_pct":1.5,"take_profit_pct":3.0}"#;
        let signal: ProposedSignal = serde_json::from_str(raw).unwrap();
        assert_eq!(signal.side, SignalSide::Short);
        assert!((signal.position_fraction - 0.25).abs() < 1e-9);
        assert_eq!(signal.stop_loss_pct, Some(1.5));
    }
}
