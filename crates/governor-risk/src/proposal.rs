//! Clamping of advisory signal proposals.

use governor_core::types::{ProposedSignal, SignalSide};

/// Clamp a raw proposal to the configured equity-fraction cap.
///
/// Flat proposals carry no allocation regardless of what the service
/// suggested.
pub fn clamp_proposal(mut proposal: ProposedSignal, equity_fraction_cap: f64) -> ProposedSignal {
    proposal.position_fraction = proposal.position_fraction.min(equity_fraction_cap).max(0.0);
    if proposal.side == SignalSide::Flat {
        proposal.position_fraction = 0.0;
    }
    proposal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_to_cap() {
        let raw = ProposedSignal {
            side: SignalSide::Long,
            position_fraction: 0.8,
            stop_loss_pct: None,
            take_profit_pct: None,
        };
        let clamped = clamp_proposal(raw, 0.5);
        assert!((clamped.position_fraction - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_flat_zeroes_allocation() {
        let raw = ProposedSignal {
            side: SignalSide::Flat,
            position_fraction: 0.3,
            stop_loss_pct: None,
            take_profit_pct: None,
        };
        let clamped = clamp_proposal(raw, 0.5);
        assert_eq!(clamped.position_fraction, 0.0);
    }

    #[test]
    fn test_negative_fraction_floors_at_zero() {
        let raw = ProposedSignal {
            side: SignalSide::Short,
            position_fraction: -0.1,
            stop_loss_pct: None,
            take_profit_pct: None,
        };
        let clamped = clamp_proposal(raw, 0.5);
        assert_eq!(clamped.position_fraction, 0.0);
    }
}
