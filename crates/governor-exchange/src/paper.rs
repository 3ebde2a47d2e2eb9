//! Paper exchange for simulation and dry runs.

use async_trait::async_trait;
use governor_core::error::ExchangeError;
use governor_core::traits::ExchangeConnector;
use governor_core::types::{AccountState, ClosedTrade, Direction, OrderFill, PositionSnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct OpenPosition {
    direction: Direction,
    size: f64,
    entry_price: f64,
}

#[derive(Debug)]
struct PaperState {
    equity: Decimal,
    mark_price: f64,
    position: Option<OpenPosition>,
}

/// In-memory exchange that fills market orders at the current mark price
/// plus slippage. One instrument, at most one open position.
pub struct PaperExchange {
    state: Mutex<PaperState>,
    slippage_pct: f64,
}

impl PaperExchange {
    pub fn new(initial_equity: Decimal) -> Self {
        Self {
            state: Mutex::new(PaperState {
                equity: initial_equity,
                mark_price: 0.0,
                position: None,
            }),
            slippage_pct: 0.05, // 0.05% slippage
        }
    }

    pub fn with_slippage(mut self, slippage_pct: f64) -> Self {
        self.slippage_pct = slippage_pct;
        self
    }

    /// Advance the mark price, revaluing the open position.
    pub fn set_mark_price(&self, price: f64) {
        let mut state = self.lock();
        state.mark_price = price;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PaperState> {
        // A poisoned lock means a panic already happened in a holder;
        // the simulation state is still the best we have.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn fill_price(&self, mark: f64, direction: Direction) -> f64 {
        // Buys fill above the mark, sells below
        mark * (1.0 + direction.sign() * self.slippage_pct / 100.0)
    }

    fn unrealized(position: &OpenPosition, mark: f64) -> Decimal {
        let per_unit = position.direction.sign() * (mark - position.entry_price);
        Decimal::try_from(per_unit * position.size).unwrap_or_default()
    }
}

#[async_trait]
impl ExchangeConnector for PaperExchange {
    async fn account(&self) -> Result<AccountState, ExchangeError> {
        let state = self.lock();
        let unrealized = state
            .position
            .as_ref()
            .map(|p| Self::unrealized(p, state.mark_price))
            .unwrap_or(Decimal::ZERO);
        Ok(AccountState {
            equity: state.equity + unrealized,
        })
    }

    async fn position(&self) -> Result<Option<PositionSnapshot>, ExchangeError> {
        let state = self.lock();
        Ok(state.position.as_ref().map(|p| PositionSnapshot {
            direction: p.direction,
            size: p.size,
            entry_price: p.entry_price,
            unrealized_pnl: Self::unrealized(p, state.mark_price),
        }))
    }

    async fn open_position(
        &self,
        direction: Direction,
        size: f64,
    ) -> Result<OrderFill, ExchangeError> {
        if size <= 0.0 {
            return Err(ExchangeError::OrderRejected(format!(
                "non-positive size {size}"
            )));
        }

        let mut state = self.lock();
        if state.position.is_some() {
            return Err(ExchangeError::OrderRejected(
                "a position is already open".to_string(),
            ));
        }
        if state.mark_price <= 0.0 {
            return Err(ExchangeError::OrderRejected(
                "no mark price available".to_string(),
            ));
        }

        let fill_price = self.fill_price(state.mark_price, direction);
        let notional = Decimal::try_from(fill_price * size).unwrap_or_default();
        if notional > state.equity {
            return Err(ExchangeError::InsufficientEquity {
                required: notional,
                available: state.equity,
            });
        }

        let order_id = Uuid::new_v4();
        info!(%order_id, %direction, size, fill_price, "paper fill: open");
        state.position = Some(OpenPosition {
            direction,
            size,
            entry_price: fill_price,
        });

        Ok(OrderFill {
            direction,
            size,
            fill_price,
        })
    }

    async fn close_position(&self) -> Result<ClosedTrade, ExchangeError> {
        let mut state = self.lock();
        let position = state.position.take().ok_or(ExchangeError::NoOpenPosition)?;

        // Closing a long is a sell, so slippage works against us
        let exit_price = self.fill_price(state.mark_price, position.direction.opposite());
        let per_unit = position.direction.sign() * (exit_price - position.entry_price);
        let realized = Decimal::try_from(per_unit * position.size).unwrap_or_default();
        state.equity += realized;

        let order_id = Uuid::new_v4();
        info!(%order_id, %realized, exit_price, "paper fill: close");
        debug!(equity = %state.equity, "paper equity updated");

        Ok(ClosedTrade {
            direction: position.direction,
            size: position.size,
            entry_price: position.entry_price,
            exit_price,
            realized_pnl: Some(realized),
        })
    }

    fn name(&self) -> &str {
        "Paper Exchange"
    }
}

impl Default for PaperExchange {
    fn default() -> Self {
        Self::new(dec!(10000))
    }
}
