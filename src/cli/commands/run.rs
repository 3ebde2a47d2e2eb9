//! Governed trading loop (paper mode).

use anyhow::{bail, Context, Result};
use chrono::Duration;
use governor_config::{load_config, AppConfig};
use governor_core::error::DataError;
use governor_core::traits::{CandleFeed, ExchangeConnector, Notifier, SignalSource};
use governor_core::types::{Candle, Direction, GovernorEvent, SignalSide};
use governor_data::{CsvCandleFeed, HttpSignalSource};
use governor_engine::{CycleDecision, EngineSettings, TradingGovernor};
use governor_exchange::PaperExchange;
use governor_exec::{ExecutionPlanner, PlanDecision, PositionAgeTracker};
use governor_monitor::{LogNotifier, TelegramNotifier};
use governor_risk::{clamp_proposal, AdmissionGuard, RiskGovernor, StateStore};
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::cli::RunArgs;

pub async fn run(args: RunArgs, config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    info!(
        symbol = %config.engine.symbol,
        connector = %config.exchange.connector,
        "starting governed trading loop"
    );

    if config.exchange.connector != "paper" {
        bail!("unknown exchange connector: {}", config.exchange.connector);
    }
    let exchange = PaperExchange::new(config.exchange.initial_equity)
        .with_slippage(config.exchange.slippage_pct);
    let feed = CsvCandleFeed::new(&config.data.candles_csv)?;
    let api_key = std::env::var(&config.signal.api_key_env).ok();
    let signal_source = HttpSignalSource::new(config.signal.endpoint.clone(), api_key)?;
    let notifier = build_notifier(&config)?;

    let store = StateStore::new(config.state.risk_state_path.clone());
    let settings = EngineSettings {
        pause_after_losses: config.risk.pause_consecutive_losses,
        pause_duration: Duration::hours(config.risk.pause_duration_hours),
        daily_loss_limit_pct: config.risk.daily_loss_limit_pct,
        shutdown_duration: Duration::hours(config.risk.shutdown_duration_hours),
        start_equity: config.exchange.initial_equity,
    };
    let mut governor = TradingGovernor::new(
        settings,
        AdmissionGuard::new(
            config.admission.max_trades_per_hour,
            config.admission.cooldown_minutes,
        ),
        RiskGovernor::load(store),
        ExecutionPlanner::new(config.execution.planner_config()),
        PositionAgeTracker::new(config.execution.time_stop_candles),
    );

    let mut previous = exchange.position().await?;
    let mut interval =
        tokio::time::interval(std::time::Duration::from_secs(config.engine.poll_interval_secs));
    let mut cycle = 0u64;

    loop {
        if !args.fast_replay {
            interval.tick().await;
        }
        if let Some(max) = args.max_cycles {
            if cycle >= max {
                info!(cycle, "reached cycle limit");
                break;
            }
        }
        cycle += 1;

        let candles = match feed.fetch(config.engine.candle_limit).await {
            Ok(candles) => candles,
            Err(DataError::NoDataAvailable) => {
                info!("candle feed exhausted");
                break;
            }
            Err(e) => {
                error!(error = %e, "candle fetch failed");
                continue;
            }
        };
        let Some(last) = candles.last().copied() else {
            continue;
        };
        exchange.set_mark_price(last.close);
        // Replay clock follows the data, not the wall
        let now = last.datetime();

        let current = exchange.position().await?;
        let events = governor.sync_position(previous.as_ref(), current.as_ref(), None, now)?;
        dispatch(notifier.as_ref(), &events).await;

        let report = governor.evaluate_cycle(&candles, current.as_ref(), now)?;
        dispatch(notifier.as_ref(), &report.events).await;
        previous = current;

        match report.decision {
            CycleDecision::Halted { reason } => debug!(%reason, "cycle halted"),
            CycleDecision::Hold => debug!("holding open position"),
            CycleDecision::Blocked { reason } => info!(%reason, "new trade blocked"),
            CycleDecision::ForceExit(advice) => {
                warn!(reason = %advice.reason, "closing stagnant position");
                match exchange.close_position().await {
                    Ok(closed) => {
                        let events =
                            governor.sync_position(previous.as_ref(), None, Some(&closed), now)?;
                        dispatch(notifier.as_ref(), &events).await;
                        previous = None;
                    }
                    Err(e) => error!(error = %e, "failed to close position"),
                }
            }
            CycleDecision::ClearToTrade => {
                if let Err(e) = try_enter(
                    &governor,
                    &exchange,
                    &signal_source,
                    notifier.as_ref(),
                    &config,
                    &candles,
                    last,
                )
                .await
                {
                    error!(error = %e, "entry attempt failed");
                }
            }
        }
    }

    info!("governed trading loop stopped");
    Ok(())
}

fn build_notifier(config: &AppConfig) -> Result<Box<dyn Notifier>> {
    if config.telegram.enabled {
        let token = std::env::var(&config.telegram.bot_token_env)
            .with_context(|| format!("{} not set", config.telegram.bot_token_env))?;
        Ok(Box::new(TelegramNotifier::new(
            token,
            config.telegram.chat_id.clone(),
        )?))
    } else {
        Ok(Box::new(LogNotifier))
    }
}

async fn dispatch(notifier: &dyn Notifier, events: &[GovernorEvent]) {
    for event in events {
        // Delivery failures must not stall the loop
        if let Err(e) = notifier.notify(event).await {
            warn!(error = %e, "event notification failed");
        }
    }
}

/// Ask the signal service for a proposal and act on it if the planner
/// produces a valid setup.
async fn try_enter(
    governor: &TradingGovernor,
    exchange: &PaperExchange,
    signal_source: &HttpSignalSource,
    notifier: &dyn Notifier,
    config: &AppConfig,
    candles: &[Candle],
    last: Candle,
) -> Result<()> {
    let proposal = match signal_source.propose(candles).await {
        Ok(proposal) => proposal,
        Err(e) => {
            warn!(error = %e, "signal service unavailable, skipping cycle");
            return Ok(());
        }
    };
    let proposal = clamp_proposal(proposal, config.risk.max_position_fraction);

    let direction = match proposal.side {
        SignalSide::Long => Direction::Long,
        SignalSide::Short => Direction::Short,
        SignalSide::Flat => {
            debug!("signal is flat");
            return Ok(());
        }
    };
    if proposal.position_fraction <= 0.0 {
        debug!("clamped allocation is zero");
        return Ok(());
    }

    // Advisory stop percentage becomes the structural invalidation level
    let invalidation = proposal
        .stop_loss_pct
        .map(|pct| last.close * (1.0 - direction.sign() * pct / 100.0));

    let plan = match governor.plan_entry(candles, direction, None, invalidation) {
        PlanDecision::Valid(plan) => plan,
        PlanDecision::Rejected { reason } => {
            info!(%reason, "entry rejected by planner");
            return Ok(());
        }
    };

    let equity = exchange.account().await?.equity;
    let size = equity.to_f64().unwrap_or(0.0) * proposal.position_fraction / plan.entry_price;
    if size <= 0.0 {
        debug!("computed size is zero");
        return Ok(());
    }

    info!(
        %direction,
        entry = plan.entry_price,
        stop = plan.stop_loss,
        target = plan.target,
        rr = plan.rr_ratio,
        size,
        "opening position"
    );
    let fill = exchange.open_position(direction, size).await?;

    dispatch(
        notifier,
        &[GovernorEvent::TradeOpened {
            direction,
            size: fill.size,
            entry: fill.fill_price,
            stop: plan.stop_loss,
            target: plan.target,
        }],
    )
    .await;

    Ok(())
}
