// src/events/mod.rs
//! Structured event emission consumed by the orchestrator. Decision logic
//! never prints; it emits typed events and a sink decides what to do with
//! them. The default sink logs; tests record.

use crate::arbitrage::types::{InventoryState, RebalanceAction, RouteDirection};
use log::{error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    IterationStarted {
        iteration: u64,
    },
    IterationFailed {
        iteration: u64,
        error: String,
    },
    InventoryRefreshed {
        inventory: InventoryState,
    },
    RebalanceTriggered {
        action: RebalanceAction,
    },
    RebalanceCompleted {
        action: RebalanceAction,
        tx_ref: String,
    },
    RebalanceFailed {
        action: RebalanceAction,
        error: String,
    },
    NoProfitableRoute,
    RouteFound {
        direction: RouteDirection,
        input_tokens: u64,
        expected_profit_tokens: f64,
        expected_profit_sol: f64,
    },
    ProfitBelowThreshold {
        expected_sol: f64,
        threshold_sol: f64,
    },
    ExecutionSkipped {
        reason: String,
    },
    LegConfirmed {
        leg: String,
        tx_ref: String,
    },
    /// One leg of a two-leg trade landed while the other did not: capital is
    /// now one-sided. Surfaced loudly, never auto-corrected.
    PartialExecution {
        landed_leg: String,
        failed_leg: String,
        error: String,
    },
    TradeCompleted {
        direction: RouteDirection,
        input_tokens: u64,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &BotEvent);
}

/// Default sink: renders events through the logger.
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: &BotEvent) {
        match event {
            BotEvent::IterationStarted { iteration } => {
                info!("--- Iteration {} ---", iteration)
            }
            BotEvent::IterationFailed { iteration, error } => {
                error!("Iteration {} failed: {}", iteration, error)
            }
            BotEvent::InventoryRefreshed { inventory } => info!(
                "Inventory: token {:.2}/{:.2} (sol/eth), counter {:.6}/{:.6} (weth-sol/eth-eth), {:.4} SOL",
                inventory.token_on_sol,
                inventory.token_on_eth,
                inventory.weth_on_sol,
                inventory.eth_on_eth,
                inventory.sol_on_sol
            ),
            BotEvent::RebalanceTriggered { action } => {
                info!("Rebalance triggered: {}", action)
            }
            BotEvent::RebalanceCompleted { action, tx_ref } => {
                info!("Rebalance completed ({}): {}", tx_ref, action)
            }
            BotEvent::RebalanceFailed { action, error } => {
                warn!("Rebalance failed ({}): {}", action, error)
            }
            BotEvent::NoProfitableRoute => info!("No profitable route this cycle"),
            BotEvent::RouteFound {
                direction,
                input_tokens,
                expected_profit_tokens,
                expected_profit_sol,
            } => info!(
                "Route found: {} size={} tokens, expected profit {:.4} tokens (~{:.6} SOL)",
                direction, input_tokens, expected_profit_tokens, expected_profit_sol
            ),
            BotEvent::ProfitBelowThreshold {
                expected_sol,
                threshold_sol,
            } => info!(
                "Skipping: expected profit {:.6} SOL below threshold {:.6} SOL",
                expected_sol, threshold_sol
            ),
            BotEvent::ExecutionSkipped { reason } => info!("Execution skipped: {}", reason),
            BotEvent::LegConfirmed { leg, tx_ref } => {
                info!("Leg confirmed: {} ({})", leg, tx_ref)
            }
            BotEvent::PartialExecution {
                landed_leg,
                failed_leg,
                error,
            } => error!(
                "PARTIAL EXECUTION: '{}' landed but '{}' failed ({}). Inventory is one-sided; manual review required.",
                landed_leg, failed_leg, error
            ),
            BotEvent::TradeCompleted {
                direction,
                input_tokens,
            } => info!("Trade completed: {} size={} tokens", direction, input_tokens),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every event for assertions.
    #[derive(Default)]
    pub struct RecordingEventSink {
        pub events: Mutex<Vec<BotEvent>>,
    }

    impl RecordingEventSink {
        pub fn contains(&self, predicate: impl Fn(&BotEvent) -> bool) -> bool {
            self.events.lock().unwrap().iter().any(|e| predicate(e))
        }
    }

    impl EventSink for RecordingEventSink {
        fn emit(&self, event: &BotEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }
}
