// src/arbitrage/rebalance.rs
//! Inventory rebalance policy, evaluated once per iteration before the route
//! search. Pure decision logic: totals are captured at entry and never
//! re-read, so one call is internally consistent even though real balances
//! may move before a triggered transfer executes.

use super::types::{Chain, InventoryState, RebalanceAction};
use crate::config::Config;

#[derive(Debug, Clone, Copy)]
pub struct RebalancePolicy {
    /// SOL balance above which the excess is sold (same-chain swap).
    pub settlement_ceiling: f64,
    /// SOL balance the sell-down leaves behind.
    pub settlement_floor: f64,
    /// Per-chain share below which a bridge transfer fires.
    pub trigger_fraction: f64,
    /// Per-chain share a transfer restores.
    pub target_fraction: f64,
    /// Transfers smaller than this are not worth their fixed costs.
    pub dust_threshold: f64,
}

impl Default for RebalancePolicy {
    fn default() -> Self {
        Self {
            settlement_ceiling: 1.99,
            settlement_floor: 1.0,
            trigger_fraction: 0.25,
            target_fraction: 0.5,
            dust_threshold: 0.0001,
        }
    }
}

impl RebalancePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            settlement_ceiling: config.sol_balance_ceiling,
            settlement_floor: config.sol_balance_floor,
            trigger_fraction: config.rebalance_trigger_fraction,
            target_fraction: config.rebalance_target_fraction,
            dust_threshold: config.rebalance_dust_threshold,
        }
    }

    /// Evaluate every rule independently and return all that fire. Exact
    /// boundary values never trigger (strict comparisons throughout).
    pub fn evaluate(&self, inventory: &InventoryState) -> Vec<RebalanceAction> {
        let mut actions = Vec::new();

        if inventory.sol_on_sol > self.settlement_ceiling {
            let amount_sol = inventory.sol_on_sol - self.settlement_floor;
            if amount_sol > self.dust_threshold {
                actions.push(RebalanceAction::SellSettlementExcess { amount_sol });
            }
        }

        let counter_total = inventory.counter_total();
        if counter_total > 0.0 {
            if inventory.eth_on_eth < self.trigger_fraction * counter_total {
                let amount_eth = self.target_fraction * counter_total - inventory.eth_on_eth;
                if amount_eth > self.dust_threshold {
                    actions.push(RebalanceAction::BridgeCounterAsset {
                        amount_eth,
                        to: Chain::Ethereum,
                    });
                }
            } else if inventory.weth_on_sol < self.trigger_fraction * counter_total {
                let amount_eth = self.target_fraction * counter_total - inventory.weth_on_sol;
                if amount_eth > self.dust_threshold {
                    actions.push(RebalanceAction::BridgeCounterAsset {
                        amount_eth,
                        to: Chain::Solana,
                    });
                }
            }
        }

        let token_total = inventory.token_total();
        if token_total > 0.0 {
            if inventory.token_on_eth < self.trigger_fraction * token_total {
                // Whole tokens bridge as integers.
                let amount_tokens =
                    (self.target_fraction * token_total - inventory.token_on_eth).floor();
                if amount_tokens > 0.0 {
                    actions.push(RebalanceAction::BridgeToken {
                        amount_tokens,
                        to: Chain::Ethereum,
                    });
                }
            } else if inventory.token_on_sol < self.trigger_fraction * token_total {
                let amount_tokens =
                    (self.target_fraction * token_total - inventory.token_on_sol).floor();
                if amount_tokens > 0.0 {
                    actions.push(RebalanceAction::BridgeToken {
                        amount_tokens,
                        to: Chain::Solana,
                    });
                }
            }
        }

        actions
    }
}
