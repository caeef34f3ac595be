// src/arbitrage/orchestrator.rs
//! One decision cycle per iteration: fetch fresh state, rebalance or search
//! for a route, gate on re-quoted profit, execute, sleep. Exactly one cycle
//! is in flight at a time; every error is caught at the iteration boundary
//! and the loop moves on.

use super::calculator::{find_best_route, SearchParams};
use super::confirmation::{await_confirmation, CommitmentLevel, PollerSettings, TxStatusSource};
use super::math;
use super::rebalance::RebalancePolicy;
use super::types::{
    ArbitrageRoute, InventoryState, RebalanceAction, ReserveSnapshot, RouteDirection, SubmittedTx,
};
use crate::bridge::{BridgeAsset, BridgeClient};
use crate::config::Config;
use crate::error::ArbError;
use crate::ethereum::EthereumVenue;
use crate::events::{BotEvent, EventSink};
use crate::price::CachedCrossRate;
use crate::solana::SolanaVenue;
use futures::future::join_all;
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

pub struct ArbitrageOrchestrator {
    config: Arc<Config>,
    solana: Arc<dyn SolanaVenue>,
    ethereum: Arc<dyn EthereumVenue>,
    bridge: Arc<dyn BridgeClient>,
    tx_status: Arc<dyn TxStatusSource>,
    cross_rate: CachedCrossRate,
    events: Arc<dyn EventSink>,
    search_params: SearchParams,
    rebalance_policy: RebalancePolicy,
    poller_settings: PollerSettings,
}

impl ArbitrageOrchestrator {
    pub fn new(
        config: Arc<Config>,
        solana: Arc<dyn SolanaVenue>,
        ethereum: Arc<dyn EthereumVenue>,
        bridge: Arc<dyn BridgeClient>,
        tx_status: Arc<dyn TxStatusSource>,
        cross_rate: CachedCrossRate,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let search_params = SearchParams {
            step_tokens: config.scan_step_tokens,
            inventory_fraction: config.scan_inventory_fraction,
            liquidity_guard: config.liquidity_guard_fraction,
            token_decimals_sol: config.token_decimals_sol,
        };
        let rebalance_policy = RebalancePolicy::from_config(&config);
        let poller_settings = PollerSettings {
            status_interval: Duration::from_millis(config.status_poll_interval_ms),
            height_interval: Duration::from_millis(config.height_poll_interval_ms),
            timeout: Duration::from_secs(config.confirm_timeout_secs),
        };
        Self {
            config,
            solana,
            ethereum,
            bridge,
            tx_status,
            cross_rate,
            events,
            search_params,
            rebalance_policy,
            poller_settings,
        }
    }

    /// Run until the process is terminated. Per-iteration failures are
    /// reported and followed by the fixed sleep, never propagated.
    pub async fn run(&self) {
        let mut iteration: u64 = 0;
        loop {
            iteration += 1;
            self.events.emit(&BotEvent::IterationStarted { iteration });
            if let Err(e) = self.run_iteration(iteration).await {
                self.events.emit(&BotEvent::IterationFailed {
                    iteration,
                    error: e.to_string(),
                });
            }
            info!(
                "Sleeping {}s until the next iteration",
                self.config.sleep_between_iterations_secs
            );
            sleep(Duration::from_secs(self.config.sleep_between_iterations_secs)).await;
        }
    }

    pub async fn run_iteration(&self, iteration: u64) -> Result<(), ArbError> {
        let (inventory, reserves) = self.fetch_state(iteration).await?;
        self.events.emit(&BotEvent::InventoryRefreshed { inventory });

        // Rebalance preempts arbitrage: a skewed book would produce routes
        // that cannot be executed anyway.
        let actions = self.rebalance_policy.evaluate(&inventory);
        if !actions.is_empty() {
            self.execute_rebalances(actions).await;
            return Ok(());
        }

        let route = find_best_route(&inventory, &reserves, &self.search_params);
        if route.is_none() {
            self.events.emit(&BotEvent::NoProfitableRoute);
            return Ok(());
        }
        self.events.emit(&BotEvent::RouteFound {
            direction: route.direction,
            input_tokens: route.input_tokens,
            expected_profit_tokens: route.expected_profit_tokens,
            expected_profit_sol: route.expected_profit_sol,
        });

        // Re-quote the token profit into SOL before gating. No route for the
        // profit leg means the profit cannot be realized, not a failure.
        let token_unit = 10f64.powi(self.config.token_decimals_sol as i32);
        let profit_raw = (route.expected_profit_tokens * token_unit).floor() as u64;
        let quoted = self
            .solana
            .quote(&self.config.token_mint_sol, &self.config.wsol_mint, profit_raw)
            .await;
        let profit_sol = match quoted {
            Ok(quote) => quote.other_amount_threshold as f64 / math::LAMPORTS_PER_SOL,
            Err(ArbError::NoRouteFound(detail)) => {
                self.events.emit(&BotEvent::ExecutionSkipped {
                    reason: format!("no route to value profit in SOL: {}", detail),
                });
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if profit_sol <= self.config.profit_threshold_sol {
            self.events.emit(&BotEvent::ProfitBelowThreshold {
                expected_sol: profit_sol,
                threshold_sol: self.config.profit_threshold_sol,
            });
            return Ok(());
        }

        if self.config.dry_run {
            self.events.emit(&BotEvent::ExecutionSkipped {
                reason: format!(
                    "dry-run: would execute {} with {} tokens for ~{:.6} SOL",
                    route.direction, route.input_tokens, profit_sol
                ),
            });
            return Ok(());
        }

        self.execute_route(&route).await
    }

    /// The five read-only fetches have no ordering dependency; issue them
    /// concurrently and join before computing.
    async fn fetch_state(
        &self,
        iteration: u64,
    ) -> Result<(InventoryState, ReserveSnapshot), ArbError> {
        let (token_on_sol, weth_on_sol, sol_on_sol, token_on_eth, eth_on_eth, curve, pair, cross_rate) =
            tokio::try_join!(
                self.solana.get_token_balance(&self.config.token_mint_sol),
                self.solana.get_token_balance(&self.config.weth_mint_sol),
                self.solana.get_sol_balance(),
                self.ethereum.get_token_balance(),
                self.ethereum.get_eth_balance(),
                self.solana.get_curve_reserves(),
                self.ethereum.get_pair_reserves(),
                self.cross_rate.get(iteration),
            )?;

        let inventory = InventoryState {
            token_on_sol,
            token_on_eth,
            weth_on_sol,
            eth_on_eth,
            sol_on_sol,
        };
        let (pair_reserve_weth, pair_reserve_token) = pair;
        let reserves = ReserveSnapshot {
            pair_reserve_weth,
            pair_reserve_token,
            curve_base: curve.base,
            curve_quote: curve.quote,
            cross_rate,
        };
        Ok((inventory, reserves))
    }

    /// Actions address disjoint assets/chains and may run together; each
    /// individual action submits and confirms sequentially.
    async fn execute_rebalances(&self, actions: Vec<RebalanceAction>) {
        for action in &actions {
            self.events
                .emit(&BotEvent::RebalanceTriggered { action: action.clone() });
        }
        let results = join_all(actions.iter().map(|a| self.execute_rebalance(a))).await;
        for (action, result) in actions.iter().zip(results) {
            match result {
                Ok(tx_ref) => self.events.emit(&BotEvent::RebalanceCompleted {
                    action: action.clone(),
                    tx_ref,
                }),
                Err(e) => self.events.emit(&BotEvent::RebalanceFailed {
                    action: action.clone(),
                    error: e.to_string(),
                }),
            }
        }
    }

    async fn execute_rebalance(&self, action: &RebalanceAction) -> Result<String, ArbError> {
        match action {
            RebalanceAction::SellSettlementExcess { amount_sol } => {
                if self.config.dry_run {
                    return Ok(format!("dry-run: would sell {:.4} SOL", amount_sol));
                }
                let lamports = (amount_sol * math::LAMPORTS_PER_SOL).floor() as u64;
                let quote = self
                    .solana
                    .quote(&self.config.wsol_mint, &self.config.token_mint_sol, lamports)
                    .await?;
                let tx = self.solana.execute_swap(&quote).await?;
                self.confirm(&tx).await?;
                Ok(tx.signature)
            }
            RebalanceAction::BridgeCounterAsset { amount_eth, to } => {
                self.bridge
                    .transfer(BridgeAsset::CounterAsset, *amount_eth, *to)
                    .await
            }
            RebalanceAction::BridgeToken { amount_tokens, to } => {
                self.bridge
                    .transfer(BridgeAsset::Token, *amount_tokens, *to)
                    .await
            }
        }
    }

    async fn execute_route(&self, route: &ArbitrageRoute) -> Result<(), ArbError> {
        match route.direction {
            RouteDirection::SellEthBuySol => self.execute_sell_eth_buy_sol(route).await?,
            RouteDirection::SellSolBuyEth => self.execute_sell_sol_buy_eth(route).await?,
            RouteDirection::None => return Ok(()),
        }
        self.events.emit(&BotEvent::TradeCompleted {
            direction: route.direction,
            input_tokens: route.input_tokens,
        });
        Ok(())
    }

    /// Both legs dispatch together. There is no compensation path: if one leg
    /// lands and the other fails, capital is one-sided and the partial state
    /// is surfaced for the operator instead of being silently retried.
    async fn execute_sell_eth_buy_sol(&self, route: &ArbitrageRoute) -> Result<(), ArbError> {
        let weth_unit = 10f64.powi(self.config.weth_decimals_sol as i32);
        let weth_raw = (route.cross_chain_eth * weth_unit).floor() as u64;

        let sol_leg = async {
            let quote = self
                .solana
                .quote(&self.config.weth_mint_sol, &self.config.token_mint_sol, weth_raw)
                .await?;
            let tx = self.solana.execute_swap(&quote).await?;
            self.confirm(&tx).await?;
            Ok::<String, ArbError>(tx.signature)
        };
        let eth_leg = self.ethereum.swap_token_for_eth(route.input_tokens);

        let (sol_result, eth_result) = tokio::join!(sol_leg, eth_leg);
        match (sol_result, eth_result) {
            (Ok(sol_sig), Ok(eth_tx)) => {
                self.events.emit(&BotEvent::LegConfirmed {
                    leg: "solana buy".to_string(),
                    tx_ref: sol_sig,
                });
                self.events.emit(&BotEvent::LegConfirmed {
                    leg: "ethereum sell".to_string(),
                    tx_ref: eth_tx,
                });
                Ok(())
            }
            (Ok(sol_sig), Err(e)) => {
                self.events.emit(&BotEvent::PartialExecution {
                    landed_leg: format!("solana buy ({})", sol_sig),
                    failed_leg: "ethereum sell".to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
            (Err(e), Ok(eth_tx)) => {
                self.events.emit(&BotEvent::PartialExecution {
                    landed_leg: format!("ethereum sell ({})", eth_tx),
                    failed_leg: "solana buy".to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
            (Err(sol_err), Err(_eth_err)) => Err(sol_err),
        }
    }

    /// Sequential by construction: each intermediate output sizes the next
    /// leg. A failure after the Solana sell leaves the loop open on Ethereum,
    /// which is surfaced as a partial execution.
    async fn execute_sell_sol_buy_eth(&self, route: &ArbitrageRoute) -> Result<(), ArbError> {
        let token_raw = route
            .input_tokens
            .saturating_mul(10u64.pow(self.config.token_decimals_sol));

        let sell_quote = self
            .solana
            .quote(&self.config.token_mint_sol, &self.config.wsol_mint, token_raw)
            .await?;
        let sell_tx = self.solana.execute_swap(&sell_quote).await?;
        self.confirm(&sell_tx).await?;
        self.events.emit(&BotEvent::LegConfirmed {
            leg: "solana sell".to_string(),
            tx_ref: sell_tx.signature.clone(),
        });

        let weth_quote = self
            .solana
            .quote(
                &self.config.wsol_mint,
                &self.config.weth_mint_sol,
                sell_quote.other_amount_threshold,
            )
            .await?;
        let weth_tx = self.solana.execute_swap(&weth_quote).await?;
        self.confirm(&weth_tx).await?;
        self.events.emit(&BotEvent::LegConfirmed {
            leg: "solana sol->weth".to_string(),
            tx_ref: weth_tx.signature.clone(),
        });

        match self.ethereum.swap_eth_for_token(route.cross_chain_eth).await {
            Ok(eth_tx) => {
                self.events.emit(&BotEvent::LegConfirmed {
                    leg: "ethereum buy".to_string(),
                    tx_ref: eth_tx,
                });
                Ok(())
            }
            Err(e) => {
                self.events.emit(&BotEvent::PartialExecution {
                    landed_leg: format!("solana sell ({})", sell_tx.signature),
                    failed_leg: "ethereum buy".to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn confirm(&self, tx: &SubmittedTx) -> Result<(), ArbError> {
        await_confirmation(
            self.tx_status.as_ref(),
            &tx.signature,
            tx.last_valid_block_height,
            CommitmentLevel::Confirmed,
            &self.poller_settings,
        )
        .await
    }
}
