// src/arbitrage/tests.rs
#[cfg(test)]
mod tests {
    use crate::arbitrage::confirmation::{CommitmentLevel, TxStatus, TxStatusSource};
    use crate::arbitrage::orchestrator::ArbitrageOrchestrator;
    use crate::arbitrage::types::{Chain, SubmittedTx};
    use crate::bridge::{BridgeAsset, BridgeClient};
    use crate::config::Config;
    use crate::error::ArbError;
    use crate::ethereum::EthereumVenue;
    use crate::events::testing::RecordingEventSink;
    use crate::events::BotEvent;
    use crate::price::{CachedCrossRate, CrossRateSource};
    use crate::solana::jupiter::SwapQuote;
    use crate::solana::{CurveReserves, SolanaVenue};
    use async_trait::async_trait;
    use num_bigint::BigUint;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const TOKEN_MINT: &str = "TOKENMINT";
    const WETH_MINT: &str = "WETHMINT";

    struct MockSolana {
        token_balance: f64,
        weth_balance: f64,
        sol_balance: f64,
        curve: CurveReserves,
        fail_balances: bool,
        /// `other_amount_threshold` every quote reports
        quote_out: u64,
        executed: AtomicUsize,
    }

    impl MockSolana {
        fn new(quote_out: u64) -> Self {
            Self {
                token_balance: 1000.0,
                weth_balance: 5.0,
                sol_balance: 1.0,
                // 1e7 whole tokens against 500 SOL: half the pair price.
                curve: CurveReserves {
                    base: 1e13,
                    quote: 5e11,
                },
                fail_balances: false,
                quote_out,
                executed: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SolanaVenue for MockSolana {
        async fn get_sol_balance(&self) -> Result<f64, ArbError> {
            if self.fail_balances {
                return Err(ArbError::RpcError("node unreachable".to_string()));
            }
            Ok(self.sol_balance)
        }

        async fn get_token_balance(&self, mint: &str) -> Result<f64, ArbError> {
            if self.fail_balances {
                return Err(ArbError::RpcError("node unreachable".to_string()));
            }
            Ok(if mint == TOKEN_MINT {
                self.token_balance
            } else {
                self.weth_balance
            })
        }

        async fn get_curve_reserves(&self) -> Result<CurveReserves, ArbError> {
            Ok(self.curve)
        }

        async fn quote(
            &self,
            input_mint: &str,
            output_mint: &str,
            amount: u64,
        ) -> Result<SwapQuote, ArbError> {
            Ok(SwapQuote {
                input_mint: input_mint.to_string(),
                output_mint: output_mint.to_string(),
                in_amount: amount,
                out_amount: self.quote_out,
                other_amount_threshold: self.quote_out,
                raw: serde_json::Value::Null,
            })
        }

        async fn execute_swap(&self, _quote: &SwapQuote) -> Result<SubmittedTx, ArbError> {
            let seq = self.executed.fetch_add(1, Ordering::SeqCst);
            Ok(SubmittedTx {
                signature: format!("mock-sig-{}", seq),
                last_valid_block_height: 1000,
            })
        }
    }

    struct MockEthereum {
        token_balance: f64,
        eth_balance: f64,
        swap_fails: bool,
        swaps: AtomicUsize,
    }

    impl MockEthereum {
        fn new() -> Self {
            Self {
                token_balance: 1000.0,
                eth_balance: 5.0,
                swap_fails: false,
                swaps: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EthereumVenue for MockEthereum {
        async fn get_eth_balance(&self) -> Result<f64, ArbError> {
            Ok(self.eth_balance)
        }

        async fn get_token_balance(&self) -> Result<f64, ArbError> {
            Ok(self.token_balance)
        }

        async fn get_pair_reserves(&self) -> Result<(BigUint, BigUint), ArbError> {
            // 10 WETH against 1e6 whole tokens: 1e-5 WETH per token.
            let weth = BigUint::from(10u64) * BigUint::from(10u64).pow(18);
            let token = BigUint::from(1_000_000u64) * BigUint::from(10u64).pow(18);
            Ok((weth, token))
        }

        async fn swap_token_for_eth(&self, _amount_tokens: u64) -> Result<String, ArbError> {
            self.swaps.fetch_add(1, Ordering::SeqCst);
            if self.swap_fails {
                return Err(ArbError::TransactionFailed("execution reverted".to_string()));
            }
            Ok("0xmock-eth-tx".to_string())
        }

        async fn swap_eth_for_token(&self, _amount_eth: f64) -> Result<String, ArbError> {
            self.swaps.fetch_add(1, Ordering::SeqCst);
            if self.swap_fails {
                return Err(ArbError::TransactionFailed("execution reverted".to_string()));
            }
            Ok("0xmock-eth-tx".to_string())
        }
    }

    #[derive(Default)]
    struct MockBridge {
        transfers: Mutex<Vec<(BridgeAsset, f64, Chain)>>,
    }

    #[async_trait]
    impl BridgeClient for MockBridge {
        async fn transfer(
            &self,
            asset: BridgeAsset,
            amount: f64,
            destination: Chain,
        ) -> Result<String, ArbError> {
            self.transfers.lock().unwrap().push((asset, amount, destination));
            Ok("mock-bridge-tx".to_string())
        }
    }

    struct InstantConfirm;

    #[async_trait]
    impl TxStatusSource for InstantConfirm {
        async fn get_status(&self, _tx_ref: &str) -> Result<TxStatus, ArbError> {
            Ok(TxStatus::Confirmed(CommitmentLevel::Confirmed))
        }

        async fn get_current_height(&self) -> Result<u64, ArbError> {
            Ok(1)
        }
    }

    struct FixedRate(f64);

    #[async_trait]
    impl CrossRateSource for FixedRate {
        async fn fetch_cross_rate(&self) -> Result<f64, ArbError> {
            Ok(self.0)
        }
    }

    fn test_config(dry_run: bool) -> Arc<Config> {
        let mut config = Config::from_env();
        config.token_mint_sol = TOKEN_MINT.to_string();
        config.weth_mint_sol = WETH_MINT.to_string();
        config.dry_run = dry_run;
        config.token_decimals_sol = 6;
        config.weth_decimals_sol = 8;
        config.profit_threshold_sol = 0.01;
        config.scan_step_tokens = 10;
        config.scan_inventory_fraction = 0.8;
        config.liquidity_guard_fraction = 0.9;
        config.sol_balance_ceiling = 1.99;
        config.sol_balance_floor = 1.0;
        config.rebalance_trigger_fraction = 0.25;
        config.rebalance_target_fraction = 0.5;
        config.rebalance_dust_threshold = 0.0001;
        Arc::new(config)
    }

    struct Harness {
        solana: Arc<MockSolana>,
        ethereum: Arc<MockEthereum>,
        bridge: Arc<MockBridge>,
        sink: Arc<RecordingEventSink>,
        orchestrator: ArbitrageOrchestrator,
    }

    fn harness(solana: MockSolana, ethereum: MockEthereum, dry_run: bool) -> Harness {
        let solana = Arc::new(solana);
        let ethereum = Arc::new(ethereum);
        let bridge = Arc::new(MockBridge::default());
        let sink = Arc::new(RecordingEventSink::default());
        let orchestrator = ArbitrageOrchestrator::new(
            test_config(dry_run),
            solana.clone(),
            ethereum.clone(),
            bridge.clone(),
            Arc::new(InstantConfirm),
            CachedCrossRate::new(Arc::new(FixedRate(10.0)), 100),
            sink.clone(),
        );
        Harness {
            solana,
            ethereum,
            bridge,
            sink,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn connectivity_error_skips_the_iteration() {
        let mut solana = MockSolana::new(0);
        solana.fail_balances = true;
        let h = harness(solana, MockEthereum::new(), true);

        let result = h.orchestrator.run_iteration(1).await;
        assert!(matches!(result, Err(ArbError::RpcError(_))));
        // Nothing was decided or executed this cycle.
        assert!(!h.sink.contains(|e| matches!(e, BotEvent::RouteFound { .. })));
        assert_eq!(h.solana.executed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rebalance_preempts_arbitrage() {
        // Token inventory 990/10: the bridge rule fires even though the
        // venues are priced for a profitable route.
        let mut solana = MockSolana::new(100_000_000);
        solana.token_balance = 990.0;
        let mut ethereum = MockEthereum::new();
        ethereum.token_balance = 10.0;
        let h = harness(solana, ethereum, true);

        h.orchestrator.run_iteration(1).await.unwrap();

        let transfers = h.bridge.transfers.lock().unwrap().clone();
        assert_eq!(transfers, vec![(BridgeAsset::Token, 490.0, Chain::Ethereum)]);
        assert!(!h.sink.contains(|e| matches!(e, BotEvent::RouteFound { .. })));
        assert!(h
            .sink
            .contains(|e| matches!(e, BotEvent::RebalanceCompleted { .. })));
    }

    #[tokio::test]
    async fn profit_below_threshold_is_not_executed() {
        // The re-quoted profit is 0.005 SOL against the 0.01 SOL threshold.
        let h = harness(MockSolana::new(5_000_000), MockEthereum::new(), false);

        h.orchestrator.run_iteration(1).await.unwrap();

        assert!(h.sink.contains(|e| matches!(e, BotEvent::RouteFound { .. })));
        assert!(h
            .sink
            .contains(|e| matches!(e, BotEvent::ProfitBelowThreshold { .. })));
        assert_eq!(h.solana.executed.load(Ordering::SeqCst), 0);
        assert_eq!(h.ethereum.swaps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dry_run_reports_but_does_not_trade() {
        let h = harness(MockSolana::new(100_000_000), MockEthereum::new(), true);

        h.orchestrator.run_iteration(1).await.unwrap();

        assert!(h.sink.contains(|e| matches!(e, BotEvent::RouteFound { .. })));
        assert!(h
            .sink
            .contains(|e| matches!(e, BotEvent::ExecutionSkipped { .. })));
        assert_eq!(h.solana.executed.load(Ordering::SeqCst), 0);
        assert_eq!(h.ethereum.swaps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn both_legs_execute_when_profit_clears_the_threshold() {
        let h = harness(MockSolana::new(100_000_000), MockEthereum::new(), false);

        h.orchestrator.run_iteration(1).await.unwrap();

        // The cheap curve means: buy on Solana, sell on Ethereum.
        assert!(h.sink.contains(|e| matches!(e, BotEvent::TradeCompleted { .. })));
        assert_eq!(h.solana.executed.load(Ordering::SeqCst), 1);
        assert_eq!(h.ethereum.swaps.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn one_sided_execution_is_surfaced_not_hidden() {
        let mut ethereum = MockEthereum::new();
        ethereum.swap_fails = true;
        let h = harness(MockSolana::new(100_000_000), ethereum, false);

        let result = h.orchestrator.run_iteration(1).await;
        assert!(matches!(result, Err(ArbError::TransactionFailed(_))));

        // The Solana leg landed, the Ethereum leg did not.
        assert_eq!(h.solana.executed.load(Ordering::SeqCst), 1);
        assert!(h.sink.contains(|e| matches!(
            e,
            BotEvent::PartialExecution { landed_leg, .. } if landed_leg.starts_with("solana buy")
        )));
        assert!(!h.sink.contains(|e| matches!(e, BotEvent::TradeCompleted { .. })));
    }
}
