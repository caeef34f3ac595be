// src/main.rs
use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;
use std::time::Duration;
use xchain_arb_bot::arbitrage::ArbitrageOrchestrator;
use xchain_arb_bot::bridge::DryRunBridge;
use xchain_arb_bot::config::Config;
use xchain_arb_bot::ethereum::EthereumClient;
use xchain_arb_bot::events::LogEventSink;
use xchain_arb_bot::price::{CachedCrossRate, JupiterCrossRateSource};
use xchain_arb_bot::solana::jupiter::JupiterClient;
use xchain_arb_bot::solana::rpc::SolanaRpcClient;
use xchain_arb_bot::solana::SolanaService;
use xchain_arb_bot::utils::{load_keypair, setup_logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_logging().expect("Failed to initialize logging");
    info!("Cross-chain arbitrage bot starting...");

    let config = Arc::new(Config::from_env());
    config.validate().context("configuration is incomplete")?;
    config.log_summary();

    let keypair = Arc::new(
        load_keypair(&config.sol_keypair_path)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("loading the Solana keypair")?,
    );

    let rpc = Arc::new(SolanaRpcClient::new(
        &config.sol_rpc_url,
        config.rpc_max_retries,
        Duration::from_millis(config.rpc_retry_delay_ms),
    ));
    let jupiter = Arc::new(JupiterClient::new(
        &config.jupiter_api_url,
        config.slippage_bps,
    ));
    let solana = Arc::new(SolanaService::new(
        rpc.clone(),
        jupiter.clone(),
        keypair,
        &config.curve_base_vault,
        &config.curve_quote_vault,
    )?);

    let ethereum = Arc::new(EthereumClient::new(
        &config.eth_rpc_url,
        &config.eth_private_key,
        &config.eth_wallet_address,
        config.eth_chain_id,
        &config.token_address_eth,
        &config.weth_address_eth,
        &config.pair_address_eth,
        &config.router_address_eth,
    )?);

    let cross_rate = CachedCrossRate::new(
        Arc::new(JupiterCrossRateSource::new(
            jupiter,
            config.weth_mint_sol.clone(),
            config.wsol_mint.clone(),
            config.weth_decimals_sol,
        )),
        config.cross_rate_refresh_iterations,
    );
    let bridge = Arc::new(DryRunBridge::new(config.dry_run));

    let orchestrator = ArbitrageOrchestrator::new(
        config,
        solana,
        ethereum,
        bridge,
        rpc,
        cross_rate,
        Arc::new(LogEventSink),
    );
    orchestrator.run().await;
    Ok(())
}
