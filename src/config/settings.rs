// src/config/settings.rs
use crate::error::ArbError;
use std::env;

const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
const WETH_ADDRESS_ETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
const UNISWAP_V2_ROUTER: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";

#[derive(Debug, Clone)]
pub struct Config {
    // Endpoints & credentials
    pub sol_rpc_url: String,
    pub eth_rpc_url: String,
    pub jupiter_api_url: String,
    pub sol_keypair_path: String,
    pub eth_private_key: String,
    /// Watch-only wallet address; used when no private key is configured.
    pub eth_wallet_address: String,
    pub eth_chain_id: u64,

    // Token pair / venue addresses
    pub token_mint_sol: String,
    pub weth_mint_sol: String,
    pub wsol_mint: String,
    pub curve_base_vault: String,
    pub curve_quote_vault: String,
    pub token_address_eth: String,
    pub weth_address_eth: String,
    pub pair_address_eth: String,
    pub router_address_eth: String,

    // Decimal conventions of the Solana representations
    pub token_decimals_sol: u32,
    pub weth_decimals_sol: u32,

    // Trading parameters
    pub slippage_bps: u32,
    pub profit_threshold_sol: f64,
    pub sleep_between_iterations_secs: u64,
    pub scan_step_tokens: u64,
    pub scan_inventory_fraction: f64,
    pub liquidity_guard_fraction: f64,

    // Rebalancing
    pub sol_balance_ceiling: f64,
    pub sol_balance_floor: f64,
    pub rebalance_trigger_fraction: f64,
    pub rebalance_target_fraction: f64,
    pub rebalance_dust_threshold: f64,

    // Confirmation polling
    pub confirm_timeout_secs: u64,
    pub status_poll_interval_ms: u64,
    pub height_poll_interval_ms: u64,

    // Misc
    pub cross_rate_refresh_iterations: u64,
    pub rpc_max_retries: usize,
    pub rpc_retry_delay_ms: u64,
    pub dry_run: bool,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            sol_rpc_url: var_or("RPC_ENDPOINT", ""),
            eth_rpc_url: var_or("ETH_RPC_ENDPOINT", ""),
            jupiter_api_url: var_or("JUPITER_API_URL", "https://quote-api.jup.ag/v6"),
            sol_keypair_path: var_or("SOL_KEYPAIR_PATH", ".config/solana/id.json"),
            eth_private_key: var_or("ETH_PRIVATE_KEY", ""),
            eth_wallet_address: var_or("ETH_WALLET_ADDRESS", ""),
            eth_chain_id: parse_or("ETH_CHAIN_ID", 1),

            token_mint_sol: var_or("TOKEN_MINT", ""),
            weth_mint_sol: var_or("WETH_MINT", "7vfCXTUXx5WJV5JADk17DUJ4ksgau7utNKj4b963voxs"),
            wsol_mint: var_or("WSOL_MINT", WSOL_MINT),
            curve_base_vault: var_or("CURVE_BASE_VAULT", ""),
            curve_quote_vault: var_or("CURVE_QUOTE_VAULT", ""),
            token_address_eth: var_or("TOKEN_ADDRESS_ETH", ""),
            weth_address_eth: var_or("WETH_ADDRESS_ETH", WETH_ADDRESS_ETH),
            pair_address_eth: var_or("PAIR_ADDRESS_ETH", ""),
            router_address_eth: var_or("ROUTER_ADDRESS_ETH", UNISWAP_V2_ROUTER),

            token_decimals_sol: parse_or("TOKEN_DECIMALS_SOL", 6),
            weth_decimals_sol: parse_or("WETH_DECIMALS_SOL", 8),

            slippage_bps: parse_or("SLIPPAGE_BPS", 50),
            profit_threshold_sol: parse_or("PROFIT_THRESHOLD_SOL", 0.01),
            sleep_between_iterations_secs: parse_or("SLEEP_BETWEEN_ITERATIONS_SECS", 30),
            scan_step_tokens: parse_or("SCAN_STEP_TOKENS", 10),
            scan_inventory_fraction: parse_or("SCAN_INVENTORY_FRACTION", 0.8),
            liquidity_guard_fraction: parse_or("LIQUIDITY_GUARD_FRACTION", 0.9),

            sol_balance_ceiling: parse_or("SOL_BALANCE_CEILING", 1.99),
            sol_balance_floor: parse_or("SOL_BALANCE_FLOOR", 1.0),
            rebalance_trigger_fraction: parse_or("REBALANCE_TRIGGER_FRACTION", 0.25),
            rebalance_target_fraction: parse_or("REBALANCE_TARGET_FRACTION", 0.5),
            rebalance_dust_threshold: parse_or("REBALANCE_DUST_THRESHOLD", 0.0001),

            confirm_timeout_secs: parse_or("CONFIRM_TIMEOUT_SECS", 30),
            status_poll_interval_ms: parse_or("STATUS_POLL_INTERVAL_MS", 1000),
            height_poll_interval_ms: parse_or("HEIGHT_POLL_INTERVAL_MS", 2000),

            cross_rate_refresh_iterations: parse_or("CROSS_RATE_REFRESH_ITERATIONS", 100),
            rpc_max_retries: parse_or("RPC_MAX_RETRIES", 3),
            rpc_retry_delay_ms: parse_or("RPC_RETRY_DELAY_MS", 500),
            dry_run: parse_or("DRY_RUN", true),
        }
    }

    /// Startup validation. Anything missing here is fatal: the process must
    /// not enter the trading loop with a partial configuration.
    pub fn validate(&self) -> Result<(), ArbError> {
        let required = [
            ("RPC_ENDPOINT", &self.sol_rpc_url),
            ("ETH_RPC_ENDPOINT", &self.eth_rpc_url),
            ("TOKEN_MINT", &self.token_mint_sol),
            ("CURVE_BASE_VAULT", &self.curve_base_vault),
            ("CURVE_QUOTE_VAULT", &self.curve_quote_vault),
            ("TOKEN_ADDRESS_ETH", &self.token_address_eth),
            ("PAIR_ADDRESS_ETH", &self.pair_address_eth),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(ArbError::ConfigError(format!("{} is not set", name)));
            }
        }
        if !self.dry_run && self.eth_private_key.is_empty() {
            return Err(ArbError::ConfigError(
                "ETH_PRIVATE_KEY is required when DRY_RUN=false".to_string(),
            ));
        }
        if self.eth_private_key.is_empty() && self.eth_wallet_address.is_empty() {
            return Err(ArbError::ConfigError(
                "one of ETH_PRIVATE_KEY or ETH_WALLET_ADDRESS must be set".to_string(),
            ));
        }
        if self.rebalance_trigger_fraction >= self.rebalance_target_fraction {
            return Err(ArbError::ConfigError(
                "REBALANCE_TRIGGER_FRACTION must be below REBALANCE_TARGET_FRACTION".to_string(),
            ));
        }
        if self.sol_balance_floor >= self.sol_balance_ceiling {
            return Err(ArbError::ConfigError(
                "SOL_BALANCE_FLOOR must be below SOL_BALANCE_CEILING".to_string(),
            ));
        }
        if self.scan_step_tokens == 0 {
            return Err(ArbError::ConfigError("SCAN_STEP_TOKENS must be positive".to_string()));
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        log::info!(
            "Configuration: dry_run={}, profit_threshold={} SOL, iteration_sleep={}s, scan_step={} tokens",
            self.dry_run,
            self.profit_threshold_sol,
            self.sleep_between_iterations_secs,
            self.scan_step_tokens
        );
    }
}
