// src/ethereum/mod.rs
pub mod client;

pub use client::EthereumClient;

use crate::error::ArbError;
use async_trait::async_trait;
use num_bigint::BigUint;

/// Balance/reserve queries plus pair swaps on the Ethereum side.
#[async_trait]
pub trait EthereumVenue: Send + Sync {
    async fn get_eth_balance(&self) -> Result<f64, ArbError>;
    /// Whole-unit balance of the arbitraged token held by the trading wallet.
    async fn get_token_balance(&self) -> Result<f64, ArbError>;
    /// Current pair reserves as exact integers, ordered (WETH, token).
    async fn get_pair_reserves(&self) -> Result<(BigUint, BigUint), ArbError>;
    /// Sell whole tokens for ETH on the pair; waits for the receipt.
    async fn swap_token_for_eth(&self, amount_tokens: u64) -> Result<String, ArbError>;
    /// Buy the token with ETH on the pair; waits for the receipt.
    async fn swap_eth_for_token(&self, amount_eth: f64) -> Result<String, ArbError>;
}
