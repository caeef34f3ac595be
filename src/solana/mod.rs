// src/solana/mod.rs
pub mod jupiter;
pub mod rpc;

use crate::arbitrage::types::SubmittedTx;
use crate::error::ArbError;
use async_trait::async_trait;
use jupiter::{JupiterClient, SwapQuote};
use rpc::SolanaRpcClient;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::str::FromStr;
use std::sync::Arc;

/// Virtual reserves of the curve venue, in raw units (token raw / lamports).
#[derive(Debug, Clone, Copy)]
pub struct CurveReserves {
    pub base: f64,
    pub quote: f64,
}

/// Balance/reserve queries plus quote/execute swaps on the Solana side.
#[async_trait]
pub trait SolanaVenue: Send + Sync {
    async fn get_sol_balance(&self) -> Result<f64, ArbError>;
    /// Whole-unit balance of an SPL token held by the trading wallet.
    async fn get_token_balance(&self, mint: &str) -> Result<f64, ArbError>;
    async fn get_curve_reserves(&self) -> Result<CurveReserves, ArbError>;
    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> Result<SwapQuote, ArbError>;
    async fn execute_swap(&self, quote: &SwapQuote) -> Result<SubmittedTx, ArbError>;
}

/// Wallet-bound implementation over the RPC and quote clients.
pub struct SolanaService {
    rpc: Arc<SolanaRpcClient>,
    jupiter: Arc<JupiterClient>,
    keypair: Arc<Keypair>,
    owner: Pubkey,
    curve_base_vault: Pubkey,
    curve_quote_vault: Pubkey,
}

impl SolanaService {
    pub fn new(
        rpc: Arc<SolanaRpcClient>,
        jupiter: Arc<JupiterClient>,
        keypair: Arc<Keypair>,
        curve_base_vault: &str,
        curve_quote_vault: &str,
    ) -> Result<Self, ArbError> {
        let parse = |name: &str, value: &str| {
            Pubkey::from_str(value)
                .map_err(|e| ArbError::ConfigError(format!("invalid {}: {}", name, e)))
        };
        let owner = keypair.pubkey();
        Ok(Self {
            rpc,
            jupiter,
            keypair,
            owner,
            curve_base_vault: parse("CURVE_BASE_VAULT", curve_base_vault)?,
            curve_quote_vault: parse("CURVE_QUOTE_VAULT", curve_quote_vault)?,
        })
    }
}

#[async_trait]
impl SolanaVenue for SolanaService {
    async fn get_sol_balance(&self) -> Result<f64, ArbError> {
        self.rpc.get_sol_balance(&self.owner).await
    }

    async fn get_token_balance(&self, mint: &str) -> Result<f64, ArbError> {
        let mint = Pubkey::from_str(mint)
            .map_err(|e| ArbError::ParseError(format!("invalid mint {}: {}", mint, e)))?;
        self.rpc.get_spl_balance(&self.owner, &mint).await
    }

    async fn get_curve_reserves(&self) -> Result<CurveReserves, ArbError> {
        let (base, quote) = tokio::try_join!(
            self.rpc.get_token_account_raw_balance(&self.curve_base_vault),
            self.rpc.get_token_account_raw_balance(&self.curve_quote_vault),
        )?;
        Ok(CurveReserves { base, quote })
    }

    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> Result<SwapQuote, ArbError> {
        self.jupiter.quote(input_mint, output_mint, amount).await
    }

    async fn execute_swap(&self, quote: &SwapQuote) -> Result<SubmittedTx, ArbError> {
        self.jupiter
            .execute_swap(quote, &self.keypair, &self.rpc)
            .await
    }
}
