// src/solana/jupiter.rs
//! Quote/swap HTTP client. Quoting and execution are deliberately separate
//! steps so expected profit can be checked from the quote before committing.

use super::rpc::SolanaRpcClient;
use crate::arbitrage::types::SubmittedTx;
use crate::error::ArbError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::VersionedTransaction;

/// A priced swap. `raw` is the untouched quote body; it round-trips into the
/// swap request exactly as received.
#[derive(Debug, Clone)]
pub struct SwapQuote {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: u64,
    pub out_amount: u64,
    /// Worst-case output after slippage; all pricing decisions use this.
    pub other_amount_threshold: u64,
    pub raw: Value,
}

pub struct JupiterClient {
    http: reqwest::Client,
    base_url: String,
    slippage_bps: u32,
}

impl JupiterClient {
    pub fn new(base_url: &str, slippage_bps: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            slippage_bps,
        }
    }

    pub async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> Result<SwapQuote, ArbError> {
        let url = format!("{}/quote", self.base_url);
        let amount_str = amount.to_string();
        let slippage_str = self.slippage_bps.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("inputMint", input_mint),
                ("outputMint", output_mint),
                ("amount", amount_str.as_str()),
                ("slippageBps", slippage_str.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ArbError::QuoteError(format!(
                "quote endpoint returned {} for {} -> {}",
                response.status(),
                input_mint,
                output_mint
            )));
        }
        let body: Value = response.json().await?;

        let has_route = body
            .get("routePlan")
            .and_then(|plan| plan.as_array())
            .map_or(false, |plan| !plan.is_empty());
        if !has_route {
            return Err(ArbError::NoRouteFound(format!(
                "{} -> {}",
                input_mint, output_mint
            )));
        }

        let amount_field = |key: &str| -> Result<u64, ArbError> {
            body.get(key)
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| ArbError::ParseError(format!("quote response missing {}", key)))
        };

        Ok(SwapQuote {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            in_amount: amount_field("inAmount")?,
            out_amount: amount_field("outAmount")?,
            other_amount_threshold: amount_field("otherAmountThreshold")?,
            raw: body,
        })
    }

    /// Fetch the swap transaction for a quote, re-sign it with our keypair
    /// and submit it through the RPC client.
    pub async fn execute_swap(
        &self,
        quote: &SwapQuote,
        keypair: &Keypair,
        rpc: &SolanaRpcClient,
    ) -> Result<SubmittedTx, ArbError> {
        info!(
            "Executing swap {} -> {} (in: {}, worst-case out: {})",
            quote.input_mint, quote.output_mint, quote.in_amount, quote.other_amount_threshold
        );

        let url = format!("{}/swap", self.base_url);
        let request = json!({
            "quoteResponse": quote.raw,
            "userPublicKey": keypair.pubkey().to_string(),
            "wrapAndUnwrapSol": true,
        });
        let response = self.http.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(ArbError::ExecutionError(format!(
                "swap endpoint returned {}",
                response.status()
            )));
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct SwapResponse {
            swap_transaction: String,
        }
        let swap: SwapResponse = response.json().await?;

        let tx_bytes = BASE64
            .decode(swap.swap_transaction)
            .map_err(|e| ArbError::ParseError(format!("swap transaction base64: {}", e)))?;
        let unsigned: VersionedTransaction = bincode::deserialize(&tx_bytes)
            .map_err(|e| ArbError::ParseError(format!("swap transaction decode: {}", e)))?;
        let signed = VersionedTransaction::try_new(unsigned.message, &[keypair])
            .map_err(|e| ArbError::ExecutionError(format!("signing swap transaction: {}", e)))?;

        let (_blockhash, last_valid_block_height) = rpc.get_latest_blockhash_with_height().await?;
        let signature = rpc.send_versioned_transaction(&signed).await?;
        info!("Swap submitted: {}", signature);

        Ok(SubmittedTx {
            signature: signature.to_string(),
            last_valid_block_height,
        })
    }
}
