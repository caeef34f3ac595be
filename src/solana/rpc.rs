// src/solana/rpc.rs
use crate::arbitrage::confirmation::{CommitmentLevel, TxStatus, TxStatusSource};
use crate::error::ArbError;
use async_trait::async_trait;
use log::warn;
use rand::Rng;
use solana_client::nonblocking::rpc_client::RpcClient as NonBlockingRpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use solana_transaction_status::TransactionConfirmationStatus;
use spl_associated_token_account::get_associated_token_address;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const DEFAULT_COMMITMENT: CommitmentConfig = CommitmentConfig::confirmed();

/// Retrying wrapper around the nonblocking RPC client. Read calls get bounded
/// retries with jittered delay; finality polls go out unwrapped because the
/// poller has its own retry semantics.
pub struct SolanaRpcClient {
    client: Arc<NonBlockingRpcClient>,
    max_retries: usize,
    retry_delay: Duration,
}

impl SolanaRpcClient {
    pub fn new(endpoint: &str, max_retries: usize, retry_delay: Duration) -> Self {
        Self {
            client: Arc::new(NonBlockingRpcClient::new_with_commitment(
                endpoint.to_string(),
                DEFAULT_COMMITMENT,
            )),
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    async fn with_retry<F, Fut, T>(
        &self,
        operation_name: &str,
        mut rpc_call_fn: F,
    ) -> Result<T, ArbError>
    where
        F: FnMut(Arc<NonBlockingRpcClient>) -> Fut,
        Fut: std::future::Future<Output = Result<T, solana_client::client_error::ClientError>>
            + Send,
        T: Send,
    {
        let mut last_error = None;
        for attempt in 0..self.max_retries {
            match rpc_call_fn(Arc::clone(&self.client)).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    warn!(
                        "[RPC - {}] attempt {}/{} failed: {}",
                        operation_name,
                        attempt + 1,
                        self.max_retries,
                        e
                    );
                    last_error = Some(e);
                    if attempt + 1 < self.max_retries {
                        let mut delay_ms = self.retry_delay.as_millis() as u64;
                        if delay_ms > 0 {
                            delay_ms += rand::thread_rng().gen_range(0..(delay_ms / 4).max(1));
                        }
                        sleep(Duration::from_millis(delay_ms)).await;
                    }
                }
            }
        }
        Err(ArbError::RpcError(format!(
            "[{}] all attempts failed: {}",
            operation_name,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    pub async fn get_sol_balance(&self, owner: &Pubkey) -> Result<f64, ArbError> {
        let owner = *owner;
        let lamports = self
            .with_retry("get_balance", |client| async move {
                client.get_balance(&owner).await
            })
            .await?;
        Ok(lamports as f64 / 1e9)
    }

    /// Whole-unit balance of the owner's associated token account. A missing
    /// account reads as zero, matching a wallet that never held the token.
    pub async fn get_spl_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<f64, ArbError> {
        let ata = get_associated_token_address(owner, mint);
        match self.get_token_account_ui_balance(&ata).await {
            Ok(balance) => Ok(balance),
            Err(ArbError::RpcError(msg))
                if msg.contains("could not find account") || msg.contains("Invalid param") =>
            {
                Ok(0.0)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_token_account_ui_balance(&self, account: &Pubkey) -> Result<f64, ArbError> {
        let account = *account;
        let balance = self
            .with_retry("get_token_account_balance", |client| async move {
                client.get_token_account_balance(&account).await
            })
            .await?;
        Ok(balance.ui_amount.unwrap_or(0.0))
    }

    /// Raw-unit balance of an arbitrary token account (curve vaults).
    pub async fn get_token_account_raw_balance(&self, account: &Pubkey) -> Result<f64, ArbError> {
        let account = *account;
        let balance = self
            .with_retry("get_token_account_balance", |client| async move {
                client.get_token_account_balance(&account).await
            })
            .await?;
        balance
            .amount
            .parse::<f64>()
            .map_err(|e| ArbError::ParseError(format!("token balance amount: {}", e)))
    }

    pub async fn get_latest_blockhash_with_height(&self) -> Result<(Hash, u64), ArbError> {
        self.with_retry("get_latest_blockhash", |client| async move {
            client
                .get_latest_blockhash_with_commitment(DEFAULT_COMMITMENT)
                .await
        })
        .await
    }

    pub async fn send_versioned_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, ArbError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: true,
            max_retries: Some(2),
            ..Default::default()
        };
        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(ArbError::from)
    }
}

#[async_trait]
impl TxStatusSource for SolanaRpcClient {
    async fn get_status(&self, tx_ref: &str) -> Result<TxStatus, ArbError> {
        let signature = Signature::from_str(tx_ref)
            .map_err(|e| ArbError::ParseError(format!("bad signature {}: {}", tx_ref, e)))?;
        let response = self
            .client
            .get_signature_statuses_with_history(&[signature])
            .await?;

        let status = match response.value.into_iter().next().flatten() {
            Some(status) => status,
            None => return Ok(TxStatus::Pending),
        };
        if let Some(err) = status.err {
            return Ok(TxStatus::Failed(format!("{:?}", err)));
        }
        Ok(match status.confirmation_status {
            Some(TransactionConfirmationStatus::Processed) => {
                TxStatus::Confirmed(CommitmentLevel::Processed)
            }
            Some(TransactionConfirmationStatus::Confirmed) => {
                TxStatus::Confirmed(CommitmentLevel::Confirmed)
            }
            Some(TransactionConfirmationStatus::Finalized) => {
                TxStatus::Confirmed(CommitmentLevel::Finalized)
            }
            None => TxStatus::Pending,
        })
    }

    async fn get_current_height(&self) -> Result<u64, ArbError> {
        Ok(self.client.get_block_height().await?)
    }
}
