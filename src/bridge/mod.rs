// src/bridge/mod.rs
//! Cross-chain transfer boundary. The core only decides *what* to move;
//! the transport that moves it is a collaborator behind this trait.

use crate::arbitrage::types::Chain;
use crate::error::ArbError;
use async_trait::async_trait;
use log::{info, warn};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeAsset {
    /// The arbitraged token
    Token,
    /// ETH / wrapped WETH
    CounterAsset,
}

impl fmt::Display for BridgeAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeAsset::Token => write!(f, "token"),
            BridgeAsset::CounterAsset => write!(f, "ETH"),
        }
    }
}

#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// Move `amount` whole units of `asset` to `destination`; returns a
    /// reference for the submitted transfer.
    async fn transfer(
        &self,
        asset: BridgeAsset,
        amount: f64,
        destination: Chain,
    ) -> Result<String, ArbError>;
}

/// The relayer that actually moves funds runs outside this process. In
/// dry-run mode transfers are simulated so the rest of the cycle can be
/// exercised end to end; in live mode the required transfer is surfaced to
/// the operator instead of being silently skipped.
pub struct DryRunBridge {
    dry_run: bool,
    sequence: AtomicU64,
}

impl DryRunBridge {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            sequence: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl BridgeClient for DryRunBridge {
    async fn transfer(
        &self,
        asset: BridgeAsset,
        amount: f64,
        destination: Chain,
    ) -> Result<String, ArbError> {
        if self.dry_run {
            let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
            let tx_ref = format!("dry-run-bridge-{}", seq);
            info!(
                "[dry-run] would bridge {:.6} {} to {} ({})",
                amount, asset, destination, tx_ref
            );
            return Ok(tx_ref);
        }
        warn!(
            "Bridge transfer required: {:.6} {} to {}. Run the external relayer.",
            amount, asset, destination
        );
        Err(ArbError::ExecutionDisabled(format!(
            "bridging {:.6} {} to {} requires the external relayer",
            amount, asset, destination
        )))
    }
}
