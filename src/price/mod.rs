// src/price/mod.rs
//! Cross-rate feed: the price of one WETH expressed in SOL.
//!
//! The cache is an explicit value with the iteration it was fetched at and a
//! count-based refresh policy, owned by the consumer side of the collaborator
//! boundary. No ambient globals.

use crate::error::ArbError;
use crate::solana::jupiter::JupiterClient;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait CrossRateSource: Send + Sync {
    async fn fetch_cross_rate(&self) -> Result<f64, ArbError>;
}

struct CacheEntry {
    value: f64,
    fetched_at_iteration: u64,
}

pub struct CachedCrossRate {
    source: Arc<dyn CrossRateSource>,
    refresh_every: u64,
    state: Mutex<Option<CacheEntry>>,
}

impl CachedCrossRate {
    pub fn new(source: Arc<dyn CrossRateSource>, refresh_every: u64) -> Self {
        Self {
            source,
            refresh_every: refresh_every.max(1),
            state: Mutex::new(None),
        }
    }

    /// Return the cached rate, refreshing once the configured number of
    /// iterations has passed since the last fetch.
    pub async fn get(&self, iteration: u64) -> Result<f64, ArbError> {
        let mut state = self.state.lock().await;
        if let Some(entry) = state.as_ref() {
            if iteration.saturating_sub(entry.fetched_at_iteration) < self.refresh_every {
                return Ok(entry.value);
            }
        }
        let value = self.source.fetch_cross_rate().await?;
        if !value.is_finite() || value <= 0.0 {
            return Err(ArbError::QuoteError(format!(
                "cross rate source returned unusable value {}",
                value
            )));
        }
        info!("Cross rate refreshed: 1 WETH = {:.6} SOL", value);
        *state = Some(CacheEntry {
            value,
            fetched_at_iteration: iteration,
        });
        Ok(value)
    }
}

/// Derives the cross rate from a quote of one whole WETH into WSOL.
pub struct JupiterCrossRateSource {
    jupiter: Arc<JupiterClient>,
    weth_mint: String,
    wsol_mint: String,
    weth_decimals: u32,
}

impl JupiterCrossRateSource {
    pub fn new(
        jupiter: Arc<JupiterClient>,
        weth_mint: String,
        wsol_mint: String,
        weth_decimals: u32,
    ) -> Self {
        Self {
            jupiter,
            weth_mint,
            wsol_mint,
            weth_decimals,
        }
    }
}

#[async_trait]
impl CrossRateSource for JupiterCrossRateSource {
    async fn fetch_cross_rate(&self) -> Result<f64, ArbError> {
        let one_weth = 10u64.pow(self.weth_decimals);
        let quote = self
            .jupiter
            .quote(&self.weth_mint, &self.wsol_mint, one_weth)
            .await?;
        Ok(quote.other_amount_threshold as f64 / crate::arbitrage::math::LAMPORTS_PER_SOL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        fetches: AtomicUsize,
        rate: f64,
    }

    #[async_trait]
    impl CrossRateSource for CountingSource {
        async fn fetch_cross_rate(&self) -> Result<f64, ArbError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.rate)
        }
    }

    #[tokio::test]
    async fn refreshes_only_after_the_configured_iteration_count() {
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
            rate: 12.5,
        });
        let cache = CachedCrossRate::new(source.clone(), 3);

        assert_eq!(cache.get(1).await.unwrap(), 12.5);
        assert_eq!(cache.get(2).await.unwrap(), 12.5);
        assert_eq!(cache.get(3).await.unwrap(), 12.5);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        cache.get(4).await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rejects_non_positive_rates() {
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
            rate: 0.0,
        });
        let cache = CachedCrossRate::new(source, 1);
        assert!(matches!(cache.get(1).await, Err(ArbError::QuoteError(_))));
    }
}
