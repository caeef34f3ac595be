// src/arbitrage/confirmation.rs
//! Transaction finality poller.
//!
//! Three distinct terminal failures, because recovery differs:
//! `TransactionFailed` (the chain rejected it, never retry as-is),
//! `TransactionExpired` (its reference block passed, resubmit with a fresh
//! reference), `TimeoutError` (we gave up waiting, same reference may still
//! land). Transient query errors neither advance nor reset the machine.

use crate::error::ArbError;
use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Commitment levels in increasing order of finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommitmentLevel {
    Processed,
    Confirmed,
    Finalized,
}

/// Status reported by the chain for a submitted transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TxStatus {
    /// Not yet visible, or visible below any commitment level
    Pending,
    Confirmed(CommitmentLevel),
    /// Executed and rejected on-chain
    Failed(String),
}

/// The narrow finality primitive the poller consumes.
#[async_trait]
pub trait TxStatusSource: Send + Sync {
    async fn get_status(&self, tx_ref: &str) -> Result<TxStatus, ArbError>;
    async fn get_current_height(&self) -> Result<u64, ArbError>;
}

#[derive(Debug, Clone, Copy)]
pub struct PollerSettings {
    /// Cadence of status queries.
    pub status_interval: Duration,
    /// Cadence of chain-height queries, slower to bound extra network calls.
    pub height_interval: Duration,
    /// Overall wall-clock budget.
    pub timeout: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_millis(1000),
            height_interval: Duration::from_millis(2000),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Poll until the transaction reaches `desired_level` or a terminal failure.
///
/// Never overlaps two polls for the same transaction: queries are issued
/// sequentially from a single loop.
pub async fn await_confirmation(
    source: &dyn TxStatusSource,
    tx_ref: &str,
    expiry_height: u64,
    desired_level: CommitmentLevel,
    settings: &PollerSettings,
) -> Result<(), ArbError> {
    let start = Instant::now();
    let mut last_height_check: Option<Instant> = None;

    while start.elapsed() < settings.timeout {
        match source.get_status(tx_ref).await {
            Ok(TxStatus::Confirmed(level)) if level >= desired_level => return Ok(()),
            Ok(TxStatus::Confirmed(_)) | Ok(TxStatus::Pending) => {}
            Ok(TxStatus::Failed(reason)) => return Err(ArbError::TransactionFailed(reason)),
            Err(e) if e.is_transient() => {
                debug!("transient status query failure for {}: {}", tx_ref, e);
            }
            Err(e) => return Err(e),
        }

        let height_due = last_height_check
            .map_or(true, |checked| checked.elapsed() >= settings.height_interval);
        if height_due {
            match source.get_current_height().await {
                Ok(height) => {
                    last_height_check = Some(Instant::now());
                    if height > expiry_height {
                        return Err(ArbError::TransactionExpired(format!(
                            "{} not found and its reference block expired (height {} > {})",
                            tx_ref, height, expiry_height
                        )));
                    }
                }
                Err(e) if e.is_transient() => {
                    debug!("transient height query failure: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        sleep(settings.status_interval).await;
    }

    Err(ArbError::TimeoutError(format!(
        "{} unconfirmed after {:?}",
        tx_ref,
        settings.timeout
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a scripted sequence of status answers; the last answer repeats.
    struct ScriptedSource {
        statuses: Mutex<VecDeque<Result<TxStatus, ArbError>>>,
        status_polls: AtomicUsize,
        height_polls: AtomicUsize,
        height: AtomicU64,
    }

    impl ScriptedSource {
        fn new(statuses: Vec<Result<TxStatus, ArbError>>, height: u64) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                status_polls: AtomicUsize::new(0),
                height_polls: AtomicUsize::new(0),
                height: AtomicU64::new(height),
            }
        }

        fn status_polls(&self) -> usize {
            self.status_polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TxStatusSource for ScriptedSource {
        async fn get_status(&self, _tx_ref: &str) -> Result<TxStatus, ArbError> {
            self.status_polls.fetch_add(1, Ordering::SeqCst);
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.pop_front().unwrap()
            } else {
                statuses.front().cloned().unwrap_or(Ok(TxStatus::Pending))
            }
        }

        async fn get_current_height(&self) -> Result<u64, ArbError> {
            self.height_polls.fetch_add(1, Ordering::SeqCst);
            Ok(self.height.load(Ordering::SeqCst))
        }
    }

    fn settings(timeout_ms: u64) -> PollerSettings {
        PollerSettings {
            status_interval: Duration::from_millis(1000),
            height_interval: Duration::from_millis(2000),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn confirms_on_first_poll_at_desired_level() {
        let source = ScriptedSource::new(
            vec![Ok(TxStatus::Confirmed(CommitmentLevel::Confirmed))],
            10,
        );
        let result = await_confirmation(
            &source,
            "sig",
            100,
            CommitmentLevel::Confirmed,
            &settings(5000),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(source.status_polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn higher_level_satisfies_desired_level() {
        let source = ScriptedSource::new(
            vec![Ok(TxStatus::Confirmed(CommitmentLevel::Finalized))],
            10,
        );
        let result = await_confirmation(
            &source,
            "sig",
            100,
            CommitmentLevel::Confirmed,
            &settings(5000),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn lower_level_keeps_polling() {
        let source = ScriptedSource::new(
            vec![
                Ok(TxStatus::Confirmed(CommitmentLevel::Processed)),
                Ok(TxStatus::Confirmed(CommitmentLevel::Confirmed)),
            ],
            10,
        );
        let result = await_confirmation(
            &source,
            "sig",
            100,
            CommitmentLevel::Confirmed,
            &settings(5000),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(source.status_polls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn onchain_failure_is_terminal_without_waiting() {
        let source = ScriptedSource::new(
            vec![Ok(TxStatus::Failed("custom program error 0x1".to_string()))],
            10,
        );
        let result = await_confirmation(
            &source,
            "sig",
            100,
            CommitmentLevel::Confirmed,
            &settings(30_000),
        )
        .await;
        assert!(matches!(result, Err(ArbError::TransactionFailed(_))));
        assert_eq!(source.status_polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn height_past_expiry_reports_expired_not_timeout() {
        let source = ScriptedSource::new(vec![Ok(TxStatus::Pending)], 101);
        let result = await_confirmation(
            &source,
            "sig",
            100,
            CommitmentLevel::Confirmed,
            &settings(30_000),
        )
        .await;
        assert!(matches!(result, Err(ArbError::TransactionExpired(_))));
        assert_eq!(source.status_polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_forever_times_out_after_exactly_five_polls() {
        // timeout 5000ms at a 1000ms tick: polls at t=0..4s, then the budget
        // is exhausted.
        let source = ScriptedSource::new(vec![Ok(TxStatus::Pending)], 10);
        let result = await_confirmation(
            &source,
            "sig",
            100,
            CommitmentLevel::Confirmed,
            &settings(5000),
        )
        .await;
        assert!(matches!(result, Err(ArbError::TimeoutError(_))));
        assert_eq!(source.status_polls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_swallowed_and_retried() {
        let source = ScriptedSource::new(
            vec![
                Err(ArbError::RpcError("connection reset".to_string())),
                Ok(TxStatus::Pending),
                Ok(TxStatus::Confirmed(CommitmentLevel::Confirmed)),
            ],
            10,
        );
        let result = await_confirmation(
            &source,
            "sig",
            100,
            CommitmentLevel::Confirmed,
            &settings(30_000),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(source.status_polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn height_checks_run_on_their_own_cadence() {
        let source = ScriptedSource::new(vec![Ok(TxStatus::Pending)], 10);
        let _ = await_confirmation(
            &source,
            "sig",
            100,
            CommitmentLevel::Confirmed,
            &settings(5000),
        )
        .await;
        // 5 status polls but height checked only at t=0s, 2s and 4s.
        assert_eq!(source.status_polls(), 5);
        assert_eq!(source.height_polls.load(Ordering::SeqCst), 3);
    }
}
