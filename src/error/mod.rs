// src/error/mod.rs
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ArbError {
    /// Configuration errors; fatal before the loop starts
    #[error("Config Error: {0}")]
    ConfigError(String),

    /// Network/connectivity issues (HTTP APIs unreachable)
    #[error("Network Error: {0}")]
    NetworkError(String),

    /// RPC/chain node errors
    #[error("RPC Error: {0}")]
    RpcError(String),

    /// Quote endpoint answered but could not price the swap
    #[error("Quote Error: {0}")]
    QuoteError(String),

    /// No route exists for the requested swap; the leg is treated as unprofitable
    #[error("No Route Found: {0}")]
    NoRouteFound(String),

    /// Insufficient balance for trade execution
    #[error("Insufficient Balance: {0}")]
    InsufficientBalance(String),

    /// The chain executed and rejected the transaction; never retried as-is
    #[error("Transaction Failed: {0}")]
    TransactionFailed(String),

    /// The reference block expired before the transaction landed;
    /// resubmission with a fresh reference is required
    #[error("Transaction Expired: {0}")]
    TransactionExpired(String),

    /// Wall-clock budget exhausted while waiting
    #[error("Timeout Error: {0}")]
    TimeoutError(String),

    /// Trade execution errors
    #[error("Execution Error: {0}")]
    ExecutionError(String),

    /// Execution disabled (dry-run, or a leg that needs an external operator)
    #[error("Execution Disabled: {0}")]
    ExecutionDisabled(String),

    /// Cross-chain transfer errors
    #[error("Bridge Error: {0}")]
    BridgeError(String),

    /// Parsing errors for on-chain or API data
    #[error("Parse Error: {0}")]
    ParseError(String),

    /// Unknown/unclassified errors
    #[error("Unknown Error: {0}")]
    Unknown(String),
}

impl From<serde_json::Error> for ArbError {
    fn from(err: serde_json::Error) -> Self {
        ArbError::ParseError(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for ArbError {
    fn from(err: reqwest::Error) -> Self {
        ArbError::NetworkError(format!("HTTP error: {}", err))
    }
}

impl From<solana_client::client_error::ClientError> for ArbError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        ArbError::RpcError(format!("Solana client error: {}", err))
    }
}

impl ArbError {
    /// Transient errors are connectivity hiccups: the finality poller swallows
    /// them and retries on the next tick, and the orchestrator skips the
    /// iteration instead of treating them as terminal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ArbError::NetworkError(_) | ArbError::RpcError(_) | ArbError::QuoteError(_)
        )
    }
}
