//! Cross-chain AMM arbitrage bot for a single token pair traded on a
//! Uniswap-V2 style pair (Ethereum) and a PumpSwap style curve (Solana).

pub mod arbitrage;
pub mod bridge;
pub mod config;
pub mod error;
pub mod ethereum;
pub mod events;
pub mod price;
pub mod solana;
pub mod utils;

pub use arbitrage::ArbitrageOrchestrator;
pub use config::Config;
pub use error::ArbError;
