// src/arbitrage/types.rs
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which chain an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chain {
    Ethereum,
    Solana,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "Ethereum"),
            Chain::Solana => write!(f, "Solana"),
        }
    }
}

/// Direction of an arbitrage loop. A closed enum so the execution state
/// machine can be matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteDirection {
    /// Sell the token on the Solana curve, buy it back on the Ethereum pair
    SellSolBuyEth,
    /// Sell the token on the Ethereum pair, buy it back on the Solana curve
    SellEthBuySol,
    /// No profitable route
    None,
}

impl fmt::Display for RouteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteDirection::SellSolBuyEth => write!(f, "SELL ON SOL / BUY ON ETH"),
            RouteDirection::SellEthBuySol => write!(f, "SELL ON ETH / BUY ON SOL"),
            RouteDirection::None => write!(f, "N/A"),
        }
    }
}

/// Point-in-time state of both venues. Fetched fresh each iteration, held
/// constant through the route search, discarded afterwards.
#[derive(Debug, Clone)]
pub struct ReserveSnapshot {
    /// Uniswap pair reserve of WETH, in wei
    pub pair_reserve_weth: BigUint,
    /// Uniswap pair reserve of the token, in its smallest Ethereum unit
    pub pair_reserve_token: BigUint,
    /// Curve virtual base reserve (token raw units)
    pub curve_base: f64,
    /// Curve virtual quote reserve (lamports)
    pub curve_quote: f64,
    /// Price of one WETH expressed in SOL
    pub cross_rate: f64,
}

/// Wallet holdings across both chains, in whole-token units. Refreshed every
/// iteration; read-only within a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InventoryState {
    pub token_on_sol: f64,
    pub token_on_eth: f64,
    pub weth_on_sol: f64,
    pub eth_on_eth: f64,
    pub sol_on_sol: f64,
}

impl InventoryState {
    pub fn token_total(&self) -> f64 {
        self.token_on_sol + self.token_on_eth
    }

    pub fn counter_total(&self) -> f64 {
        self.weth_on_sol + self.eth_on_eth
    }
}

/// Result of a route search, consumed once by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrageRoute {
    pub direction: RouteDirection,
    /// Trade size in whole tokens
    pub input_tokens: u64,
    /// Expected profit in whole tokens
    pub expected_profit_tokens: f64,
    /// Expected profit valued in SOL (curve-ratio estimate; the orchestrator
    /// re-quotes before gating on the threshold)
    pub expected_profit_sol: f64,
    /// ETH that must be swapped on the other chain to close the loop
    pub cross_chain_eth: f64,
}

impl ArbitrageRoute {
    pub fn none() -> Self {
        Self {
            direction: RouteDirection::None,
            input_tokens: 0,
            expected_profit_tokens: 0.0,
            expected_profit_sol: 0.0,
            cross_chain_eth: 0.0,
        }
    }

    pub fn is_none(&self) -> bool {
        self.direction == RouteDirection::None
    }
}

/// A single inventory correction. More than one may fire per cycle; the
/// orchestrator executes all of them.
#[derive(Debug, Clone, PartialEq)]
pub enum RebalanceAction {
    /// Sell excess SOL down to the configured floor on the Solana venue
    /// (a same-chain swap, not a bridge).
    SellSettlementExcess { amount_sol: f64 },
    /// Move counter-asset (ETH/WETH) across chains to restore the target split.
    BridgeCounterAsset { amount_eth: f64, to: Chain },
    /// Move the arbitraged token across chains to restore the target split.
    BridgeToken { amount_tokens: f64, to: Chain },
}

impl fmt::Display for RebalanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalanceAction::SellSettlementExcess { amount_sol } => {
                write!(f, "sell {:.4} SOL of settlement excess", amount_sol)
            }
            RebalanceAction::BridgeCounterAsset { amount_eth, to } => {
                write!(f, "bridge {:.6} ETH to {}", amount_eth, to)
            }
            RebalanceAction::BridgeToken { amount_tokens, to } => {
                write!(f, "bridge {} tokens to {}", amount_tokens, to)
            }
        }
    }
}

/// A transaction submitted to Solana, along with the block height past which
/// its blockhash can no longer land.
#[derive(Debug, Clone)]
pub struct SubmittedTx {
    pub signature: String,
    pub last_valid_block_height: u64,
}
