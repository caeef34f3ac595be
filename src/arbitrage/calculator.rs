// src/arbitrage/calculator.rs
//! Route search over both trade directions.
//!
//! A coarse linear scan, not a continuous optimizer: the profit-vs-size curve
//! under the combined pair/curve models and the hard liquidity ceiling is not
//! known to be unimodal, so candidates are enumerated at a fixed step and the
//! strictly best positive profit wins. Deterministic, no I/O.

use super::math;
use super::types::{ArbitrageRoute, InventoryState, ReserveSnapshot, RouteDirection};
use num_bigint::BigUint;

/// Knobs of the route search, sourced from config.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Scan step in whole tokens. Coarse on purpose: search resolution is
    /// traded for predictable cycle time.
    pub step_tokens: u64,
    /// Fraction of the smaller token holding that bounds the scan.
    pub inventory_fraction: f64,
    /// Fraction of destination-side counter inventory that halts a direction.
    pub liquidity_guard: f64,
    /// Token decimals on the Solana side.
    pub token_decimals_sol: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            step_tokens: 10,
            inventory_fraction: 0.8,
            liquidity_guard: 0.9,
            token_decimals_sol: 6,
        }
    }
}

/// Scan candidate sizes in both directions and return the best route found,
/// or a `None` route when no candidate yields positive profit.
pub fn find_best_route(
    inventory: &InventoryState,
    reserves: &ReserveSnapshot,
    params: &SearchParams,
) -> ArbitrageRoute {
    let smaller_holding = inventory.token_on_eth.min(inventory.token_on_sol).max(0.0);
    let end = (params.inventory_fraction * smaller_holding).floor() as u64;
    let token_unit = 10f64.powi(params.token_decimals_sol as i32);

    let mut best = ArbitrageRoute::none();

    // Direction 1: sell the token on the curve, buy it back on the pair.
    let mut i = 1u64;
    while i <= end {
        let input_raw = i as f64 * token_unit;
        let lamports_out =
            math::bonding_curve_out(input_raw, reserves.curve_base, reserves.curve_quote);
        let sol_received = lamports_out / math::LAMPORTS_PER_SOL;
        let eth_expected = if reserves.cross_rate > 0.0 {
            sol_received / reserves.cross_rate
        } else {
            0.0
        };
        // Inventory ceiling on the Ethereum side: larger sizes only need more.
        if eth_expected > params.liquidity_guard * inventory.eth_on_eth {
            break;
        }
        let wei_in = math::eth_to_wei(eth_expected);
        let token_out = math::constant_product_out(
            &wei_in,
            &reserves.pair_reserve_weth,
            &reserves.pair_reserve_token,
        );
        let tokens_back = math::biguint_to_f64(&token_out) / math::WEI_PER_ETH;
        let profit = tokens_back - i as f64;
        if profit > 0.0 && profit > best.expected_profit_tokens {
            best = ArbitrageRoute {
                direction: RouteDirection::SellSolBuyEth,
                input_tokens: i,
                expected_profit_tokens: profit,
                expected_profit_sol: 0.0,
                cross_chain_eth: eth_expected,
            };
        }
        i += params.step_tokens;
    }

    // Direction 2: sell the token on the pair, buy it back on the curve.
    let mut i = 1u64;
    while i <= end {
        let wei_in = BigUint::from(i) * BigUint::from(10u64).pow(18);
        let wei_out = math::constant_product_out(
            &wei_in,
            &reserves.pair_reserve_token,
            &reserves.pair_reserve_weth,
        );
        let eth_received = math::wei_to_eth(&wei_out);
        // Inventory ceiling on the Solana side.
        if eth_received > params.liquidity_guard * inventory.weth_on_sol {
            break;
        }
        let lamports_in = eth_received * reserves.cross_rate * math::LAMPORTS_PER_SOL;
        let token_out_raw =
            math::bonding_curve_out(lamports_in, reserves.curve_quote, reserves.curve_base);
        let tokens_back = token_out_raw / token_unit;
        let profit = tokens_back - i as f64;
        if profit > 0.0 && profit > best.expected_profit_tokens {
            best = ArbitrageRoute {
                direction: RouteDirection::SellEthBuySol,
                input_tokens: i,
                expected_profit_tokens: profit,
                expected_profit_sol: 0.0,
                cross_chain_eth: eth_received,
            };
        }
        i += params.step_tokens;
    }

    if !best.is_none() && reserves.curve_base > 0.0 {
        // Value the token profit in SOL from the curve's spot ratio. The
        // orchestrator re-quotes this before gating on the profit threshold.
        best.expected_profit_sol = best.expected_profit_tokens * token_unit
            * (reserves.curve_quote / reserves.curve_base)
            / math::LAMPORTS_PER_SOL;
    }
    best
}
