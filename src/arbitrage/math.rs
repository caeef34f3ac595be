// src/arbitrage/math.rs
//! Pure pricing functions for the two venues.
//!
//! Both functions take `(amount_in, reserve_in, reserve_out)` for the
//! direction being simulated. Passing reserves in the wrong order silently
//! prices the opposite direction; ordering is the caller's responsibility.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// Uniswap V2 style fee: 0.3%
pub const PAIR_FEE_NUMERATOR: u64 = 997;
pub const PAIR_FEE_DENOMINATOR: u64 = 1000;

/// PumpSwap style curve fee: 1.0%
pub const CURVE_FEE_NUMERATOR: f64 = 990.0;
pub const CURVE_FEE_DENOMINATOR: f64 = 1000.0;

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;
pub const WEI_PER_ETH: f64 = 1e18;

/// Constant-product swap output in exact integer arithmetic.
///
/// out = floor(in * 997 * reserve_out / (reserve_in * 1000 + in * 997))
///
/// Intermediate products exceed 128 bits for uint112 reserves, hence BigUint.
pub fn constant_product_out(
    amount_in: &BigUint,
    reserve_in: &BigUint,
    reserve_out: &BigUint,
) -> BigUint {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return BigUint::zero();
    }
    let amount_in_with_fee = amount_in * BigUint::from(PAIR_FEE_NUMERATOR);
    let numerator = &amount_in_with_fee * reserve_out;
    let denominator = reserve_in * BigUint::from(PAIR_FEE_DENOMINATOR) + &amount_in_with_fee;
    numerator / denominator
}

/// Bonding-curve swap output over virtual reserves.
///
/// out = floor(in * 990 * reserve_out / (reserve_in * 1000 + in * 990))
///
/// The reserves are raw-unit magnitudes held constant through a search;
/// the result is floored so simulated profit is never overstated.
pub fn bonding_curve_out(amount_in: f64, reserve_in: f64, reserve_out: f64) -> f64 {
    if amount_in <= 0.0 || reserve_in <= 0.0 || reserve_out <= 0.0 {
        return 0.0;
    }
    let amount_in_with_fee = amount_in * CURVE_FEE_NUMERATOR;
    let numerator = amount_in_with_fee * reserve_out;
    let denominator = reserve_in * CURVE_FEE_DENOMINATOR + amount_in_with_fee;
    (numerator / denominator).floor()
}

/// Lossy conversion for comparing integer outputs against float inventories.
pub fn biguint_to_f64(value: &BigUint) -> f64 {
    value.to_f64().unwrap_or(f64::MAX)
}

/// Whole ETH (float) to wei, flooring. Non-positive inputs map to zero.
pub fn eth_to_wei(eth: f64) -> BigUint {
    if eth <= 0.0 {
        return BigUint::zero();
    }
    BigUint::from((eth * 1e18).floor() as u128)
}

/// Wei to whole ETH (float), for inventory comparisons only.
pub fn wei_to_eth(wei: &BigUint) -> f64 {
    biguint_to_f64(wei) / 1e18
}
