use crate::dex::keys::PoolKeys;
use crate::dex::state::PoolReserveSnapshot;
use crate::errors::{AppError, Result};
use crate::models::{Direction, SwapAmounts};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

const BPS_DENOMINATOR: u128 = 10_000;

/// Display amount → base units, truncating sub-unit dust.
pub fn to_base_units(amount: &BigDecimal, decimals: u8) -> Result<u64> {
    let scale = BigDecimal::new(BigInt::from(1), -i64::from(decimals));
    (amount * &scale)
        .with_scale(0)
        .to_u64()
        .ok_or_else(|| AppError::Quote(format!("{amount} does not fit in base units")))
}

/// `10^decimals` in base units, i.e. one display unit.
fn one_display_unit(decimals: u8) -> Result<u64> {
    10u64
        .checked_pow(u32::from(decimals))
        .ok_or_else(|| AppError::Quote(format!("unsupported precision {decimals}")))
}

/// Constant-product output for an exact input. The fee is taken from the
/// input and rounded up, the output is rounded down.
pub fn compute_amount_out(
    reserve_in: u64,
    reserve_out: u64,
    amount_in: u64,
    fee_numerator: u64,
    fee_denominator: u64,
) -> Result<u64> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AppError::Quote("pool has no liquidity".into()));
    }
    if fee_denominator == 0 {
        return Err(AppError::Quote("fee denominator is zero".into()));
    }
    let amount_in = u128::from(amount_in);
    let fee = (amount_in * u128::from(fee_numerator)).div_ceil(u128::from(fee_denominator));
    let amount_after_fee = amount_in.saturating_sub(fee);
    let out = u128::from(reserve_out) * amount_after_fee
        / (u128::from(reserve_in) + amount_after_fee);
    u64::try_from(out).map_err(|_| AppError::Quote("output overflows u64".into()))
}

/// Minimum acceptable output under a slippage tolerance. Zero bps leaves
/// `amount_out` untouched.
pub fn apply_slippage(amount_out: u64, slippage_bps: u64) -> u64 {
    let scaled =
        u128::from(amount_out) * BPS_DENOMINATOR / (BPS_DENOMINATOR + u128::from(slippage_bps));
    // scaled <= amount_out, so it always fits.
    scaled as u64
}

fn quote_leg(reserves: &PoolReserveSnapshot, direction: Direction, amount_in: u64) -> Result<u64> {
    let (reserve_in, reserve_out) = match direction {
        Direction::Inbound => (reserves.quote_reserve, reserves.base_reserve),
        Direction::Outbound => (reserves.base_reserve, reserves.quote_reserve),
    };
    compute_amount_out(
        reserve_in,
        reserve_out,
        amount_in,
        reserves.fee_numerator,
        reserves.fee_denominator,
    )
}

/// The reference swap is scaled up until it yields this many quote units.
const REFERENCE_MIN_OUT: u64 = 1_000_000_000;
/// The reference swap never exceeds 1 / n of the base reserve.
const REFERENCE_MAX_RESERVE_SHARE: u64 = 1_000;

/// Base input whose output first reaches `wanted_out` quote units.
///
/// A reference swap gives the starting rate. The estimate is then widened by
/// doubling and narrowed by bisection to the smallest sufficient input.
/// Output is monotone in input, so the result never falls short.
fn outbound_input(pool: &PoolKeys, reserves: &PoolReserveSnapshot, wanted_out: u64) -> Result<u64> {
    if wanted_out == 0 {
        return Ok(0);
    }
    if wanted_out >= reserves.quote_reserve {
        return Err(AppError::Quote(format!(
            "{wanted_out} exceeds quote reserve {}",
            reserves.quote_reserve
        )));
    }
    let leg = |amount_in: u64| quote_leg(reserves, Direction::Outbound, amount_in);

    let mut reference_in = one_display_unit(pool.base_decimals)?;
    let mut reference_out = leg(reference_in)?;
    let reference_cap = reserves.base_reserve / REFERENCE_MAX_RESERVE_SHARE;
    while reference_out < REFERENCE_MIN_OUT {
        match reference_in.checked_mul(10) {
            Some(next) if next <= reference_cap => {
                reference_in = next;
                reference_out = leg(reference_in)?;
            }
            _ => break,
        }
    }
    if reference_out == 0 {
        return Err(AppError::Quote("reference swap returned nothing".into()));
    }
    let estimate = u128::from(wanted_out) * u128::from(reference_in) / u128::from(reference_out);
    let estimate = u64::try_from(estimate)
        .map_err(|_| AppError::Quote("resolved input overflows u64".into()))?;

    // leg(lo) < wanted_out <= leg(hi)
    let mut lo = 0u64;
    let mut hi = estimate.max(1);
    while leg(hi)? < wanted_out {
        lo = hi;
        hi = hi
            .checked_mul(2)
            .ok_or_else(|| AppError::Quote(format!("{wanted_out} cannot be filled")))?;
    }
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if leg(mid)? >= wanted_out {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(hi)
}

/// Resolve a desired trade size into exact swap amounts.
///
/// `desired` is always in quote display units: the amount spent for
/// `Inbound`, the amount to receive for `Outbound`. Outbound sizing finds the
/// smallest base input that yields the wanted quote amount, then prices that
/// input for the real minimum output.
pub fn resolve_amounts(
    pool: &PoolKeys,
    reserves: &PoolReserveSnapshot,
    direction: Direction,
    desired: &BigDecimal,
    slippage_bps: u64,
) -> Result<SwapAmounts> {
    let amount_in = match direction {
        Direction::Inbound => to_base_units(desired, pool.quote_decimals)?,
        Direction::Outbound => {
            let wanted_out = to_base_units(desired, pool.quote_decimals)?;
            outbound_input(pool, reserves, wanted_out)?
        }
    };
    if amount_in == 0 {
        return Err(AppError::Quote(format!(
            "{desired} resolves to zero base units"
        )));
    }

    let amount_out = quote_leg(reserves, direction, amount_in)?;
    Ok(SwapAmounts {
        amount_in,
        min_amount_out: apply_slippage(amount_out, slippage_bps),
    })
}
