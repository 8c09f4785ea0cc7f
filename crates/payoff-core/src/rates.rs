//! Rate conversions and integer-power helpers shared by the engine modules.

use rust_decimal::Decimal;

use crate::error::PayoffError;
use crate::types::Rate;
use crate::PayoffResult;

/// Convert an annual rate to a periodic rate by simple division
/// (e.g. APR / 12 for monthly compounding).
pub fn periodic_from_annual(annual_rate: Rate, periods_per_year: u32) -> PayoffResult<Rate> {
    if periods_per_year == 0 {
        return Err(PayoffError::DivisionByZero {
            context: "periodic rate conversion".into(),
        });
    }
    Ok(annual_rate / Decimal::from(periods_per_year))
}

/// Compute base^n for a non-negative integer exponent via iterative
/// multiplication. Avoids the precision drift of transcendental powd for
/// the period counts this engine deals in (hundreds, not thousands).
///
/// Returns `None` when the product outgrows `Decimal`, which steep rates
/// over long terms can do.
pub fn pow_int(base: Decimal, n: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(base)?;
    }
    Some(result)
}
