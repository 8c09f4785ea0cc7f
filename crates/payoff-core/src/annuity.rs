//! Closed-form fixed payment calculation for level-pay amortising loans.
//!
//! The standard annuity formula `P·r·(1+r)^n / ((1+r)^n − 1)`, with a
//! straight-line branch for zero-rate loans. All math in
//! `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PayoffError;
use crate::rates::pow_int;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PayoffResult;

/// Terms of a fixed-rate loan. The rate is per payment period
/// (annual rate / 12 for monthly payments).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub periodic_rate: Rate,
    pub periods: u32,
}

/// Result of a closed-form payment calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    /// Level payment due each period.
    pub periodic_payment: Money,
    /// `periodic_payment × periods`.
    pub total_paid: Money,
    /// `total_paid − principal`. Exactly zero only at a zero rate.
    pub total_interest: Money,
}

/// Compute the fixed periodic payment for a loan.
///
/// Returns `None` when no payment is computable: zero or negative
/// principal, zero periods, a negative rate, or terms whose compounding
/// factor outgrows `Decimal`. Callers must treat `None` as
/// "not enough input", never as a zero payment.
pub fn fixed_payment(principal: Money, periodic_rate: Rate, periods: u32) -> Option<PaymentResult> {
    if principal <= Decimal::ZERO || periods == 0 || periodic_rate < Decimal::ZERO {
        return None;
    }

    let n = Decimal::from(periods);

    let periodic_payment = if periodic_rate.is_zero() {
        // Straight-line: no interest, principal split evenly.
        principal / n
    } else {
        let factor = pow_int(Decimal::ONE + periodic_rate, periods)?;
        let denom = factor - Decimal::ONE;
        if denom <= Decimal::ZERO {
            return None;
        }
        // factor/denom stays near 1 even when factor is huge, so divide
        // first and keep the multiplications checked.
        let annuity_factor = factor.checked_div(denom)?;
        principal
            .checked_mul(periodic_rate)
            .and_then(|v| v.checked_mul(annuity_factor))?
    };

    let total_paid = periodic_payment.checked_mul(n)?;
    Some(PaymentResult {
        periodic_payment,
        total_paid,
        total_interest: total_paid - principal,
    })
}

/// Validating entry point around [`fixed_payment`].
pub fn analyze_payment(
    terms: &LoanTerms,
) -> PayoffResult<ComputationOutput<PaymentResult>> {
    let start = Instant::now();
    validate_terms(terms)?;

    let result = fixed_payment(terms.principal, terms.periodic_rate, terms.periods)
        .ok_or_else(|| {
            PayoffError::NotComputable(
                "Payment requires a positive principal, at least one period, and terms within decimal range".into(),
            )
        })?;

    let mut warnings: Vec<String> = Vec::new();
    if terms.periodic_rate.is_zero() {
        warnings.push("Zero periodic rate: straight-line repayment, no interest".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Annuity Payment",
        terms,
        warnings,
        elapsed,
        result,
    ))
}

fn validate_terms(terms: &LoanTerms) -> PayoffResult<()> {
    if terms.principal < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "principal".into(),
            reason: "Principal cannot be negative".into(),
        });
    }
    if terms.periodic_rate < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Periodic rate cannot be negative".into(),
        });
    }
    Ok(())
}
