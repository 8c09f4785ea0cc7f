//! Comparison calculators built on the annuity and schedule primitives:
//! extra-payment acceleration, balance transfers, and refinance
//! break-even.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PayoffError;
use crate::schedule::{run_simulation, PayoffOutcome, PayoffSchedule, RateSegment, SimulationInput};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PayoffResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Extra-payment comparison input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentInput {
    pub principal: Money,
    pub periodic_rate: Rate,
    pub periodic_payment: Money,
    pub extra_per_period: Money,
    pub max_periods: u32,
}

/// Balance transfer input. The transfer fee is capitalised onto the
/// transferred balance; the promo rate applies for `promo_periods`, then
/// the go-to rate thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceTransferInput {
    pub balance: Money,
    pub current_periodic_rate: Rate,
    pub transfer_fee_rate: Rate,
    pub promo_periodic_rate: Rate,
    pub promo_periods: u32,
    pub go_to_periodic_rate: Rate,
    pub periodic_payment: Money,
    pub max_periods: u32,
}

/// Refinance break-even input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceBreakevenInput {
    pub closing_costs: Money,
    pub current_payment: Money,
    pub new_payment: Money,
}

/// Top-level comparison input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComparisonInput {
    ExtraPayment(ExtraPaymentInput),
    BalanceTransfer(BalanceTransferInput),
    RefinanceBreakeven(RefinanceBreakevenInput),
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Extra-payment comparison output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentOutput {
    pub baseline_months: u32,
    pub accelerated_months: u32,
    pub months_saved: u32,
    pub baseline_interest: Money,
    pub accelerated_interest: Money,
    pub interest_saved: Money,
}

/// Balance transfer output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceTransferOutput {
    pub stay_months: u32,
    pub stay_total_cost: Money,
    pub transfer_fee: Money,
    pub transfer_months: u32,
    /// Payments on the transferred balance, fee included.
    pub transfer_total_cost: Money,
    /// Positive when transferring costs less.
    pub savings: Money,
    pub transfer_recommended: bool,
}

/// Refinance break-even output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceBreakevenOutput {
    pub monthly_savings: Money,
    /// First month in which cumulative savings cover the closing costs.
    pub breakeven_month: u32,
}

/// Unified comparison output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComparisonOutput {
    ExtraPayment(ExtraPaymentOutput),
    BalanceTransfer(BalanceTransferOutput),
    RefinanceBreakeven(RefinanceBreakevenOutput),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the requested comparison.
pub fn analyze_comparison(
    input: &ComparisonInput,
) -> PayoffResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();

    let (output, methodology, warnings) = match input {
        ComparisonInput::ExtraPayment(ep) => {
            let (out, w) = compute_extra_payment(ep)?;
            (
                ComparisonOutput::ExtraPayment(out),
                "Extra Payment Acceleration",
                w,
            )
        }
        ComparisonInput::BalanceTransfer(bt) => {
            let (out, w) = compute_balance_transfer(bt)?;
            (
                ComparisonOutput::BalanceTransfer(out),
                "Balance Transfer Comparison",
                w,
            )
        }
        ComparisonInput::RefinanceBreakeven(rb) => {
            let (out, w) = compute_refinance_breakeven(rb)?;
            (
                ComparisonOutput::RefinanceBreakeven(out),
                "Refinance Break-Even",
                w,
            )
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Extra payment
// ---------------------------------------------------------------------------

fn compute_extra_payment(
    input: &ExtraPaymentInput,
) -> PayoffResult<(ExtraPaymentOutput, Vec<String>)> {
    let warnings: Vec<String> = Vec::new();
    if input.extra_per_period < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "extra_per_period".into(),
            reason: "Extra payment cannot be negative".into(),
        });
    }

    let baseline = flat_rate_schedule(
        input.principal,
        input.periodic_rate,
        input.periodic_payment,
        Decimal::ZERO,
        input.max_periods,
    )?;
    let accelerated = flat_rate_schedule(
        input.principal,
        input.periodic_rate,
        input.periodic_payment,
        input.extra_per_period,
        input.max_periods,
    )?;

    Ok((
        ExtraPaymentOutput {
            baseline_months: baseline.months,
            accelerated_months: accelerated.months,
            months_saved: baseline.months.saturating_sub(accelerated.months),
            baseline_interest: baseline.total_interest,
            accelerated_interest: accelerated.total_interest,
            interest_saved: baseline.total_interest - accelerated.total_interest,
        },
        warnings,
    ))
}

// ---------------------------------------------------------------------------
// Balance transfer
// ---------------------------------------------------------------------------

fn compute_balance_transfer(
    input: &BalanceTransferInput,
) -> PayoffResult<(BalanceTransferOutput, Vec<String>)> {
    let mut warnings: Vec<String> = Vec::new();
    if input.transfer_fee_rate < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "transfer_fee_rate".into(),
            reason: "Transfer fee rate cannot be negative".into(),
        });
    }
    if input.promo_periods == 0 {
        warnings.push("Zero promo periods: the go-to rate applies from period 1".into());
    }

    // Staying put: one flat rate.
    let stay = flat_rate_schedule(
        input.balance,
        input.current_periodic_rate,
        input.periodic_payment,
        Decimal::ZERO,
        input.max_periods,
    )?;

    // Transferring: fee capitalised, promo segment then go-to segment.
    let transfer_fee = input.balance * input.transfer_fee_rate;
    let segments = if input.promo_periods == 0 {
        vec![RateSegment {
            from_period: 1,
            to_period: None,
            periodic_rate: input.go_to_periodic_rate,
        }]
    } else {
        vec![
            RateSegment {
                from_period: 1,
                to_period: Some(input.promo_periods),
                periodic_rate: input.promo_periodic_rate,
            },
            RateSegment {
                from_period: input.promo_periods + 1,
                to_period: None,
                periodic_rate: input.go_to_periodic_rate,
            },
        ]
    };
    let transfer = completed_schedule(&SimulationInput {
        principal: input.balance + transfer_fee,
        segments,
        periodic_payment: input.periodic_payment,
        extra_per_period: Decimal::ZERO,
        max_periods: input.max_periods,
        start_date: None,
    })?;

    let stay_total_cost = stay.total_paid;
    let transfer_total_cost = transfer.total_paid;
    let savings = stay_total_cost - transfer_total_cost;

    Ok((
        BalanceTransferOutput {
            stay_months: stay.months,
            stay_total_cost,
            transfer_fee,
            transfer_months: transfer.months,
            transfer_total_cost,
            savings,
            transfer_recommended: savings > Decimal::ZERO,
        },
        warnings,
    ))
}

// ---------------------------------------------------------------------------
// Refinance break-even
// ---------------------------------------------------------------------------

fn compute_refinance_breakeven(
    input: &RefinanceBreakevenInput,
) -> PayoffResult<(RefinanceBreakevenOutput, Vec<String>)> {
    let warnings: Vec<String> = Vec::new();
    if input.closing_costs < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "closing_costs".into(),
            reason: "Closing costs cannot be negative".into(),
        });
    }

    let monthly_savings = input.current_payment - input.new_payment;
    if monthly_savings <= Decimal::ZERO {
        return Err(PayoffError::NotComputable(
            "New payment is not lower than the current payment; the refinance never breaks even"
                .into(),
        ));
    }

    // Ceiling division: the first whole month covering the costs.
    let ratio = input.closing_costs / monthly_savings;
    let mut breakeven = ratio.trunc();
    if ratio.fract() > Decimal::ZERO {
        breakeven += Decimal::ONE;
    }
    let breakeven_month = breakeven
        .to_u32()
        .ok_or_else(|| PayoffError::NotComputable("Break-even horizon overflows".into()))?;

    Ok((
        RefinanceBreakevenOutput {
            monthly_savings,
            breakeven_month,
        },
        warnings,
    ))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn flat_rate_schedule(
    principal: Money,
    rate: Rate,
    payment: Money,
    extra: Money,
    max_periods: u32,
) -> PayoffResult<PayoffSchedule> {
    completed_schedule(&SimulationInput {
        principal,
        segments: vec![RateSegment {
            from_period: 1,
            to_period: None,
            periodic_rate: rate,
        }],
        periodic_payment: payment,
        extra_per_period: extra,
        max_periods,
        start_date: None,
    })
}

/// Run a simulation that the comparison needs to complete; non-payoff
/// outcomes become typed errors with the specific cause.
fn completed_schedule(input: &SimulationInput) -> PayoffResult<PayoffSchedule> {
    if input.principal < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "principal".into(),
            reason: "Balance cannot be negative".into(),
        });
    }
    if input.max_periods == 0 {
        return Err(PayoffError::InvalidInput {
            field: "max_periods".into(),
            reason: "Safety cap must be at least 1 period".into(),
        });
    }
    match run_simulation(input) {
        PayoffOutcome::PaidOff(s) => Ok(s),
        PayoffOutcome::PaymentInsufficient { interest_accrued, payment, .. } => {
            Err(PayoffError::NotComputable(format!(
                "Payment {payment} does not cover the {interest_accrued} of interest accruing each period"
            )))
        }
        PayoffOutcome::HorizonExceeded { max_periods, .. } => {
            Err(PayoffError::NotComputable(format!(
                "Balance is not repaid within {max_periods} periods; increase the payment"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // -----------------------------------------------------------------------
    // 1. Extra payments save both months and interest
    // -----------------------------------------------------------------------
    #[test]
    fn test_extra_payment_saves() {
        let input = ComparisonInput::ExtraPayment(ExtraPaymentInput {
            principal: dec!(20000),
            periodic_rate: dec!(0.01),
            periodic_payment: dec!(500),
            extra_per_period: dec!(200),
            max_periods: 600,
        });
        let out = analyze_comparison(&input).unwrap();
        match out.result {
            ComparisonOutput::ExtraPayment(ep) => {
                assert!(ep.months_saved > 0);
                assert!(ep.interest_saved > Decimal::ZERO);
                assert!(ep.accelerated_months < ep.baseline_months);
            }
            other => panic!("Expected ExtraPayment output, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // 2. Zero extra is a no-op comparison
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_extra_no_savings() {
        let input = ComparisonInput::ExtraPayment(ExtraPaymentInput {
            principal: dec!(5000),
            periodic_rate: dec!(0.005),
            periodic_payment: dec!(250),
            extra_per_period: Decimal::ZERO,
            max_periods: 600,
        });
        let out = analyze_comparison(&input).unwrap();
        match out.result {
            ComparisonOutput::ExtraPayment(ep) => {
                assert_eq!(ep.months_saved, 0);
                assert_eq!(ep.interest_saved, Decimal::ZERO);
            }
            other => panic!("Expected ExtraPayment output, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // 3. A long 0% promo beats a high current rate despite the fee
    // -----------------------------------------------------------------------
    #[test]
    fn test_balance_transfer_recommended() {
        let input = ComparisonInput::BalanceTransfer(BalanceTransferInput {
            balance: dec!(8000),
            current_periodic_rate: dec!(0.22) / dec!(12),
            transfer_fee_rate: dec!(0.03),
            promo_periodic_rate: Decimal::ZERO,
            promo_periods: 18,
            go_to_periodic_rate: dec!(0.25) / dec!(12),
            periodic_payment: dec!(450),
            max_periods: 600,
        });
        let out = analyze_comparison(&input).unwrap();
        match out.result {
            ComparisonOutput::BalanceTransfer(bt) => {
                assert_eq!(bt.transfer_fee, dec!(240));
                assert!(bt.transfer_recommended, "savings = {}", bt.savings);
                assert!(bt.transfer_total_cost < bt.stay_total_cost);
            }
            other => panic!("Expected BalanceTransfer output, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // 4. A steep fee with no promo benefit is not recommended
    // -----------------------------------------------------------------------
    #[test]
    fn test_balance_transfer_not_recommended() {
        let input = ComparisonInput::BalanceTransfer(BalanceTransferInput {
            balance: dec!(8000),
            current_periodic_rate: dec!(0.10) / dec!(12),
            transfer_fee_rate: dec!(0.05),
            promo_periodic_rate: dec!(0.10) / dec!(12),
            promo_periods: 6,
            go_to_periodic_rate: dec!(0.10) / dec!(12),
            periodic_payment: dec!(450),
            max_periods: 600,
        });
        let out = analyze_comparison(&input).unwrap();
        match out.result {
            ComparisonOutput::BalanceTransfer(bt) => {
                assert!(!bt.transfer_recommended);
                assert!(bt.savings < Decimal::ZERO);
            }
            other => panic!("Expected BalanceTransfer output, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // 5. Break-even month is the ceiling of costs over savings
    // -----------------------------------------------------------------------
    #[test]
    fn test_refinance_breakeven_ceiling() {
        let input = ComparisonInput::RefinanceBreakeven(RefinanceBreakevenInput {
            closing_costs: dec!(3500),
            current_payment: dec!(1900),
            new_payment: dec!(1700),
        });
        let out = analyze_comparison(&input).unwrap();
        match out.result {
            ComparisonOutput::RefinanceBreakeven(rb) => {
                assert_eq!(rb.monthly_savings, dec!(200));
                // 3500 / 200 = 17.5 -> month 18
                assert_eq!(rb.breakeven_month, 18);
            }
            other => panic!("Expected RefinanceBreakeven output, got {other:?}"),
        }
    }

    #[test]
    fn test_refinance_exact_division() {
        let input = ComparisonInput::RefinanceBreakeven(RefinanceBreakevenInput {
            closing_costs: dec!(4000),
            current_payment: dec!(1900),
            new_payment: dec!(1700),
        });
        let out = analyze_comparison(&input).unwrap();
        match out.result {
            ComparisonOutput::RefinanceBreakeven(rb) => assert_eq!(rb.breakeven_month, 20),
            other => panic!("Expected RefinanceBreakeven output, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // 6. A refinance that raises the payment never breaks even
    // -----------------------------------------------------------------------
    #[test]
    fn test_refinance_no_savings() {
        let input = ComparisonInput::RefinanceBreakeven(RefinanceBreakevenInput {
            closing_costs: dec!(3500),
            current_payment: dec!(1700),
            new_payment: dec!(1900),
        });
        match analyze_comparison(&input) {
            Err(PayoffError::NotComputable(_)) => {}
            other => panic!("Expected NotComputable, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // 7. A non-amortising baseline surfaces as a typed error
    // -----------------------------------------------------------------------
    #[test]
    fn test_stuck_baseline_is_error() {
        let input = ComparisonInput::ExtraPayment(ExtraPaymentInput {
            principal: dec!(10000),
            periodic_rate: dec!(0.10),
            periodic_payment: dec!(50),
            extra_per_period: dec!(10),
            max_periods: 600,
        });
        match analyze_comparison(&input) {
            Err(PayoffError::NotComputable(_)) => {}
            other => panic!("Expected NotComputable, got {other:?}"),
        }
    }
}
