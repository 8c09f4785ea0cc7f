//! Iterative payoff simulation: step a balance period by period, applying
//! interest then principal reduction, until payoff or a safety cap.
//!
//! Rates may change over the horizon via ordered [`RateSegment`]s
//! (promotional/intro rates, rate shocks). A loan whose payment cannot
//! cover accruing interest is reported as a distinct outcome, never
//! simulated to the cap.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PayoffError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PayoffResult;

/// Caps above this draw a warning: 100 years of monthly payments is
/// almost certainly a mis-keyed input.
const HORIZON_WARNING_PERIODS: u32 = 1200;

/// A contiguous run of periods sharing one periodic rate.
/// Periods are 1-indexed; `to_period` is inclusive, `None` = open-ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSegment {
    pub from_period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_period: Option<u32>,
    pub periodic_rate: Rate,
}

/// Input for a payoff simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub principal: Money,
    /// Ordered, contiguous segments starting at period 1.
    pub segments: Vec<RateSegment>,
    /// Base scheduled payment per period.
    pub periodic_payment: Money,
    /// Additional amount applied on top of every payment.
    #[serde(default)]
    pub extra_per_period: Money,
    /// Safety cap on simulated periods (commonly 600 ≈ 50 years).
    pub max_periods: u32,
    /// Date of the first payment; when set, each snapshot is dated.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_date: Option<NaiveDate>,
}

/// One simulated period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    /// Period number (1-indexed).
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub interest_accrued: Money,
    pub principal_paid: Money,
    pub remaining_balance: Money,
}

/// A completed payoff schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffSchedule {
    pub periods: Vec<PeriodSnapshot>,
    /// Number of periods until the balance reached zero.
    pub months: u32,
    pub total_interest: Money,
    pub total_paid: Money,
}

/// Outcome of a simulation. The failure variants are computed results,
/// not errors: the caller turns them into actionable guidance
/// ("increase your payment").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PayoffOutcome {
    /// Balance reached zero within the horizon.
    PaidOff(PayoffSchedule),
    /// The payment never exceeds accruing interest; the balance cannot
    /// shrink and the loan would never terminate.
    PaymentInsufficient {
        period: u32,
        interest_accrued: Money,
        payment: Money,
    },
    /// The iteration cap was reached with a balance outstanding.
    HorizonExceeded {
        max_periods: u32,
        remaining_balance: Money,
        total_interest: Money,
        total_paid: Money,
    },
}

/// Simulate paying off a balance period by period.
pub fn simulate_payoff(
    input: &SimulationInput,
) -> PayoffResult<ComputationOutput<PayoffOutcome>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_simulation(input)?;

    if input.max_periods > HORIZON_WARNING_PERIODS {
        warnings.push(format!(
            "max_periods {} exceeds {} periods; check the input units",
            input.max_periods, HORIZON_WARNING_PERIODS
        ));
    }
    if horizon_past_segments(input) {
        warnings.push(
            "Rate segments end before max_periods; carrying the last segment's rate forward"
                .into(),
        );
    }

    let outcome = run_simulation(input);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Iterative Payoff Simulation",
        input,
        warnings,
        elapsed,
        outcome,
    ))
}

/// The simulation loop itself, shared with the comparison calculators.
pub fn run_simulation(input: &SimulationInput) -> PayoffOutcome {
    let mut balance = input.principal;
    let mut periods: Vec<PeriodSnapshot> = Vec::new();
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    if balance <= Decimal::ZERO {
        return PayoffOutcome::PaidOff(PayoffSchedule {
            periods,
            months: 0,
            total_interest,
            total_paid,
        });
    }

    let scheduled = input.periodic_payment + input.extra_per_period;

    for period in 1..=input.max_periods {
        let rate = active_rate(&input.segments, period);
        // Interest past decimal range dwarfs any representable payment.
        let interest = match balance.checked_mul(rate) {
            Some(i) => i,
            None => {
                return PayoffOutcome::PaymentInsufficient {
                    period,
                    interest_accrued: Decimal::MAX,
                    payment: scheduled,
                };
            }
        };

        // Stuck loan: with a positive rate the balance can never shrink.
        if rate > Decimal::ZERO && scheduled <= interest {
            return PayoffOutcome::PaymentInsufficient {
                period,
                interest_accrued: interest,
                payment: scheduled,
            };
        }

        // Clamp the final payment so the reported total is exact.
        let available = scheduled - interest;
        let (principal_paid, paid_this_period) = if available >= balance {
            (balance, interest + balance)
        } else {
            (available, scheduled)
        };

        balance -= principal_paid;
        total_interest += interest;
        total_paid += paid_this_period;

        periods.push(PeriodSnapshot {
            period,
            date: period_date(input.start_date, period),
            interest_accrued: interest,
            principal_paid,
            remaining_balance: balance,
        });

        if balance <= Decimal::ZERO {
            return PayoffOutcome::PaidOff(PayoffSchedule {
                months: period,
                periods,
                total_interest,
                total_paid,
            });
        }
    }

    PayoffOutcome::HorizonExceeded {
        max_periods: input.max_periods,
        remaining_balance: balance,
        total_interest,
        total_paid,
    }
}

/// Rate in force at a 1-indexed period. Past the last closed segment the
/// last rate carries forward.
fn active_rate(segments: &[RateSegment], period: u32) -> Rate {
    for seg in segments {
        let past_start = period >= seg.from_period;
        let before_end = seg.to_period.map(|to| period <= to).unwrap_or(true);
        if past_start && before_end {
            return seg.periodic_rate;
        }
    }
    segments.last().map(|s| s.periodic_rate).unwrap_or(Decimal::ZERO)
}

fn period_date(start_date: Option<NaiveDate>, period: u32) -> Option<NaiveDate> {
    start_date.and_then(|d| d.checked_add_months(Months::new(period - 1)))
}

fn horizon_past_segments(input: &SimulationInput) -> bool {
    match input.segments.last().and_then(|s| s.to_period) {
        Some(to) => to < input.max_periods,
        None => false,
    }
}

fn validate_simulation(input: &SimulationInput) -> PayoffResult<()> {
    if input.principal < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "principal".into(),
            reason: "Principal cannot be negative".into(),
        });
    }
    if input.periodic_payment < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "periodic_payment".into(),
            reason: "Payment cannot be negative".into(),
        });
    }
    if input.extra_per_period < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "extra_per_period".into(),
            reason: "Extra payment cannot be negative".into(),
        });
    }
    if input.max_periods == 0 {
        return Err(PayoffError::InvalidInput {
            field: "max_periods".into(),
            reason: "Safety cap must be at least 1 period".into(),
        });
    }
    if input.segments.is_empty() {
        return Err(PayoffError::InvalidInput {
            field: "segments".into(),
            reason: "At least one rate segment is required".into(),
        });
    }
    if input.segments[0].from_period != 1 {
        return Err(PayoffError::InvalidInput {
            field: "segments".into(),
            reason: "First rate segment must start at period 1".into(),
        });
    }

    let mut expected_from = 1u32;
    for (i, seg) in input.segments.iter().enumerate() {
        if seg.periodic_rate < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: format!("segments[{i}].periodic_rate"),
                reason: "Rate cannot be negative".into(),
            });
        }
        if seg.from_period != expected_from {
            return Err(PayoffError::InvalidInput {
                field: format!("segments[{i}].from_period"),
                reason: format!("Segments must be contiguous; expected {expected_from}"),
            });
        }
        match seg.to_period {
            Some(to) => {
                if to < seg.from_period {
                    return Err(PayoffError::InvalidInput {
                        field: format!("segments[{i}].to_period"),
                        reason: "Segment end precedes its start".into(),
                    });
                }
                // A segment ending at u32::MAX has no successor period.
                match to.checked_add(1) {
                    Some(next) => expected_from = next,
                    None => {
                        if i + 1 != input.segments.len() {
                            return Err(PayoffError::InvalidInput {
                                field: format!("segments[{i}].to_period"),
                                reason: "Segment end leaves no room for the segments after it"
                                    .into(),
                            });
                        }
                    }
                }
            }
            None => {
                if i + 1 != input.segments.len() {
                    return Err(PayoffError::InvalidInput {
                        field: format!("segments[{i}].to_period"),
                        reason: "Only the last segment may be open-ended".into(),
                    });
                }
            }
        }
    }

    Ok(())
}
