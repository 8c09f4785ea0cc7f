//! Multi-debt payoff planning: avalanche (highest rate first) and
//! snowball (lowest balance first).
//!
//! Each period every active debt receives its minimum payment; the
//! remaining budget — the extra amount plus minimums freed by retired
//! debts — routes to a single target debt chosen by the policy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PayoffError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PayoffResult;

/// Target selection policy. Ties break by original input order in both
/// policies (strict comparisons over a first-match scan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoffPolicy {
    /// Highest periodic rate first.
    Avalanche,
    /// Lowest current balance first.
    Snowball,
}

/// One debt in the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtInput {
    pub name: String,
    pub balance: Money,
    pub periodic_rate: Rate,
    pub minimum_payment: Money,
}

/// Input for a multi-debt payoff plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInput {
    pub debts: Vec<DebtInput>,
    pub policy: PayoffPolicy,
    /// Budget on top of the sum of minimum payments.
    #[serde(default)]
    pub extra_per_period: Money,
    pub max_periods: u32,
}

/// Per-debt results, in payoff order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtSummary {
    pub name: String,
    /// Period in which this debt reached zero.
    pub paid_off_period: u32,
    pub interest_paid: Money,
    pub principal_paid: Money,
}

/// A completed plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    pub debts: Vec<DebtSummary>,
    /// Periods until every debt reached zero.
    pub months: u32,
    pub total_interest: Money,
    pub total_paid: Money,
}

/// Outcome of a plan; failure variants are computed results, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlanOutcome {
    PaidOff(PlanResult),
    /// No active debt's payment exceeds its own accrued interest, so no
    /// balance can shrink and no minimum will ever be freed.
    PaymentInsufficient {
        period: u32,
        interest_accrued: Money,
        budget: Money,
    },
    HorizonExceeded {
        max_periods: u32,
        remaining_balance: Money,
        total_interest: Money,
        total_paid: Money,
    },
}

/// Run a multi-debt payoff plan.
pub fn plan_payoff(input: &PlanInput) -> PayoffResult<ComputationOutput<PlanOutcome>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();
    validate_plan(input)?;

    let outcome = run_plan(input);

    let elapsed = start.elapsed().as_micros() as u64;
    let methodology = match input.policy {
        PayoffPolicy::Avalanche => "Debt Avalanche (highest rate first)",
        PayoffPolicy::Snowball => "Debt Snowball (lowest balance first)",
    };
    Ok(with_metadata(methodology, input, warnings, elapsed, outcome))
}

struct DebtState {
    index: usize,
    balance: Money,
    rate: Rate,
    minimum: Money,
    interest_paid: Money,
    principal_paid: Money,
    paid_off_period: Option<u32>,
}

fn run_plan(input: &PlanInput) -> PlanOutcome {
    let mut states: Vec<DebtState> = input
        .debts
        .iter()
        .enumerate()
        .map(|(index, d)| DebtState {
            index,
            balance: d.balance,
            rate: d.periodic_rate,
            minimum: d.minimum_payment,
            interest_paid: Decimal::ZERO,
            principal_paid: Decimal::ZERO,
            paid_off_period: None,
        })
        .collect();

    // Budget is fixed for the life of the plan: freed minimums roll over.
    let budget: Money =
        input.debts.iter().map(|d| d.minimum_payment).sum::<Decimal>() + input.extra_per_period;

    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut summaries: Vec<DebtSummary> = Vec::new();

    // Debts that start at zero are retired before the first period.
    for s in states.iter_mut().filter(|s| s.balance <= Decimal::ZERO) {
        s.paid_off_period = Some(0);
        summaries.push(DebtSummary {
            name: input.debts[s.index].name.clone(),
            paid_off_period: 0,
            interest_paid: Decimal::ZERO,
            principal_paid: Decimal::ZERO,
        });
    }

    if states.iter().all(|s| s.paid_off_period.is_some()) {
        return PlanOutcome::PaidOff(PlanResult {
            debts: summaries,
            months: 0,
            total_interest,
            total_paid,
        });
    }

    for period in 1..=input.max_periods {
        let debt_count = states.len();
        let mut interest_now = vec![Decimal::ZERO; debt_count];
        let mut paid_now = vec![Decimal::ZERO; debt_count];

        // Accrue interest on every active debt. A balance that has outgrown
        // decimal range already dwarfs any representable budget.
        let mut interest_this_period = Decimal::ZERO;
        for (i, s) in states.iter_mut().enumerate() {
            if s.paid_off_period.is_some() {
                continue;
            }
            let grown = s
                .balance
                .checked_mul(s.rate)
                .and_then(|interest| s.balance.checked_add(interest).map(|b| (interest, b)));
            let Some((interest, balance)) = grown else {
                return PlanOutcome::PaymentInsufficient {
                    period,
                    interest_accrued: Decimal::MAX,
                    budget,
                };
            };
            s.balance = balance;
            s.interest_paid += interest;
            interest_now[i] = interest;
            interest_this_period += interest;
        }

        total_interest += interest_this_period;

        // Minimum payments first, in input order.
        let mut remaining_budget = budget;
        for (i, s) in states.iter_mut().enumerate() {
            if s.paid_off_period.is_some() {
                continue;
            }
            let pay = s.minimum.min(s.balance).min(remaining_budget);
            s.balance -= pay;
            paid_now[i] = pay;
            total_paid += pay;
            remaining_budget -= pay;
        }

        // Route the leftover budget to one target until it runs out.
        while remaining_budget > Decimal::ZERO {
            let Some(target) = select_target(&states, input.policy) else {
                break;
            };
            let pay = states[target].balance.min(remaining_budget);
            states[target].balance -= pay;
            paid_now[target] += pay;
            total_paid += pay;
            remaining_budget -= pay;
            if states[target].balance > Decimal::ZERO {
                break;
            }
            // Target retired mid-period; the residue spills to the next one.
            retire(&mut states[target], period, &input.debts, &mut summaries);
        }

        // Retire anything the minimum payments alone finished.
        for i in 0..states.len() {
            if states[i].paid_off_period.is_none() && states[i].balance <= Decimal::ZERO {
                retire(&mut states[i], period, &input.debts, &mut summaries);
            }
        }

        // Stuck check is per debt: as long as any single debt outruns its
        // own interest it will retire and free its minimum, even while the
        // aggregate balance is still growing.
        let progressed = (0..debt_count).any(|i| paid_now[i] > interest_now[i]);
        if interest_this_period > Decimal::ZERO && !progressed {
            return PlanOutcome::PaymentInsufficient {
                period,
                interest_accrued: interest_this_period,
                budget,
            };
        }

        if states.iter().all(|s| s.paid_off_period.is_some()) {
            return PlanOutcome::PaidOff(PlanResult {
                debts: summaries,
                months: period,
                total_interest,
                total_paid,
            });
        }
    }

    let remaining_balance = states
        .iter()
        .filter(|s| s.paid_off_period.is_none())
        .map(|s| s.balance)
        .sum();
    PlanOutcome::HorizonExceeded {
        max_periods: input.max_periods,
        remaining_balance,
        total_interest,
        total_paid,
    }
}

fn retire(
    state: &mut DebtState,
    period: u32,
    debts: &[DebtInput],
    summaries: &mut Vec<DebtSummary>,
) {
    state.paid_off_period = Some(period);
    state.principal_paid = debts[state.index].balance;
    summaries.push(DebtSummary {
        name: debts[state.index].name.clone(),
        paid_off_period: period,
        interest_paid: state.interest_paid,
        principal_paid: state.principal_paid,
    });
}

/// Pick the extra-payment target among active debts. First-match scan with
/// strict comparisons, so ties fall to the earliest debt in input order.
fn select_target(states: &[DebtState], policy: PayoffPolicy) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, s) in states.iter().enumerate() {
        if s.paid_off_period.is_some() || s.balance <= Decimal::ZERO {
            continue;
        }
        best = Some(match best {
            None => i,
            Some(b) => match policy {
                PayoffPolicy::Avalanche if s.rate > states[b].rate => i,
                PayoffPolicy::Snowball if s.balance < states[b].balance => i,
                _ => b,
            },
        });
    }
    best
}

fn validate_plan(input: &PlanInput) -> PayoffResult<()> {
    if input.debts.is_empty() {
        return Err(PayoffError::InvalidInput {
            field: "debts".into(),
            reason: "At least one debt is required".into(),
        });
    }
    if input.max_periods == 0 {
        return Err(PayoffError::InvalidInput {
            field: "max_periods".into(),
            reason: "Safety cap must be at least 1 period".into(),
        });
    }
    if input.extra_per_period < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "extra_per_period".into(),
            reason: "Extra budget cannot be negative".into(),
        });
    }
    for (i, d) in input.debts.iter().enumerate() {
        if d.balance < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: format!("debts[{i}].balance"),
                reason: "Balance cannot be negative".into(),
            });
        }
        if d.periodic_rate < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: format!("debts[{i}].periodic_rate"),
                reason: "Rate cannot be negative".into(),
            });
        }
        if d.minimum_payment < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: format!("debts[{i}].minimum_payment"),
                reason: "Minimum payment cannot be negative".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn two_card_input(policy: PayoffPolicy) -> PlanInput {
        PlanInput {
            debts: vec![
                DebtInput {
                    name: "Card A".into(),
                    balance: dec!(1000),
                    periodic_rate: dec!(0.20) / dec!(12),
                    minimum_payment: dec!(50),
                },
                DebtInput {
                    name: "Card B".into(),
                    balance: dec!(2000),
                    periodic_rate: dec!(0.10) / dec!(12),
                    minimum_payment: dec!(60),
                },
            ],
            policy,
            extra_per_period: dec!(100),
            max_periods: 600,
        }
    }

    fn expect_paid_off(outcome: PlanOutcome) -> PlanResult {
        match outcome {
            PlanOutcome::PaidOff(r) => r,
            other => panic!("Expected PaidOff, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // 1. Avalanche routes the extra budget to the highest-rate debt
    // -----------------------------------------------------------------------
    #[test]
    fn test_avalanche_targets_highest_rate() {
        let result = expect_paid_off(run_plan(&two_card_input(PayoffPolicy::Avalanche)));
        // The 20% card retires first even though it is the larger payment target.
        assert_eq!(result.debts[0].name, "Card A");
        assert!(result.debts[0].paid_off_period < result.debts[1].paid_off_period);
    }

    // -----------------------------------------------------------------------
    // 2. Snowball targets the lowest balance
    // -----------------------------------------------------------------------
    #[test]
    fn test_snowball_targets_lowest_balance() {
        let mut input = two_card_input(PayoffPolicy::Snowball);
        // Make the low-balance debt the *low*-rate one so the policies differ.
        input.debts[0].periodic_rate = dec!(0.05) / dec!(12);
        let result = expect_paid_off(run_plan(&input));
        assert_eq!(result.debts[0].name, "Card A");
    }

    // -----------------------------------------------------------------------
    // 3. Avalanche never pays more interest than snowball
    // -----------------------------------------------------------------------
    #[test]
    fn test_avalanche_interest_dominance() {
        let avalanche = expect_paid_off(run_plan(&two_card_input(PayoffPolicy::Avalanche)));
        let snowball = expect_paid_off(run_plan(&two_card_input(PayoffPolicy::Snowball)));
        assert!(avalanche.total_interest <= snowball.total_interest);
    }

    // -----------------------------------------------------------------------
    // 4. Rate ties break by input order
    // -----------------------------------------------------------------------
    #[test]
    fn test_tie_break_input_order() {
        let mut input = two_card_input(PayoffPolicy::Avalanche);
        input.debts[1].periodic_rate = input.debts[0].periodic_rate;
        let result = expect_paid_off(run_plan(&input));
        assert_eq!(result.debts[0].name, "Card A");
    }

    // -----------------------------------------------------------------------
    // 5. Freed minimums roll into the extra budget
    // -----------------------------------------------------------------------
    #[test]
    fn test_minimum_rollover() {
        let with_rollover = expect_paid_off(run_plan(&two_card_input(PayoffPolicy::Avalanche)));

        // A plan whose budget never grows (extra only, no freed minimum)
        // would take longer; verify the combined plan beats Card B alone
        // paying just its minimum.
        let solo = PlanInput {
            debts: vec![two_card_input(PayoffPolicy::Avalanche).debts[1].clone()],
            policy: PayoffPolicy::Avalanche,
            extra_per_period: Decimal::ZERO,
            max_periods: 600,
        };
        let solo_result = expect_paid_off(run_plan(&solo));
        assert!(with_rollover.months < solo_result.months);
    }

    // -----------------------------------------------------------------------
    // 6. A budget no debt can outrun is reported, not simulated forever
    // -----------------------------------------------------------------------
    #[test]
    fn test_plan_payment_insufficient() {
        let input = PlanInput {
            debts: vec![DebtInput {
                name: "Underwater".into(),
                balance: dec!(10000),
                periodic_rate: dec!(0.10),
                minimum_payment: dec!(50),
            }],
            policy: PayoffPolicy::Avalanche,
            extra_per_period: Decimal::ZERO,
            max_periods: 600,
        };
        match run_plan(&input) {
            PlanOutcome::PaymentInsufficient { period, budget, .. } => {
                assert_eq!(period, 1);
                assert_eq!(budget, dec!(50));
            }
            other => panic!("Expected PaymentInsufficient, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // 6b. Aggregate interest above the budget is not stuck while one debt
    //     still amortises: its freed minimum later carries the rest
    // -----------------------------------------------------------------------
    #[test]
    fn test_mixed_rates_still_amortise() {
        // Aggregate interest in period 1 is 110 against a 105 budget, but
        // the fast debt shrinks by 5 a period, retires, and its minimum
        // then pays the slow one down.
        let input = PlanInput {
            debts: vec![
                DebtInput {
                    name: "Fast".into(),
                    balance: dec!(100),
                    periodic_rate: dec!(1.0),
                    minimum_payment: dec!(105),
                },
                DebtInput {
                    name: "Slow".into(),
                    balance: dec!(10000),
                    periodic_rate: dec!(0.001),
                    minimum_payment: Decimal::ZERO,
                },
            ],
            policy: PayoffPolicy::Avalanche,
            extra_per_period: Decimal::ZERO,
            max_periods: 600,
        };
        let result = expect_paid_off(run_plan(&input));
        assert_eq!(result.debts[0].name, "Fast");
        assert!(
            result.months > 100 && result.months < 115,
            "months = {}",
            result.months
        );
    }

    // -----------------------------------------------------------------------
    // 7. Plan totals reconcile with the input balances
    // -----------------------------------------------------------------------
    #[test]
    fn test_plan_totals_reconcile() {
        let result = expect_paid_off(run_plan(&two_card_input(PayoffPolicy::Avalanche)));
        let tol = dec!(0.000001);
        assert!((result.total_paid - (dec!(3000) + result.total_interest)).abs() < tol);
        assert_eq!(result.debts.len(), 2);
    }

    // -----------------------------------------------------------------------
    // 8. Debts starting at zero are retired up front
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_balance_debt() {
        let mut input = two_card_input(PayoffPolicy::Avalanche);
        input.debts[0].balance = Decimal::ZERO;
        let result = expect_paid_off(run_plan(&input));
        assert_eq!(result.debts[0].paid_off_period, 0);
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------
    #[test]
    fn test_validation_empty_debts() {
        let input = PlanInput {
            debts: vec![],
            policy: PayoffPolicy::Avalanche,
            extra_per_period: Decimal::ZERO,
            max_periods: 600,
        };
        assert!(plan_payoff(&input).is_err());
    }

    #[test]
    fn test_validation_negative_minimum() {
        let mut input = two_card_input(PayoffPolicy::Snowball);
        input.debts[1].minimum_payment = dec!(-1);
        assert!(plan_payoff(&input).is_err());
    }
}
