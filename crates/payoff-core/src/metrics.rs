//! Debt service coverage: income available for debt service against the
//! required payments, banded by conventional underwriting thresholds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PayoffError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::PayoffResult;

/// Underwriting rules of thumb. Business policy, kept as-is rather than
/// derived.
const DSCR_STRONG: Decimal = dec!(1.25);
const DSCR_BREAK_EVEN: Decimal = dec!(1.0);

/// DSCR input: both figures over the same period (typically annual).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DscrInput {
    pub net_operating_income: Money,
    pub debt_service: Money,
}

/// Risk band implied by the ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DscrBand {
    /// DSCR ≥ 1.25: comfortable coverage.
    Strong,
    /// 1.0 ≤ DSCR < 1.25: covers debt service with little cushion.
    Adequate,
    /// DSCR < 1.0: income does not cover debt service.
    Insufficient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DscrOutput {
    pub dscr: Decimal,
    pub band: DscrBand,
}

/// Compute the debt service coverage ratio.
pub fn assess_dscr(input: &DscrInput) -> PayoffResult<ComputationOutput<DscrOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.debt_service <= Decimal::ZERO {
        return Err(PayoffError::DivisionByZero {
            context: "DSCR debt service".into(),
        });
    }
    if input.net_operating_income < Decimal::ZERO {
        warnings.push("Negative net operating income".into());
    }

    let dscr = input.net_operating_income / input.debt_service;
    let band = if dscr >= DSCR_STRONG {
        DscrBand::Strong
    } else if dscr >= DSCR_BREAK_EVEN {
        DscrBand::Adequate
    } else {
        DscrBand::Insufficient
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt Service Coverage Ratio",
        input,
        warnings,
        elapsed,
        DscrOutput { dscr, band },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dscr_strong() {
        let out = assess_dscr(&DscrInput {
            net_operating_income: dec!(140000),
            debt_service: dec!(100000),
        })
        .unwrap();
        assert_eq!(out.result.dscr, dec!(1.4));
        assert_eq!(out.result.band, DscrBand::Strong);
    }

    #[test]
    fn test_dscr_adequate_at_threshold() {
        let out = assess_dscr(&DscrInput {
            net_operating_income: dec!(100000),
            debt_service: dec!(100000),
        })
        .unwrap();
        assert_eq!(out.result.dscr, Decimal::ONE);
        assert_eq!(out.result.band, DscrBand::Adequate);
    }

    #[test]
    fn test_dscr_insufficient() {
        let out = assess_dscr(&DscrInput {
            net_operating_income: dec!(80000),
            debt_service: dec!(100000),
        })
        .unwrap();
        assert_eq!(out.result.band, DscrBand::Insufficient);
    }

    #[test]
    fn test_dscr_strong_boundary() {
        let out = assess_dscr(&DscrInput {
            net_operating_income: dec!(125000),
            debt_service: dec!(100000),
        })
        .unwrap();
        assert_eq!(out.result.band, DscrBand::Strong);
    }

    #[test]
    fn test_dscr_zero_debt_service_error() {
        let result = assess_dscr(&DscrInput {
            net_operating_income: dec!(100000),
            debt_service: Decimal::ZERO,
        });
        assert!(matches!(result, Err(PayoffError::DivisionByZero { .. })));
    }

    #[test]
    fn test_dscr_negative_income_warns() {
        let out = assess_dscr(&DscrInput {
            net_operating_income: dec!(-5000),
            debt_service: dec!(100000),
        })
        .unwrap();
        assert_eq!(out.result.band, DscrBand::Insufficient);
        assert!(!out.warnings.is_empty());
    }
}
