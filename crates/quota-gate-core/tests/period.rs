// crates/quota-gate-core/tests/period.rs
// ============================================================================
// Module: Period Shape Tests
// Description: Structural invariants for quarter- and month-granularity periods.
// Purpose: Ensure period validation rejects every malformed shape with a
//          specific message.
// Dependencies: quota-gate-core
// ============================================================================
//! ## Overview
//! Validates the period-shape invariants enforced before any storage write.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use quota_gate_core::Period;
use quota_gate_core::PeriodType;
use quota_gate_core::QuotaError;
use quota_gate_core::month_in_quarter;
use quota_gate_core::quarter_month_span;

// ============================================================================
// SECTION: Valid Shapes
// ============================================================================

/// Verifies well-formed quarterly and monthly periods validate.
#[test]
fn valid_periods_pass_validation() {
    for quarter in 1..=4 {
        assert!(Period::quarterly(2025, quarter).validate().is_ok());
        let (first, last) = quarter_month_span(quarter);
        for month in first..=last {
            assert!(Period::monthly(2025, quarter, month).validate().is_ok());
        }
    }
}

// ============================================================================
// SECTION: Invalid Shapes
// ============================================================================

/// Verifies a quarterly period carrying a month is rejected with the
/// granularity-specific message.
#[test]
fn quarterly_period_with_month_is_rejected() {
    let period = Period {
        period_type: PeriodType::Quarter,
        year: 2025,
        quarter: 2,
        month: Some(4),
    };
    match period.validate() {
        Err(QuotaError::Validation(message)) => {
            assert_eq!(message, "quarterly targets cannot specify a month");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// Verifies a monthly period missing its month is rejected with the
/// granularity-specific message.
#[test]
fn monthly_period_without_month_is_rejected() {
    let period = Period {
        period_type: PeriodType::Month,
        year: 2025,
        quarter: 2,
        month: None,
    };
    match period.validate() {
        Err(QuotaError::Validation(message)) => {
            assert_eq!(message, "monthly targets must include a month value");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// Verifies out-of-range quarter and month numbers are rejected.
#[test]
fn out_of_range_numbers_are_rejected() {
    for quarter in [0, 5, 12] {
        assert!(matches!(
            Period::quarterly(2025, quarter).validate(),
            Err(QuotaError::Validation(_))
        ));
    }
    for month in [0, 13, 99] {
        assert!(matches!(
            Period::monthly(2025, 1, month).validate(),
            Err(QuotaError::Validation(_))
        ));
    }
}

// ============================================================================
// SECTION: Quarter Spans
// ============================================================================

/// Verifies the month span covered by each quarter.
#[test]
fn quarter_spans_cover_the_calendar() {
    assert_eq!(quarter_month_span(1), (1, 3));
    assert_eq!(quarter_month_span(2), (4, 6));
    assert_eq!(quarter_month_span(3), (7, 9));
    assert_eq!(quarter_month_span(4), (10, 12));
    assert!(month_in_quarter(5, 2));
    assert!(!month_in_quarter(7, 2));
}
