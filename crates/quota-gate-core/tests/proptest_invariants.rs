// crates/quota-gate-core/tests/proptest_invariants.rs
// ============================================================================
// Module: Property-Based Invariant Tests
// Description: Randomized coverage for period shapes and completion math.
// Purpose: Ensure validation accepts exactly the valid shapes and the
//          calculators never panic or divide by zero.
// Dependencies: quota-gate-core, proptest
// ============================================================================
//! ## Overview
//! Property-based checks over the period validator and both completion
//! calculators across the full input space.

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

use proptest::prelude::*;
use quota_gate_core::MetricKind;
use quota_gate_core::MetricValues;
use quota_gate_core::OwnerId;
use quota_gate_core::OwnerKind;
use quota_gate_core::Period;
use quota_gate_core::PeriodType;
use quota_gate_core::TargetId;
use quota_gate_core::TargetOwner;
use quota_gate_core::Timestamp;
use quota_gate_core::UnifiedTarget;
use quota_gate_core::UserId;
use quota_gate_core::completion;
use quota_gate_core::legacy_completion;
use uuid::Uuid;

fn metric_values() -> impl Strategy<Value = MetricValues> {
    (0_i64..1_000_000, 0_i64..1_000_000, 0_i64..1_000_000, 0_i64..1_000_000, 0_i64..1_000_000)
        .prop_map(|(a, b, c, d, e)| MetricValues {
            new_signing: a,
            core_opportunity: b,
            core_performance: c,
            high_value_opportunity: d,
            high_value_performance: e,
        })
}

fn target(targets: MetricValues, achieved: MetricValues) -> UnifiedTarget {
    UnifiedTarget {
        id: TargetId::new(Uuid::from_u128(11)),
        owner: TargetOwner {
            kind: OwnerKind::Person,
            id: OwnerId::new(Uuid::from_u128(12)),
        },
        period: Period::quarterly(2025, 4),
        targets,
        achieved,
        notes: None,
        created_at: Timestamp::from_unix_millis(0),
        created_by: UserId::new(Uuid::from_u128(13)),
        updated_at: Timestamp::from_unix_millis(0),
        last_modified_by: None,
    }
}

proptest! {
    /// Period validation accepts exactly the structurally valid shapes.
    #[test]
    fn period_validation_matches_the_shape_invariants(
        year in 1990_i32..2100,
        quarter in 0_u8..7,
        month in proptest::option::of(0_u8..15),
        quarterly in proptest::bool::ANY,
    ) {
        let period_type = if quarterly { PeriodType::Quarter } else { PeriodType::Month };
        let period = Period { period_type, year, quarter, month };
        let valid_quarter = (1..=4).contains(&quarter);
        let expected = valid_quarter
            && match period_type {
                PeriodType::Quarter => month.is_none(),
                PeriodType::Month => month.is_some_and(|value| (1..=12).contains(&value)),
            };
        prop_assert_eq!(period.validate().is_ok(), expected);
    }

    /// Completion never panics and keeps every percentage non-negative,
    /// with zero-target metrics pinned at zero.
    #[test]
    fn completion_is_total_and_non_negative(
        targets in metric_values(),
        achieved in metric_values(),
    ) {
        let row = target(targets, achieved);
        let report = completion(&row);
        for (kind, pct) in [
            (MetricKind::NewSigning, report.new_signing),
            (MetricKind::CoreOpportunity, report.core_opportunity),
            (MetricKind::CorePerformance, report.core_performance),
            (MetricKind::HighValueOpportunity, report.high_value_opportunity),
            (MetricKind::HighValuePerformance, report.high_value_performance),
        ] {
            prop_assert!(pct >= 0.0);
            if targets.get(kind) == 0 {
                prop_assert!(pct.abs() < f64::EPSILON);
            }
        }
        prop_assert!(report.overall >= 0.0);
        prop_assert!(report.overall.is_finite());
    }

    /// The legacy average always equals the mean of its three percentages
    /// up to the rounding step.
    #[test]
    fn legacy_average_tracks_its_three_percentages(
        targets in metric_values(),
        achieved in metric_values(),
    ) {
        let row = target(targets, achieved);
        let report = legacy_completion(&row);
        let mean = (report.performance + report.opportunity + report.project_count) / 3.0;
        prop_assert!((report.average - mean).abs() <= 0.005 + f64::EPSILON);
    }
}
