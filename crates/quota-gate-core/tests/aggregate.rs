// crates/quota-gate-core/tests/aggregate.rs
// ============================================================================
// Module: Achievement Aggregation Tests
// Description: Read-time summation of monthly achievement records.
// Purpose: Ensure quarterly totals fold month rows without touching storage.
// Dependencies: quota-gate-core
// ============================================================================
//! ## Overview
//! Validates the pure summation over month rows used by quarterly
//! reporting.

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

use quota_gate_core::MetricValues;
use quota_gate_core::OwnerId;
use quota_gate_core::OwnerKind;
use quota_gate_core::Period;
use quota_gate_core::TargetId;
use quota_gate_core::TargetOwner;
use quota_gate_core::Timestamp;
use quota_gate_core::UnifiedTarget;
use quota_gate_core::UserId;
use quota_gate_core::sum_achievements;
use uuid::Uuid;

fn month_row(month: u8, achieved: MetricValues) -> UnifiedTarget {
    UnifiedTarget {
        id: TargetId::new_random(),
        owner: TargetOwner {
            kind: OwnerKind::Channel,
            id: OwnerId::new(Uuid::from_u128(7)),
        },
        period: Period::monthly(2025, 1, month),
        targets: MetricValues::default(),
        achieved,
        notes: None,
        created_at: Timestamp::from_unix_millis(0),
        created_by: UserId::new(Uuid::from_u128(8)),
        updated_at: Timestamp::from_unix_millis(0),
        last_modified_by: None,
    }
}

/// Verifies three month rows sum per metric into one quarterly total.
#[test]
fn monthly_achievements_sum_per_metric() {
    let rows = [
        month_row(
            1,
            MetricValues {
                new_signing: 10,
                core_opportunity: 20,
                core_performance: 30,
                high_value_opportunity: 40,
                high_value_performance: 50,
            },
        ),
        month_row(
            2,
            MetricValues {
                new_signing: 15,
                core_opportunity: 25,
                core_performance: 35,
                high_value_opportunity: 45,
                high_value_performance: 55,
            },
        ),
        month_row(
            3,
            MetricValues {
                new_signing: 5,
                core_opportunity: 15,
                core_performance: 25,
                high_value_opportunity: 35,
                high_value_performance: 45,
            },
        ),
    ];
    let totals = sum_achievements(rows.iter());
    assert_eq!(
        totals,
        MetricValues {
            new_signing: 30,
            core_opportunity: 60,
            core_performance: 90,
            high_value_opportunity: 120,
            high_value_performance: 150,
        }
    );
}

/// Verifies an empty row set sums to all zeros.
#[test]
fn empty_row_set_sums_to_zero() {
    let totals = sum_achievements(std::iter::empty());
    assert_eq!(totals, MetricValues::default());
}
