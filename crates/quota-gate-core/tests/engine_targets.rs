// crates/quota-gate-core/tests/engine_targets.rs
// ============================================================================
// Module: Engine Target Tests
// Description: Unified target lifecycle through the gated engine.
// Purpose: Ensure period invariants, uniqueness, partial updates, and the
//          quarter view hold over the in-memory store.
// Dependencies: quota-gate-core
// ============================================================================
//! ## Overview
//! Exercises target creation, listing, the two separate update paths, the
//! no-op timestamp rule, deletion semantics, the quarter view, and
//! read-time aggregation.

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

mod common;

use common::TestEngine;
use common::engine;
use common::seed_user;
use quota_gate_core::AchievementChange;
use quota_gate_core::Actor;
use quota_gate_core::MetricUpdate;
use quota_gate_core::MetricValues;
use quota_gate_core::OwnerId;
use quota_gate_core::OwnerKind;
use quota_gate_core::Period;
use quota_gate_core::PeriodType;
use quota_gate_core::QuotaError;
use quota_gate_core::Role;
use quota_gate_core::TargetChange;
use quota_gate_core::TargetDraft;
use quota_gate_core::TargetFilter;
use quota_gate_core::TargetId;
use quota_gate_core::TargetOwner;
use quota_gate_core::UnifiedTarget;
use uuid::Uuid;

fn channel_owner(raw: u128) -> TargetOwner {
    TargetOwner {
        kind: OwnerKind::Channel,
        id: OwnerId::new(Uuid::from_u128(raw)),
    }
}

fn create_target(
    engine: &TestEngine,
    operator: &Actor,
    owner: TargetOwner,
    period: Period,
    targets: MetricValues,
) -> UnifiedTarget {
    engine
        .create_target(
            operator,
            TargetDraft {
                owner,
                period,
                targets,
                notes: None,
            },
        )
        .expect("target creation succeeds")
}

// ============================================================================
// SECTION: Creation and Invariants
// ============================================================================

/// Verifies created rows start with zero achievement regardless of the
/// draft's planned values.
#[test]
fn created_targets_start_with_zero_achievement() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let target = create_target(
        &engine,
        &manager,
        channel_owner(1),
        Period::quarterly(2025, 1),
        MetricValues {
            new_signing: 10,
            core_performance: 500,
            ..MetricValues::default()
        },
    );
    assert_eq!(target.achieved, MetricValues::default());
    assert_eq!(target.created_by, manager.user_id);
    assert!(target.last_modified_by.is_none());
}

/// Verifies malformed period shapes are rejected before storage.
#[test]
fn malformed_periods_are_rejected_at_creation() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);

    let quarterly_with_month = engine.create_target(
        &manager,
        TargetDraft {
            owner: channel_owner(1),
            period: Period {
                period_type: PeriodType::Quarter,
                year: 2025,
                quarter: 1,
                month: Some(2),
            },
            targets: MetricValues::default(),
            notes: None,
        },
    );
    assert!(matches!(quarterly_with_month, Err(QuotaError::Validation(_))));

    let monthly_without_month = engine.create_target(
        &manager,
        TargetDraft {
            owner: channel_owner(1),
            period: Period {
                period_type: PeriodType::Month,
                year: 2025,
                quarter: 1,
                month: None,
            },
            targets: MetricValues::default(),
            notes: None,
        },
    );
    assert!(matches!(monthly_without_month, Err(QuotaError::Validation(_))));
}

/// Verifies the owner/period tuple is unique while quarter and month rows
/// coexist.
#[test]
fn duplicate_period_tuples_conflict_but_granularities_coexist() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let owner = channel_owner(1);

    create_target(&engine, &manager, owner, Period::quarterly(2025, 1), MetricValues::default());
    let duplicate = engine.create_target(
        &manager,
        TargetDraft {
            owner,
            period: Period::quarterly(2025, 1),
            targets: MetricValues::default(),
            notes: None,
        },
    );
    assert!(matches!(duplicate, Err(QuotaError::Conflict(_))));

    // Same quarter number at month granularity is a distinct row.
    create_target(&engine, &manager, owner, Period::monthly(2025, 1, 2), MetricValues::default());
}

/// Verifies negative planned values are rejected as validation errors.
#[test]
fn negative_planned_values_are_rejected() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let result = engine.create_target(
        &manager,
        TargetDraft {
            owner: channel_owner(1),
            period: Period::quarterly(2025, 1),
            targets: MetricValues {
                core_performance: -5,
                ..MetricValues::default()
            },
            notes: None,
        },
    );
    assert!(matches!(result, Err(QuotaError::Validation(_))));
}

// ============================================================================
// SECTION: Update Paths
// ============================================================================

/// Verifies plan updates touch only supplied fields and stamp the modifier.
#[test]
fn plan_updates_apply_only_supplied_fields() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let target = create_target(
        &engine,
        &manager,
        channel_owner(1),
        Period::quarterly(2025, 1),
        MetricValues {
            new_signing: 10,
            core_opportunity: 100,
            ..MetricValues::default()
        },
    );

    let updated = engine
        .update_target(
            &manager,
            target.id,
            TargetChange {
                targets: MetricUpdate {
                    new_signing: Some(0),
                    ..MetricUpdate::default()
                },
                notes: Some("replanned after kickoff".to_string()),
            },
        )
        .expect("plan update succeeds");

    assert_eq!(updated.targets.new_signing, 0);
    assert_eq!(updated.targets.core_opportunity, 100);
    assert_eq!(updated.notes.as_deref(), Some("replanned after kickoff"));
    assert_eq!(updated.last_modified_by, Some(manager.user_id));
    assert!(updated.updated_at > target.updated_at);
}

/// Verifies a no-op update with no fields leaves the timestamps untouched.
#[test]
fn empty_update_does_not_bump_updated_at() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let target = create_target(
        &engine,
        &manager,
        channel_owner(1),
        Period::quarterly(2025, 1),
        MetricValues::default(),
    );

    let untouched = engine
        .update_target(&manager, target.id, TargetChange::default())
        .expect("no-op update succeeds");
    assert_eq!(untouched.updated_at, target.updated_at);
    assert!(untouched.last_modified_by.is_none());

    let untouched = engine
        .update_achievement(&manager, target.id, AchievementChange::default())
        .expect("no-op achievement update succeeds");
    assert_eq!(untouched.updated_at, target.updated_at);
}

/// Verifies the achievement path mutates achieved values and never the
/// planned side.
#[test]
fn achievement_updates_never_touch_planned_values() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let target = create_target(
        &engine,
        &manager,
        channel_owner(1),
        Period::quarterly(2025, 1),
        MetricValues {
            core_performance: 1_000,
            ..MetricValues::default()
        },
    );

    let updated = engine
        .update_achievement(
            &manager,
            target.id,
            AchievementChange {
                achieved: MetricUpdate {
                    core_performance: Some(250),
                    ..MetricUpdate::default()
                },
            },
        )
        .expect("achievement update succeeds");

    assert_eq!(updated.achieved.core_performance, 250);
    assert_eq!(updated.targets.core_performance, 1_000);
}

/// Verifies user-role callers are denied both update paths, including
/// achievement recording.
#[test]
fn regular_users_cannot_update_targets_or_achievement() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let (_, user_actor) = seed_user(&engine, "field rep", Role::User);
    let target = create_target(
        &engine,
        &manager,
        channel_owner(1),
        Period::quarterly(2025, 1),
        MetricValues::default(),
    );

    let plan = engine.update_target(&user_actor, target.id, TargetChange::default());
    assert!(matches!(plan, Err(QuotaError::Forbidden(_))));

    let achievement =
        engine.update_achievement(&user_actor, target.id, AchievementChange::default());
    assert!(matches!(achievement, Err(QuotaError::Forbidden(_))));
}

// ============================================================================
// SECTION: Deletion and Lookup
// ============================================================================

/// Verifies deleting a missing target reports not-found, unlike assignment
/// deletion.
#[test]
fn delete_missing_target_reports_not_found() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let result = engine.delete_target(&manager, TargetId::new(Uuid::from_u128(77)));
    assert!(matches!(result, Err(QuotaError::NotFound(_))));
}

/// Verifies deletion removes the row and a second delete reports
/// not-found.
#[test]
fn delete_target_removes_the_row() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let target = create_target(
        &engine,
        &manager,
        channel_owner(1),
        Period::quarterly(2025, 1),
        MetricValues::default(),
    );

    engine.delete_target(&manager, target.id).expect("delete succeeds");
    assert!(matches!(engine.get_target(target.id), Err(QuotaError::NotFound(_))));
    assert!(matches!(
        engine.delete_target(&manager, target.id),
        Err(QuotaError::NotFound(_))
    ));
}

// ============================================================================
// SECTION: Listing
// ============================================================================

/// Verifies listing orders rows most recent and most granular first with
/// quarter rows after their months, and pages with an independent total.
#[test]
fn listing_orders_and_paginates() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let owner = channel_owner(1);

    create_target(&engine, &manager, owner, Period::quarterly(2024, 4), MetricValues::default());
    create_target(&engine, &manager, owner, Period::quarterly(2025, 1), MetricValues::default());
    create_target(&engine, &manager, owner, Period::monthly(2025, 1, 1), MetricValues::default());
    create_target(&engine, &manager, owner, Period::monthly(2025, 1, 3), MetricValues::default());

    let filter = TargetFilter {
        owner_id: Some(owner.id),
        ..TargetFilter::default()
    };
    let page = engine.list_targets(&filter, 0, None).expect("listing succeeds");
    assert_eq!(page.total, 4);
    let periods: Vec<(i32, u8, Option<u8>)> = page
        .items
        .iter()
        .map(|target| (target.period.year, target.period.quarter, target.period.month))
        .collect();
    assert_eq!(
        periods,
        vec![(2025, 1, Some(3)), (2025, 1, Some(1)), (2025, 1, None), (2024, 4, None)]
    );

    let window = engine.list_targets(&filter, 1, Some(2)).expect("listing succeeds");
    assert_eq!(window.total, 4);
    assert_eq!(window.items.len(), 2);
    assert_eq!(window.items[0].period.month, Some(1));

    let zero_limit = engine.list_targets(&filter, 0, Some(0));
    assert!(matches!(zero_limit, Err(QuotaError::Validation(_))));
}

// ============================================================================
// SECTION: Quarter View and Aggregation
// ============================================================================

/// Verifies the quarter view returns month rows ascending even when no
/// quarter-level row exists.
#[test]
fn quarter_view_tolerates_missing_quarter_row() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let owner = channel_owner(1);
    create_target(&engine, &manager, owner, Period::monthly(2025, 2, 5), MetricValues::default());
    create_target(&engine, &manager, owner, Period::monthly(2025, 2, 4), MetricValues::default());

    let view = engine.quarter_view(owner, 2025, 2).expect("quarter view succeeds");
    assert!(view.quarter.is_none());
    let months: Vec<Option<u8>> = view.months.iter().map(|row| row.period.month).collect();
    assert_eq!(months, vec![Some(4), Some(5)]);
}

/// Verifies aggregation sums the month rows and ignores the quarter row.
#[test]
fn aggregation_sums_months_and_ignores_the_quarter_row() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let owner = channel_owner(1);

    let quarter_row = create_target(
        &engine,
        &manager,
        owner,
        Period::quarterly(2025, 1),
        MetricValues::default(),
    );
    engine
        .update_achievement(
            &manager,
            quarter_row.id,
            AchievementChange {
                achieved: MetricUpdate {
                    new_signing: Some(999),
                    ..MetricUpdate::default()
                },
            },
        )
        .expect("quarter-row achievement update succeeds");

    for (month, signed) in [(1_u8, 10_i64), (2, 15), (3, 5)] {
        let row = create_target(
            &engine,
            &manager,
            owner,
            Period::monthly(2025, 1, month),
            MetricValues::default(),
        );
        engine
            .update_achievement(
                &manager,
                row.id,
                AchievementChange {
                    achieved: MetricUpdate {
                        new_signing: Some(signed),
                        ..MetricUpdate::default()
                    },
                },
            )
            .expect("month-row achievement update succeeds");
    }

    let totals = engine.aggregate_achievement(owner, 2025, 1).expect("aggregation succeeds");
    assert_eq!(totals.new_signing, 30);

    // The quarter row's own achievement is untouched by aggregation.
    let reread = engine.get_target(quarter_row.id).expect("quarter row still present");
    assert_eq!(reread.achieved.new_signing, 999);
}

/// Verifies completion reads flow through the engine.
#[test]
fn completion_reads_flow_through_the_engine() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let target = create_target(
        &engine,
        &manager,
        channel_owner(1),
        Period::quarterly(2025, 1),
        MetricValues {
            core_performance: 200,
            ..MetricValues::default()
        },
    );
    engine
        .update_achievement(
            &manager,
            target.id,
            AchievementChange {
                achieved: MetricUpdate {
                    core_performance: Some(50),
                    ..MetricUpdate::default()
                },
            },
        )
        .expect("achievement update succeeds");

    let report = engine.target_completion(target.id).expect("completion succeeds");
    assert!((report.core_performance - 25.0).abs() < f64::EPSILON);
    assert!((report.overall - 25.0).abs() < f64::EPSILON);
}
