// crates/quota-gate-core/tests/legacy_roundtrip.rs
// ============================================================================
// Module: Legacy Plan Facade Tests
// Description: Old-shape plan lifecycle over the unified engine.
// Purpose: Ensure the legacy mapping is exact, reversible, and keeps the
//          old averaging semantics.
// Dependencies: quota-gate-core
// ============================================================================
//! ## Overview
//! Drives a legacy create/read/update/achievement/completion sequence and
//! checks the old wire values reproduce exactly, including two-decimal
//! currency formatting.

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
    clippy::float_cmp,
    reason = "Test-only output, panic-based assertions, and exact rounded \
              float comparisons are permitted."
)]

mod common;

use common::engine;
use common::seed_user;
use quota_gate_core::LegacyAchievementChange;
use quota_gate_core::LegacyPlanChange;
use quota_gate_core::LegacyPlanDraft;
use quota_gate_core::LegacyPlanFacade;
use quota_gate_core::MetricValues;
use quota_gate_core::OwnerId;
use quota_gate_core::OwnerKind;
use quota_gate_core::Period;
use quota_gate_core::QuotaError;
use quota_gate_core::Role;
use quota_gate_core::TargetDraft;
use quota_gate_core::TargetOwner;
use quota_gate_core::UserId;
use quota_gate_core::format_currency;
use quota_gate_core::parse_currency;
use uuid::Uuid;

fn draft(channel_id: quota_gate_core::ChannelId) -> LegacyPlanDraft {
    LegacyPlanDraft {
        channel_id,
        year: 2025,
        quarter: 2,
        month: None,
        performance_target: "100000.00".to_string(),
        opportunity_target: "50000.00".to_string(),
        project_count_target: 10,
        development_goal: Some("expand the reseller base".to_string()),
    }
}

// ============================================================================
// SECTION: Mapping
// ============================================================================

/// Verifies a legacy create lands on the unified row with the documented
/// field correspondence and zeroed high-value metrics.
#[test]
fn legacy_create_maps_onto_the_unified_row() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let channel = common::seed_channel(&engine, &manager, "north partners");
    let facade = LegacyPlanFacade::new(&engine);

    let plan = facade.create_plan(&manager, draft(channel.id)).expect("legacy create succeeds");
    let unified = engine.get_target(plan.id).expect("unified row exists");

    assert_eq!(unified.targets.core_performance, 100_000);
    assert_eq!(unified.targets.core_opportunity, 50_000);
    assert_eq!(unified.targets.new_signing, 10);
    assert_eq!(unified.targets.high_value_opportunity, 0);
    assert_eq!(unified.targets.high_value_performance, 0);
    assert_eq!(unified.notes.as_deref(), Some("expand the reseller base"));
    assert_eq!(unified.owner.kind, OwnerKind::Channel);
}

/// Verifies the legacy read reproduces the original four fields exactly,
/// including two-decimal currency strings.
#[test]
fn legacy_read_reproduces_the_wire_values() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let channel = common::seed_channel(&engine, &manager, "north partners");
    let facade = LegacyPlanFacade::new(&engine);

    let created = facade.create_plan(&manager, draft(channel.id)).expect("legacy create succeeds");
    let read = facade.get_plan(created.id).expect("legacy read succeeds");

    assert_eq!(read.performance_target, "100000.00");
    assert_eq!(read.opportunity_target, "50000.00");
    assert_eq!(read.project_count_target, 10);
    assert_eq!(read.development_goal.as_deref(), Some("expand the reseller base"));
    assert_eq!(read.achieved_performance, "0.00");
    assert_eq!(read.achieved_opportunity, "0.00");
    assert_eq!(read.achieved_project_count, 0);
    assert_eq!(read.channel_id, channel.id);
    assert_eq!(read, created);
}

/// Verifies legacy updates and achievement recording round-trip through
/// the unified store.
#[test]
fn legacy_updates_and_achievement_round_trip() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let channel = common::seed_channel(&engine, &manager, "north partners");
    let facade = LegacyPlanFacade::new(&engine);
    let plan = facade.create_plan(&manager, draft(channel.id)).expect("legacy create succeeds");

    let replanned = facade
        .update_plan(
            &manager,
            plan.id,
            LegacyPlanChange {
                performance_target: Some("120000.00".to_string()),
                opportunity_target: None,
                project_count_target: Some(12),
                development_goal: None,
            },
        )
        .expect("legacy update succeeds");
    assert_eq!(replanned.performance_target, "120000.00");
    assert_eq!(replanned.opportunity_target, "50000.00");
    assert_eq!(replanned.project_count_target, 12);
    assert_eq!(replanned.development_goal.as_deref(), Some("expand the reseller base"));

    let recorded = facade
        .update_achievement(
            &manager,
            plan.id,
            LegacyAchievementChange {
                achieved_performance: Some("60000.00".to_string()),
                achieved_opportunity: Some("25000.00".to_string()),
                achieved_project_count: Some(6),
            },
        )
        .expect("legacy achievement update succeeds");
    assert_eq!(recorded.achieved_performance, "60000.00");
    assert_eq!(recorded.achieved_opportunity, "25000.00");
    assert_eq!(recorded.achieved_project_count, 6);

    let completion = facade.plan_completion(plan.id).expect("legacy completion succeeds");
    assert_eq!(completion.performance, 50.0);
    assert_eq!(completion.opportunity, 50.0);
    assert_eq!(completion.project_count, 50.0);
    assert_eq!(completion.average, 50.0);
}

// ============================================================================
// SECTION: Boundaries
// ============================================================================

/// Verifies sub-unit currency precision is rejected instead of truncated.
#[test]
fn sub_unit_currency_values_are_rejected() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let channel = common::seed_channel(&engine, &manager, "north partners");
    let facade = LegacyPlanFacade::new(&engine);

    let mut request = draft(channel.id);
    request.performance_target = "100000.50".to_string();
    let result = facade.create_plan(&manager, request);
    assert!(matches!(result, Err(QuotaError::Validation(_))));
}

/// Verifies person targets stay invisible to the legacy surface.
#[test]
fn person_targets_are_invisible_to_the_legacy_surface() {
    let engine = engine();
    let (_, manager) = seed_user(&engine, "ops manager", Role::Manager);
    let facade = LegacyPlanFacade::new(&engine);

    let person_target = engine
        .create_target(
            &manager,
            TargetDraft {
                owner: TargetOwner {
                    kind: OwnerKind::Person,
                    id: OwnerId::from_user(UserId::new(Uuid::from_u128(5))),
                },
                period: Period::quarterly(2025, 3),
                targets: MetricValues::default(),
                notes: None,
            },
        )
        .expect("person target creation succeeds");

    let result = facade.get_plan(person_target.id);
    assert!(matches!(result, Err(QuotaError::NotFound(_))));
}

/// Verifies currency parsing and formatting round-trip whole amounts in
/// every accepted rendering.
#[test]
fn currency_parsing_accepts_whole_amount_renderings() {
    for raw in ["250000", "250000.0", "250000.00"] {
        let units = parse_currency(raw, "performance_target").expect("whole amount parses");
        assert_eq!(units, 250_000);
        assert_eq!(format_currency(units), "250000.00");
    }
    assert!(parse_currency("abc", "performance_target").is_err());
    assert!(parse_currency("-5.00", "performance_target").is_err());
    assert!(parse_currency("0.25", "performance_target").is_err());
}
