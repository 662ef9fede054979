// crates/quota-gate-core/tests/authorize.rs
// ============================================================================
// Module: Authorization Gate Tests
// Description: Allow/deny matrix for system-wide and channel-scoped operations.
// Purpose: Ensure the gate is exhaustive and fails closed without assignments.
// Dependencies: quota-gate-core
// ============================================================================
//! ## Overview
//! Validates the pure gate over every role and permission-level combination
//! the access model distinguishes.

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

use quota_gate_core::Actor;
use quota_gate_core::Operation;
use quota_gate_core::PermissionLevel;
use quota_gate_core::Role;
use quota_gate_core::UserId;
use quota_gate_core::authorize;

fn actor(role: Role) -> Actor {
    Actor {
        user_id: UserId::new_random(),
        role,
    }
}

// ============================================================================
// SECTION: System-Wide Operations
// ============================================================================

/// Verifies operator roles pass every system-wide operation.
#[test]
fn system_wide_operations_permit_operators() {
    let operations = [
        Operation::CreateChannel,
        Operation::ManageAssignments,
        Operation::CreateTarget,
        Operation::UpdateTarget,
        Operation::UpdateAchievement,
        Operation::DeleteTarget,
    ];
    for role in [Role::Admin, Role::Manager] {
        for operation in operations {
            assert!(authorize(&actor(role), operation, None).is_permit());
        }
    }
}

/// Verifies the user role is denied system-wide operations even with an
/// admin-level channel assignment supplied.
#[test]
fn system_wide_operations_deny_regular_users() {
    let operations = [
        Operation::CreateChannel,
        Operation::ManageAssignments,
        Operation::CreateTarget,
        Operation::UpdateTarget,
        Operation::UpdateAchievement,
        Operation::DeleteTarget,
    ];
    for operation in operations {
        let decision = authorize(&actor(Role::User), operation, Some(PermissionLevel::Admin));
        assert!(!decision.is_permit());
        assert!(decision.reason().is_some());
    }
}

// ============================================================================
// SECTION: Channel-Scoped Operations
// ============================================================================

/// Verifies viewing requires at least a read-level assignment for users.
#[test]
fn view_channel_requires_read_assignment() {
    let user = actor(Role::User);
    assert!(!authorize(&user, Operation::ViewChannel, None).is_permit());
    for level in [PermissionLevel::Read, PermissionLevel::Write, PermissionLevel::Admin] {
        assert!(authorize(&user, Operation::ViewChannel, Some(level)).is_permit());
    }
}

/// Verifies editing requires at least a write-level assignment for users.
#[test]
fn edit_channel_requires_write_assignment() {
    let user = actor(Role::User);
    assert!(!authorize(&user, Operation::EditChannel, None).is_permit());
    assert!(!authorize(&user, Operation::EditChannel, Some(PermissionLevel::Read)).is_permit());
    assert!(authorize(&user, Operation::EditChannel, Some(PermissionLevel::Write)).is_permit());
    assert!(authorize(&user, Operation::EditChannel, Some(PermissionLevel::Admin)).is_permit());
}

/// Verifies operators bypass channel-scoped level checks entirely.
#[test]
fn operators_bypass_channel_level_checks() {
    for role in [Role::Admin, Role::Manager] {
        assert!(authorize(&actor(role), Operation::ViewChannel, None).is_permit());
        assert!(authorize(&actor(role), Operation::EditChannel, None).is_permit());
    }
}

// ============================================================================
// SECTION: Ordinal Scale
// ============================================================================

/// Verifies the permission scale orders read below write below admin.
#[test]
fn permission_levels_are_totally_ordered() {
    assert!(PermissionLevel::Read < PermissionLevel::Write);
    assert!(PermissionLevel::Write < PermissionLevel::Admin);
    assert_eq!(PermissionLevel::Read.rank(), 1);
    assert_eq!(PermissionLevel::Write.rank(), 2);
    assert_eq!(PermissionLevel::Admin.rank(), 3);
    assert!(PermissionLevel::Admin.satisfies(PermissionLevel::Read));
    assert!(!PermissionLevel::Read.satisfies(PermissionLevel::Write));
}
