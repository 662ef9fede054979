// crates/quota-gate-core/src/runtime/authorize.rs
// ============================================================================
// Module: Quota Gate Authorization Logic
// Description: Pure allow/deny decisions over roles and channel levels.
// Purpose: Gate every mutating operation through one exhaustive decision function.
// Dependencies: crate::core, crate::interfaces, serde
// ============================================================================

//! ## Overview
//! The authorization gate is a pure decision function over supplied state:
//! the caller's identity, the attempted operation, and the caller's
//! resolved permission level on the scoped channel (when any). It performs
//! no mutation and no lookups of its own; the engine resolves the channel
//! level from the assignment store and records the decision for audit.
//! Absence of an assignment is an implicit deny, not an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::PermissionLevel;
use crate::interfaces::Actor;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Operation attempted by a caller.
///
/// # Invariants
/// - Variants are stable for serialization and audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create a sales channel. System-wide.
    CreateChannel,
    /// View a channel and its data. Channel-scoped for regular users.
    ViewChannel,
    /// Edit channel-scoped fields. Channel-scoped for regular users.
    EditChannel,
    /// Create, update, or delete permission assignments. System-wide.
    ManageAssignments,
    /// Create a target. System-wide.
    CreateTarget,
    /// Update a target's planned values. System-wide.
    UpdateTarget,
    /// Record achievement against a target. System-wide; regular users
    /// never record achievement, even as target-responsible assignees.
    UpdateAchievement,
    /// Delete a target. System-wide.
    DeleteTarget,
}

impl Operation {
    /// Returns the stable snake_case label for audit records.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreateChannel => "create_channel",
            Self::ViewChannel => "view_channel",
            Self::EditChannel => "edit_channel",
            Self::ManageAssignments => "manage_assignments",
            Self::CreateTarget => "create_target",
            Self::UpdateTarget => "update_target",
            Self::UpdateAchievement => "update_achievement",
            Self::DeleteTarget => "delete_target",
        }
    }
}

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Outcome of one authorization gate evaluation.
///
/// # Invariants
/// - Variants are stable and exhaustive for authorization outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    /// Permit the operation.
    Permit,
    /// Deny the operation.
    Deny {
        /// Human-readable denial reason.
        reason: String,
    },
}

impl Decision {
    /// Returns whether the operation was permitted.
    #[must_use]
    pub const fn is_permit(&self) -> bool {
        matches!(self, Self::Permit)
    }

    /// Returns the denial reason, when denied.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Permit => None,
            Self::Deny { reason } => Some(reason),
        }
    }
}

// ============================================================================
// SECTION: Gate Evaluation
// ============================================================================

/// Evaluates the authorization gate for one operation.
///
/// `channel_level` is the caller's permission level on the scoped channel,
/// resolved by the caller of this function; `None` means no assignment
/// exists or the operation is not channel-scoped.
#[must_use]
pub fn authorize(
    actor: &Actor,
    operation: Operation,
    channel_level: Option<PermissionLevel>,
) -> Decision {
    match operation {
        Operation::CreateChannel
        | Operation::ManageAssignments
        | Operation::CreateTarget
        | Operation::UpdateTarget
        | Operation::UpdateAchievement
        | Operation::DeleteTarget => require_operator(actor, operation),
        Operation::ViewChannel => {
            channel_scoped(actor, channel_level, PermissionLevel::Read, operation)
        }
        Operation::EditChannel => {
            channel_scoped(actor, channel_level, PermissionLevel::Write, operation)
        }
    }
}

/// Permits system-wide operations for operator roles only.
fn require_operator(actor: &Actor, operation: Operation) -> Decision {
    if actor.role.is_operator() {
        Decision::Permit
    } else {
        Decision::Deny {
            reason: format!("{} requires the admin or manager role", operation.label()),
        }
    }
}

/// Permits channel-scoped operations for operators, or for regular users
/// holding at least the required level on the channel.
fn channel_scoped(
    actor: &Actor,
    channel_level: Option<PermissionLevel>,
    required: PermissionLevel,
    operation: Operation,
) -> Decision {
    if actor.role.is_operator() {
        return Decision::Permit;
    }
    match channel_level {
        Some(level) if level.satisfies(required) => Decision::Permit,
        Some(_) => Decision::Deny {
            reason: format!(
                "{} requires at least the {} permission level on the channel",
                operation.label(),
                required.label()
            ),
        },
        None => Decision::Deny {
            reason: format!("{} requires a channel assignment", operation.label()),
        },
    }
}
