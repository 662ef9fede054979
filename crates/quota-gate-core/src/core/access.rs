// crates/quota-gate-core/src/core/access.rs
// ============================================================================
// Module: Quota Gate Access Model
// Description: Permission levels, system-wide roles, and channel assignments.
// Purpose: Provide the ordinal permission scale and assignment records gating writes.
// Dependencies: crate::core::{error, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! The access model is a fixed three-tier ordinal permission scale combined
//! with three system-wide roles. A role decides system-wide authority; a
//! permission level decides channel-scoped authority once a user is assigned
//! to a channel. Holding permission `P` means the assigned level compares
//! greater than or equal to `P` under the ordinal total order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::QuotaError;
use crate::core::identifiers::AssignmentId;
use crate::core::identifiers::ChannelId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Permission Level
// ============================================================================

/// Channel-scoped permission level on a fixed three-tier ordinal scale.
///
/// # Invariants
/// - Total order: `Read < Write < Admin`; variant declaration order carries
///   the ordinal comparison, so variants must never be reordered.
/// - Variants are stable for serialization and contract matching.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// May view the channel and its data.
    Read,
    /// May edit channel-scoped fields; implies read.
    Write,
    /// Full channel-scoped control; implies write and read.
    Admin,
}

impl PermissionLevel {
    /// Returns the 1-based ordinal rank of this level.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Read => 1,
            Self::Write => 2,
            Self::Admin => 3,
        }
    }

    /// Returns the stable snake_case label for this level.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }

    /// Returns whether this level satisfies the required level.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

// ============================================================================
// SECTION: Role
// ============================================================================

/// System-wide role carried in the caller's authenticated identity.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
/// - Distinct from [`PermissionLevel`]: roles gate system-wide operations,
///   levels gate channel-scoped operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full system-wide authority.
    Admin,
    /// Operational authority over channels, assignments, and targets.
    Manager,
    /// Regular user; authority comes only from channel assignments.
    User,
}

impl Role {
    /// Returns the stable snake_case label for this role.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::User => "user",
        }
    }

    /// Returns whether this role carries operator authority (admin or manager).
    #[must_use]
    pub const fn is_operator(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

// ============================================================================
// SECTION: Grant Rules
// ============================================================================

/// Validates that a permission level may be granted to a user with the given role.
///
/// The admin level is categorically rejected for user-role grantees,
/// independent of who performs the grant. Enforced at assignment-write time
/// for both creation and level escalation.
///
/// # Errors
///
/// Returns [`QuotaError::Forbidden`] when the grant is not allowed.
pub fn ensure_grantable(grantee_role: Role, level: PermissionLevel) -> Result<(), QuotaError> {
    if grantee_role == Role::User && level == PermissionLevel::Admin {
        return Err(QuotaError::Forbidden(
            "a regular user may only hold read or write, never admin, on a channel".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// SECTION: Assignments
// ============================================================================

/// Permission binding between a user and a channel.
///
/// # Invariants
/// - Unique on `(user_id, channel_id)`: a user holds at most one permission
///   level per channel, escalated or downgraded by re-assignment, never
///   duplicated.
/// - Deleting an assignment has no cascading effect on targets; targets are
///   owned by channel or person identity, not by assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assignment identifier.
    pub id: AssignmentId,
    /// User holding the permission.
    pub user_id: UserId,
    /// Channel the permission applies to.
    pub channel_id: ChannelId,
    /// Granted permission level.
    pub level: PermissionLevel,
    /// Operator who granted the permission.
    pub assigned_by: UserId,
    /// When the assignment was created.
    pub assigned_at: Timestamp,
    /// Whether this user is responsible for the channel's targets.
    pub target_responsibility: bool,
    /// When the assignment was last modified.
    pub updated_at: Timestamp,
}

/// Request payload for creating an assignment.
///
/// # Invariants
/// - The grantee's role is resolved and checked against the level before the
///   record reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    /// User to grant the permission to.
    pub user_id: UserId,
    /// Channel the permission applies to.
    pub channel_id: ChannelId,
    /// Permission level to grant.
    pub level: PermissionLevel,
    /// Whether the user is responsible for the channel's targets.
    pub target_responsibility: bool,
}

/// Partial update for an assignment; unset fields are left unchanged.
///
/// # Invariants
/// - An empty change requests no mutation and must not bump `updated_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentChange {
    /// New permission level, when supplied.
    pub level: Option<PermissionLevel>,
    /// New target-responsibility flag, when supplied.
    pub target_responsibility: Option<bool>,
}

impl AssignmentChange {
    /// Returns whether no field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.level.is_none() && self.target_responsibility.is_none()
    }
}
