// crates/quota-gate-core/src/core/directory.rs
// ============================================================================
// Module: Quota Gate Directory Entities
// Description: User account and sales channel records.
// Purpose: Provide the entities that assignments and targets refer to.
// Dependencies: crate::core::{access, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Directory entities are the referents of assignment existence checks: an
//! assignment binds a user account to a channel, and the grant rules need
//! the grantee's system-wide role. User accounts mirror the external
//! identity provider; channels are created through the gated engine path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::access::Role;
use crate::core::identifiers::ChannelId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: User Accounts
// ============================================================================

/// User account mirrored from the external identity provider.
///
/// # Invariants
/// - `role` is the system-wide role consulted by grant rules and the
///   authorization gate; channel-scoped authority lives on assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// System-wide role.
    pub role: Role,
    /// When the account record was created.
    pub created_at: Timestamp,
}

/// Request payload for registering a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    /// Display name.
    pub name: String,
    /// System-wide role.
    pub role: Role,
}

// ============================================================================
// SECTION: Channels
// ============================================================================

/// Sales channel (business partner) entity.
///
/// # Invariants
/// - Channels exist independently of assignments; deleting an assignment
///   never affects the channel or its targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel identifier.
    pub id: ChannelId,
    /// Channel name.
    pub name: String,
    /// When the channel was created.
    pub created_at: Timestamp,
    /// Operator who created the channel.
    pub created_by: UserId,
}

/// Request payload for creating a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDraft {
    /// Channel name.
    pub name: String,
}

/// Partial update for a channel; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelChange {
    /// New channel name, when supplied.
    pub name: Option<String>,
}

impl ChannelChange {
    /// Returns whether no field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}
