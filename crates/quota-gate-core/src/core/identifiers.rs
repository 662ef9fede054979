// crates/quota-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Quota Gate Identifiers
// Description: Canonical opaque identifiers for channels, users, and targets.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Quota Gate.
//! Identifiers are UUID-backed and opaque; they serialize as their canonical
//! hyphenated string form on the wire. New identifiers are minted with
//! version-4 UUIDs at the engine boundary, never inside the stores.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// User identifier carried in authenticated identities and assignments.
///
/// # Invariants
/// - Opaque UUID; no structure beyond UUID validity is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a user identifier from an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Mints a fresh random (version 4) user identifier.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub const fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Channel identifier for sales channel (business partner) entities.
///
/// # Invariants
/// - Opaque UUID; no structure beyond UUID validity is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(Uuid);

impl ChannelId {
    /// Creates a channel identifier from an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Mints a fresh random (version 4) channel identifier.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub const fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Assignment identifier for (user, channel) permission bindings.
///
/// # Invariants
/// - Opaque UUID; no structure beyond UUID validity is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(Uuid);

impl AssignmentId {
    /// Creates an assignment identifier from an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Mints a fresh random (version 4) assignment identifier.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub const fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Target identifier for unified period-target rows.
///
/// # Invariants
/// - Opaque UUID; no structure beyond UUID validity is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(Uuid);

impl TargetId {
    /// Creates a target identifier from an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Mints a fresh random (version 4) target identifier.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub const fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Owner identifier naming the person or channel a target belongs to.
///
/// # Invariants
/// - Carries the UUID of a user when the owner kind is person, or of a
///   channel when the owner kind is channel; the kind travels separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Creates an owner identifier from an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Creates an owner identifier referring to a user.
    #[must_use]
    pub const fn from_user(id: UserId) -> Self {
        Self(id.get())
    }

    /// Creates an owner identifier referring to a channel.
    #[must_use]
    pub const fn from_channel(id: ChannelId) -> Self {
        Self(id.get())
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub const fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
