// crates/quota-gate-core/src/core/time.rs
// ============================================================================
// Module: Quota Gate Time Model
// Description: Canonical timestamp representation for audit stamps.
// Purpose: Provide explicit time values supplied by hosts, never read ambiently.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Quota Gate stamps `created_at`/`updated_at` fields with explicit time
//! values supplied through the injected [`crate::interfaces::Clock`] seam.
//! The core never reads wall-clock time directly, which keeps store and
//! engine behavior deterministic under test.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used for audit stamping, in unix epoch milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }
}
