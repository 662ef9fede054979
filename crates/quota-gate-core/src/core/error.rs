// crates/quota-gate-core/src/core/error.rs
// ============================================================================
// Module: Quota Gate Error Taxonomy
// Description: Recoverable error kinds surfaced by stores and the engine.
// Purpose: Give callers a stable machine-readable kind plus a human message.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every fallible Quota Gate operation surfaces one of four
//! recoverable-by-caller conditions (validation, not-found, conflict,
//! forbidden) or a wrapped internal failure. The kind is stable for
//! programmatic handling; the message is for humans. Errors are never
//! retried by the store layer and are always scoped to a single request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Error Kind
// ============================================================================

/// Stable machine-readable error kind.
///
/// # Invariants
/// - Variants are stable for serialization and programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input: bad period shape, bad enum value, out-of-range field.
    Validation,
    /// A referenced entity is absent.
    NotFound,
    /// A uniqueness invariant was violated.
    Conflict,
    /// A role or permission check failed.
    Forbidden,
    /// An unexpected store-layer failure, wrapped without storage internals.
    Internal,
}

// ============================================================================
// SECTION: Quota Error
// ============================================================================

/// Error surfaced by Quota Gate stores and the engine.
///
/// # Invariants
/// - Variants map 1:1 onto [`ErrorKind`]; the kind never changes for a
///   given failure condition once released.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    /// Malformed input rejected before any state was touched.
    #[error("validation error: {0}")]
    Validation(String),
    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A uniqueness invariant rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The caller's role or channel permission does not allow the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// An unexpected backend failure; the message carries diagnostics only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QuotaError {
    /// Returns the stable machine-readable kind for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}
