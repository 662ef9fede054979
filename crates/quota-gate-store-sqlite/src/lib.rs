// crates/quota-gate-store-sqlite/src/lib.rs
// ============================================================================
// Module: Quota Gate SQLite Store Library
// Description: Durable quota store backed by SQLite.
// Purpose: Expose the SQLite-backed store and its configuration.
// Dependencies: crate::store
// ============================================================================

//! ## Overview
//! This crate implements the Quota Gate store interfaces over `SQLite`.
//! Uniqueness invariants live in unique indexes so concurrent writers race
//! safely, and every read-then-write operation runs inside one transaction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteQuotaStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
