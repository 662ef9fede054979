// crates/quota-gate-core/tests/wire_forms.rs
// ============================================================================
// Module: Wire Form Stability Tests
// Description: Serialized shapes of enums and records on the wire.
// Purpose: Ensure snake_case forms and transparent identifiers stay stable.
// Dependencies: quota-gate-core, serde_json
// ============================================================================
//! ## Overview
//! Locks down the serialized forms derived API surfaces rely on: enum
//! labels, transparent UUID identifiers, and the error-kind taxonomy.

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

use quota_gate_core::ChannelId;
use quota_gate_core::ErrorKind;
use quota_gate_core::OwnerKind;
use quota_gate_core::PeriodType;
use quota_gate_core::PermissionLevel;
use quota_gate_core::QuotaError;
use quota_gate_core::Role;
use serde_json::json;
use uuid::Uuid;

/// Verifies enum variants serialize to their stable snake_case labels.
#[test]
fn enums_serialize_to_snake_case_labels() {
    assert_eq!(serde_json::to_value(PermissionLevel::Read).expect("serializes"), json!("read"));
    assert_eq!(serde_json::to_value(PermissionLevel::Admin).expect("serializes"), json!("admin"));
    assert_eq!(serde_json::to_value(Role::Manager).expect("serializes"), json!("manager"));
    assert_eq!(serde_json::to_value(OwnerKind::Person).expect("serializes"), json!("person"));
    assert_eq!(serde_json::to_value(PeriodType::Quarter).expect("serializes"), json!("quarter"));
    assert_eq!(serde_json::to_value(ErrorKind::NotFound).expect("serializes"), json!("not_found"));
}

/// Verifies identifiers serialize transparently as hyphenated UUID strings.
#[test]
fn identifiers_serialize_transparently() {
    let id = ChannelId::new(Uuid::from_u128(0x10));
    let value = serde_json::to_value(id).expect("serializes");
    assert_eq!(value, json!("00000000-0000-0000-0000-000000000010"));
    let back: ChannelId = serde_json::from_value(value).expect("deserializes");
    assert_eq!(back, id);
}

/// Verifies every error variant reports its matching stable kind.
#[test]
fn error_kinds_match_their_variants() {
    let cases = [
        (QuotaError::Validation("v".to_string()), ErrorKind::Validation),
        (QuotaError::NotFound("n".to_string()), ErrorKind::NotFound),
        (QuotaError::Conflict("c".to_string()), ErrorKind::Conflict),
        (QuotaError::Forbidden("f".to_string()), ErrorKind::Forbidden),
        (QuotaError::Internal("i".to_string()), ErrorKind::Internal),
    ];
    for (error, kind) in cases {
        assert_eq!(error.kind(), kind);
    }
}
