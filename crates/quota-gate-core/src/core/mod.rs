// crates/quota-gate-core/src/core/mod.rs
// ============================================================================
// Module: Quota Gate Core Types
// Description: Canonical access-control and period-target structures.
// Purpose: Provide stable, serializable types for channels, assignments, and targets.
// Dependencies: serde, thiserror, uuid, bigdecimal
// ============================================================================

//! ## Overview
//! Quota Gate core types define the permission model, directory entities,
//! reporting periods, unified targets, and the legacy plan mapping. These
//! types are the canonical source of truth for any derived API surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod access;
pub mod directory;
pub mod error;
pub mod identifiers;
pub mod legacy;
pub mod period;
pub mod target;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use access::Assignment;
pub use access::AssignmentChange;
pub use access::AssignmentDraft;
pub use access::PermissionLevel;
pub use access::Role;
pub use access::ensure_grantable;
pub use directory::Channel;
pub use directory::ChannelChange;
pub use directory::ChannelDraft;
pub use directory::UserAccount;
pub use directory::UserDraft;
pub use error::ErrorKind;
pub use error::QuotaError;
pub use identifiers::AssignmentId;
pub use identifiers::ChannelId;
pub use identifiers::OwnerId;
pub use identifiers::TargetId;
pub use identifiers::UserId;
pub use legacy::LegacyAchievementChange;
pub use legacy::LegacyPlanChange;
pub use legacy::LegacyPlanDraft;
pub use legacy::LegacyTargetPlan;
pub use legacy::format_currency;
pub use legacy::parse_currency;
pub use period::Period;
pub use period::PeriodType;
pub use period::month_in_quarter;
pub use period::quarter_month_span;
pub use target::AchievementChange;
pub use target::MetricKind;
pub use target::MetricUpdate;
pub use target::MetricValues;
pub use target::OwnerKind;
pub use target::QuarterView;
pub use target::TargetChange;
pub use target::TargetDraft;
pub use target::TargetFilter;
pub use target::TargetOwner;
pub use target::TargetPage;
pub use target::UnifiedTarget;
pub use target::canonical_order;
pub use time::Timestamp;
