// crates/quota-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Quota Gate Interfaces
// Description: Backend-agnostic interfaces for storage, time, and audit.
// Purpose: Define the contract surfaces used by the Quota Gate engine.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Interfaces define how Quota Gate integrates with its collaborators — a
//! relational store with unique-constraint enforcement, an authenticated
//! identity supplied per call, a clock, and an audit sink — without
//! embedding backend-specific details. Store implementations must execute
//! each read-then-write operation inside a single transaction boundary so
//! uniqueness races resolve as conflicts for the losing writer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::AchievementChange;
use crate::core::Assignment;
use crate::core::AssignmentChange;
use crate::core::AssignmentId;
use crate::core::Channel;
use crate::core::ChannelChange;
use crate::core::ChannelId;
use crate::core::MetricValues;
use crate::core::PermissionLevel;
use crate::core::QuarterView;
use crate::core::QuotaError;
use crate::core::Role;
use crate::core::TargetChange;
use crate::core::TargetFilter;
use crate::core::TargetId;
use crate::core::TargetOwner;
use crate::core::TargetPage;
use crate::core::Timestamp;
use crate::core::UnifiedTarget;
use crate::core::UserAccount;
use crate::core::UserId;

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Authenticated caller identity supplied with every engine call.
///
/// # Invariants
/// - Produced by the external identity provider; the engine never
///   authenticates, it only authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier of the calling user.
    pub user_id: UserId,
    /// System-wide role of the calling user.
    pub role: Role,
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time source for audit stamping.
///
/// Hosts supply the clock at engine construction; the core never reads
/// wall-clock time directly.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

// ============================================================================
// SECTION: Decision Log
// ============================================================================

/// Audit record for one authorization gate decision.
///
/// # Invariants
/// - Records are observational only; the gate performs no mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecisionRecord {
    /// Identifier of the calling user.
    pub actor_id: UserId,
    /// Role of the calling user at decision time.
    pub actor_role: Role,
    /// Stable label of the attempted operation.
    pub operation: String,
    /// Channel the operation was scoped to, when channel-scoped.
    pub channel_id: Option<ChannelId>,
    /// Whether the operation was permitted.
    pub permitted: bool,
    /// Denial reason, when denied.
    pub reason: Option<String>,
    /// When the decision was made.
    pub decided_at: Timestamp,
}

/// Sink for authorization gate decisions.
///
/// Every grant and deny flows through the sink so access decisions stay
/// observable for audit without coupling the gate to any log backend.
pub trait DecisionLog {
    /// Records one gate decision.
    fn record(&self, record: &AccessDecisionRecord);
}

// ============================================================================
// SECTION: Directory Store
// ============================================================================

/// Store surface for user accounts and channels.
pub trait Directory {
    /// Inserts a user account record.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Conflict`] when the identifier is already
    /// taken, or [`QuotaError::Internal`] on backend failure.
    fn insert_user(&self, user: &UserAccount) -> Result<(), QuotaError>;

    /// Loads a user account by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn get_user(&self, id: UserId) -> Result<Option<UserAccount>, QuotaError>;

    /// Inserts a channel record.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Conflict`] when the identifier is already
    /// taken, or [`QuotaError::Internal`] on backend failure.
    fn insert_channel(&self, channel: &Channel) -> Result<(), QuotaError>;

    /// Loads a channel by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn get_channel(&self, id: ChannelId) -> Result<Option<Channel>, QuotaError>;

    /// Applies a partial update to a channel.
    ///
    /// An empty change leaves the row untouched. The read and write execute
    /// inside one transaction boundary.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::NotFound`] when the channel is absent, or
    /// [`QuotaError::Internal`] on backend failure.
    fn update_channel(
        &self,
        id: ChannelId,
        change: &ChannelChange,
    ) -> Result<Channel, QuotaError>;
}

// ============================================================================
// SECTION: Assignment Store
// ============================================================================

/// Store surface for (user, channel) permission assignments.
pub trait AssignmentStore {
    /// Inserts an assignment after verifying both referents exist.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::NotFound`] when the user or channel is absent,
    /// [`QuotaError::Conflict`] when an assignment already exists for the
    /// pair, or [`QuotaError::Internal`] on backend failure.
    fn insert_assignment(&self, assignment: &Assignment) -> Result<(), QuotaError>;

    /// Loads an assignment by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn get_assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, QuotaError>;

    /// Loads the single assignment for a (user, channel) pair, if any.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn find_assignment(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<Option<Assignment>, QuotaError>;

    /// Applies a partial update to an assignment.
    ///
    /// An empty change leaves the row untouched, including `updated_at`.
    /// The read and write execute inside one transaction boundary.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::NotFound`] when the assignment is absent, or
    /// [`QuotaError::Internal`] on backend failure.
    fn update_assignment(
        &self,
        id: AssignmentId,
        change: &AssignmentChange,
        now: Timestamp,
    ) -> Result<Assignment, QuotaError>;

    /// Deletes an assignment; returns whether a row was removed.
    ///
    /// Absence is reported as `false`, never as an error, so deletion is
    /// idempotent-friendly.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn delete_assignment(&self, id: AssignmentId) -> Result<bool, QuotaError>;

    /// Lists channels where the user holds at least the required level,
    /// ordered by channel name then identifier.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn list_channels_for_user(
        &self,
        user_id: UserId,
        required: PermissionLevel,
    ) -> Result<Vec<Channel>, QuotaError>;

    /// Returns whether the user holds at least the required level on the
    /// channel. Absence of an assignment yields `false`, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn has_permission(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
        required: PermissionLevel,
    ) -> Result<bool, QuotaError> {
        Ok(self
            .find_assignment(user_id, channel_id)?
            .is_some_and(|assignment| assignment.level.satisfies(required)))
    }
}

// ============================================================================
// SECTION: Target Store
// ============================================================================

/// Store surface for unified period targets.
pub trait TargetStore {
    /// Inserts a target row.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Conflict`] when a row already exists for the
    /// owner and exact period tuple, or [`QuotaError::Internal`] on backend
    /// failure.
    fn insert_target(&self, target: &UnifiedTarget) -> Result<(), QuotaError>;

    /// Loads a target by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn get_target(&self, id: TargetId) -> Result<Option<UnifiedTarget>, QuotaError>;

    /// Lists targets matching a filter with offset pagination.
    ///
    /// Ordering is year desc, quarter desc, month desc with quarter rows
    /// last, then creation time desc. The total is computed independent of
    /// the page window.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn list_targets(
        &self,
        filter: &TargetFilter,
        skip: u64,
        limit: u64,
    ) -> Result<TargetPage, QuotaError>;

    /// Applies a partial update to planned values and notes.
    ///
    /// `updated_at` and `last_modified_by` are touched only when at least
    /// one field or the modifier is supplied. The read and write execute
    /// inside one transaction boundary.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::NotFound`] when the target is absent, or
    /// [`QuotaError::Internal`] on backend failure.
    fn update_target(
        &self,
        id: TargetId,
        change: &TargetChange,
        modified_by: Option<UserId>,
        now: Timestamp,
    ) -> Result<UnifiedTarget, QuotaError>;

    /// Applies a partial update to achieved values only.
    ///
    /// Shares the partial-update discipline of [`TargetStore::update_target`]
    /// and never touches planned values.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::NotFound`] when the target is absent, or
    /// [`QuotaError::Internal`] on backend failure.
    fn update_achievement(
        &self,
        id: TargetId,
        change: &AchievementChange,
        modified_by: Option<UserId>,
        now: Timestamp,
    ) -> Result<UnifiedTarget, QuotaError>;

    /// Deletes a target; returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn delete_target(&self, id: TargetId) -> Result<bool, QuotaError>;

    /// Loads the quarter row (if any) and the month rows inside the
    /// quarter span for one owner, months ascending.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn quarter_view(
        &self,
        owner: TargetOwner,
        year: i32,
        quarter: u8,
    ) -> Result<QuarterView, QuotaError>;

    /// Sums achieved values across the month rows matching the owner,
    /// year, and quarter. The quarter row never contributes; missing
    /// months contribute zero. Read-time only, never written back.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Internal`] on backend failure.
    fn aggregate_achievement(
        &self,
        owner: TargetOwner,
        year: i32,
        quarter: u8,
    ) -> Result<MetricValues, QuotaError>;
}

// ============================================================================
// SECTION: Combined Store
// ============================================================================

/// Combined store surface required by the engine.
pub trait QuotaStore: Directory + AssignmentStore + TargetStore {}

impl<S> QuotaStore for S where S: Directory + AssignmentStore + TargetStore {}
