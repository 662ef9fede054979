// crates/quota-gate-core/src/runtime/engine.rs
// ============================================================================
// Module: Quota Gate Engine
// Description: Gated channel, assignment, and target operations.
// Purpose: Execute every mutation through the same authorization gate and
//          validation path before touching storage.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The engine is the single canonical execution path for Quota Gate. All
//! API surfaces must call into these methods so the authorization gate,
//! input validation, and audit recording stay uniform. Period-shape
//! invariants are checked before storage is touched; uniqueness invariants
//! are enforced by the stores and surface as conflicts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AchievementChange;
use crate::core::Assignment;
use crate::core::AssignmentChange;
use crate::core::AssignmentDraft;
use crate::core::AssignmentId;
use crate::core::Channel;
use crate::core::ChannelChange;
use crate::core::ChannelDraft;
use crate::core::ChannelId;
use crate::core::MetricValues;
use crate::core::PermissionLevel;
use crate::core::QuarterView;
use crate::core::QuotaError;
use crate::core::Role;
use crate::core::TargetChange;
use crate::core::TargetDraft;
use crate::core::TargetFilter;
use crate::core::TargetId;
use crate::core::TargetOwner;
use crate::core::TargetPage;
use crate::core::UnifiedTarget;
use crate::core::UserAccount;
use crate::core::UserDraft;
use crate::core::UserId;
use crate::core::ensure_grantable;
use crate::interfaces::AccessDecisionRecord;
use crate::interfaces::Actor;
use crate::interfaces::Clock;
use crate::interfaces::DecisionLog;
use crate::interfaces::QuotaStore;
use crate::runtime::authorize::Decision;
use crate::runtime::authorize::Operation;
use crate::runtime::authorize::authorize;
use crate::runtime::completion::CompletionReport;
use crate::runtime::completion::completion;

// ============================================================================
// SECTION: Engine Configuration
// ============================================================================

/// Configuration for the Quota Gate engine.
///
/// # Invariants
/// - `default_page_size` and `max_page_size` are greater than zero and
///   `default_page_size <= max_page_size` once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Page size applied when a listing call supplies no limit.
    pub default_page_size: u64,
    /// Upper bound for caller-supplied page sizes.
    pub max_page_size: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl EngineConfig {
    /// Validates the configured limits.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] when a limit is zero or the
    /// default exceeds the maximum.
    pub fn validate(&self) -> Result<(), QuotaError> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(QuotaError::Validation(
                "page sizes must be greater than zero".to_string(),
            ));
        }
        if self.default_page_size > self.max_page_size {
            return Err(QuotaError::Validation(
                "default page size must not exceed the maximum page size".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Quota Gate engine executing gated operations over an abstract store.
pub struct QuotaEngine<S, C, L> {
    /// Combined store implementation.
    store: S,
    /// Injected time source.
    clock: C,
    /// Audit sink for gate decisions.
    decisions: L,
    /// Engine limits.
    config: EngineConfig,
}

impl<S, C, L> QuotaEngine<S, C, L>
where
    S: QuotaStore,
    C: Clock,
    L: DecisionLog,
{
    /// Creates a new engine over the supplied collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] when the configuration limits are
    /// invalid.
    pub fn new(store: S, clock: C, decisions: L, config: EngineConfig) -> Result<Self, QuotaError> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            decisions,
            config,
        })
    }

    /// Returns a reference to the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the decision audit sink.
    #[must_use]
    pub const fn decision_log(&self) -> &L {
        &self.decisions
    }

    // ------------------------------------------------------------------
    // Gate plumbing
    // ------------------------------------------------------------------

    /// Evaluates the gate for one operation and records the decision.
    ///
    /// For channel-scoped operations by user-role actors, the actor's
    /// permission level on the channel is resolved from the assignment
    /// store and handed to the pure gate as supplied state.
    fn gate(
        &self,
        actor: &Actor,
        operation: Operation,
        channel_id: Option<ChannelId>,
    ) -> Result<(), QuotaError> {
        let channel_level = match channel_id {
            Some(channel) if actor.role == Role::User => self
                .store
                .find_assignment(actor.user_id, channel)?
                .map(|assignment| assignment.level),
            _ => None,
        };
        let decision = authorize(actor, operation, channel_level);
        self.decisions.record(&AccessDecisionRecord {
            actor_id: actor.user_id,
            actor_role: actor.role,
            operation: operation.label().to_string(),
            channel_id,
            permitted: decision.is_permit(),
            reason: decision.reason().map(str::to_string),
            decided_at: self.clock.now(),
        });
        match decision {
            Decision::Permit => Ok(()),
            Decision::Deny { reason } => Err(QuotaError::Forbidden(reason)),
        }
    }

    /// Resolves the effective page limit for a listing call.
    fn effective_limit(&self, limit: Option<u64>) -> Result<u64, QuotaError> {
        match limit {
            None => Ok(self.config.default_page_size),
            Some(0) => {
                Err(QuotaError::Validation("page limit must be greater than zero".to_string()))
            }
            Some(requested) => Ok(requested.min(self.config.max_page_size)),
        }
    }

    // ------------------------------------------------------------------
    // Directory operations
    // ------------------------------------------------------------------

    /// Registers a user account mirrored from the identity provider.
    ///
    /// Provisioning is an identity-provider concern, so this path is not
    /// gated; it exists so assignments and grant rules have a role to
    /// consult.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Conflict`] on identifier collision or
    /// [`QuotaError::Internal`] on backend failure.
    pub fn register_user(&self, draft: UserDraft) -> Result<UserAccount, QuotaError> {
        let user = UserAccount {
            id: UserId::new_random(),
            name: draft.name,
            role: draft.role,
            created_at: self.clock.now(),
        };
        self.store.insert_user(&user)?;
        Ok(user)
    }

    /// Creates a sales channel. Operator-only.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Forbidden`] for non-operator callers, or a
    /// store error.
    pub fn create_channel(&self, actor: &Actor, draft: ChannelDraft) -> Result<Channel, QuotaError> {
        self.gate(actor, Operation::CreateChannel, None)?;
        let now = self.clock.now();
        let channel = Channel {
            id: ChannelId::new_random(),
            name: draft.name,
            created_at: now,
            created_by: actor.user_id,
        };
        self.store.insert_channel(&channel)?;
        Ok(channel)
    }

    /// Loads a channel, applying the channel-scoped read gate.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Forbidden`] when a user-role caller holds no
    /// read-level assignment, [`QuotaError::NotFound`] when the channel is
    /// absent, or a store error.
    pub fn view_channel(&self, actor: &Actor, id: ChannelId) -> Result<Channel, QuotaError> {
        self.gate(actor, Operation::ViewChannel, Some(id))?;
        self.store
            .get_channel(id)?
            .ok_or_else(|| QuotaError::NotFound(format!("channel not found: {id}")))
    }

    /// Edits channel fields, applying the channel-scoped write gate.
    ///
    /// Operators edit any channel; a user-role caller needs a write-level
    /// assignment on it.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Forbidden`] when the write gate denies,
    /// [`QuotaError::NotFound`] when the channel is absent, or a store
    /// error.
    pub fn edit_channel(
        &self,
        actor: &Actor,
        id: ChannelId,
        change: ChannelChange,
    ) -> Result<Channel, QuotaError> {
        self.gate(actor, Operation::EditChannel, Some(id))?;
        self.store.update_channel(id, &change)
    }

    // ------------------------------------------------------------------
    // Assignment operations
    // ------------------------------------------------------------------

    /// Creates a permission assignment. Operator-only.
    ///
    /// The grantee's role is resolved first so the admin-level-for-regular-
    /// user rule rejects the grant before any write. Duplicate pairs
    /// surface as conflicts from the store's unique constraint.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Forbidden`] for non-operator callers or
    /// disallowed grants, [`QuotaError::NotFound`] for a missing user or
    /// channel, [`QuotaError::Conflict`] for a duplicate pair, or a store
    /// error.
    pub fn create_assignment(
        &self,
        actor: &Actor,
        draft: AssignmentDraft,
    ) -> Result<Assignment, QuotaError> {
        self.gate(actor, Operation::ManageAssignments, None)?;
        let grantee = self
            .store
            .get_user(draft.user_id)?
            .ok_or_else(|| QuotaError::NotFound(format!("user not found: {}", draft.user_id)))?;
        ensure_grantable(grantee.role, draft.level)?;
        let now = self.clock.now();
        let assignment = Assignment {
            id: AssignmentId::new_random(),
            user_id: draft.user_id,
            channel_id: draft.channel_id,
            level: draft.level,
            assigned_by: actor.user_id,
            assigned_at: now,
            target_responsibility: draft.target_responsibility,
            updated_at: now,
        };
        self.store.insert_assignment(&assignment)?;
        Ok(assignment)
    }

    /// Applies a partial update to an assignment. Operator-only.
    ///
    /// When a level is supplied, the grantee's role is re-checked against
    /// the grant rules before the write.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Forbidden`] for non-operator callers or
    /// disallowed grants, [`QuotaError::NotFound`] when the assignment or
    /// grantee is absent, or a store error.
    pub fn update_assignment(
        &self,
        actor: &Actor,
        id: AssignmentId,
        change: AssignmentChange,
    ) -> Result<Assignment, QuotaError> {
        self.gate(actor, Operation::ManageAssignments, None)?;
        if let Some(level) = change.level {
            let assignment = self
                .store
                .get_assignment(id)?
                .ok_or_else(|| QuotaError::NotFound(format!("assignment not found: {id}")))?;
            let grantee = self.store.get_user(assignment.user_id)?.ok_or_else(|| {
                QuotaError::NotFound(format!("user not found: {}", assignment.user_id))
            })?;
            ensure_grantable(grantee.role, level)?;
        }
        self.store.update_assignment(id, &change, self.clock.now())
    }

    /// Deletes an assignment. Operator-only; returns whether a row was
    /// removed, so repeated deletion is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Forbidden`] for non-operator callers, or a
    /// store error.
    pub fn delete_assignment(&self, actor: &Actor, id: AssignmentId) -> Result<bool, QuotaError> {
        self.gate(actor, Operation::ManageAssignments, None)?;
        self.store.delete_assignment(id)
    }

    /// Returns whether a user holds at least the required level on a
    /// channel. Ungated read; absence of an assignment yields `false`.
    ///
    /// # Errors
    ///
    /// Returns a store error on backend failure.
    pub fn has_permission(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
        required: PermissionLevel,
    ) -> Result<bool, QuotaError> {
        self.store.has_permission(user_id, channel_id, required)
    }

    /// Lists channels where a user holds at least the required level.
    ///
    /// # Errors
    ///
    /// Returns a store error on backend failure.
    pub fn list_channels_for_user(
        &self,
        user_id: UserId,
        required: PermissionLevel,
    ) -> Result<Vec<Channel>, QuotaError> {
        self.store.list_channels_for_user(user_id, required)
    }

    // ------------------------------------------------------------------
    // Target operations
    // ------------------------------------------------------------------

    /// Creates a unified target. Operator-only.
    ///
    /// Period-shape invariants are validated before storage is touched;
    /// achieved values always start at zero regardless of the draft.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Forbidden`] for non-operator callers,
    /// [`QuotaError::Validation`] for a bad period shape or negative
    /// values, [`QuotaError::Conflict`] for a duplicate owner/period
    /// tuple, or a store error.
    pub fn create_target(
        &self,
        actor: &Actor,
        draft: TargetDraft,
    ) -> Result<UnifiedTarget, QuotaError> {
        self.gate(actor, Operation::CreateTarget, None)?;
        draft.period.validate()?;
        draft.targets.ensure_non_negative("target")?;
        let now = self.clock.now();
        let target = UnifiedTarget {
            id: TargetId::new_random(),
            owner: draft.owner,
            period: draft.period,
            targets: draft.targets,
            achieved: MetricValues::default(),
            notes: draft.notes,
            created_at: now,
            created_by: actor.user_id,
            updated_at: now,
            last_modified_by: None,
        };
        self.store.insert_target(&target)?;
        Ok(target)
    }

    /// Loads a target by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::NotFound`] when absent, or a store error.
    pub fn get_target(&self, id: TargetId) -> Result<UnifiedTarget, QuotaError> {
        self.store
            .get_target(id)?
            .ok_or_else(|| QuotaError::NotFound(format!("target not found: {id}")))
    }

    /// Lists targets matching a filter with offset pagination.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] for a zero limit, or a store
    /// error.
    pub fn list_targets(
        &self,
        filter: &TargetFilter,
        skip: u64,
        limit: Option<u64>,
    ) -> Result<TargetPage, QuotaError> {
        let limit = self.effective_limit(limit)?;
        self.store.list_targets(filter, skip, limit)
    }

    /// Applies a partial update to a target's planned values. Operator-only.
    ///
    /// An empty change is forwarded without a modifier so the store leaves
    /// `updated_at` untouched on a no-op call.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Forbidden`] for non-operator callers,
    /// [`QuotaError::Validation`] for negative values,
    /// [`QuotaError::NotFound`] when absent, or a store error.
    pub fn update_target(
        &self,
        actor: &Actor,
        id: TargetId,
        change: TargetChange,
    ) -> Result<UnifiedTarget, QuotaError> {
        self.gate(actor, Operation::UpdateTarget, None)?;
        change.targets.ensure_non_negative("target")?;
        let modified_by = if change.is_empty() { None } else { Some(actor.user_id) };
        self.store.update_target(id, &change, modified_by, self.clock.now())
    }

    /// Records achievement against a target. Operator-only; the planned
    /// side is unreachable through this path.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Forbidden`] for non-operator callers,
    /// [`QuotaError::Validation`] for negative values,
    /// [`QuotaError::NotFound`] when absent, or a store error.
    pub fn update_achievement(
        &self,
        actor: &Actor,
        id: TargetId,
        change: AchievementChange,
    ) -> Result<UnifiedTarget, QuotaError> {
        self.gate(actor, Operation::UpdateAchievement, None)?;
        change.achieved.ensure_non_negative("achieved")?;
        let modified_by = if change.is_empty() { None } else { Some(actor.user_id) };
        self.store.update_achievement(id, &change, modified_by, self.clock.now())
    }

    /// Deletes a target. Operator-only.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Forbidden`] for non-operator callers,
    /// [`QuotaError::NotFound`] when the target is absent, or a store
    /// error.
    pub fn delete_target(&self, actor: &Actor, id: TargetId) -> Result<(), QuotaError> {
        self.gate(actor, Operation::DeleteTarget, None)?;
        if self.store.delete_target(id)? {
            Ok(())
        } else {
            Err(QuotaError::NotFound(format!("target not found: {id}")))
        }
    }

    /// Loads the quarter view for one owner.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] for an out-of-range quarter, or
    /// a store error.
    pub fn quarter_view(
        &self,
        owner: TargetOwner,
        year: i32,
        quarter: u8,
    ) -> Result<QuarterView, QuotaError> {
        ensure_quarter_in_range(quarter)?;
        self.store.quarter_view(owner, year, quarter)
    }

    /// Sums monthly achievement into a quarterly total for one owner.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] for an out-of-range quarter, or
    /// a store error.
    pub fn aggregate_achievement(
        &self,
        owner: TargetOwner,
        year: i32,
        quarter: u8,
    ) -> Result<MetricValues, QuotaError> {
        ensure_quarter_in_range(quarter)?;
        self.store.aggregate_achievement(owner, year, quarter)
    }

    /// Computes per-metric and overall completion for a target.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::NotFound`] when the target is absent, or a
    /// store error.
    pub fn target_completion(&self, id: TargetId) -> Result<CompletionReport, QuotaError> {
        let target = self.get_target(id)?;
        Ok(completion(&target))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a caller-supplied quarter number.
fn ensure_quarter_in_range(quarter: u8) -> Result<(), QuotaError> {
    if (1..=4).contains(&quarter) {
        Ok(())
    } else {
        Err(QuotaError::Validation(format!("quarter must be between 1 and 4, got {quarter}")))
    }
}
