// crates/quota-gate-core/src/runtime/legacy.rs
// ============================================================================
// Module: Quota Gate Legacy Plan Facade
// Description: Old-shape plan operations in front of the unified engine.
// Purpose: Keep the deprecated wire contract alive over the canonical store.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The legacy facade translates old-shaped plan requests into unified
//! target operations and projects the results back. A legacy client
//! creating, reading, updating, and reading completion of a plan sees only
//! the old field names and the old unweighted averaging, while the
//! underlying storage is the unified row. The facade sits in front of the
//! engine, so every legacy mutation passes the same authorization gate and
//! invariant validation as native ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::LegacyAchievementChange;
use crate::core::LegacyPlanChange;
use crate::core::LegacyPlanDraft;
use crate::core::LegacyTargetPlan;
use crate::core::QuotaError;
use crate::core::TargetId;
use crate::interfaces::Actor;
use crate::interfaces::Clock;
use crate::interfaces::DecisionLog;
use crate::interfaces::QuotaStore;
use crate::runtime::completion::LegacyCompletionReport;
use crate::runtime::completion::legacy_completion;
use crate::runtime::engine::QuotaEngine;

// ============================================================================
// SECTION: Legacy Facade
// ============================================================================

/// Legacy-shaped plan surface over the unified engine.
pub struct LegacyPlanFacade<'a, S, C, L> {
    /// Engine executing the translated operations.
    engine: &'a QuotaEngine<S, C, L>,
}

impl<'a, S, C, L> LegacyPlanFacade<'a, S, C, L>
where
    S: QuotaStore,
    C: Clock,
    L: DecisionLog,
{
    /// Creates a facade over an engine.
    #[must_use]
    pub const fn new(engine: &'a QuotaEngine<S, C, L>) -> Self {
        Self {
            engine,
        }
    }

    /// Creates a channel plan from a legacy-shaped draft.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] for malformed currency values or
    /// period shapes, plus any error of the unified create path.
    pub fn create_plan(
        &self,
        actor: &Actor,
        draft: LegacyPlanDraft,
    ) -> Result<LegacyTargetPlan, QuotaError> {
        let target = self.engine.create_target(actor, draft.into_target_draft()?)?;
        LegacyTargetPlan::from_target(&target)
    }

    /// Loads a plan in the legacy shape.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::NotFound`] when the row is absent or does not
    /// belong to a channel, or a store error.
    pub fn get_plan(&self, id: TargetId) -> Result<LegacyTargetPlan, QuotaError> {
        let target = self.engine.get_target(id)?;
        LegacyTargetPlan::from_target(&target)
    }

    /// Applies a legacy-shaped partial update to a plan's targets.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] for malformed currency values,
    /// plus any error of the unified update path.
    pub fn update_plan(
        &self,
        actor: &Actor,
        id: TargetId,
        change: LegacyPlanChange,
    ) -> Result<LegacyTargetPlan, QuotaError> {
        let target = self.engine.update_target(actor, id, change.into_target_change()?)?;
        LegacyTargetPlan::from_target(&target)
    }

    /// Records legacy-shaped achievement against a plan.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] for malformed currency values,
    /// plus any error of the unified achievement path.
    pub fn update_achievement(
        &self,
        actor: &Actor,
        id: TargetId,
        change: LegacyAchievementChange,
    ) -> Result<LegacyTargetPlan, QuotaError> {
        let target =
            self.engine.update_achievement(actor, id, change.into_achievement_change()?)?;
        LegacyTargetPlan::from_target(&target)
    }

    /// Computes legacy completion with the unweighted three-metric mean.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::NotFound`] when the row is absent or does not
    /// belong to a channel, or a store error.
    pub fn plan_completion(&self, id: TargetId) -> Result<LegacyCompletionReport, QuotaError> {
        let target = self.engine.get_target(id)?;
        LegacyTargetPlan::from_target(&target)?;
        Ok(legacy_completion(&target))
    }
}
