// crates/quota-gate-core/src/core/legacy.rs
// ============================================================================
// Module: Quota Gate Legacy Plan Mapping
// Description: Bidirectional mapping between the deprecated single-metric
//              plan shape and the unified five-metric target model.
// Purpose: Preserve the old wire contract while writing to the unified store.
// Dependencies: crate::core::{error, identifiers, period, target}, bigdecimal, serde
// ============================================================================

//! ## Overview
//! The legacy plan shape is channel-only and tracks three metrics
//! (performance, opportunity, project count) plus a development goal. It
//! maps onto the unified model as: project count → new signing, opportunity
//! → core opportunity, performance → core performance, development goal →
//! notes. The two high-value metrics stay at zero for legacy-created rows.
//! The mapping is exact and reversible: currency fields are parsed as
//! decimals, required to be whole currency units, and rendered back with
//! exactly two decimal places.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;

use bigdecimal::BigDecimal;
use bigdecimal::ToPrimitive;
use bigdecimal::Zero;
use serde::Deserialize;
use serde::Serialize;

use crate::core::error::QuotaError;
use crate::core::identifiers::ChannelId;
use crate::core::identifiers::OwnerId;
use crate::core::identifiers::TargetId;
use crate::core::period::Period;
use crate::core::period::PeriodType;
use crate::core::target::AchievementChange;
use crate::core::target::MetricUpdate;
use crate::core::target::MetricValues;
use crate::core::target::OwnerKind;
use crate::core::target::TargetChange;
use crate::core::target::TargetDraft;
use crate::core::target::TargetOwner;
use crate::core::target::UnifiedTarget;

// ============================================================================
// SECTION: Currency Values
// ============================================================================

/// Parses a legacy currency string into whole currency units.
///
/// Accepts any decimal rendering of a whole amount (`"100000"`,
/// `"100000.0"`, `"100000.00"`). Sub-unit precision is not representable in
/// the unified model and is rejected rather than truncated.
///
/// # Errors
///
/// Returns [`QuotaError::Validation`] when the value is not a decimal, is
/// negative, carries a fractional part, or exceeds the representable range.
pub fn parse_currency(raw: &str, field: &str) -> Result<i64, QuotaError> {
    let value = BigDecimal::from_str(raw.trim()).map_err(|_| {
        QuotaError::Validation(format!("{field} is not a valid decimal value: {raw}"))
    })?;
    if value < BigDecimal::zero() {
        return Err(QuotaError::Validation(format!("{field} must not be negative")));
    }
    if !value.is_integer() {
        return Err(QuotaError::Validation(format!(
            "{field} must be a whole currency amount, got {raw}"
        )));
    }
    value.to_i64().ok_or_else(|| {
        QuotaError::Validation(format!("{field} exceeds the representable range: {raw}"))
    })
}

/// Renders whole currency units with exactly two decimal places.
#[must_use]
pub fn format_currency(units: i64) -> String {
    BigDecimal::from(units).with_scale(2).to_string()
}

// ============================================================================
// SECTION: Legacy Plan Shape
// ============================================================================

/// Deprecated channel-only plan as seen by legacy clients.
///
/// # Invariants
/// - Currency fields are rendered with exactly two decimal places.
/// - `id` is the identifier of the underlying unified row; legacy clients
///   treat it as the plan identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTargetPlan {
    /// Plan identifier (the underlying unified target identifier).
    pub id: TargetId,
    /// Channel the plan belongs to.
    pub channel_id: ChannelId,
    /// Calendar year.
    pub year: i32,
    /// Quarter number, 1 through 4.
    pub quarter: u8,
    /// Month number for monthly plans; absent for quarterly plans.
    pub month: Option<u8>,
    /// Planned performance volume, two-decimal currency string.
    pub performance_target: String,
    /// Planned opportunity volume, two-decimal currency string.
    pub opportunity_target: String,
    /// Planned project count.
    pub project_count_target: i64,
    /// Development goal free text.
    pub development_goal: Option<String>,
    /// Achieved performance volume, two-decimal currency string.
    pub achieved_performance: String,
    /// Achieved opportunity volume, two-decimal currency string.
    pub achieved_opportunity: String,
    /// Achieved project count.
    pub achieved_project_count: i64,
}

impl LegacyTargetPlan {
    /// Projects a unified target row into the legacy plan shape.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::NotFound`] when the row does not belong to a
    /// channel; person targets are invisible to the legacy surface.
    pub fn from_target(target: &UnifiedTarget) -> Result<Self, QuotaError> {
        if target.owner.kind != OwnerKind::Channel {
            return Err(QuotaError::NotFound(format!(
                "no legacy plan exists for target {}",
                target.id
            )));
        }
        Ok(Self {
            id: target.id,
            channel_id: ChannelId::new(target.owner.id.get()),
            year: target.period.year,
            quarter: target.period.quarter,
            month: target.period.month,
            performance_target: format_currency(target.targets.core_performance),
            opportunity_target: format_currency(target.targets.core_opportunity),
            project_count_target: target.targets.new_signing,
            development_goal: target.notes.clone(),
            achieved_performance: format_currency(target.achieved.core_performance),
            achieved_opportunity: format_currency(target.achieved.core_opportunity),
            achieved_project_count: target.achieved.new_signing,
        })
    }
}

// ============================================================================
// SECTION: Legacy Requests
// ============================================================================

/// Legacy-shaped plan creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPlanDraft {
    /// Channel the plan belongs to.
    pub channel_id: ChannelId,
    /// Calendar year.
    pub year: i32,
    /// Quarter number, 1 through 4.
    pub quarter: u8,
    /// Month number for monthly plans; absent for quarterly plans.
    pub month: Option<u8>,
    /// Planned performance volume as a decimal string.
    pub performance_target: String,
    /// Planned opportunity volume as a decimal string.
    pub opportunity_target: String,
    /// Planned project count.
    pub project_count_target: i64,
    /// Development goal free text.
    pub development_goal: Option<String>,
}

impl LegacyPlanDraft {
    /// Translates the legacy draft into a unified target draft.
    ///
    /// The period granularity is inferred from month presence; the two
    /// high-value metrics are left at zero.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] when a currency field is
    /// malformed or the project count is negative.
    pub fn into_target_draft(self) -> Result<TargetDraft, QuotaError> {
        let period_type = if self.month.is_some() {
            PeriodType::Month
        } else {
            PeriodType::Quarter
        };
        let targets = MetricValues {
            new_signing: self.project_count_target,
            core_opportunity: parse_currency(&self.opportunity_target, "opportunity_target")?,
            core_performance: parse_currency(&self.performance_target, "performance_target")?,
            high_value_opportunity: 0,
            high_value_performance: 0,
        };
        targets.ensure_non_negative("target")?;
        Ok(TargetDraft {
            owner: TargetOwner {
                kind: OwnerKind::Channel,
                id: OwnerId::from_channel(self.channel_id),
            },
            period: Period {
                period_type,
                year: self.year,
                quarter: self.quarter,
                month: self.month,
            },
            targets,
            notes: self.development_goal,
        })
    }
}

/// Legacy-shaped partial plan update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPlanChange {
    /// New performance target, when supplied.
    pub performance_target: Option<String>,
    /// New opportunity target, when supplied.
    pub opportunity_target: Option<String>,
    /// New project count target, when supplied.
    pub project_count_target: Option<i64>,
    /// New development goal, when supplied.
    pub development_goal: Option<String>,
}

impl LegacyPlanChange {
    /// Returns whether no field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.performance_target.is_none()
            && self.opportunity_target.is_none()
            && self.project_count_target.is_none()
            && self.development_goal.is_none()
    }

    /// Translates the legacy change into a unified target change.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] when a supplied currency field is
    /// malformed.
    pub fn into_target_change(self) -> Result<TargetChange, QuotaError> {
        let core_performance = self
            .performance_target
            .as_deref()
            .map(|raw| parse_currency(raw, "performance_target"))
            .transpose()?;
        let core_opportunity = self
            .opportunity_target
            .as_deref()
            .map(|raw| parse_currency(raw, "opportunity_target"))
            .transpose()?;
        Ok(TargetChange {
            targets: MetricUpdate {
                new_signing: self.project_count_target,
                core_opportunity,
                core_performance,
                high_value_opportunity: None,
                high_value_performance: None,
            },
            notes: self.development_goal,
        })
    }
}

/// Legacy-shaped achievement update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyAchievementChange {
    /// Achieved performance volume, when supplied.
    pub achieved_performance: Option<String>,
    /// Achieved opportunity volume, when supplied.
    pub achieved_opportunity: Option<String>,
    /// Achieved project count, when supplied.
    pub achieved_project_count: Option<i64>,
}

impl LegacyAchievementChange {
    /// Returns whether no field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.achieved_performance.is_none()
            && self.achieved_opportunity.is_none()
            && self.achieved_project_count.is_none()
    }

    /// Translates the legacy achievement update into the unified mask.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] when a supplied currency field is
    /// malformed.
    pub fn into_achievement_change(self) -> Result<AchievementChange, QuotaError> {
        let core_performance = self
            .achieved_performance
            .as_deref()
            .map(|raw| parse_currency(raw, "achieved_performance"))
            .transpose()?;
        let core_opportunity = self
            .achieved_opportunity
            .as_deref()
            .map(|raw| parse_currency(raw, "achieved_opportunity"))
            .transpose()?;
        Ok(AchievementChange {
            achieved: MetricUpdate {
                new_signing: self.achieved_project_count,
                core_opportunity,
                core_performance,
                high_value_opportunity: None,
                high_value_performance: None,
            },
        })
    }
}
