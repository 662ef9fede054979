// crates/quota-gate-core/src/core/target.rs
// ============================================================================
// Module: Quota Gate Unified Target Model
// Description: Owner-agnostic period targets with five paired metrics.
// Purpose: Provide the canonical target record, drafts, change masks, and filters.
// Dependencies: crate::core::{error, identifiers, period, time}, serde
// ============================================================================

//! ## Overview
//! A unified target stores quarter- or month-granularity goals for a person
//! or a channel. Each row carries five metrics, each as a planned/achieved
//! pair of integer values. Planned and achieved values are mutated through
//! two separate paths: planning happens up-front through the target-change
//! mask, achievement is recorded incrementally through the
//! achievement-change mask. Change masks distinguish "no change requested"
//! from "change to zero".

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::QuotaError;
use crate::core::identifiers::OwnerId;
use crate::core::identifiers::TargetId;
use crate::core::identifiers::UserId;
use crate::core::period::Period;
use crate::core::period::PeriodType;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// The five target metrics tracked per row.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Newly signed contracts.
    NewSigning,
    /// Core business opportunity volume.
    CoreOpportunity,
    /// Core business performance volume.
    CorePerformance,
    /// High-value business opportunity volume.
    HighValueOpportunity,
    /// High-value business performance volume.
    HighValuePerformance,
}

impl MetricKind {
    /// All metric kinds in canonical order.
    pub const ALL: [Self; 5] = [
        Self::NewSigning,
        Self::CoreOpportunity,
        Self::CorePerformance,
        Self::HighValueOpportunity,
        Self::HighValuePerformance,
    ];

    /// Returns the stable snake_case label for this metric.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NewSigning => "new_signing",
            Self::CoreOpportunity => "core_opportunity",
            Self::CorePerformance => "core_performance",
            Self::HighValueOpportunity => "high_value_opportunity",
            Self::HighValuePerformance => "high_value_performance",
        }
    }
}

/// One integer value per metric; used for both planned and achieved sides.
///
/// # Invariants
/// - Values are non-negative once past engine validation; the type itself
///   does not enforce the bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricValues {
    /// Newly signed contract count.
    pub new_signing: i64,
    /// Core opportunity volume.
    pub core_opportunity: i64,
    /// Core performance volume.
    pub core_performance: i64,
    /// High-value opportunity volume.
    pub high_value_opportunity: i64,
    /// High-value performance volume.
    pub high_value_performance: i64,
}

impl MetricValues {
    /// Returns the value for a metric kind.
    #[must_use]
    pub const fn get(&self, kind: MetricKind) -> i64 {
        match kind {
            MetricKind::NewSigning => self.new_signing,
            MetricKind::CoreOpportunity => self.core_opportunity,
            MetricKind::CorePerformance => self.core_performance,
            MetricKind::HighValueOpportunity => self.high_value_opportunity,
            MetricKind::HighValuePerformance => self.high_value_performance,
        }
    }

    /// Sets the value for a metric kind.
    pub const fn set(&mut self, kind: MetricKind, value: i64) {
        match kind {
            MetricKind::NewSigning => self.new_signing = value,
            MetricKind::CoreOpportunity => self.core_opportunity = value,
            MetricKind::CorePerformance => self.core_performance = value,
            MetricKind::HighValueOpportunity => self.high_value_opportunity = value,
            MetricKind::HighValuePerformance => self.high_value_performance = value,
        }
    }

    /// Validates that every value is non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] naming the offending metric.
    pub fn ensure_non_negative(&self, side: &str) -> Result<(), QuotaError> {
        for kind in MetricKind::ALL {
            if self.get(kind) < 0 {
                return Err(QuotaError::Validation(format!(
                    "{side} value for {} must not be negative",
                    kind.label()
                )));
            }
        }
        Ok(())
    }
}

/// Per-metric partial update; unset metrics are left unchanged.
///
/// # Invariants
/// - `Some(0)` requests a change to zero; `None` requests no change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricUpdate {
    /// New signing value, when supplied.
    pub new_signing: Option<i64>,
    /// Core opportunity value, when supplied.
    pub core_opportunity: Option<i64>,
    /// Core performance value, when supplied.
    pub core_performance: Option<i64>,
    /// High-value opportunity value, when supplied.
    pub high_value_opportunity: Option<i64>,
    /// High-value performance value, when supplied.
    pub high_value_performance: Option<i64>,
}

impl MetricUpdate {
    /// Returns the supplied value for a metric kind, if any.
    #[must_use]
    pub const fn get(&self, kind: MetricKind) -> Option<i64> {
        match kind {
            MetricKind::NewSigning => self.new_signing,
            MetricKind::CoreOpportunity => self.core_opportunity,
            MetricKind::CorePerformance => self.core_performance,
            MetricKind::HighValueOpportunity => self.high_value_opportunity,
            MetricKind::HighValuePerformance => self.high_value_performance,
        }
    }

    /// Returns whether no metric was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.new_signing.is_none()
            && self.core_opportunity.is_none()
            && self.core_performance.is_none()
            && self.high_value_opportunity.is_none()
            && self.high_value_performance.is_none()
    }

    /// Applies the supplied metrics onto a value set.
    pub fn apply_to(&self, values: &mut MetricValues) {
        for kind in MetricKind::ALL {
            if let Some(value) = self.get(kind) {
                values.set(kind, value);
            }
        }
    }

    /// Validates that every supplied value is non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] naming the offending metric.
    pub fn ensure_non_negative(&self, side: &str) -> Result<(), QuotaError> {
        for kind in MetricKind::ALL {
            if let Some(value) = self.get(kind)
                && value < 0
            {
                return Err(QuotaError::Validation(format!(
                    "{side} value for {} must not be negative",
                    kind.label()
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Target Ownership
// ============================================================================

/// Dimension a target belongs to.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    /// Target belongs to a person (user).
    Person,
    /// Target belongs to a sales channel.
    Channel,
}

impl OwnerKind {
    /// Returns the stable snake_case label for this dimension.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Channel => "channel",
        }
    }
}

/// Owner of a target row: a person or a channel.
///
/// # Invariants
/// - `id` refers to a user when `kind` is person, to a channel otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetOwner {
    /// Owner dimension.
    pub kind: OwnerKind,
    /// Owner identifier within that dimension.
    pub id: OwnerId,
}

// ============================================================================
// SECTION: Unified Target
// ============================================================================

/// Unified period-target row for a person or channel.
///
/// # Invariants
/// - At most one row per `(owner, period_type, year, quarter, month)`
///   tuple; a quarter row and its constituent month rows coexist as
///   distinct rows with no derivation between them.
/// - Achieved values start at zero and change only through the
///   achievement-update path, never the plan-update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedTarget {
    /// Target identifier.
    pub id: TargetId,
    /// Owner of the target.
    pub owner: TargetOwner,
    /// Reporting period.
    pub period: Period,
    /// Planned values per metric.
    pub targets: MetricValues,
    /// Achieved values per metric.
    pub achieved: MetricValues,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When the row was created.
    pub created_at: Timestamp,
    /// Operator who created the row.
    pub created_by: UserId,
    /// When the row was last modified.
    pub updated_at: Timestamp,
    /// Operator who last modified the row, when recorded.
    pub last_modified_by: Option<UserId>,
}

/// Request payload for creating a target.
///
/// # Invariants
/// - Achieved values are not part of the draft; every row starts at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDraft {
    /// Owner of the target.
    pub owner: TargetOwner,
    /// Reporting period.
    pub period: Period,
    /// Planned values per metric; unspecified metrics default to zero.
    pub targets: MetricValues,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Partial update for planned values and notes.
///
/// # Invariants
/// - An empty change with no modifier must not bump `updated_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetChange {
    /// Planned-value updates per metric.
    pub targets: MetricUpdate,
    /// New notes text, when supplied.
    pub notes: Option<String>,
}

impl TargetChange {
    /// Returns whether no field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.notes.is_none()
    }
}

/// Partial update for achieved values only.
///
/// # Invariants
/// - Operates exclusively on the achieved side; planned values are
///   unreachable through this mask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementChange {
    /// Achieved-value updates per metric.
    pub achieved: MetricUpdate,
}

impl AchievementChange {
    /// Returns whether no field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.achieved.is_empty()
    }
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Filter for listing targets; unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFilter {
    /// Owner dimension to match.
    pub owner_kind: Option<OwnerKind>,
    /// Owner identifier to match.
    pub owner_id: Option<OwnerId>,
    /// Period granularity to match.
    pub period_type: Option<PeriodType>,
    /// Year to match.
    pub year: Option<i32>,
    /// Quarter to match.
    pub quarter: Option<u8>,
    /// Month to match.
    pub month: Option<u8>,
}

impl TargetFilter {
    /// Returns whether a target row matches this filter.
    #[must_use]
    pub fn matches(&self, target: &UnifiedTarget) -> bool {
        self.owner_kind.is_none_or(|kind| target.owner.kind == kind)
            && self.owner_id.is_none_or(|id| target.owner.id == id)
            && self.period_type.is_none_or(|pt| target.period.period_type == pt)
            && self.year.is_none_or(|year| target.period.year == year)
            && self.quarter.is_none_or(|quarter| target.period.quarter == quarter)
            && self.month.is_none_or(|month| target.period.month == Some(month))
    }
}

/// One page of a target listing with the window-independent total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPage {
    /// Rows in the requested window, in canonical order.
    pub items: Vec<UnifiedTarget>,
    /// Total matching rows, independent of the page window.
    pub total: u64,
}

/// Quarter-level view: the optional quarter row plus its month rows.
///
/// # Invariants
/// - Either side may be absent or empty; there is no referential
///   enforcement between the quarter row and its month rows.
/// - `months` is ordered by month ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterView {
    /// The quarter-period row, when one exists.
    pub quarter: Option<UnifiedTarget>,
    /// Month-period rows within the quarter span, month ascending.
    pub months: Vec<UnifiedTarget>,
}

/// Canonical listing order: year desc, quarter desc, month desc with
/// quarter rows (no month) last, then creation time desc.
#[must_use]
pub fn canonical_order(a: &UnifiedTarget, b: &UnifiedTarget) -> Ordering {
    b.period
        .year
        .cmp(&a.period.year)
        .then_with(|| b.period.quarter.cmp(&a.period.quarter))
        .then_with(|| match (a.period.month, b.period.month) {
            (Some(left), Some(right)) => right.cmp(&left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}
