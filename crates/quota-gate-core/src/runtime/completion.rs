// crates/quota-gate-core/src/runtime/completion.rs
// ============================================================================
// Module: Quota Gate Completion Logic
// Description: Per-metric and overall achievement percentages.
// Purpose: Compute completion figures without division errors or weighting drift.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Completion is a pure function over a stored target row. Each metric with
//! a positive planned value yields `achieved / target * 100` rounded to two
//! decimals; a zero or unset target is defined as 0% complete, never a
//! division error and never 100%. The unified overall figure is weighted by
//! absolute target magnitude across the metrics with positive targets. The
//! legacy three-metric figure uses the unweighted arithmetic mean of its
//! percentages instead; both behaviors are preserved exactly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::MetricKind;
use crate::core::UnifiedTarget;

// ============================================================================
// SECTION: Unified Completion
// ============================================================================

/// Per-metric and overall completion percentages for a unified target.
///
/// # Invariants
/// - Percentages are rounded to two decimal places.
/// - `overall` is weighted by target magnitude, not a mean of the five
///   per-metric percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    /// New signing completion percentage.
    pub new_signing: f64,
    /// Core opportunity completion percentage.
    pub core_opportunity: f64,
    /// Core performance completion percentage.
    pub core_performance: f64,
    /// High-value opportunity completion percentage.
    pub high_value_opportunity: f64,
    /// High-value performance completion percentage.
    pub high_value_performance: f64,
    /// Target-magnitude-weighted overall completion percentage.
    pub overall: f64,
}

/// Computes per-metric and weighted overall completion for a target row.
#[must_use]
pub fn completion(target: &UnifiedTarget) -> CompletionReport {
    let mut achieved_sum: i64 = 0;
    let mut target_sum: i64 = 0;
    for kind in MetricKind::ALL {
        let planned = target.targets.get(kind);
        if planned > 0 {
            achieved_sum = achieved_sum.saturating_add(target.achieved.get(kind));
            target_sum = target_sum.saturating_add(planned);
        }
    }
    CompletionReport {
        new_signing: metric_pct(target, MetricKind::NewSigning),
        core_opportunity: metric_pct(target, MetricKind::CoreOpportunity),
        core_performance: metric_pct(target, MetricKind::CorePerformance),
        high_value_opportunity: metric_pct(target, MetricKind::HighValueOpportunity),
        high_value_performance: metric_pct(target, MetricKind::HighValuePerformance),
        overall: pct(achieved_sum, target_sum),
    }
}

/// Computes the completion percentage for one metric of a target row.
fn metric_pct(target: &UnifiedTarget, kind: MetricKind) -> f64 {
    pct(target.achieved.get(kind), target.targets.get(kind))
}

// ============================================================================
// SECTION: Legacy Completion
// ============================================================================

/// Completion percentages for the deprecated three-metric plan shape.
///
/// # Invariants
/// - `average` is the unweighted arithmetic mean of the three percentages,
///   preserved exactly for legacy-endpoint compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyCompletionReport {
    /// Performance completion percentage.
    pub performance: f64,
    /// Opportunity completion percentage.
    pub opportunity: f64,
    /// Project count completion percentage.
    pub project_count: f64,
    /// Unweighted mean of the three percentages.
    pub average: f64,
}

/// Computes legacy completion over the three mapped metrics of a row.
#[must_use]
pub fn legacy_completion(target: &UnifiedTarget) -> LegacyCompletionReport {
    let performance = metric_pct(target, MetricKind::CorePerformance);
    let opportunity = metric_pct(target, MetricKind::CoreOpportunity);
    let project_count = metric_pct(target, MetricKind::NewSigning);
    LegacyCompletionReport {
        performance,
        opportunity,
        project_count,
        average: round2((performance + opportunity + project_count) / 3.0),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Computes a percentage for one achieved/target pair.
fn pct(achieved: i64, target: i64) -> f64 {
    if target > 0 {
        round2(to_f64(achieved) / to_f64(target) * 100.0)
    } else {
        0.0
    }
}

/// Rounds a value to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Widens an integer metric value for percentage arithmetic.
#[allow(
    clippy::cast_precision_loss,
    reason = "Metric magnitudes stay far below the 2^53 exact-integer range."
)]
fn to_f64(value: i64) -> f64 {
    value as f64
}
