// crates/quota-gate-core/src/runtime/aggregate.rs
// ============================================================================
// Module: Quota Gate Achievement Aggregation
// Description: Read-time summation of monthly achievement into quarter totals.
// Purpose: Report quarterly totals without ever writing back to quarter rows.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Aggregation folds the achieved values of month-period rows into one
//! quarterly total per metric. It is a pure read-time operation: the
//! quarter-period row never contributes and is never updated from the
//! months. Missing months simply contribute zero.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::MetricKind;
use crate::core::MetricValues;
use crate::core::UnifiedTarget;

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Sums achieved values across a set of target rows.
#[must_use]
pub fn sum_achievements<'a, I>(rows: I) -> MetricValues
where
    I: IntoIterator<Item = &'a UnifiedTarget>,
{
    let mut totals = MetricValues::default();
    for row in rows {
        for kind in MetricKind::ALL {
            totals.set(kind, totals.get(kind).saturating_add(row.achieved.get(kind)));
        }
    }
    totals
}
