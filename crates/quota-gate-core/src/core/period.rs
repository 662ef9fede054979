// crates/quota-gate-core/src/core/period.rs
// ============================================================================
// Module: Quota Gate Period Model
// Description: Quarter- and month-granularity reporting periods.
// Purpose: Enforce structural consistency between period granularities at write time.
// Dependencies: crate::core::error, serde
// ============================================================================

//! ## Overview
//! A period names either a whole quarter or a single month within a quarter.
//! The shape invariants are enforced before any storage is touched: a
//! quarterly period must not carry a month, a monthly period must carry one,
//! and quarter/month numbers stay in range. A quarter row and its
//! constituent month rows are distinct records that coexist; the quarter is
//! never derived from the months at write time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::QuotaError;

// ============================================================================
// SECTION: Period Type
// ============================================================================

/// Granularity of a reporting period.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    /// A whole quarter; the period carries no month.
    Quarter,
    /// A single month; the period carries the month value.
    Month,
}

impl PeriodType {
    /// Returns the stable snake_case label for this granularity.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quarter => "quarter",
            Self::Month => "month",
        }
    }
}

// ============================================================================
// SECTION: Period
// ============================================================================

/// Reporting period for a target row.
///
/// # Invariants
/// - `period_type == Quarter` ⟺ `month` is `None`.
/// - `quarter` is in `[1, 4]`; `month`, when present, is in `[1, 12]`.
/// - Invariants hold only after [`Period::validate`] succeeds; construction
///   alone does not enforce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Period granularity.
    pub period_type: PeriodType,
    /// Calendar year.
    pub year: i32,
    /// Quarter number, 1 through 4.
    pub quarter: u8,
    /// Month number, 1 through 12; present only for monthly periods.
    pub month: Option<u8>,
}

impl Period {
    /// Creates a quarterly period.
    #[must_use]
    pub const fn quarterly(year: i32, quarter: u8) -> Self {
        Self {
            period_type: PeriodType::Quarter,
            year,
            quarter,
            month: None,
        }
    }

    /// Creates a monthly period within a quarter.
    #[must_use]
    pub const fn monthly(year: i32, quarter: u8, month: u8) -> Self {
        Self {
            period_type: PeriodType::Month,
            year,
            quarter,
            month: Some(month),
        }
    }

    /// Validates the period shape invariants.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::Validation`] with a message distinguishing each
    /// violated invariant: quarter range, month presence per granularity,
    /// and month range.
    pub fn validate(&self) -> Result<(), QuotaError> {
        if !(1..=4).contains(&self.quarter) {
            return Err(QuotaError::Validation(format!(
                "quarter must be between 1 and 4, got {}",
                self.quarter
            )));
        }
        match (self.period_type, self.month) {
            (PeriodType::Quarter, Some(_)) => Err(QuotaError::Validation(
                "quarterly targets cannot specify a month".to_string(),
            )),
            (PeriodType::Month, None) => Err(QuotaError::Validation(
                "monthly targets must include a month value".to_string(),
            )),
            (PeriodType::Month, Some(month)) if !(1..=12).contains(&month) => Err(
                QuotaError::Validation(format!("month must be between 1 and 12, got {month}")),
            ),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Quarter Spans
// ============================================================================

/// Returns the inclusive month span `[first, last]` covered by a quarter.
///
/// The quarter number is expected to be in `[1, 4]`; out-of-range quarters
/// are the caller's validation responsibility.
#[must_use]
pub const fn quarter_month_span(quarter: u8) -> (u8, u8) {
    let first = quarter.saturating_sub(1).saturating_mul(3).saturating_add(1);
    (first, quarter.saturating_mul(3))
}

/// Returns whether a month value falls inside the span of a quarter.
#[must_use]
pub const fn month_in_quarter(month: u8, quarter: u8) -> bool {
    let (first, last) = quarter_month_span(quarter);
    month >= first && month <= last
}
