// crates/quota-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Quota Gate In-Memory Store
// Description: Simple in-memory quota store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of the store and audit
//! interfaces for tests and local demos. They mirror the durable store's
//! semantics — pair uniqueness, period-tuple uniqueness, and the
//! partial-update discipline — under a single mutex, and are not intended
//! for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

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
use crate::core::TargetChange;
use crate::core::TargetFilter;
use crate::core::TargetId;
use crate::core::TargetOwner;
use crate::core::TargetPage;
use crate::core::Timestamp;
use crate::core::UnifiedTarget;
use crate::core::UserAccount;
use crate::core::UserId;
use crate::core::canonical_order;
use crate::core::month_in_quarter;
use crate::core::period::PeriodType;
use crate::interfaces::AccessDecisionRecord;
use crate::interfaces::AssignmentStore;
use crate::interfaces::DecisionLog;
use crate::interfaces::Directory;
use crate::interfaces::TargetStore;
use crate::runtime::aggregate::sum_achievements;

// ============================================================================
// SECTION: In-Memory State
// ============================================================================

/// Mutable state behind the in-memory store mutex.
#[derive(Debug, Default)]
struct MemoryState {
    /// User accounts by identifier.
    users: BTreeMap<UserId, UserAccount>,
    /// Channels by identifier.
    channels: BTreeMap<ChannelId, Channel>,
    /// Assignments by identifier.
    assignments: BTreeMap<AssignmentId, Assignment>,
    /// Unified targets by identifier.
    targets: BTreeMap<TargetId, UnifiedTarget>,
}

/// In-memory quota store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct MemoryQuotaStore {
    /// State map protected by a mutex.
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryQuotaStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the state, mapping mutex poisoning onto an internal error.
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, QuotaError> {
        self.state
            .lock()
            .map_err(|_| QuotaError::Internal("quota store mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Directory Implementation
// ============================================================================

impl Directory for MemoryQuotaStore {
    fn insert_user(&self, user: &UserAccount) -> Result<(), QuotaError> {
        let mut guard = self.lock()?;
        if guard.users.contains_key(&user.id) {
            return Err(QuotaError::Conflict(format!("user already exists: {}", user.id)));
        }
        guard.users.insert(user.id, user.clone());
        Ok(())
    }

    fn get_user(&self, id: UserId) -> Result<Option<UserAccount>, QuotaError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn insert_channel(&self, channel: &Channel) -> Result<(), QuotaError> {
        let mut guard = self.lock()?;
        if guard.channels.contains_key(&channel.id) {
            return Err(QuotaError::Conflict(format!("channel already exists: {}", channel.id)));
        }
        guard.channels.insert(channel.id, channel.clone());
        Ok(())
    }

    fn get_channel(&self, id: ChannelId) -> Result<Option<Channel>, QuotaError> {
        Ok(self.lock()?.channels.get(&id).cloned())
    }

    fn update_channel(&self, id: ChannelId, change: &ChannelChange) -> Result<Channel, QuotaError> {
        let mut guard = self.lock()?;
        let Some(channel) = guard.channels.get_mut(&id) else {
            return Err(QuotaError::NotFound(format!("channel not found: {id}")));
        };
        if let Some(name) = &change.name {
            channel.name = name.clone();
        }
        Ok(channel.clone())
    }
}

// ============================================================================
// SECTION: Assignment Store Implementation
// ============================================================================

impl AssignmentStore for MemoryQuotaStore {
    fn insert_assignment(&self, assignment: &Assignment) -> Result<(), QuotaError> {
        let mut guard = self.lock()?;
        if !guard.users.contains_key(&assignment.user_id) {
            return Err(QuotaError::NotFound(format!("user not found: {}", assignment.user_id)));
        }
        if !guard.channels.contains_key(&assignment.channel_id) {
            return Err(QuotaError::NotFound(format!(
                "channel not found: {}",
                assignment.channel_id
            )));
        }
        let duplicate = guard.assignments.values().any(|existing| {
            existing.user_id == assignment.user_id && existing.channel_id == assignment.channel_id
        });
        if duplicate {
            return Err(QuotaError::Conflict(
                "an assignment already exists for this user and channel".to_string(),
            ));
        }
        guard.assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    fn get_assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, QuotaError> {
        Ok(self.lock()?.assignments.get(&id).cloned())
    }

    fn find_assignment(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<Option<Assignment>, QuotaError> {
        Ok(self
            .lock()?
            .assignments
            .values()
            .find(|assignment| {
                assignment.user_id == user_id && assignment.channel_id == channel_id
            })
            .cloned())
    }

    fn update_assignment(
        &self,
        id: AssignmentId,
        change: &AssignmentChange,
        now: Timestamp,
    ) -> Result<Assignment, QuotaError> {
        let mut guard = self.lock()?;
        let Some(assignment) = guard.assignments.get_mut(&id) else {
            return Err(QuotaError::NotFound(format!("assignment not found: {id}")));
        };
        if change.is_empty() {
            return Ok(assignment.clone());
        }
        if let Some(level) = change.level {
            assignment.level = level;
        }
        if let Some(flag) = change.target_responsibility {
            assignment.target_responsibility = flag;
        }
        assignment.updated_at = now;
        Ok(assignment.clone())
    }

    fn delete_assignment(&self, id: AssignmentId) -> Result<bool, QuotaError> {
        Ok(self.lock()?.assignments.remove(&id).is_some())
    }

    fn list_channels_for_user(
        &self,
        user_id: UserId,
        required: PermissionLevel,
    ) -> Result<Vec<Channel>, QuotaError> {
        let guard = self.lock()?;
        let mut channels: Vec<Channel> = guard
            .assignments
            .values()
            .filter(|assignment| {
                assignment.user_id == user_id && assignment.level.satisfies(required)
            })
            .filter_map(|assignment| guard.channels.get(&assignment.channel_id).cloned())
            .collect();
        channels.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(channels)
    }
}

// ============================================================================
// SECTION: Target Store Implementation
// ============================================================================

impl TargetStore for MemoryQuotaStore {
    fn insert_target(&self, target: &UnifiedTarget) -> Result<(), QuotaError> {
        let mut guard = self.lock()?;
        let duplicate = guard.targets.values().any(|existing| {
            existing.owner == target.owner && existing.period == target.period
        });
        if duplicate {
            return Err(QuotaError::Conflict(
                "a target already exists for this owner and period".to_string(),
            ));
        }
        guard.targets.insert(target.id, target.clone());
        Ok(())
    }

    fn get_target(&self, id: TargetId) -> Result<Option<UnifiedTarget>, QuotaError> {
        Ok(self.lock()?.targets.get(&id).cloned())
    }

    fn list_targets(
        &self,
        filter: &TargetFilter,
        skip: u64,
        limit: u64,
    ) -> Result<TargetPage, QuotaError> {
        let guard = self.lock()?;
        let mut matching: Vec<UnifiedTarget> =
            guard.targets.values().filter(|target| filter.matches(target)).cloned().collect();
        let total = matching.len() as u64;
        matching.sort_by(canonical_order);
        let items = matching
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        Ok(TargetPage {
            items,
            total,
        })
    }

    fn update_target(
        &self,
        id: TargetId,
        change: &TargetChange,
        modified_by: Option<UserId>,
        now: Timestamp,
    ) -> Result<UnifiedTarget, QuotaError> {
        let mut guard = self.lock()?;
        let Some(target) = guard.targets.get_mut(&id) else {
            return Err(QuotaError::NotFound(format!("target not found: {id}")));
        };
        if change.is_empty() && modified_by.is_none() {
            return Ok(target.clone());
        }
        change.targets.apply_to(&mut target.targets);
        if let Some(notes) = &change.notes {
            target.notes = Some(notes.clone());
        }
        target.updated_at = now;
        if modified_by.is_some() {
            target.last_modified_by = modified_by;
        }
        Ok(target.clone())
    }

    fn update_achievement(
        &self,
        id: TargetId,
        change: &AchievementChange,
        modified_by: Option<UserId>,
        now: Timestamp,
    ) -> Result<UnifiedTarget, QuotaError> {
        let mut guard = self.lock()?;
        let Some(target) = guard.targets.get_mut(&id) else {
            return Err(QuotaError::NotFound(format!("target not found: {id}")));
        };
        if change.is_empty() && modified_by.is_none() {
            return Ok(target.clone());
        }
        change.achieved.apply_to(&mut target.achieved);
        target.updated_at = now;
        if modified_by.is_some() {
            target.last_modified_by = modified_by;
        }
        Ok(target.clone())
    }

    fn delete_target(&self, id: TargetId) -> Result<bool, QuotaError> {
        Ok(self.lock()?.targets.remove(&id).is_some())
    }

    fn quarter_view(
        &self,
        owner: TargetOwner,
        year: i32,
        quarter: u8,
    ) -> Result<QuarterView, QuotaError> {
        let guard = self.lock()?;
        let quarter_row = guard
            .targets
            .values()
            .find(|target| {
                target.owner == owner
                    && target.period.period_type == PeriodType::Quarter
                    && target.period.year == year
                    && target.period.quarter == quarter
            })
            .cloned();
        let mut months: Vec<UnifiedTarget> = guard
            .targets
            .values()
            .filter(|target| {
                target.owner == owner
                    && target.period.period_type == PeriodType::Month
                    && target.period.year == year
                    && target.period.quarter == quarter
                    && target.period.month.is_some_and(|month| month_in_quarter(month, quarter))
            })
            .cloned()
            .collect();
        months.sort_by_key(|target| target.period.month);
        Ok(QuarterView {
            quarter: quarter_row,
            months,
        })
    }

    fn aggregate_achievement(
        &self,
        owner: TargetOwner,
        year: i32,
        quarter: u8,
    ) -> Result<MetricValues, QuotaError> {
        let guard = self.lock()?;
        let months: Vec<&UnifiedTarget> = guard
            .targets
            .values()
            .filter(|target| {
                target.owner == owner
                    && target.period.period_type == PeriodType::Month
                    && target.period.year == year
                    && target.period.quarter == quarter
            })
            .collect();
        Ok(sum_achievements(months))
    }
}

// ============================================================================
// SECTION: Decision Logs
// ============================================================================

/// Decision log that discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDecisionLog;

impl DecisionLog for NullDecisionLog {
    fn record(&self, _record: &AccessDecisionRecord) {}
}

/// Decision log that retains records in memory for tests and audit review.
#[derive(Debug, Default, Clone)]
pub struct MemoryDecisionLog {
    /// Recorded decisions protected by a mutex.
    records: Arc<Mutex<Vec<AccessDecisionRecord>>>,
}

impl MemoryDecisionLog {
    /// Creates a new empty decision log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded decisions.
    ///
    /// Records lost to mutex poisoning are reported as an empty snapshot;
    /// the log is observational and never fails an operation.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AccessDecisionRecord> {
        self.records.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl DecisionLog for MemoryDecisionLog {
    fn record(&self, record: &AccessDecisionRecord) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(record.clone());
        }
    }
}
