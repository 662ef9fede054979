// crates/quota-gate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Quota Store
// Description: Durable Directory, AssignmentStore, and TargetStore backed by
//              SQLite.
// Purpose: Persist channels, assignments, and targets with unique-constraint
//          enforcement and one transaction per logical operation.
// Dependencies: quota-gate-core, rusqlite, serde, thiserror, uuid
// ============================================================================

//! ## Overview
//! This module implements the Quota Gate store interfaces over `SQLite`.
//! The assignment pair and the target period tuple are guarded by unique
//! indexes, so concurrent writers racing past the in-transaction existence
//! checks resolve as a conflict for the losing writer. Every
//! read-then-write operation (existence checks before insert, partial-update
//! reads before mutation) executes inside a single transaction.
//!
//! `SQLite` treats `NULL` index entries as distinct, so the period-tuple
//! index coalesces the nullable month column to keep quarter rows unique.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use quota_gate_core::AchievementChange;
use quota_gate_core::Assignment;
use quota_gate_core::AssignmentChange;
use quota_gate_core::AssignmentId;
use quota_gate_core::AssignmentStore;
use quota_gate_core::Channel;
use quota_gate_core::ChannelChange;
use quota_gate_core::ChannelId;
use quota_gate_core::Directory;
use quota_gate_core::MetricValues;
use quota_gate_core::OwnerId;
use quota_gate_core::OwnerKind;
use quota_gate_core::Period;
use quota_gate_core::PeriodType;
use quota_gate_core::PermissionLevel;
use quota_gate_core::QuarterView;
use quota_gate_core::QuotaError;
use quota_gate_core::Role;
use quota_gate_core::TargetChange;
use quota_gate_core::TargetFilter;
use quota_gate_core::TargetId;
use quota_gate_core::TargetOwner;
use quota_gate_core::TargetPage;
use quota_gate_core::TargetStore;
use quota_gate_core::Timestamp;
use quota_gate_core::UnifiedTarget;
use quota_gate_core::UserAccount;
use quota_gate_core::UserId;
use quota_gate_core::quarter_month_span;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Column list shared by every target row read.
const TARGET_COLUMNS: &str = "id, owner_kind, owner_id, period_type, year, quarter, month, \
                              new_signing_target, core_opportunity_target, \
                              core_performance_target, high_value_opportunity_target, \
                              high_value_performance_target, new_signing_achieved, \
                              core_opportunity_achieved, core_performance_achieved, \
                              high_value_opportunity_achieved, high_value_performance_achieved, \
                              notes, created_at, created_by, updated_at, last_modified_by";

/// Column list shared by every assignment row read.
const ASSIGNMENT_COLUMNS: &str = "id, user_id, channel_id, level, assigned_by, assigned_at, \
                                  target_responsibility, updated_at";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` quota store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration with defaults for the given database path.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while opening or migrating the `SQLite` store.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("quota store io error: {0}")]
    Io(String),
    /// Database error.
    #[error("quota store database error: {0}")]
    Db(String),
    /// Store configuration or path is invalid.
    #[error("quota store invalid configuration: {0}")]
    Invalid(String),
    /// Store schema version is incompatible.
    #[error("quota store version mismatch: {0}")]
    VersionMismatch(String),
}

/// Maps an unexpected database failure onto the generic internal kind.
fn db_err(err: &rusqlite::Error) -> QuotaError {
    QuotaError::Internal(err.to_string())
}

/// Maps an insert failure, converting anticipated constraint violations
/// into a conflict for the losing writer.
fn insert_err(err: &rusqlite::Error, conflict_message: &str) -> QuotaError {
    match err {
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == ErrorCode::ConstraintViolation =>
        {
            QuotaError::Conflict(conflict_message.to_string())
        }
        other => db_err(other),
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Durable quota store backed by `SQLite`.
#[derive(Debug)]
pub struct SqliteQuotaStore {
    /// Database connection guarded for exclusive transactional use.
    connection: Mutex<Connection>,
}

impl SqliteQuotaStore {
    /// Opens (or creates) the store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is invalid, the database
    /// cannot be opened, or the schema version is incompatible.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Locks the connection, mapping mutex poisoning onto an internal error.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, QuotaError> {
        self.connection
            .lock()
            .map_err(|_| QuotaError::Internal("quota store mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Open Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx =
        connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    role TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS channels (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    created_by TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS assignments (
                    id TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL REFERENCES users(id),
                    channel_id TEXT NOT NULL REFERENCES channels(id),
                    level INTEGER NOT NULL,
                    assigned_by TEXT NOT NULL,
                    assigned_at INTEGER NOT NULL,
                    target_responsibility INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    UNIQUE (user_id, channel_id)
                );
                CREATE INDEX IF NOT EXISTS idx_assignments_user_level
                    ON assignments (user_id, level);
                CREATE TABLE IF NOT EXISTS unified_targets (
                    id TEXT PRIMARY KEY,
                    owner_kind TEXT NOT NULL,
                    owner_id TEXT NOT NULL,
                    period_type TEXT NOT NULL,
                    year INTEGER NOT NULL,
                    quarter INTEGER NOT NULL,
                    month INTEGER,
                    new_signing_target INTEGER NOT NULL DEFAULT 0,
                    core_opportunity_target INTEGER NOT NULL DEFAULT 0,
                    core_performance_target INTEGER NOT NULL DEFAULT 0,
                    high_value_opportunity_target INTEGER NOT NULL DEFAULT 0,
                    high_value_performance_target INTEGER NOT NULL DEFAULT 0,
                    new_signing_achieved INTEGER NOT NULL DEFAULT 0,
                    core_opportunity_achieved INTEGER NOT NULL DEFAULT 0,
                    core_performance_achieved INTEGER NOT NULL DEFAULT 0,
                    high_value_opportunity_achieved INTEGER NOT NULL DEFAULT 0,
                    high_value_performance_achieved INTEGER NOT NULL DEFAULT 0,
                    notes TEXT,
                    created_at INTEGER NOT NULL,
                    created_by TEXT NOT NULL,
                    updated_at INTEGER NOT NULL,
                    last_modified_by TEXT
                );
                CREATE UNIQUE INDEX IF NOT EXISTS idx_targets_period_tuple
                    ON unified_targets (
                        owner_kind, owner_id, period_type, year, quarter, COALESCE(month, 0)
                    );
                CREATE INDEX IF NOT EXISTS idx_targets_owner_period
                    ON unified_targets (owner_kind, owner_id, year, quarter);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(found) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "store schema version {found} is not supported (expected {SCHEMA_VERSION})"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Parses a stored UUID column value.
fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, QuotaError> {
    Uuid::parse_str(raw)
        .map_err(|_| QuotaError::Internal(format!("corrupt {what} identifier in store: {raw}")))
}

/// Decodes a stored permission level rank.
fn level_from_rank(rank: i64) -> Result<PermissionLevel, QuotaError> {
    match rank {
        1 => Ok(PermissionLevel::Read),
        2 => Ok(PermissionLevel::Write),
        3 => Ok(PermissionLevel::Admin),
        other => {
            Err(QuotaError::Internal(format!("corrupt permission level in store: {other}")))
        }
    }
}

/// Decodes a stored role label.
fn role_from_label(label: &str) -> Result<Role, QuotaError> {
    match label {
        "admin" => Ok(Role::Admin),
        "manager" => Ok(Role::Manager),
        "user" => Ok(Role::User),
        other => Err(QuotaError::Internal(format!("corrupt role in store: {other}"))),
    }
}

/// Decodes a stored owner kind label.
fn owner_kind_from_label(label: &str) -> Result<OwnerKind, QuotaError> {
    match label {
        "person" => Ok(OwnerKind::Person),
        "channel" => Ok(OwnerKind::Channel),
        other => Err(QuotaError::Internal(format!("corrupt owner kind in store: {other}"))),
    }
}

/// Decodes a stored period type label.
fn period_type_from_label(label: &str) -> Result<PeriodType, QuotaError> {
    match label {
        "quarter" => Ok(PeriodType::Quarter),
        "month" => Ok(PeriodType::Month),
        other => Err(QuotaError::Internal(format!("corrupt period type in store: {other}"))),
    }
}

/// Narrows a stored quarter or month number.
fn narrow_u8(value: i64, what: &str) -> Result<u8, QuotaError> {
    u8::try_from(value)
        .map_err(|_| QuotaError::Internal(format!("corrupt {what} value in store: {value}")))
}

/// Raw assignment row as read from `SQLite`.
struct RawAssignment {
    /// Assignment identifier text.
    id: String,
    /// User identifier text.
    user_id: String,
    /// Channel identifier text.
    channel_id: String,
    /// Permission level rank.
    level: i64,
    /// Grantor identifier text.
    assigned_by: String,
    /// Creation stamp in unix milliseconds.
    assigned_at: i64,
    /// Target-responsibility flag.
    target_responsibility: bool,
    /// Update stamp in unix milliseconds.
    updated_at: i64,
}

impl RawAssignment {
    /// Reads a raw assignment from the shared column list.
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            channel_id: row.get(2)?,
            level: row.get(3)?,
            assigned_by: row.get(4)?,
            assigned_at: row.get(5)?,
            target_responsibility: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    /// Decodes the raw row into the canonical assignment record.
    fn decode(self) -> Result<Assignment, QuotaError> {
        Ok(Assignment {
            id: AssignmentId::new(parse_uuid(&self.id, "assignment")?),
            user_id: UserId::new(parse_uuid(&self.user_id, "user")?),
            channel_id: ChannelId::new(parse_uuid(&self.channel_id, "channel")?),
            level: level_from_rank(self.level)?,
            assigned_by: UserId::new(parse_uuid(&self.assigned_by, "user")?),
            assigned_at: Timestamp::from_unix_millis(self.assigned_at),
            target_responsibility: self.target_responsibility,
            updated_at: Timestamp::from_unix_millis(self.updated_at),
        })
    }
}

/// Raw target row as read from `SQLite`.
struct RawTarget {
    /// Target identifier text.
    id: String,
    /// Owner kind label.
    owner_kind: String,
    /// Owner identifier text.
    owner_id: String,
    /// Period type label.
    period_type: String,
    /// Calendar year.
    year: i64,
    /// Quarter number.
    quarter: i64,
    /// Month number for monthly rows.
    month: Option<i64>,
    /// Planned values in canonical metric order.
    targets: [i64; 5],
    /// Achieved values in canonical metric order.
    achieved: [i64; 5],
    /// Free-text notes.
    notes: Option<String>,
    /// Creation stamp in unix milliseconds.
    created_at: i64,
    /// Creator identifier text.
    created_by: String,
    /// Update stamp in unix milliseconds.
    updated_at: i64,
    /// Last modifier identifier text.
    last_modified_by: Option<String>,
}

impl RawTarget {
    /// Reads a raw target from the shared column list.
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_kind: row.get(1)?,
            owner_id: row.get(2)?,
            period_type: row.get(3)?,
            year: row.get(4)?,
            quarter: row.get(5)?,
            month: row.get(6)?,
            targets: [row.get(7)?, row.get(8)?, row.get(9)?, row.get(10)?, row.get(11)?],
            achieved: [row.get(12)?, row.get(13)?, row.get(14)?, row.get(15)?, row.get(16)?],
            notes: row.get(17)?,
            created_at: row.get(18)?,
            created_by: row.get(19)?,
            updated_at: row.get(20)?,
            last_modified_by: row.get(21)?,
        })
    }

    /// Decodes the raw row into the canonical target record.
    fn decode(self) -> Result<UnifiedTarget, QuotaError> {
        let month = self.month.map(|value| narrow_u8(value, "month")).transpose()?;
        let last_modified_by = self
            .last_modified_by
            .as_deref()
            .map(|raw| parse_uuid(raw, "user").map(UserId::new))
            .transpose()?;
        Ok(UnifiedTarget {
            id: TargetId::new(parse_uuid(&self.id, "target")?),
            owner: TargetOwner {
                kind: owner_kind_from_label(&self.owner_kind)?,
                id: OwnerId::new(parse_uuid(&self.owner_id, "owner")?),
            },
            period: Period {
                period_type: period_type_from_label(&self.period_type)?,
                year: i32::try_from(self.year).map_err(|_| {
                    QuotaError::Internal(format!("corrupt year value in store: {}", self.year))
                })?,
                quarter: narrow_u8(self.quarter, "quarter")?,
                month,
            },
            targets: metric_values_from(self.targets),
            achieved: metric_values_from(self.achieved),
            notes: self.notes,
            created_at: Timestamp::from_unix_millis(self.created_at),
            created_by: UserId::new(parse_uuid(&self.created_by, "user")?),
            updated_at: Timestamp::from_unix_millis(self.updated_at),
            last_modified_by,
        })
    }
}

/// Builds a metric value set from the canonical column order.
const fn metric_values_from(values: [i64; 5]) -> MetricValues {
    MetricValues {
        new_signing: values[0],
        core_opportunity: values[1],
        core_performance: values[2],
        high_value_opportunity: values[3],
        high_value_performance: values[4],
    }
}

/// Checks whether a row exists for the given identifier.
fn row_exists(tx: &Transaction<'_>, sql: &str, id: &str) -> Result<bool, QuotaError> {
    let mut stmt = tx.prepare_cached(sql).map_err(|err| db_err(&err))?;
    let found: Option<i64> =
        stmt.query_row(params![id], |row| row.get(0)).optional().map_err(|err| db_err(&err))?;
    Ok(found.is_some())
}

// ============================================================================
// SECTION: Directory Implementation
// ============================================================================

impl Directory for SqliteQuotaStore {
    fn insert_user(&self, user: &UserAccount) -> Result<(), QuotaError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        let result = {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO users (id, name, role, created_at) VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(|err| db_err(&err))?;
            stmt.execute(params![
                user.id.to_string(),
                user.name.as_str(),
                user.role.label(),
                user.created_at.as_unix_millis(),
            ])
        };
        result.map_err(|err| insert_err(&err, "user already exists"))?;
        tx.commit().map_err(|err| db_err(&err))
    }

    fn get_user(&self, id: UserId) -> Result<Option<UserAccount>, QuotaError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare_cached("SELECT id, name, role, created_at FROM users WHERE id = ?1")
            .map_err(|err| db_err(&err))?;
        let raw: Option<(String, String, String, i64)> = stmt
            .query_row(params![id.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .optional()
            .map_err(|err| db_err(&err))?;
        raw.map(|(id, name, role, created_at)| {
            Ok(UserAccount {
                id: UserId::new(parse_uuid(&id, "user")?),
                name,
                role: role_from_label(&role)?,
                created_at: Timestamp::from_unix_millis(created_at),
            })
        })
        .transpose()
    }

    fn insert_channel(&self, channel: &Channel) -> Result<(), QuotaError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        let result = {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO channels (id, name, created_at, created_by) \
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(|err| db_err(&err))?;
            stmt.execute(params![
                channel.id.to_string(),
                channel.name.as_str(),
                channel.created_at.as_unix_millis(),
                channel.created_by.to_string(),
            ])
        };
        result.map_err(|err| insert_err(&err, "channel already exists"))?;
        tx.commit().map_err(|err| db_err(&err))
    }

    fn get_channel(&self, id: ChannelId) -> Result<Option<Channel>, QuotaError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare_cached("SELECT id, name, created_at, created_by FROM channels WHERE id = ?1")
            .map_err(|err| db_err(&err))?;
        let raw: Option<(String, String, i64, String)> = stmt
            .query_row(params![id.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .optional()
            .map_err(|err| db_err(&err))?;
        raw.map(|(id, name, created_at, created_by)| {
            Ok(Channel {
                id: ChannelId::new(parse_uuid(&id, "channel")?),
                name,
                created_at: Timestamp::from_unix_millis(created_at),
                created_by: UserId::new(parse_uuid(&created_by, "user")?),
            })
        })
        .transpose()
    }

    fn update_channel(&self, id: ChannelId, change: &ChannelChange) -> Result<Channel, QuotaError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        let raw: Option<(String, String, i64, String)> = {
            let mut stmt = tx
                .prepare_cached(
                    "SELECT id, name, created_at, created_by FROM channels WHERE id = ?1",
                )
                .map_err(|err| db_err(&err))?;
            stmt.query_row(params![id.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .optional()
            .map_err(|err| db_err(&err))?
        };
        let Some((channel_id, name, created_at, created_by)) = raw else {
            return Err(QuotaError::NotFound(format!("channel not found: {id}")));
        };
        let mut channel = Channel {
            id: ChannelId::new(parse_uuid(&channel_id, "channel")?),
            name,
            created_at: Timestamp::from_unix_millis(created_at),
            created_by: UserId::new(parse_uuid(&created_by, "user")?),
        };
        if change.is_empty() {
            return Ok(channel);
        }
        if let Some(name) = &change.name {
            channel.name = name.clone();
        }
        {
            let mut stmt = tx
                .prepare_cached("UPDATE channels SET name = ?2 WHERE id = ?1")
                .map_err(|err| db_err(&err))?;
            stmt.execute(params![id.to_string(), channel.name.as_str()])
                .map_err(|err| db_err(&err))?;
        }
        tx.commit().map_err(|err| db_err(&err))?;
        Ok(channel)
    }
}

// ============================================================================
// SECTION: Assignment Store Implementation
// ============================================================================

impl AssignmentStore for SqliteQuotaStore {
    fn insert_assignment(&self, assignment: &Assignment) -> Result<(), QuotaError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        if !row_exists(&tx, "SELECT 1 FROM users WHERE id = ?1", &assignment.user_id.to_string())?
        {
            return Err(QuotaError::NotFound(format!(
                "user not found: {}",
                assignment.user_id
            )));
        }
        if !row_exists(
            &tx,
            "SELECT 1 FROM channels WHERE id = ?1",
            &assignment.channel_id.to_string(),
        )? {
            return Err(QuotaError::NotFound(format!(
                "channel not found: {}",
                assignment.channel_id
            )));
        }
        let result = {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO assignments (id, user_id, channel_id, level, assigned_by, \
                     assigned_at, target_responsibility, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(|err| db_err(&err))?;
            stmt.execute(params![
                assignment.id.to_string(),
                assignment.user_id.to_string(),
                assignment.channel_id.to_string(),
                i64::from(assignment.level.rank()),
                assignment.assigned_by.to_string(),
                assignment.assigned_at.as_unix_millis(),
                assignment.target_responsibility,
                assignment.updated_at.as_unix_millis(),
            ])
        };
        result.map_err(|err| {
            insert_err(&err, "an assignment already exists for this user and channel")
        })?;
        tx.commit().map_err(|err| db_err(&err))
    }

    fn get_assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, QuotaError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare_cached(&format!(
                "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ?1"
            ))
            .map_err(|err| db_err(&err))?;
        let raw = stmt
            .query_row(params![id.to_string()], RawAssignment::from_row)
            .optional()
            .map_err(|err| db_err(&err))?;
        raw.map(RawAssignment::decode).transpose()
    }

    fn find_assignment(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<Option<Assignment>, QuotaError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare_cached(&format!(
                "SELECT {ASSIGNMENT_COLUMNS} FROM assignments \
                 WHERE user_id = ?1 AND channel_id = ?2"
            ))
            .map_err(|err| db_err(&err))?;
        let raw = stmt
            .query_row(params![user_id.to_string(), channel_id.to_string()], RawAssignment::from_row)
            .optional()
            .map_err(|err| db_err(&err))?;
        raw.map(RawAssignment::decode).transpose()
    }

    fn update_assignment(
        &self,
        id: AssignmentId,
        change: &AssignmentChange,
        now: Timestamp,
    ) -> Result<Assignment, QuotaError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        let raw = {
            let mut stmt = tx
                .prepare_cached(&format!(
                    "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ?1"
                ))
                .map_err(|err| db_err(&err))?;
            stmt.query_row(params![id.to_string()], RawAssignment::from_row)
                .optional()
                .map_err(|err| db_err(&err))?
        };
        let Some(raw) = raw else {
            return Err(QuotaError::NotFound(format!("assignment not found: {id}")));
        };
        let mut assignment = raw.decode()?;
        if change.is_empty() {
            return Ok(assignment);
        }
        if let Some(level) = change.level {
            assignment.level = level;
        }
        if let Some(flag) = change.target_responsibility {
            assignment.target_responsibility = flag;
        }
        assignment.updated_at = now;
        {
            let mut stmt = tx
                .prepare_cached(
                    "UPDATE assignments SET level = ?2, target_responsibility = ?3, \
                     updated_at = ?4 WHERE id = ?1",
                )
                .map_err(|err| db_err(&err))?;
            stmt.execute(params![
                id.to_string(),
                i64::from(assignment.level.rank()),
                assignment.target_responsibility,
                assignment.updated_at.as_unix_millis(),
            ])
            .map_err(|err| db_err(&err))?;
        }
        tx.commit().map_err(|err| db_err(&err))?;
        Ok(assignment)
    }

    fn delete_assignment(&self, id: AssignmentId) -> Result<bool, QuotaError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare_cached("DELETE FROM assignments WHERE id = ?1")
            .map_err(|err| db_err(&err))?;
        let removed = stmt.execute(params![id.to_string()]).map_err(|err| db_err(&err))?;
        Ok(removed > 0)
    }

    fn list_channels_for_user(
        &self,
        user_id: UserId,
        required: PermissionLevel,
    ) -> Result<Vec<Channel>, QuotaError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare_cached(
                "SELECT c.id, c.name, c.created_at, c.created_by \
                 FROM assignments a JOIN channels c ON c.id = a.channel_id \
                 WHERE a.user_id = ?1 AND a.level >= ?2 \
                 ORDER BY c.name ASC, c.id ASC",
            )
            .map_err(|err| db_err(&err))?;
        let rows = stmt
            .query_map(params![user_id.to_string(), i64::from(required.rank())], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|err| db_err(&err))?;
        let mut channels = Vec::new();
        for row in rows {
            let (id, name, created_at, created_by) = row.map_err(|err| db_err(&err))?;
            channels.push(Channel {
                id: ChannelId::new(parse_uuid(&id, "channel")?),
                name,
                created_at: Timestamp::from_unix_millis(created_at),
                created_by: UserId::new(parse_uuid(&created_by, "user")?),
            });
        }
        Ok(channels)
    }
}

// ============================================================================
// SECTION: Target Store Implementation
// ============================================================================

impl TargetStore for SqliteQuotaStore {
    fn insert_target(&self, target: &UnifiedTarget) -> Result<(), QuotaError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        let result = {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO unified_targets (id, owner_kind, owner_id, period_type, year, \
                     quarter, month, new_signing_target, core_opportunity_target, \
                     core_performance_target, high_value_opportunity_target, \
                     high_value_performance_target, new_signing_achieved, \
                     core_opportunity_achieved, core_performance_achieved, \
                     high_value_opportunity_achieved, high_value_performance_achieved, notes, \
                     created_at, created_by, updated_at, last_modified_by) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
                     ?16, ?17, ?18, ?19, ?20, ?21, ?22)",
                )
                .map_err(|err| db_err(&err))?;
            stmt.execute(params![
                target.id.to_string(),
                target.owner.kind.label(),
                target.owner.id.to_string(),
                target.period.period_type.label(),
                i64::from(target.period.year),
                i64::from(target.period.quarter),
                target.period.month.map(i64::from),
                target.targets.new_signing,
                target.targets.core_opportunity,
                target.targets.core_performance,
                target.targets.high_value_opportunity,
                target.targets.high_value_performance,
                target.achieved.new_signing,
                target.achieved.core_opportunity,
                target.achieved.core_performance,
                target.achieved.high_value_opportunity,
                target.achieved.high_value_performance,
                target.notes.as_deref(),
                target.created_at.as_unix_millis(),
                target.created_by.to_string(),
                target.updated_at.as_unix_millis(),
                target.last_modified_by.map(|user| user.to_string()),
            ])
        };
        result
            .map_err(|err| insert_err(&err, "a target already exists for this owner and period"))?;
        tx.commit().map_err(|err| db_err(&err))
    }

    fn get_target(&self, id: TargetId) -> Result<Option<UnifiedTarget>, QuotaError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare_cached(&format!(
                "SELECT {TARGET_COLUMNS} FROM unified_targets WHERE id = ?1"
            ))
            .map_err(|err| db_err(&err))?;
        let raw = stmt
            .query_row(params![id.to_string()], RawTarget::from_row)
            .optional()
            .map_err(|err| db_err(&err))?;
        raw.map(RawTarget::decode).transpose()
    }

    fn list_targets(
        &self,
        filter: &TargetFilter,
        skip: u64,
        limit: u64,
    ) -> Result<TargetPage, QuotaError> {
        let (where_clause, values) = filter_clause(filter);
        let guard = self.lock()?;

        let total: i64 = {
            let mut stmt = guard
                .prepare_cached(&format!(
                    "SELECT COUNT(1) FROM unified_targets{where_clause}"
                ))
                .map_err(|err| db_err(&err))?;
            stmt.query_row(params_from_iter(values.iter()), |row| row.get(0))
                .map_err(|err| db_err(&err))?
        };

        let mut page_values = values;
        page_values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        page_values.push(Value::Integer(i64::try_from(skip).unwrap_or(i64::MAX)));
        let mut stmt = guard
            .prepare_cached(&format!(
                "SELECT {TARGET_COLUMNS} FROM unified_targets{where_clause} \
                 ORDER BY year DESC, quarter DESC, month DESC, created_at DESC \
                 LIMIT ? OFFSET ?"
            ))
            .map_err(|err| db_err(&err))?;
        let rows = stmt
            .query_map(params_from_iter(page_values.iter()), RawTarget::from_row)
            .map_err(|err| db_err(&err))?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(|err| db_err(&err))?.decode()?);
        }
        Ok(TargetPage {
            items,
            total: u64::try_from(total).unwrap_or(0),
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
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        let mut target = load_target_for_update(&tx, id)?;
        if change.is_empty() && modified_by.is_none() {
            return Ok(target);
        }
        change.targets.apply_to(&mut target.targets);
        if let Some(notes) = &change.notes {
            target.notes = Some(notes.clone());
        }
        target.updated_at = now;
        if modified_by.is_some() {
            target.last_modified_by = modified_by;
        }
        write_target_values(&tx, &target)?;
        tx.commit().map_err(|err| db_err(&err))?;
        Ok(target)
    }

    fn update_achievement(
        &self,
        id: TargetId,
        change: &AchievementChange,
        modified_by: Option<UserId>,
        now: Timestamp,
    ) -> Result<UnifiedTarget, QuotaError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_err(&err))?;
        let mut target = load_target_for_update(&tx, id)?;
        if change.is_empty() && modified_by.is_none() {
            return Ok(target);
        }
        change.achieved.apply_to(&mut target.achieved);
        target.updated_at = now;
        if modified_by.is_some() {
            target.last_modified_by = modified_by;
        }
        write_target_values(&tx, &target)?;
        tx.commit().map_err(|err| db_err(&err))?;
        Ok(target)
    }

    fn delete_target(&self, id: TargetId) -> Result<bool, QuotaError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare_cached("DELETE FROM unified_targets WHERE id = ?1")
            .map_err(|err| db_err(&err))?;
        let removed = stmt.execute(params![id.to_string()]).map_err(|err| db_err(&err))?;
        Ok(removed > 0)
    }

    fn quarter_view(
        &self,
        owner: TargetOwner,
        year: i32,
        quarter: u8,
    ) -> Result<QuarterView, QuotaError> {
        let guard = self.lock()?;
        let quarter_row = {
            let mut stmt = guard
                .prepare_cached(&format!(
                    "SELECT {TARGET_COLUMNS} FROM unified_targets \
                     WHERE owner_kind = ?1 AND owner_id = ?2 AND period_type = 'quarter' \
                     AND year = ?3 AND quarter = ?4"
                ))
                .map_err(|err| db_err(&err))?;
            stmt.query_row(
                params![
                    owner.kind.label(),
                    owner.id.to_string(),
                    i64::from(year),
                    i64::from(quarter),
                ],
                RawTarget::from_row,
            )
            .optional()
            .map_err(|err| db_err(&err))?
        };
        let (first_month, last_month) = quarter_month_span(quarter);
        let mut stmt = guard
            .prepare_cached(&format!(
                "SELECT {TARGET_COLUMNS} FROM unified_targets \
                 WHERE owner_kind = ?1 AND owner_id = ?2 AND period_type = 'month' \
                 AND year = ?3 AND quarter = ?4 AND month BETWEEN ?5 AND ?6 \
                 ORDER BY month ASC"
            ))
            .map_err(|err| db_err(&err))?;
        let rows = stmt
            .query_map(
                params![
                    owner.kind.label(),
                    owner.id.to_string(),
                    i64::from(year),
                    i64::from(quarter),
                    i64::from(first_month),
                    i64::from(last_month),
                ],
                RawTarget::from_row,
            )
            .map_err(|err| db_err(&err))?;
        let mut months = Vec::new();
        for row in rows {
            months.push(row.map_err(|err| db_err(&err))?.decode()?);
        }
        Ok(QuarterView {
            quarter: quarter_row.map(RawTarget::decode).transpose()?,
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
        let mut stmt = guard
            .prepare_cached(
                "SELECT COALESCE(SUM(new_signing_achieved), 0), \
                 COALESCE(SUM(core_opportunity_achieved), 0), \
                 COALESCE(SUM(core_performance_achieved), 0), \
                 COALESCE(SUM(high_value_opportunity_achieved), 0), \
                 COALESCE(SUM(high_value_performance_achieved), 0) \
                 FROM unified_targets \
                 WHERE owner_kind = ?1 AND owner_id = ?2 AND period_type = 'month' \
                 AND year = ?3 AND quarter = ?4",
            )
            .map_err(|err| db_err(&err))?;
        let sums: [i64; 5] = stmt
            .query_row(
                params![
                    owner.kind.label(),
                    owner.id.to_string(),
                    i64::from(year),
                    i64::from(quarter),
                ],
                |row| Ok([row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?]),
            )
            .map_err(|err| db_err(&err))?;
        Ok(metric_values_from(sums))
    }
}

// ============================================================================
// SECTION: Target Helpers
// ============================================================================

/// Loads a target inside an update transaction, failing closed on absence.
fn load_target_for_update(tx: &Transaction<'_>, id: TargetId) -> Result<UnifiedTarget, QuotaError> {
    let raw = {
        let mut stmt = tx
            .prepare_cached(&format!("SELECT {TARGET_COLUMNS} FROM unified_targets WHERE id = ?1"))
            .map_err(|err| db_err(&err))?;
        stmt.query_row(params![id.to_string()], RawTarget::from_row)
            .optional()
            .map_err(|err| db_err(&err))?
    };
    raw.map_or_else(
        || Err(QuotaError::NotFound(format!("target not found: {id}"))),
        RawTarget::decode,
    )
}

/// Writes the mutable columns of a target row inside an update transaction.
fn write_target_values(tx: &Transaction<'_>, target: &UnifiedTarget) -> Result<(), QuotaError> {
    let mut stmt = tx
        .prepare_cached(
            "UPDATE unified_targets SET new_signing_target = ?2, core_opportunity_target = ?3, \
             core_performance_target = ?4, high_value_opportunity_target = ?5, \
             high_value_performance_target = ?6, new_signing_achieved = ?7, \
             core_opportunity_achieved = ?8, core_performance_achieved = ?9, \
             high_value_opportunity_achieved = ?10, high_value_performance_achieved = ?11, \
             notes = ?12, updated_at = ?13, last_modified_by = ?14 WHERE id = ?1",
        )
        .map_err(|err| db_err(&err))?;
    stmt.execute(params![
        target.id.to_string(),
        target.targets.new_signing,
        target.targets.core_opportunity,
        target.targets.core_performance,
        target.targets.high_value_opportunity,
        target.targets.high_value_performance,
        target.achieved.new_signing,
        target.achieved.core_opportunity,
        target.achieved.core_performance,
        target.achieved.high_value_opportunity,
        target.achieved.high_value_performance,
        target.notes.as_deref(),
        target.updated_at.as_unix_millis(),
        target.last_modified_by.map(|user| user.to_string()),
    ])
    .map_err(|err| db_err(&err))?;
    Ok(())
}

/// Builds the WHERE clause and bound values for a target filter.
fn filter_clause(filter: &TargetFilter) -> (String, Vec<Value>) {
    let mut conditions: Vec<&'static str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(kind) = filter.owner_kind {
        conditions.push("owner_kind = ?");
        values.push(Value::Text(kind.label().to_string()));
    }
    if let Some(owner_id) = filter.owner_id {
        conditions.push("owner_id = ?");
        values.push(Value::Text(owner_id.to_string()));
    }
    if let Some(period_type) = filter.period_type {
        conditions.push("period_type = ?");
        values.push(Value::Text(period_type.label().to_string()));
    }
    if let Some(year) = filter.year {
        conditions.push("year = ?");
        values.push(Value::Integer(i64::from(year)));
    }
    if let Some(quarter) = filter.quarter {
        conditions.push("quarter = ?");
        values.push(Value::Integer(i64::from(quarter)));
    }
    if let Some(month) = filter.month {
        conditions.push("month = ?");
        values.push(Value::Integer(i64::from(month)));
    }
    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}
