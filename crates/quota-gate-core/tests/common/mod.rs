// crates/quota-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Shared Test Fixtures
// Description: Engine construction and directory seeding helpers.
// Purpose: Keep integration tests focused on behavior under test.
// ============================================================================

//! ## Overview
//! Helpers building an engine over the in-memory store with a stepping
//! clock, plus seeding shortcuts for users, channels, and actors.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use quota_gate_core::Actor;
use quota_gate_core::Channel;
use quota_gate_core::ChannelDraft;
use quota_gate_core::Clock;
use quota_gate_core::EngineConfig;
use quota_gate_core::MemoryDecisionLog;
use quota_gate_core::MemoryQuotaStore;
use quota_gate_core::QuotaEngine;
use quota_gate_core::Role;
use quota_gate_core::Timestamp;
use quota_gate_core::UserAccount;
use quota_gate_core::UserDraft;

/// Clock advancing one second on every reading.
#[derive(Debug, Default)]
pub struct TickClock {
    /// Number of readings taken so far.
    ticks: AtomicI64,
}

impl Clock for TickClock {
    fn now(&self) -> Timestamp {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        Timestamp::from_unix_millis(1_700_000_000_000 + tick * 1_000)
    }
}

/// Engine type used across the integration tests.
pub type TestEngine = QuotaEngine<MemoryQuotaStore, TickClock, MemoryDecisionLog>;

/// Builds an engine over an empty in-memory store.
pub fn engine() -> TestEngine {
    QuotaEngine::new(
        MemoryQuotaStore::new(),
        TickClock::default(),
        MemoryDecisionLog::new(),
        EngineConfig::default(),
    )
    .expect("default engine config is valid")
}

/// Registers a user with the given role and returns account and actor.
pub fn seed_user(engine: &TestEngine, name: &str, role: Role) -> (UserAccount, Actor) {
    let user = engine
        .register_user(UserDraft {
            name: name.to_string(),
            role,
        })
        .expect("user registration succeeds");
    let actor = Actor {
        user_id: user.id,
        role: user.role,
    };
    (user, actor)
}

/// Creates a channel through an operator actor.
pub fn seed_channel(engine: &TestEngine, operator: &Actor, name: &str) -> Channel {
    engine
        .create_channel(
            operator,
            ChannelDraft {
                name: name.to_string(),
            },
        )
        .expect("channel creation succeeds")
}
