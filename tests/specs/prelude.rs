// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the engine specs

pub use kiln_adapters::{FakeRuntime, RuntimeCall};
pub use kiln_core::{BuildContext, PullPolicy, SlotConfig, WorkerState};
pub use kiln_engine::WorkerSession;

use kiln_core::{FakeClock, SequentialIdGen, SlotMeta, WorkerSlot};
use tokio::sync::watch;

pub struct Harness {
    pub runtime: FakeRuntime,
    /// Flipped to simulate the worker dialing back in
    pub connected: watch::Sender<bool>,
    pub session: WorkerSession<FakeRuntime, FakeClock, SequentialIdGen>,
}

/// A session for the named slot, backed by a fresh fake runtime and a
/// deterministic ephemeral-id sequence ("eph-1", "eph-2", ...).
pub fn harness(slot_name: &str, config: SlotConfig) -> Harness {
    let runtime = FakeRuntime::new();
    let (connected, rx) = watch::channel(false);
    let session = WorkerSession::new(
        WorkerSlot::new(slot_name, SlotMeta::default()),
        config,
        runtime.clone(),
        FakeClock::new(),
        SequentialIdGen::new("eph"),
        rx,
    );
    Harness {
        runtime,
        connected,
        session,
    }
}

/// Slot config that builds its image from a recipe, with pulling disabled
pub fn recipe_config() -> SlotConfig {
    SlotConfig {
        build_recipe: Some("FROM base\nRUN adduser worker\n".to_string()),
        ..SlotConfig::default()
    }
}
