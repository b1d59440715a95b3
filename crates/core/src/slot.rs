// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker slots and live instances

use crate::clock::Clock;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    /// No instance, no substantiation in flight
    Idle,
    /// Resolving the filesystem image
    Resolving,
    /// Create call issued against the container runtime
    Creating,
    /// Container created, start call in flight
    Starting,
    /// Worker is up and addressable
    Running,
}

/// Optional per-slot worker metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMeta {
    pub arch: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One live or starting container backing a worker slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub image: String,
    pub state: WorkerState,
    #[serde(skip, default = "Instant::now")]
    pub created_at: Instant,
}

impl Instance {
    /// Record a freshly created container. The caller stores this on the
    /// slot before issuing the start call, so eviction can find a container
    /// stuck between create and start.
    pub fn created(id: String, image: String, clock: &impl Clock) -> Self {
        Self {
            id,
            image,
            state: WorkerState::Starting,
            created_at: clock.now(),
        }
    }

    /// Truncated identifier for operator-facing log lines
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

/// First six characters of an instance identifier
pub fn short_id(id: &str) -> &str {
    id.get(..6).unwrap_or(id)
}

/// A logical, persistently-named provisioning target. Lives for the process
/// lifetime; holds at most one instance at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSlot {
    pub name: String,
    #[serde(default)]
    pub meta: SlotMeta,
    pub instance: Option<Instance>,
}

impl WorkerSlot {
    pub fn new(name: impl Into<String>, meta: SlotMeta) -> Self {
        Self {
            name: name.into(),
            meta,
            instance: None,
        }
    }

    /// Deterministic container name for this slot
    pub fn container_name(&self) -> String {
        format!("kiln-{}", self.name)
    }

    pub fn is_occupied(&self) -> bool {
        self.instance.is_some()
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
