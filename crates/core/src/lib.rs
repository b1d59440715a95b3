// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kiln-core: domain model for ephemeral CI worker provisioning
//!
//! This crate provides:
//! - Pure domain types for worker slots, instances, and images
//! - Two-phase configuration: templated `SlotConfig` rendered into a
//!   concrete `RuntimeConfig` per substantiation attempt
//! - The typed substantiation outcome shared with the control plane
//! - Clock and ID abstractions for testable time and naming

pub mod clock;
pub mod config;
pub mod id;
pub mod image;
pub mod outcome;
pub mod slot;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{parse_volumes, BuildContext, HostLimits, RenderError, RuntimeConfig, SlotConfig};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use image::{ImageSpec, PullPolicy};
pub use outcome::{Substantiated, SubstantiateError};
pub use slot::{Instance, SlotMeta, WorkerSlot, WorkerState};
