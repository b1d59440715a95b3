// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the container runtime boundary

pub mod runtime;
pub mod traced;

pub use runtime::{
    ClientVersion, ContainerCreated, ContainerRuntime, ContainerSummary, CreateRequest,
    DockerRuntime, RuntimeError,
};
pub use traced::TracedRuntime;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use runtime::{FakeContainer, FakeRuntime, RuntimeCall};
