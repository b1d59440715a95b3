// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kiln-engine: substantiation engine for ephemeral CI workers
//!
//! Provisions one disposable container per worker slot: resolves the
//! filesystem image (local / build / pull), evicts stale same-named
//! containers, creates and starts the instance, streams startup output
//! until the worker connects, and tears everything down on release.

mod error;
mod lifecycle;
mod reaper;
mod resolver;
mod session;
mod streamer;

pub use error::{LifecycleError, ResolveError};
pub use lifecycle::{create_and_start, release};
pub use reaper::evict_stale;
pub use resolver::ImageResolver;
pub use session::WorkerSession;
pub use streamer::stream_until_connected;
