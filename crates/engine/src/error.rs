// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the substantiation engine

use kiln_adapters::RuntimeError;
use thiserror::Error;

/// Errors from image resolution. All of these surface to the control plane
/// as `CannotSubstantiate`: the image precondition could not be met.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("image {0} not found on container host")]
    ImageNotFound(String),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Errors from container creation and start. All of these surface to the
/// control plane as `FailedToSubstantiate`.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("container runtime returned no instance id")]
    NoInstanceId,
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
