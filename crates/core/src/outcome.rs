// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed substantiation outcome shared with the control plane

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Successful substantiation: the slot is backed by a running container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substantiated {
    pub instance_id: String,
    pub image: String,
}

/// Terminal failure kinds for one substantiation attempt.
///
/// `SlotOccupied` signals a caller bug (requests for a slot must be
/// serialized) and is never retried. The other two are terminal for the
/// attempt; retry policy belongs to the control plane.
#[derive(Debug, Error)]
pub enum SubstantiateError {
    /// Precondition violation: the slot already holds a live instance
    #[error("slot `{0}` already has an active instance")]
    SlotOccupied(String),
    /// The image could not be resolved after build and pull attempts
    #[error("cannot substantiate: {0}")]
    CannotSubstantiate(String),
    /// Rendering, create, or start failed
    #[error("failed to substantiate: {0}")]
    FailedToSubstantiate(String),
}

impl SubstantiateError {
    /// True for the fatal programming-error class, as opposed to the two
    /// per-attempt failure kinds
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::SlotOccupied(_))
    }
}
