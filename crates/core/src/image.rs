// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image specification and pull policy

use serde::{Deserialize, Serialize};

/// What the resolver has to work with for one worker slot: a registry
/// reference, an inline build recipe (Dockerfile contents), or both absent.
///
/// With neither set, resolution always fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    /// Pre-existing image reference, e.g. `ubuntu:24.04`
    pub reference: Option<String>,
    /// Inline build-definition contents used when the reference is absent
    /// or not present locally
    pub build_recipe: Option<String>,
}

impl ImageSpec {
    pub fn from_reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            build_recipe: None,
        }
    }

    pub fn from_recipe(recipe: impl Into<String>) -> Self {
        Self {
            reference: None,
            build_recipe: Some(recipe.into()),
        }
    }

    /// True when there is nothing to resolve from
    pub fn is_empty(&self) -> bool {
        self.reference.is_none() && self.build_recipe.is_none()
    }
}

/// Registry pull behavior for a slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullPolicy {
    /// Pull even when the image is already present locally
    #[serde(default)]
    pub always_pull: bool,
    /// Whether pulling is enabled at all
    #[serde(default)]
    pub autopull: bool,
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
