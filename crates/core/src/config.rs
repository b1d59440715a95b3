// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-phase slot configuration.
//!
//! A `SlotConfig` holds deferred values: minijinja templates that are only
//! meaningful against the build request that triggers a substantiation.
//! `SlotConfig::render` resolves all of them exactly once per attempt into a
//! `RuntimeConfig` of plain strings. Nothing below the worker session ever
//! sees an unrendered placeholder.

use crate::image::{ImageSpec, PullPolicy};
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from rendering deferred configuration values
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error in `{field}`: {message}")]
    Template { field: &'static str, message: String },
}

/// Per-request properties supplied by the control plane, e.g. branch name,
/// commit hash, requested toolchain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildContext {
    values: HashMap<String, serde_json::Value>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    fn to_value(&self) -> minijinja::Value {
        minijinja::Value::from_serialize(&self.values)
    }
}

/// Host-side container configuration: resource limits, the init-process
/// flag, and bind mounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostLimits {
    pub memory_bytes: Option<i64>,
    pub nano_cpus: Option<i64>,
    pub pids_limit: Option<i64>,
    #[serde(default)]
    pub init: bool,
    #[serde(default)]
    pub binds: Vec<String>,
}

/// Static, possibly-templated configuration for one worker slot.
///
/// `image`, `build_recipe`, `volumes`, and env values may contain
/// `{{ ... }}` placeholders resolved against the [`BuildContext`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotConfig {
    pub image: Option<String>,
    pub build_recipe: Option<String>,
    #[serde(default)]
    pub host: HostLimits,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default)]
    pub env: Vec<(String, String)>,
    /// Worker command run inside the container
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub pull: PullPolicy,
    #[serde(default)]
    pub follow_startup_logs: bool,
}

impl SlotConfig {
    /// Resolve every deferred value against the build context.
    ///
    /// Rendering happens once per substantiation attempt; the result is an
    /// immutable snapshot handed down to the resolver and lifecycle manager.
    pub fn render(&self, context: &BuildContext) -> Result<RuntimeConfig, RenderError> {
        // minijinja uses {{ }}, {% %}, {# #} by default, which is what we
        // want. Rendering must not mutate content: a recipe's trailing
        // newline survives.
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        let ctx = context.to_value();

        let reference = self
            .image
            .as_deref()
            .map(|t| render_str(&env, "image", t, &ctx))
            .transpose()?;
        let build_recipe = self
            .build_recipe
            .as_deref()
            .map(|t| render_str(&env, "build_recipe", t, &ctx))
            .transpose()?;
        let volumes = self
            .volumes
            .iter()
            .map(|t| render_str(&env, "volumes", t, &ctx))
            .collect::<Result<Vec<_>, _>>()?;
        let env_vars = self
            .env
            .iter()
            .map(|(k, v)| Ok((k.clone(), render_str(&env, "env", v, &ctx)?)))
            .collect::<Result<Vec<_>, RenderError>>()?;

        Ok(RuntimeConfig {
            image: ImageSpec {
                reference,
                build_recipe,
            },
            host: self.host.clone(),
            volumes,
            env: env_vars,
            command: self.command.clone(),
        })
    }
}

fn render_str(
    env: &Environment,
    field: &'static str,
    template: &str,
    ctx: &minijinja::Value,
) -> Result<String, RenderError> {
    let tmpl = env
        .template_from_str(template)
        .map_err(|e| RenderError::Template {
            field,
            message: e.to_string(),
        })?;
    tmpl.render(ctx).map_err(|e| RenderError::Template {
        field,
        message: e.to_string(),
    })
}

/// The rendered, point-in-time snapshot used for one substantiation attempt.
/// All values are concrete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub image: ImageSpec,
    pub host: HostLimits,
    pub volumes: Vec<String>,
    pub env: Vec<(String, String)>,
    pub command: Vec<String>,
}

/// Split volume specs into (container volume paths, host binds).
///
/// A bare path declares a container volume; `host:container` and
/// `host:container:mode` declare binds, whose container part is also a
/// volume path on the create call.
pub fn parse_volumes(specs: &[String]) -> (Vec<String>, Vec<String>) {
    let mut volumes = Vec::new();
    let mut binds = Vec::new();
    for spec in specs {
        let parts: Vec<&str> = spec.splitn(3, ':').collect();
        match parts.as_slice() {
            [container] => volumes.push((*container).to_string()),
            [_, container] | [_, container, _] => {
                volumes.push((*container).to_string());
                binds.push(spec.clone());
            }
            _ => {}
        }
    }
    (volumes, binds)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
