// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort eviction of stale same-named containers

use kiln_adapters::ContainerRuntime;

/// Remove any container bearing the slot's deterministic name before a new
/// instance is created.
///
/// Never fails the surrounding substantiation: "not found" on removal is a
/// race another process won, and any other removal error is logged and
/// ignored. Name filters can return prefix false positives, so each listed
/// container is re-checked against the exact `/`-prefixed name.
pub async fn evict_stale<R: ContainerRuntime>(runtime: &R, container_name: &str) {
    let listed = match runtime.list_containers(container_name).await {
        Ok(listed) => listed,
        Err(e) => {
            tracing::warn!(container_name, error = %e, "stale instance listing failed");
            return;
        }
    };

    let exact = format!("/{container_name}");
    for container in listed {
        if !container.names.iter().any(|name| name == &exact) {
            continue;
        }
        match runtime.remove_container(&container.id, true, true).await {
            Ok(()) => {
                tracing::info!(container_name, id = %container.id, "stale instance removed");
            }
            Err(e) if e.is_not_found() => {
                // Lost the removal race; someone else got there first
                tracing::debug!(container_name, id = %container.id, "stale instance already gone");
            }
            Err(e) => {
                tracing::warn!(container_name, id = %container.id, error = %e, "stale instance removal failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
