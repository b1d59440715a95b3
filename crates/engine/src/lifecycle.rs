// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container creation, start, and idempotent teardown

use crate::error::LifecycleError;
use kiln_adapters::{ContainerRuntime, CreateRequest};
use kiln_core::{parse_volumes, Clock, Instance, RuntimeConfig, WorkerState};

/// Create and start the container backing a worker slot.
///
/// The instance record is written into `slot_instance` as soon as creation
/// yields an identifier and before the start call is issued, so that a later
/// eviction pass can find a container stuck between create and start.
pub async fn create_and_start<R: ContainerRuntime>(
    runtime: &R,
    clock: &impl Clock,
    container_name: &str,
    image: &str,
    config: &RuntimeConfig,
    slot_instance: &mut Option<Instance>,
) -> Result<String, LifecycleError> {
    let (volumes, binds) = parse_volumes(&config.volumes);

    let mut host = config.host.clone();
    host.binds.extend(binds);
    if runtime.client_version().supports_init() {
        host.init = true;
    }

    let created = runtime
        .create_container(CreateRequest {
            name: container_name.to_string(),
            image: image.to_string(),
            command: config.command.clone(),
            env: config.env.clone(),
            volumes,
            host,
        })
        .await?;

    let id = created.id.ok_or(LifecycleError::NoInstanceId)?;
    tracing::info!(id = %kiln_core::slot::short_id(&id), "container created");

    *slot_instance = Some(Instance::created(id.clone(), image.to_string(), clock));

    runtime.start_container(&id).await?;
    if let Some(instance) = slot_instance.as_mut() {
        instance.state = WorkerState::Running;
    }
    tracing::info!(container_name, "container started");

    Ok(id)
}

/// Stop and remove the slot's instance. Idempotent: releasing an already
/// released slot is a no-op, and a container that is already gone is not an
/// error.
pub async fn release<R: ContainerRuntime>(runtime: &R, slot_instance: &mut Option<Instance>) {
    let Some(instance) = slot_instance.take() else {
        return;
    };

    if let Err(e) = runtime.stop_container(&instance.id).await {
        tracing::debug!(id = %instance.short_id(), error = %e, "stop on release failed");
    }
    match runtime.remove_container(&instance.id, true, true).await {
        Ok(()) => tracing::info!(id = %instance.short_id(), "instance released"),
        Err(e) if e.is_not_found() => {
            tracing::debug!(id = %instance.short_id(), "instance already gone on release");
        }
        Err(e) => {
            tracing::warn!(id = %instance.short_id(), error = %e, "instance removal on release failed");
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
