// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced runtime wrapper for consistent observability

use crate::runtime::{
    ClientVersion, ContainerCreated, ContainerRuntime, ContainerSummary, CreateRequest,
    RuntimeError,
};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Wrapper that adds tracing to any ContainerRuntime
#[derive(Clone)]
pub struct TracedRuntime<R> {
    inner: R,
}

impl<R> TracedRuntime<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: ContainerRuntime> ContainerRuntime for TracedRuntime<R> {
    fn client_version(&self) -> ClientVersion {
        self.inner.client_version()
    }

    async fn image_exists(&self, reference: &str) -> Result<bool, RuntimeError> {
        let result = self.inner.image_exists(reference).await;
        match &result {
            Ok(present) => tracing::debug!(reference, present, "image presence checked"),
            Err(e) => tracing::error!(reference, error = %e, "image presence check failed"),
        }
        result
    }

    async fn build_image(
        &self,
        recipe: &str,
        tag: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<(), RuntimeError> {
        let span = tracing::info_span!("runtime.build", tag);
        let _guard = span.enter();

        tracing::info!(recipe_bytes = recipe.len(), "building image");
        let start = std::time::Instant::now();
        let result = self.inner.build_image(recipe, tag, sink).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "image built"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "build failed"
            ),
        }
        result
    }

    async fn pull_image(
        &self,
        reference: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<(), RuntimeError> {
        let span = tracing::info_span!("runtime.pull", reference);
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.pull_image(reference, sink).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "image pulled"),
            Err(e) => tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "pull failed"
            ),
        }
        result
    }

    async fn list_containers(
        &self,
        name_filter: &str,
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let result = self.inner.list_containers(name_filter).await;
        match &result {
            Ok(listed) => tracing::debug!(name_filter, count = listed.len(), "containers listed"),
            Err(e) => tracing::error!(name_filter, error = %e, "list failed"),
        }
        result
    }

    async fn create_container(
        &self,
        request: CreateRequest,
    ) -> Result<ContainerCreated, RuntimeError> {
        let span = tracing::info_span!("runtime.create", name = %request.name);
        let _guard = span.enter();

        tracing::info!(image = %request.image, "creating container");
        let result = self.inner.create_container(request).await;

        match &result {
            Ok(created) => tracing::info!(id = ?created.id, "container created"),
            Err(e) => tracing::error!(error = %e, "create failed"),
        }
        result
    }

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError> {
        let result = self.inner.start_container(id).await;
        match &result {
            Ok(()) => tracing::info!(id, "container started"),
            Err(e) => tracing::error!(id, error = %e, "start failed"),
        }
        result
    }

    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError> {
        let result = self.inner.stop_container(id).await;
        // stop failing is often acceptable (container already gone)
        match &result {
            Ok(()) => tracing::info!(id, "container stopped"),
            Err(e) => tracing::warn!(id, error = %e, "stop failed (may be expected)"),
        }
        result
    }

    async fn remove_container(
        &self,
        id: &str,
        force: bool,
        volumes: bool,
    ) -> Result<(), RuntimeError> {
        let result = self.inner.remove_container(id, force, volumes).await;
        match &result {
            Ok(()) => tracing::info!(id, "container removed"),
            Err(e) if e.is_not_found() => tracing::debug!(id, "container already gone"),
            Err(e) => tracing::warn!(id, error = %e, "remove failed"),
        }
        result
    }

    async fn attach(&self, id: &str) -> Result<mpsc::Receiver<String>, RuntimeError> {
        let result = self.inner.attach(id).await;
        match &result {
            Ok(_) => tracing::debug!(id, "attached to container output"),
            Err(e) => tracing::warn!(id, error = %e, "attach failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
