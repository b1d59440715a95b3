// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime adapter trait

mod docker;

pub use docker::DockerRuntime;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeContainer, FakeRuntime, RuntimeCall};

use async_trait::async_trait;
use kiln_core::HostLimits;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from container runtime operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("container runtime api error: {0}")]
    Api(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// True for a benign "already gone" outcome on removal
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Negotiated client API version of the runtime endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientVersion {
    pub major: u32,
    pub minor: u32,
}

impl ClientVersion {
    /// Docker API 1.25 introduced the `init` host-config flag
    pub fn supports_init(&self) -> bool {
        (self.major, self.minor) >= (1, 25)
    }
}

/// One entry from a name-filtered container listing.
///
/// Name filters may return prefix false positives; callers must re-check
/// exact equality against the `/`-prefixed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub names: Vec<String>,
}

/// Outcome of a create call. A missing identifier means the runtime
/// accepted the call but produced nothing usable; callers treat it as a
/// failed creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerCreated {
    pub id: Option<String>,
}

/// Fully-resolved arguments for a create call. Binds are already merged
/// into the host limits by the lifecycle manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Container-side volume paths
    pub volumes: Vec<String>,
    pub host: HostLimits,
}

/// Adapter for the container runtime (create/start/stop/remove/list,
/// image build/pull, log attachment).
///
/// Implementations must be cheap to clone and safe for concurrent use by
/// independent worker slots.
#[async_trait]
pub trait ContainerRuntime: Clone + Send + Sync + 'static {
    /// Negotiated client API version
    fn client_version(&self) -> ClientVersion;

    /// Check local presence of an image by reference
    async fn image_exists(&self, reference: &str) -> Result<bool, RuntimeError>;

    /// Build an image from an inline recipe under the given tag, streaming
    /// progress lines into the sink while the build runs
    async fn build_image(
        &self,
        recipe: &str,
        tag: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<(), RuntimeError>;

    /// Pull an image from a registry, streaming progress lines into the sink
    async fn pull_image(
        &self,
        reference: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<(), RuntimeError>;

    /// List all containers (including stopped ones) matching a name filter
    async fn list_containers(&self, name_filter: &str)
        -> Result<Vec<ContainerSummary>, RuntimeError>;

    /// Issue a create call
    async fn create_container(&self, request: CreateRequest)
        -> Result<ContainerCreated, RuntimeError>;

    /// Start a created container
    async fn start_container(&self, id: &str) -> Result<(), RuntimeError>;

    /// Stop a running container
    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError>;

    /// Remove a container; `RuntimeError::NotFound` when it is already gone
    async fn remove_container(
        &self,
        id: &str,
        force: bool,
        volumes: bool,
    ) -> Result<(), RuntimeError>;

    /// Attach to the combined stdout/stderr line stream. Dropping the
    /// receiver cancels forwarding.
    async fn attach(&self, id: &str) -> Result<mpsc::Receiver<String>, RuntimeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_support_starts_at_api_1_25() {
        assert!(!ClientVersion { major: 1, minor: 24 }.supports_init());
        assert!(ClientVersion { major: 1, minor: 25 }.supports_init());
        assert!(ClientVersion { major: 2, minor: 0 }.supports_init());
    }
}
