// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake container runtime for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    ClientVersion, ContainerCreated, ContainerRuntime, ContainerSummary, CreateRequest,
    RuntimeError,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Recorded runtime call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    ImageExists { reference: String },
    Build { tag: String },
    Pull { reference: String },
    List { filter: String },
    Create { name: String, image: String },
    Start { id: String },
    Stop { id: String },
    Remove { id: String, force: bool, volumes: bool },
    Attach { id: String },
}

/// Fake container state
#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub id: String,
    pub name: String,
    pub image: String,
    pub running: bool,
}

#[derive(Debug)]
struct FakeState {
    images: HashSet<String>,
    containers: Vec<FakeContainer>,
    calls: Vec<RuntimeCall>,
    create_requests: Vec<CreateRequest>,
    next_id: u64,
    version: ClientVersion,
    build_succeeds: bool,
    pull_adds_image: bool,
    fail_create: bool,
    create_without_id: bool,
    fail_start: bool,
    fail_remove: bool,
    fail_attach: bool,
    remove_not_found: HashSet<String>,
    build_log_lines: Vec<String>,
    pull_log_lines: Vec<String>,
    startup_lines: Vec<String>,
    attach_senders: Vec<mpsc::Sender<String>>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            images: HashSet::new(),
            containers: Vec::new(),
            calls: Vec::new(),
            create_requests: Vec::new(),
            next_id: 0,
            version: ClientVersion {
                major: 1,
                minor: 45,
            },
            build_succeeds: true,
            pull_adds_image: false,
            fail_create: false,
            create_without_id: false,
            fail_start: false,
            fail_remove: false,
            fail_attach: false,
            remove_not_found: HashSet::new(),
            build_log_lines: vec!["Step 1/1 : FROM base".to_string()],
            pull_log_lines: vec!["Pulling from library".to_string()],
            startup_lines: Vec::new(),
            attach_senders: Vec::new(),
        }
    }
}

/// Fake container runtime for testing
#[derive(Clone, Default)]
pub struct FakeRuntime {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.state().calls.clone()
    }

    /// Full create requests, in order
    pub fn create_requests(&self) -> Vec<CreateRequest> {
        self.state().create_requests.clone()
    }

    /// Mark an image as present locally
    pub fn add_image(&self, reference: impl Into<String>) {
        self.state().images.insert(reference.into());
    }

    pub fn has_image(&self, reference: &str) -> bool {
        self.state().images.contains(reference)
    }

    /// Seed a pre-existing container, returning its id
    pub fn add_container(&self, name: impl Into<String>, image: impl Into<String>) -> String {
        let mut state = self.state();
        state.next_id += 1;
        let id = format!("fake{:08}", state.next_id);
        state.containers.push(FakeContainer {
            id: id.clone(),
            name: name.into(),
            image: image.into(),
            running: false,
        });
        id
    }

    pub fn container_named(&self, name: &str) -> Option<FakeContainer> {
        self.state()
            .containers
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    pub fn containers(&self) -> Vec<FakeContainer> {
        self.state().containers.clone()
    }

    pub fn set_client_version(&self, major: u32, minor: u32) {
        self.state().version = ClientVersion { major, minor };
    }

    pub fn set_build_succeeds(&self, succeeds: bool) {
        self.state().build_succeeds = succeeds;
    }

    /// When set, pulls succeed and make the image present locally
    pub fn set_pull_adds_image(&self, adds: bool) {
        self.state().pull_adds_image = adds;
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.state().fail_create = fail;
    }

    /// Create call returns without an instance identifier
    pub fn set_create_without_id(&self, without: bool) {
        self.state().create_without_id = without;
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.state().fail_start = fail;
    }

    pub fn set_fail_remove(&self, fail: bool) {
        self.state().fail_remove = fail;
    }

    pub fn set_fail_attach(&self, fail: bool) {
        self.state().fail_attach = fail;
    }

    /// Removal of this id reports "not found", simulating a lost race
    pub fn set_remove_not_found(&self, id: impl Into<String>) {
        self.state().remove_not_found.insert(id.into());
    }

    pub fn set_build_log(&self, lines: Vec<String>) {
        self.state().build_log_lines = lines;
    }

    pub fn set_startup_lines(&self, lines: Vec<String>) {
        self.state().startup_lines = lines;
    }

    /// Feed a line to all live attach subscribers
    pub fn push_startup_line(&self, line: impl Into<String>) {
        let line = line.into();
        for sender in &self.state().attach_senders {
            let _ = sender.try_send(line.clone());
        }
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    fn client_version(&self) -> ClientVersion {
        self.state().version
    }

    async fn image_exists(&self, reference: &str) -> Result<bool, RuntimeError> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::ImageExists {
            reference: reference.to_string(),
        });
        Ok(state.images.contains(reference))
    }

    async fn build_image(
        &self,
        _recipe: &str,
        tag: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<(), RuntimeError> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::Build {
            tag: tag.to_string(),
        });
        for line in state.build_log_lines.clone() {
            let _ = sink.try_send(line);
        }
        if state.build_succeeds {
            state.images.insert(tag.to_string());
            Ok(())
        } else {
            Err(RuntimeError::Api("build failed".to_string()))
        }
    }

    async fn pull_image(
        &self,
        reference: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<(), RuntimeError> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::Pull {
            reference: reference.to_string(),
        });
        for line in state.pull_log_lines.clone() {
            let _ = sink.try_send(line);
        }
        if state.pull_adds_image {
            state.images.insert(reference.to_string());
            Ok(())
        } else {
            Err(RuntimeError::NotFound(reference.to_string()))
        }
    }

    async fn list_containers(
        &self,
        name_filter: &str,
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::List {
            filter: name_filter.to_string(),
        });
        // Prefix matching on purpose: real name filters return false
        // positives that callers must re-check.
        Ok(state
            .containers
            .iter()
            .filter(|c| c.name.starts_with(name_filter))
            .map(|c| ContainerSummary {
                id: c.id.clone(),
                names: vec![format!("/{}", c.name)],
            })
            .collect())
    }

    async fn create_container(
        &self,
        request: CreateRequest,
    ) -> Result<ContainerCreated, RuntimeError> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::Create {
            name: request.name.clone(),
            image: request.image.clone(),
        });
        state.create_requests.push(request.clone());
        if state.fail_create {
            return Err(RuntimeError::Api("create failed".to_string()));
        }
        if state.create_without_id {
            return Ok(ContainerCreated { id: None });
        }
        state.next_id += 1;
        let id = format!("fake{:08}", state.next_id);
        state.containers.push(FakeContainer {
            id: id.clone(),
            name: request.name,
            image: request.image,
            running: false,
        });
        Ok(ContainerCreated { id: Some(id) })
    }

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::Start { id: id.to_string() });
        if state.fail_start {
            return Err(RuntimeError::Api("start failed".to_string()));
        }
        match state.containers.iter_mut().find(|c| c.id == id) {
            Some(container) => {
                container.running = true;
                Ok(())
            }
            None => Err(RuntimeError::NotFound(id.to_string())),
        }
    }

    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::Stop { id: id.to_string() });
        match state.containers.iter_mut().find(|c| c.id == id) {
            Some(container) => {
                container.running = false;
                Ok(())
            }
            None => Err(RuntimeError::NotFound(id.to_string())),
        }
    }

    async fn remove_container(
        &self,
        id: &str,
        force: bool,
        volumes: bool,
    ) -> Result<(), RuntimeError> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::Remove {
            id: id.to_string(),
            force,
            volumes,
        });
        if state.remove_not_found.contains(id) {
            return Err(RuntimeError::NotFound(id.to_string()));
        }
        if state.fail_remove {
            return Err(RuntimeError::Api("remove failed".to_string()));
        }
        let before = state.containers.len();
        state.containers.retain(|c| c.id != id);
        if state.containers.len() == before {
            return Err(RuntimeError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn attach(&self, id: &str) -> Result<mpsc::Receiver<String>, RuntimeError> {
        let mut state = self.state();
        state.calls.push(RuntimeCall::Attach { id: id.to_string() });
        if state.fail_attach {
            return Err(RuntimeError::Api("attach failed".to_string()));
        }
        let (tx, rx) = mpsc::channel(64);
        for line in state.startup_lines.clone() {
            let _ = tx.try_send(line);
        }
        // Hold the sender so the stream stays open like a live attach
        state.attach_senders.push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
