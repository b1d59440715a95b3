// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker container runtime adapter (bollard)

use super::{
    ClientVersion, ContainerCreated, ContainerRuntime, ContainerSummary, CreateRequest,
    RuntimeError,
};
use async_trait::async_trait;
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerCreateBody, HostConfig};
use bollard::query_parameters::{
    BuildImageOptionsBuilder, CreateContainerOptionsBuilder, CreateImageOptionsBuilder,
    ListContainersOptionsBuilder, LogsOptionsBuilder, RemoveContainerOptionsBuilder,
    StartContainerOptions, StopContainerOptionsBuilder,
};
use bollard::Docker;
use futures_util::StreamExt;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Docker-backed runtime adapter against the local daemon.
///
/// The handle is a bare RPC client: cheap to clone, safe for concurrent use
/// by independent worker slots, no domain state.
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
    version: ClientVersion,
}

impl DockerRuntime {
    pub fn connect() -> Result<Self, RuntimeError> {
        let docker = Docker::connect_with_local_defaults().map_err(map_err)?;
        let negotiated = docker.client_version();
        let version = ClientVersion {
            major: negotiated.major_version as u32,
            minor: negotiated.minor_version as u32,
        };
        Ok(Self { docker, version })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    fn client_version(&self) -> ClientVersion {
        self.version
    }

    async fn image_exists(&self, reference: &str) -> Result<bool, RuntimeError> {
        match self.docker.inspect_image(reference).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(map_err(e)),
        }
    }

    async fn build_image(
        &self,
        recipe: &str,
        tag: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<(), RuntimeError> {
        let context = dockerfile_tarball(recipe)?;
        let options = BuildImageOptionsBuilder::new().t(tag).rm(true).build();
        let mut stream =
            self.docker
                .build_image(options, None, Some(bollard::body_full(context.into())));

        while let Some(item) = stream.next().await {
            let info = item.map_err(map_err)?;
            if let Some(chunk) = info.stream {
                for line in chunk.lines().filter(|l| !l.trim().is_empty()) {
                    if sink.send(line.to_string()).await.is_err() {
                        // Sink consumer went away; keep draining the build so
                        // the daemon finishes tagging the image.
                        break;
                    }
                }
            }
            if let Some(error) = info.error {
                return Err(RuntimeError::Api(error));
            }
        }
        Ok(())
    }

    async fn pull_image(
        &self,
        reference: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<(), RuntimeError> {
        let (from_image, tag) = match reference.rsplit_once(':') {
            Some((image, tag)) => (image, tag),
            None => (reference, "latest"),
        };
        let options = CreateImageOptionsBuilder::new()
            .from_image(from_image)
            .tag(tag)
            .build();
        let mut stream = self.docker.create_image(Some(options), None, None);

        while let Some(item) = stream.next().await {
            let info = item.map_err(map_err)?;
            if let Some(status) = info.status {
                let _ = sink.send(status).await;
            }
        }
        Ok(())
    }

    async fn list_containers(
        &self,
        name_filter: &str,
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let mut filters: HashMap<String, Vec<String>> = HashMap::new();
        filters.insert("name".to_string(), vec![name_filter.to_string()]);
        let options = ListContainersOptionsBuilder::new()
            .all(true)
            .filters(&filters)
            .build();

        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(map_err)?;

        Ok(containers
            .into_iter()
            .filter_map(|c| {
                Some(ContainerSummary {
                    id: c.id?,
                    names: c.names.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn create_container(
        &self,
        request: CreateRequest,
    ) -> Result<ContainerCreated, RuntimeError> {
        let env: Vec<String> = request
            .env
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        let volumes: HashMap<String, HashMap<(), ()>> = request
            .volumes
            .iter()
            .map(|path| (path.clone(), HashMap::new()))
            .collect();

        let body = ContainerCreateBody {
            image: Some(request.image),
            cmd: if request.command.is_empty() {
                None
            } else {
                Some(request.command)
            },
            env: if env.is_empty() { None } else { Some(env) },
            volumes: if volumes.is_empty() {
                None
            } else {
                Some(volumes)
            },
            host_config: Some(HostConfig {
                binds: if request.host.binds.is_empty() {
                    None
                } else {
                    Some(request.host.binds)
                },
                init: Some(request.host.init),
                memory: request.host.memory_bytes,
                nano_cpus: request.host.nano_cpus,
                pids_limit: request.host.pids_limit,
                ..HostConfig::default()
            }),
            ..ContainerCreateBody::default()
        };

        let options = CreateContainerOptionsBuilder::new()
            .name(&request.name)
            .build();
        let response = self
            .docker
            .create_container(Some(options), body)
            .await
            .map_err(map_err)?;

        let id = if response.id.is_empty() {
            None
        } else {
            Some(response.id)
        };
        Ok(ContainerCreated { id })
    }

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await
            .map_err(map_err)
    }

    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError> {
        let options = StopContainerOptionsBuilder::new().t(10).build();
        self.docker
            .stop_container(id, Some(options))
            .await
            .map_err(map_err)
    }

    async fn remove_container(
        &self,
        id: &str,
        force: bool,
        volumes: bool,
    ) -> Result<(), RuntimeError> {
        let options = RemoveContainerOptionsBuilder::new()
            .force(force)
            .v(volumes)
            .build();
        self.docker
            .remove_container(id, Some(options))
            .await
            .map_err(map_err)
    }

    async fn attach(&self, id: &str) -> Result<mpsc::Receiver<String>, RuntimeError> {
        let options = LogsOptionsBuilder::new()
            .follow(true)
            .stdout(true)
            .stderr(true)
            .build();
        let mut stream = self.docker.logs(id, Some(options));
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                let output = match item {
                    Ok(output) => output,
                    Err(_) => break,
                };
                let text = String::from_utf8_lossy(&output.into_bytes()).into_owned();
                for line in text.lines() {
                    if tx.send(line.trim_end().to_string()).await.is_err() {
                        // Receiver dropped: the startup phase is over
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}

/// In-memory tar archive holding a single `Dockerfile` with the recipe
/// contents, matching what the daemon expects as a build context.
fn dockerfile_tarball(recipe: &str) -> Result<Vec<u8>, RuntimeError> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_path("Dockerfile")?;
    header.set_size(recipe.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append(&header, recipe.as_bytes())?;
    builder.into_inner().map_err(RuntimeError::Io)
}

fn is_not_found(error: &BollardError) -> bool {
    matches!(
        error,
        BollardError::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

fn map_err(error: BollardError) -> RuntimeError {
    if is_not_found(&error) {
        RuntimeError::NotFound(error.to_string())
    } else {
        RuntimeError::Api(error.to_string())
    }
}
