// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image resolution: local presence, build from recipe, registry pull

use crate::error::ResolveError;
use kiln_adapters::ContainerRuntime;
use kiln_core::{ImageSpec, PullPolicy};
use tokio::sync::mpsc;

/// Resolves an [`ImageSpec`] to a locally-present image reference.
pub struct ImageResolver<R> {
    runtime: R,
}

impl<R: ContainerRuntime> ImageResolver<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// Ensure an image is present locally and return its reference.
    ///
    /// When the spec carries no reference, the tag is synthesized from the
    /// slot name and the ephemeral id of this attempt. Build and pull
    /// failures are reported on the sink and absorbed; the final presence
    /// check decides the outcome. Presence is re-checked after a build,
    /// and `always_pull` can trigger a pull even for a freshly-built image.
    pub async fn resolve(
        &self,
        slot_name: &str,
        ephemeral_id: &str,
        spec: &ImageSpec,
        pull: &PullPolicy,
        sink: &mpsc::Sender<String>,
    ) -> Result<String, ResolveError> {
        let mut found = false;
        let image = match &spec.reference {
            Some(reference) => {
                found = self.runtime.image_exists(reference).await?;
                reference.clone()
            }
            None => format!("{slot_name}_{ephemeral_id}_image"),
        };

        if !found {
            if let Some(recipe) = &spec.build_recipe {
                let _ = sink
                    .send(format!("Image {image} not found, building it from scratch"))
                    .await;
                if let Err(e) = self
                    .runtime
                    .build_image(recipe, &image, sink.clone())
                    .await
                {
                    tracing::warn!(image = %image, error = %e, "image build failed");
                    let _ = sink.send(format!("Build of {image} failed: {e}")).await;
                }
            }
        }

        let exists = self.runtime.image_exists(&image).await?;
        if (!exists || pull.always_pull) && pull.autopull {
            if !exists {
                let _ = sink
                    .send(format!("Image {image} not found, pulling from registry"))
                    .await;
            }
            if let Err(e) = self.runtime.pull_image(&image, sink.clone()).await {
                tracing::warn!(image = %image, error = %e, "image pull failed");
                let _ = sink.send(format!("Pull of {image} failed: {e}")).await;
            }
        }

        if !self.runtime.image_exists(&image).await? {
            return Err(ResolveError::ImageNotFound(image));
        }
        Ok(image)
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
