// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker session: the full substantiate/release state machine for one slot

use crate::lifecycle;
use crate::reaper;
use crate::resolver::ImageResolver;
use crate::streamer;
use kiln_adapters::ContainerRuntime;
use kiln_core::{
    BuildContext, Clock, IdGen, Instance, SlotConfig, Substantiated, SubstantiateError,
    WorkerSlot, WorkerState,
};
use tokio::sync::{mpsc, watch};

/// Drives one worker slot through its lifecycle against a container runtime.
///
/// A session owns the slot record and serializes substantiation for it: at
/// most one instance exists at a time, and a second `substantiate` while one
/// is live is a caller bug reported as [`SubstantiateError::SlotOccupied`].
pub struct WorkerSession<R, C, G> {
    slot: WorkerSlot,
    config: SlotConfig,
    runtime: R,
    clock: C,
    ids: G,
    state: WorkerState,
    connected: watch::Receiver<bool>,
}

impl<R, C, G> WorkerSession<R, C, G>
where
    R: ContainerRuntime,
    C: Clock,
    G: IdGen,
{
    /// `connected` is flipped by the transport layer once the worker inside
    /// the container has dialed back in; the startup log streamer watches it.
    pub fn new(
        slot: WorkerSlot,
        config: SlotConfig,
        runtime: R,
        clock: C,
        ids: G,
        connected: watch::Receiver<bool>,
    ) -> Self {
        Self {
            slot,
            config,
            runtime,
            clock,
            ids,
            state: WorkerState::Idle,
            connected,
        }
    }

    /// Current lifecycle state. While an instance exists its recorded state
    /// wins, so a container stuck between create and start shows `Starting`.
    pub fn state(&self) -> WorkerState {
        match &self.slot.instance {
            Some(instance) => instance.state,
            None => self.state,
        }
    }

    pub fn slot(&self) -> &WorkerSlot {
        &self.slot
    }

    pub fn instance(&self) -> Option<&Instance> {
        self.slot.instance.as_ref()
    }

    /// Provision a fresh container for this slot.
    ///
    /// On any failure after the occupancy check, whatever was partially
    /// created is torn down and the session returns to `Idle`, so the slot
    /// is immediately reusable.
    pub async fn substantiate(
        &mut self,
        context: &BuildContext,
    ) -> Result<Substantiated, SubstantiateError> {
        if self.slot.is_occupied() {
            return Err(SubstantiateError::SlotOccupied(self.slot.name.clone()));
        }

        self.state = WorkerState::Resolving;
        match self.try_substantiate(context).await {
            Ok(outcome) => {
                self.state = WorkerState::Running;
                Ok(outcome)
            }
            Err(e) => {
                lifecycle::release(&self.runtime, &mut self.slot.instance).await;
                self.state = WorkerState::Idle;
                Err(e)
            }
        }
    }

    async fn try_substantiate(
        &mut self,
        context: &BuildContext,
    ) -> Result<Substantiated, SubstantiateError> {
        let rendered = self
            .config
            .render(context)
            .map_err(|e| SubstantiateError::FailedToSubstantiate(e.to_string()))?;

        let container_name = self.slot.container_name();
        reaper::evict_stale(&self.runtime, &container_name).await;

        // Build and pull progress goes to the structured log, attributed to
        // the slot, while the resolver runs
        let (sink, mut progress) = mpsc::channel::<String>(64);
        let slot_name = self.slot.name.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(line) = progress.recv().await {
                tracing::info!(slot = %slot_name, "{line}");
            }
        });

        let ephemeral_id = self.ids.next();
        let resolver = ImageResolver::new(self.runtime.clone());
        let resolved = resolver
            .resolve(
                &self.slot.name,
                &ephemeral_id,
                &rendered.image,
                &self.config.pull,
                &sink,
            )
            .await;
        drop(sink);
        let _ = forwarder.await;
        let image = resolved.map_err(|e| SubstantiateError::CannotSubstantiate(e.to_string()))?;

        self.state = WorkerState::Creating;
        let runtime = self.runtime.clone();
        let clock = self.clock.clone();
        let instance_id = lifecycle::create_and_start(
            &runtime,
            &clock,
            &container_name,
            &image,
            &rendered,
            &mut self.slot.instance,
        )
        .await
        .map_err(|e| SubstantiateError::FailedToSubstantiate(e.to_string()))?;

        if self.config.follow_startup_logs {
            tokio::spawn(streamer::stream_until_connected(
                self.runtime.clone(),
                instance_id.clone(),
                self.connected.clone(),
            ));
        }

        Ok(Substantiated { instance_id, image })
    }

    /// Tear down the slot's instance, if any. Safe to call at any time.
    pub async fn release(&mut self) {
        lifecycle::release(&self.runtime, &mut self.slot.instance).await;
        self.state = WorkerState::Idle;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
