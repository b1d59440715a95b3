// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup log forwarding until the worker connects

use kiln_adapters::ContainerRuntime;
use kiln_core::slot::short_id;
use tokio::sync::watch;

/// Follow a fresh instance's log output and forward each line to the
/// structured log, stopping as soon as the worker reports in.
///
/// The connected flag is level-triggered: if it is already set when a line
/// arrives, or flips while waiting, the stream is dropped and the task ends.
/// Attach failures are logged and swallowed; log forwarding is a diagnostic
/// aid, never a substantiation step.
pub async fn stream_until_connected<R: ContainerRuntime>(
    runtime: R,
    instance_id: String,
    mut connected: watch::Receiver<bool>,
) {
    if *connected.borrow() {
        return;
    }

    let mut lines = match runtime.attach(&instance_id).await {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!(id = %short_id(&instance_id), error = %e, "log attach failed");
            return;
        }
    };

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    // Container exited or the stream was torn down
                    break;
                };
                tracing::info!("worker {}: {}", short_id(&instance_id), line.trim_end());
                if *connected.borrow() {
                    break;
                }
            }
            changed = connected.changed() => {
                if changed.is_err() || *connected.borrow() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "streamer_tests.rs"]
mod tests;
