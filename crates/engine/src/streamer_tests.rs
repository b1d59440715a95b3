// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_adapters::{FakeRuntime, RuntimeCall};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn already_connected_skips_the_attach() {
    let runtime = FakeRuntime::new();
    let (_tx, rx) = watch::channel(true);

    stream_until_connected(runtime.clone(), "abc123".to_string(), rx).await;

    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn stops_when_the_worker_connects() {
    let runtime = FakeRuntime::new();
    runtime.set_startup_lines(vec!["booting".to_string(), "loading config".to_string()]);
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(stream_until_connected(
        runtime.clone(),
        "abc123".to_string(),
        rx,
    ));

    // Flipping the flag before the task attaches would let it exit through
    // the already-connected fast path; wait for the attach first
    let attached = RuntimeCall::Attach {
        id: "abc123".to_string(),
    };
    for _ in 0..50 {
        if runtime.calls().contains(&attached) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(runtime.calls().contains(&attached));

    // The fake keeps the attach stream open, so only the connected flag
    // can end the task
    tx.send(true).unwrap();
    timeout(Duration::from_secs(1), task)
        .await
        .expect("streamer should stop once connected")
        .unwrap();
}

#[tokio::test]
async fn stops_when_the_connected_flag_is_dropped() {
    let runtime = FakeRuntime::new();
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(stream_until_connected(
        runtime.clone(),
        "abc123".to_string(),
        rx,
    ));

    drop(tx);
    timeout(Duration::from_secs(1), task)
        .await
        .expect("streamer should stop when the flag sender goes away")
        .unwrap();
}

#[tokio::test]
async fn attach_failure_is_swallowed() {
    let runtime = FakeRuntime::new();
    runtime.set_fail_attach(true);
    let (_tx, rx) = watch::channel(false);

    stream_until_connected(runtime.clone(), "abc123".to_string(), rx).await;

    assert_eq!(
        runtime.calls(),
        vec![RuntimeCall::Attach {
            id: "abc123".to_string()
        }]
    );
}
