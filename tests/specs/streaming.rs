// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup log streaming specs
//!
//! Verify that a slot configured to follow startup logs attaches to the
//! fresh instance and stops once the worker connects.

use crate::prelude::*;
use std::time::Duration;

async fn wait_for_attach(h: &Harness, instance_id: &str) {
    let attached = RuntimeCall::Attach {
        id: instance_id.to_string(),
    };
    for _ in 0..50 {
        if h.runtime.calls().contains(&attached) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("streamer never attached to {instance_id}");
}

#[tokio::test]
async fn follow_startup_logs_attaches_to_the_new_instance() {
    let config = SlotConfig {
        follow_startup_logs: true,
        ..recipe_config()
    };
    let mut h = harness("w", config);
    h.runtime
        .set_startup_lines(vec!["worker agent starting".to_string()]);

    let outcome = h.session.substantiate(&BuildContext::new()).await.unwrap();

    wait_for_attach(&h, &outcome.instance_id).await;
    // The worker dials in; the streamer winds down without incident even
    // as more output arrives
    h.connected.send(true).unwrap();
    h.runtime.push_startup_line("listening on :9989");
}

#[tokio::test]
async fn plain_slots_never_attach() {
    let mut h = harness("w", recipe_config());

    h.session.substantiate(&BuildContext::new()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!h
        .runtime
        .calls()
        .iter()
        .any(|c| matches!(c, RuntimeCall::Attach { .. })));
}
