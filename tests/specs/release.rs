// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Release specs
//!
//! Verify teardown and slot reuse.

use crate::prelude::*;

#[tokio::test]
async fn release_stops_and_removes_the_instance() {
    let mut h = harness("w", recipe_config());
    let outcome = h.session.substantiate(&BuildContext::new()).await.unwrap();

    h.session.release().await;

    assert_eq!(h.session.state(), WorkerState::Idle);
    assert!(h.session.instance().is_none());
    assert!(h.runtime.container_named("kiln-w").is_none());
    let calls = h.runtime.calls();
    assert!(calls.contains(&RuntimeCall::Stop {
        id: outcome.instance_id.clone()
    }));
    assert!(calls.contains(&RuntimeCall::Remove {
        id: outcome.instance_id,
        force: true,
        volumes: true,
    }));
}

#[tokio::test]
async fn double_release_is_a_no_op() {
    let mut h = harness("w", recipe_config());
    h.session.substantiate(&BuildContext::new()).await.unwrap();

    h.session.release().await;
    let calls_after_first = h.runtime.calls().len();
    h.session.release().await;

    assert_eq!(h.runtime.calls().len(), calls_after_first);
    assert_eq!(h.session.state(), WorkerState::Idle);
}

#[tokio::test]
async fn released_slot_substantiates_again_with_a_fresh_id() {
    let mut h = harness("w", recipe_config());

    let first = h.session.substantiate(&BuildContext::new()).await.unwrap();
    h.session.release().await;
    let second = h.session.substantiate(&BuildContext::new()).await.unwrap();

    assert_ne!(first.instance_id, second.instance_id);
    assert_eq!(second.image, "w_eph-2_image");
    assert!(h.runtime.container_named("kiln-w").unwrap().running);
}

#[tokio::test]
async fn release_of_a_never_substantiated_slot_is_harmless() {
    let mut h = harness("w", recipe_config());
    h.session.release().await;
    assert!(h.runtime.calls().is_empty());
    assert_eq!(h.session.state(), WorkerState::Idle);
}
