// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Substantiation specs
//!
//! Verify the full provision path: image resolution, stale eviction,
//! container creation and start.

use crate::prelude::*;

#[tokio::test]
async fn recipe_slot_builds_a_per_attempt_image_and_runs_it() {
    let mut h = harness("builder", recipe_config());

    let outcome = h.session.substantiate(&BuildContext::new()).await.unwrap();

    // No reference configured, so the image tag is derived from the slot
    // name and the attempt's ephemeral id
    assert_eq!(outcome.image, "builder_eph-1_image");
    assert!(h.runtime.has_image("builder_eph-1_image"));
    assert_eq!(h.session.state(), WorkerState::Running);

    let container = h.runtime.container_named("kiln-builder").unwrap();
    assert_eq!(container.id, outcome.instance_id);
    assert!(container.running);
}

#[tokio::test]
async fn missing_reference_with_failing_pull_cannot_substantiate() {
    let config = SlotConfig {
        image: Some("registry.example/worker:gone".to_string()),
        pull: PullPolicy {
            always_pull: false,
            autopull: true,
        },
        ..SlotConfig::default()
    };
    let mut h = harness("w", config);

    let err = h
        .session
        .substantiate(&BuildContext::new())
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("cannot substantiate:"));
    assert_eq!(h.session.state(), WorkerState::Idle);
    // Nothing was created, nothing is left behind
    assert!(h.runtime.containers().is_empty());
}

#[tokio::test]
async fn missing_reference_is_pulled_when_the_registry_has_it() {
    let config = SlotConfig {
        image: Some("registry.example/worker:v3".to_string()),
        pull: PullPolicy {
            always_pull: false,
            autopull: true,
        },
        ..SlotConfig::default()
    };
    let mut h = harness("w", config);
    h.runtime.set_pull_adds_image(true);

    let outcome = h.session.substantiate(&BuildContext::new()).await.unwrap();

    assert_eq!(outcome.image, "registry.example/worker:v3");
    assert!(h.runtime.calls().contains(&RuntimeCall::Pull {
        reference: "registry.example/worker:v3".to_string()
    }));
}

#[tokio::test]
async fn templated_config_is_rendered_once_per_attempt() {
    let config = SlotConfig {
        env: vec![("BRANCH".to_string(), "{{ branch }}".to_string())],
        ..recipe_config()
    };
    let mut h = harness("w", config);
    let context = BuildContext::new().with("branch", "release/2.1");

    h.session.substantiate(&context).await.unwrap();

    let request = h.runtime.create_requests().remove(0);
    assert_eq!(
        request.env,
        vec![("BRANCH".to_string(), "release/2.1".to_string())]
    );
}

#[tokio::test]
async fn stale_container_with_the_slot_name_is_evicted_first() {
    let mut h = harness("w", recipe_config());
    let stale = h.runtime.add_container("kiln-w", "old");

    let outcome = h.session.substantiate(&BuildContext::new()).await.unwrap();

    let calls = h.runtime.calls();
    let removed_at = calls
        .iter()
        .position(|c| matches!(c, RuntimeCall::Remove { id, .. } if *id == stale))
        .expect("stale container was removed");
    let created_at = calls
        .iter()
        .position(|c| matches!(c, RuntimeCall::Create { .. }))
        .expect("fresh container was created");
    assert!(removed_at < created_at);
    assert_eq!(
        h.runtime.container_named("kiln-w").unwrap().id,
        outcome.instance_id
    );
}

#[tokio::test]
async fn a_slot_holds_at_most_one_instance() {
    let mut h = harness("w", recipe_config());
    let first = h.session.substantiate(&BuildContext::new()).await.unwrap();

    let err = h
        .session
        .substantiate(&BuildContext::new())
        .await
        .unwrap_err();

    assert!(err.is_precondition());
    // The first instance is untouched
    assert_eq!(h.session.instance().unwrap().id, first.instance_id);
    assert!(h.runtime.container_named("kiln-w").unwrap().running);
}
