// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;

#[test]
fn container_name_is_deterministic() {
    let slot = WorkerSlot::new("builder-1", SlotMeta::default());
    assert_eq!(slot.container_name(), "kiln-builder-1");
    assert_eq!(slot.container_name(), "kiln-builder-1");
}

#[test]
fn new_slot_is_unoccupied() {
    let slot = WorkerSlot::new("builder-1", SlotMeta::default());
    assert!(!slot.is_occupied());
}

#[test]
fn slot_with_instance_is_occupied() {
    let clock = FakeClock::new();
    let mut slot = WorkerSlot::new("builder-1", SlotMeta::default());
    slot.instance = Some(Instance::created(
        "abcdef123456".to_string(),
        "ubuntu:24.04".to_string(),
        &clock,
    ));
    assert!(slot.is_occupied());
}

#[test]
fn created_instance_starts_in_starting_state() {
    let clock = FakeClock::new();
    let instance = Instance::created("abc".to_string(), "img".to_string(), &clock);
    assert_eq!(instance.state, WorkerState::Starting);
    assert_eq!(instance.created_at, clock.now());
}

#[test]
fn short_id_truncates_long_identifiers() {
    let clock = FakeClock::new();
    let instance = Instance::created("abcdef123456".to_string(), "img".to_string(), &clock);
    assert_eq!(instance.short_id(), "abcdef");
}

#[test]
fn short_id_keeps_short_identifiers_whole() {
    assert_eq!(short_id("abc"), "abc");
}

#[test]
fn slot_meta_is_plain_composition() {
    let meta = SlotMeta {
        arch: Some("arm64".to_string()),
        tags: vec!["nightly".to_string()],
    };
    let slot = WorkerSlot::new("builder-2", meta.clone());
    assert_eq!(slot.meta, meta);
}
