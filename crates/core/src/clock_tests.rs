// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_advances() {
    let clock = SystemClock;
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}

#[test]
fn system_clock_epoch_nonzero() {
    let clock = SystemClock;
    assert!(clock.epoch_ms() > 0);
}

#[test]
fn fake_clock_starts_fixed() {
    let clock = FakeClock::new();
    assert_eq!(clock.epoch_ms(), 1_000_000);
}

#[test]
fn fake_clock_advance_moves_both() {
    let clock = FakeClock::new();
    let before = clock.now();
    clock.advance(Duration::from_secs(90));
    assert_eq!(clock.now().duration_since(before), Duration::from_secs(90));
    assert_eq!(clock.epoch_ms(), 1_000_000 + 90_000);
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.advance(Duration::from_millis(250));
    assert_eq!(other.epoch_ms(), clock.epoch_ms());
}

#[test]
fn fake_clock_set_epoch() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}
