// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Serialization and validation tests for the configuration types.

use iceflash_config::{BootSlots, Error, FlashLayout, Signal, SignalMap};

#[test]
fn boot_slots_deserialize_from_partial_list() {
    let slots: BootSlots = serde_json::from_str("[160, 4096]").unwrap();
    assert_eq!(slots.offsets(), &[160, 4096, 160, 160, 160]);
}

#[test]
fn boot_slots_deserialize_rejects_six() {
    let result: Result<BootSlots, _> = serde_json::from_str("[1, 2, 3, 4, 5, 6]");
    let err = result.unwrap_err().to_string();
    assert!(err.contains("too many boot offsets"), "got: {err}");
}

#[test]
fn boot_slots_serialize_round_trip() {
    let slots = BootSlots::from_offsets(&[160, 160, 157696, 262144, 294912]).unwrap();
    let json = serde_json::to_string(&slots).unwrap();
    let back: BootSlots = serde_json::from_str(&json).unwrap();
    assert_eq!(slots, back);
}

#[test]
fn layout_deserialize_uses_defaults() {
    let layout: FlashLayout = serde_json::from_str("{}").unwrap();
    assert_eq!(layout, FlashLayout::default());
    layout.validate().unwrap();
}

#[test]
fn layout_partial_override() {
    let layout: FlashLayout =
        serde_json::from_str(r#"{"gateware_region": 131072}"#).unwrap();
    assert_eq!(layout.gateware_region, 131072);
    assert_eq!(layout.total_size, FlashLayout::default().total_size);
    layout.validate().unwrap();
}

#[test]
fn layout_offsets_follow_regions() {
    let layout = FlashLayout::default();
    assert_eq!(layout.loader_offset(), 0x1a000);
    assert_eq!(layout.kernel_offset(), 0x1a000 + 4096);
}

#[test]
fn signal_map_round_trip() {
    let map = SignalMap::up5k_tester();
    let json = serde_json::to_string(&map).unwrap();
    let back: SignalMap = serde_json::from_str(&json).unwrap();
    assert_eq!(back.pin(Signal::Clk), 15);
    assert_eq!(map, back);
}

#[test]
fn boot_offset_beyond_flash_rejected() {
    let layout = FlashLayout::default();
    let slots = BootSlots::from_offsets(&[0xF0_0000]).unwrap();
    assert!(matches!(
        slots.validate(&layout),
        Err(Error::OffsetOutOfRange { .. })
    ));
}
