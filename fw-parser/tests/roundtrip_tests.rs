// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Round-trip tests: compose an artifact, parse the header back.

use iceflash_config::{BootSlots, FlashLayout};
use iceflash_fw_parser::{HEADER_LEN, MultibootHeader, RECORD_LEN, WarmbootRecord};
use iceflash_gen::Composer;

const OFFSETS: [u32; 5] = [160, 160, 157696, 262144, 294912];

#[test]
fn composed_artifact_header_round_trips() {
    let layout = FlashLayout::default();
    let slots = BootSlots::from_offsets(&OFFSETS).unwrap();
    let artifact = Composer::new(slots, &layout)
        .gateware(vec![0x99; 1024])
        .firmware(vec![0x42; 2048])
        .build()
        .unwrap();

    // The first 160 bytes of the multiboot artifact are the header
    let header = MultibootHeader::parse(&artifact.multiboot_pad).unwrap();
    assert_eq!(header.records.len(), 5);
    assert_eq!(header.boot_offsets(), OFFSETS.to_vec());
    header.check_offsets(&layout).unwrap();
    assert!(!header.is_uniform());

    // And each parsed record re-encodes to the exact bytes in flash
    for (i, record) in header.records.iter().enumerate() {
        let expected = iceflash_gen::encode_record(OFFSETS[i]).unwrap();
        let parsed = &artifact.multiboot_pad[i * RECORD_LEN..(i + 1) * RECORD_LEN];
        assert_eq!(parsed, &expected[..], "record {i} bytes differ");
        assert_eq!(record.boot_offset, OFFSETS[i]);
    }
}

#[test]
fn uniform_header_detected() {
    let data = iceflash_gen::encode_boot_headers(&[4096]).unwrap();
    let header = MultibootHeader::parse(&data).unwrap();
    assert!(header.is_uniform());
    assert_eq!(header.boot_offsets(), vec![4096; 5]);
}

#[test]
fn header_parse_ignores_trailing_image() {
    let mut data = iceflash_gen::encode_boot_headers(&[160]).unwrap();
    data.extend_from_slice(&[0xAB; 512]);
    let header = MultibootHeader::parse(&data).unwrap();
    assert_eq!(header.records.len(), 5);
}

#[test]
fn record_serde_round_trip() {
    let data = iceflash_gen::encode_boot_headers(&[160]).unwrap();
    let header = MultibootHeader::parse(&data).unwrap();

    let json = serde_json::to_string(&header.records[0]).unwrap();
    let back: WarmbootRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, header.records[0]);
}

#[test]
fn plain_artifact_has_no_header() {
    let layout = FlashLayout::default();
    let artifact = Composer::new(BootSlots::default(), &layout)
        .gateware(vec![0x99; HEADER_LEN * 2])
        .build()
        .unwrap();
    assert!(MultibootHeader::parse(&artifact.image_pad).is_err());
}
