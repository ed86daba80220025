// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Tests for the iceflash-gen header encoder and composer.
//!
//! # Test Plan
//!
//! ## Phase 1: Header Records
//! - [x] Single offset replicates into five identical records
//! - [x] Full five-offset list encodes each slot's address bytes
//! - [x] Six offsets rejected with a configuration error
//! - [x] Header length is always 160 bytes
//!
//! ## Phase 2: Merge/Pad Primitives
//! - [x] Pad zero-extends a short image to the sector-aligned target
//! - [x] Pad truncation reported, never silent
//! - [x] Merge skips the secondary bytes covered by the primary
//!
//! ## Phase 3: Composer
//! - [x] Both artifacts produced, padded to the gateware region
//! - [x] Multiboot artifact = header + merged image
//! - [x] Missing/empty gateware rejected
//! - [x] Misaligned pad target rejected

use iceflash_config::{BootSlots, FlashLayout};
use iceflash_gen::{
    Composer, Error, HEADER_LEN, PadOutcome, RECORD_LEN, encode_boot_headers, merge_images,
    pad_image,
};

fn record(header: &[u8], index: usize) -> &[u8] {
    &header[index * RECORD_LEN..(index + 1) * RECORD_LEN]
}

// Boot address payload is bytes 9..12 of each record, big-endian.
fn addr_bytes(header: &[u8], index: usize) -> [u8; 3] {
    let record = record(header, index);
    [record[9], record[10], record[11]]
}

#[test]
fn single_offset_yields_five_identical_records() {
    let header = encode_boot_headers(&[160]).unwrap();
    assert_eq!(header.len(), HEADER_LEN);

    let first = record(&header, 0).to_vec();
    for i in 1..5 {
        assert_eq!(record(&header, i), &first[..], "record {i} differs");
    }
    assert_eq!(addr_bytes(&header, 0), [0x00, 0x00, 0xA0]);
}

#[test]
fn five_offsets_encode_each_slot() {
    let header = encode_boot_headers(&[160, 160, 157696, 262144, 294912]).unwrap();
    assert_eq!(addr_bytes(&header, 2), [0x02, 0x68, 0x00]);
    assert_eq!(addr_bytes(&header, 3), [0x04, 0x00, 0x00]);
    assert_eq!(addr_bytes(&header, 4), [0x04, 0x80, 0x00]);
}

#[test]
fn six_offsets_rejected() {
    let err = encode_boot_headers(&[1, 2, 3, 4, 5, 6]).unwrap_err();
    match err {
        Error::InvalidSlots { error } => assert!(error.contains("too many"), "got: {error}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn pad_zero_extends_to_sector_target() {
    let src = vec![0u8; 64];
    let (padded, outcome) = pad_image(&src, 106496);
    assert_eq!(padded.len(), 106496);
    assert_eq!(&padded[..64], &src[..]);
    assert!(padded[64..].iter().all(|&b| b == 0));
    assert_eq!(outcome, PadOutcome::ZeroExtended { added: 106432 });
}

#[test]
fn pad_truncation_is_reported() {
    let src = vec![0x55u8; 8192];
    let (padded, outcome) = pad_image(&src, 4096);
    assert_eq!(padded.len(), 4096);
    assert_eq!(outcome, PadOutcome::Truncated { dropped: 4096 });
}

#[test]
fn merge_skips_covered_secondary_bytes() {
    let primary: Vec<u8> = (0..100).collect();
    let secondary = vec![0xEEu8; 300];

    let merged = merge_images(&primary, &secondary);
    assert_eq!(merged.len(), 300);
    assert_eq!(&merged[..100], &primary[..]);
    assert!(merged[100..].iter().all(|&b| b == 0xEE));

    // Secondary no longer than primary: output is just the primary
    let merged = merge_images(&primary, &secondary[..40]);
    assert_eq!(merged, primary);
}

#[test]
fn composer_produces_both_artifacts() {
    let layout = FlashLayout::default();
    let artifact = Composer::new(BootSlots::default(), &layout)
        .gateware(vec![0x5A; 2000])
        .firmware(vec![0xC3; 3000])
        .build()
        .unwrap();

    assert_eq!(artifact.header.len(), HEADER_LEN);
    assert_eq!(artifact.image.len(), 3000);
    assert_eq!(artifact.multiboot.len(), HEADER_LEN + 3000);
    assert_eq!(artifact.image_pad.len(), layout.gateware_region as usize);
    assert_eq!(artifact.multiboot_pad.len(), layout.gateware_region as usize);
    assert_eq!(&artifact.multiboot[..HEADER_LEN], &artifact.header[..]);
    assert_eq!(&artifact.multiboot[HEADER_LEN..], &artifact.image[..]);
    assert!(!artifact.image_outcome.is_truncated());
}

#[test]
fn composer_requires_gateware() {
    let layout = FlashLayout::default();
    let err = Composer::new(BootSlots::default(), &layout).build().unwrap_err();
    assert_eq!(err, Error::MissingGateware);

    let err = Composer::new(BootSlots::default(), &layout)
        .gateware(Vec::new())
        .build()
        .unwrap_err();
    assert_eq!(err, Error::EmptyImage { name: "gateware" });
}

#[test]
fn composer_rejects_misaligned_pad_target() {
    let layout = FlashLayout::default();
    let err = Composer::new(BootSlots::default(), &layout)
        .gateware(vec![1, 2, 3])
        .pad_target(5000)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPadTarget { .. }));
}
