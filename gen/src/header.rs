// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Warmboot header encoder.
//!
//! The iCE40 boot ROM is programmed through the `SB_WARMBOOT` state
//! machine by a fixed sequence of records placed in flash before any
//! image:
//!
//! ```text
//! [7E AA 99 7E]       Sync header
//! [92 00 00]          Boot mode (cold boot flag clear for warmboot)
//! [44 03 o1 o2 o3]    Boot address, 24-bit big-endian offset
//! [82 00 00]          Bank offset
//! [01 08]             Reboot
//! [...]               Zero padding up to 32 bytes
//! ```
//!
//! The record is repeated five times: the initial boot image plus the
//! four `SB_WARMBOOT` selections, in order.

use alloc::string::ToString;
use alloc::vec::Vec;

use iceflash_config::{BootSlots, FLASH_ADDR_BITS};

use crate::{Error, Result};

/// Sync header opening every record
pub const SYNC: [u8; 4] = [0x7e, 0xaa, 0x99, 0x7e];

/// Boot mode bytes (warmboot)
pub const BOOT_MODE: [u8; 3] = [0x92, 0x00, 0x00];

/// Boot address opcode; the offset payload follows big-endian
pub const BOOT_ADDR: [u8; 2] = [0x44, 0x03];

/// Bank offset bytes
pub const BANK_OFFSET: [u8; 3] = [0x82, 0x00, 0x00];

/// Reboot command bytes
pub const REBOOT: [u8; 2] = [0x01, 0x08];

/// Length of one warmboot record
pub const RECORD_LEN: usize = 32;

/// Number of records in a complete header
pub const BOOT_SLOT_COUNT: usize = iceflash_config::BOOT_SLOT_COUNT;

/// Length of a complete header
pub const HEADER_LEN: usize = RECORD_LEN * BOOT_SLOT_COUNT;

/// Encodes one boot offset into a 32-byte warmboot record.
pub fn encode_record(offset: u32) -> Result<[u8; RECORD_LEN]> {
    if offset >= (1 << FLASH_ADDR_BITS) {
        return Err(Error::OffsetTooWide { offset });
    }

    let mut record = [0u8; RECORD_LEN];
    let mut at = 0;

    let mut put = |bytes: &[u8]| {
        record[at..at + bytes.len()].copy_from_slice(bytes);
        at += bytes.len();
    };

    put(&SYNC);
    put(&BOOT_MODE);
    put(&BOOT_ADDR);
    put(&[
        (offset >> 16) as u8,
        (offset >> 8) as u8,
        offset as u8,
    ]);
    put(&BANK_OFFSET);
    put(&REBOOT);

    // Remainder is already zero padding
    debug_assert_eq!(at, RECORD_LEN - 15);

    Ok(record)
}

/// Encodes a complete warmboot header from 1..=5 boot offsets.
///
/// Fewer than five offsets replicate the first into the remaining slots;
/// more than five is a configuration error.  Always returns exactly
/// [`HEADER_LEN`] bytes on success.
pub fn encode_boot_headers(offsets: &[u32]) -> Result<Vec<u8>> {
    let slots = BootSlots::from_offsets(offsets).map_err(|e| Error::InvalidSlots {
        error: e.to_string(),
    })?;
    Ok(encode_slots(&slots))
}

/// Encodes a complete warmboot header from a validated slot list.
pub fn encode_slots(slots: &BootSlots) -> Vec<u8> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    for offset in slots.iter() {
        // Infallible: BootSlots only holds 24-bit offsets.
        let record = encode_record(offset).unwrap();
        header.extend_from_slice(&record);
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_always_32_bytes() {
        for offset in [0, 160, 0xFF_FFFF] {
            assert_eq!(encode_record(offset).unwrap().len(), RECORD_LEN);
        }
    }

    #[test]
    fn record_field_layout() {
        let record = encode_record(0x02_68_00).unwrap();
        assert_eq!(&record[0..4], &SYNC);
        assert_eq!(&record[4..7], &BOOT_MODE);
        assert_eq!(&record[7..9], &BOOT_ADDR);
        assert_eq!(&record[9..12], &[0x02, 0x68, 0x00]);
        assert_eq!(&record[12..15], &BANK_OFFSET);
        assert_eq!(&record[15..17], &REBOOT);
        assert!(record[17..].iter().all(|&b| b == 0));
    }

    #[test]
    fn offset_wider_than_24_bits_rejected() {
        assert!(matches!(
            encode_record(0x0100_0000),
            Err(Error::OffsetTooWide { .. })
        ));
    }
}
