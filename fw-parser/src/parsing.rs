// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Declarative readers for the warmboot header records.
//!
//! Layout reflects what [`iceflash_gen::header`] emits:
//!
//! ```text
//! [7E AA 99 7E]       Sync header (deku magic)
//! [92 00 00]          Boot mode
//! [44 03 o1 o2 o3]    Boot address opcode + 24-bit big-endian offset
//! [82 00 00]          Bank offset
//! [01 08]             Reboot
//! [15 x 00]           Padding
//! ```

use deku::prelude::*;
use static_assertions::const_assert_eq;

use iceflash_config::FlashLayout;
use iceflash_gen::header::{BANK_OFFSET, BOOT_ADDR, BOOT_MODE, REBOOT};

use crate::{BOOT_SLOT_COUNT, HEADER_LEN, RECORD_LEN, Error, Result};

#[cfg(not(feature = "std"))]
use alloc::{format, string::ToString, vec::Vec};

#[allow(unused_imports)]
use log::{debug, trace, warn};

// Sync header consumed as magic, remaining 28 bytes as fields.
const_assert_eq!(RECORD_LEN, 4 + 3 + 2 + 3 + 3 + 2 + 15);
const_assert_eq!(HEADER_LEN, RECORD_LEN * BOOT_SLOT_COUNT);

/// One warmboot record as found in flash
#[derive(Debug, Clone, PartialEq, Eq, DekuRead, DekuWrite, serde::Serialize, serde::Deserialize)]
#[deku(endian = "big", magic = b"\x7e\xaa\x99\x7e")]
pub struct WarmbootRecord {
    pub boot_mode: [u8; 3],

    pub boot_opcode: [u8; 2],

    /// 24-bit boot offset, stored most-significant byte first
    #[deku(bytes = "3")]
    pub boot_offset: u32,

    pub bank_offset: [u8; 3],

    pub reboot: [u8; 2],

    pub padding: [u8; 15],
}

impl WarmbootRecord {
    /// Checks the fixed fields against the values the encoder emits.
    pub fn validate(&self, record: usize) -> Result<()> {
        if self.boot_mode != BOOT_MODE {
            return Err(Error::BadField {
                record,
                field: "boot mode",
            });
        }
        if self.boot_opcode != BOOT_ADDR {
            return Err(Error::BadField {
                record,
                field: "boot address opcode",
            });
        }
        if self.bank_offset != BANK_OFFSET {
            return Err(Error::BadField {
                record,
                field: "bank offset",
            });
        }
        if self.reboot != REBOOT {
            return Err(Error::BadField {
                record,
                field: "reboot command",
            });
        }
        if self.padding.iter().any(|&b| b != 0) {
            return Err(Error::BadField {
                record,
                field: "padding",
            });
        }
        Ok(())
    }
}

/// The complete five-record multiboot header
#[derive(Debug, Clone, PartialEq, Eq, DekuRead, DekuWrite, serde::Serialize, serde::Deserialize)]
pub struct MultibootHeader {
    #[deku(count = "crate::BOOT_SLOT_COUNT")]
    pub records: Vec<WarmbootRecord>,
}

impl MultibootHeader {
    /// Parses the header from the start of a flash artifact.
    ///
    /// Only the first [`HEADER_LEN`] bytes are consumed; the artifact may
    /// continue with the gateware image.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::Truncated {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }

        let ((_rest, _), header) =
            Self::from_bytes((&data[..HEADER_LEN], 0)).map_err(|e| Error::Decode {
                error: e.to_string(),
            })?;

        for (i, record) in header.records.iter().enumerate() {
            record.validate(i)?;
            trace!("record {i}: boot offset {:#08x}", record.boot_offset);
        }
        debug!("parsed multiboot header, {} records", header.records.len());

        Ok(header)
    }

    /// The recovered boot offsets, in warmboot selection order.
    pub fn boot_offsets(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.boot_offset).collect()
    }

    /// True when every record selects the same boot offset.
    pub fn is_uniform(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| w[0].boot_offset == w[1].boot_offset)
    }

    /// Checks every recovered offset against the flash region.
    pub fn check_offsets(&self, layout: &FlashLayout) -> Result<()> {
        for (i, record) in self.records.iter().enumerate() {
            layout
                .check_boot_offset(record.boot_offset)
                .map_err(|e| Error::BadOffset {
                    record: i,
                    error: format!("{e}"),
                })?;
        }
        Ok(())
    }
}
