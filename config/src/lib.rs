// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Board and flash configuration for IceFlash.
//!
//! Everything in this crate is declarative: flash geometry and region
//! layout, boot slot lists for the warmboot header, and the signal-name to
//! package-pin table for the SPI flash port.  Validation happens at
//! construction time so the generator and controller crates can rely on
//! well-formed values.

pub mod board;
pub mod boot;
pub mod layout;

pub use board::{Signal, SignalMap};
pub use boot::{BOOT_SLOT_COUNT, BootSlots, DEFAULT_BOOT_OFFSETS};
pub use layout::{ERASE_SECTOR, FLASH_ADDR_BITS, FlashLayout, SPI_FLASH_SIZE};

use core::fmt;

/// Error type
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Error {
    /// More boot offsets supplied than there are warmboot slots
    TooManySlots { expected: usize, actual: usize },

    /// No boot offsets supplied at all
    NoSlots,

    /// Boot offset does not fit in the 24-bit flash address space
    OffsetTooWide { offset: u32 },

    /// Boot offset lies beyond the configured flash region
    OffsetOutOfRange { offset: u32, size: u32 },

    /// Length is not a whole number of erase sectors
    NotSectorAligned { value: u32, sector: u32 },

    /// Region does not fit within the flash
    RegionTooLarge { region: u32, size: u32 },

    /// Signal identifier not known to the board description
    UnknownSignal { name: String },

    /// Signal assigned to more than one pin
    DuplicateSignal { name: String },

    /// Board description is missing a required signal
    MissingSignal { name: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TooManySlots { expected, actual } => write!(
                f,
                "too many boot offsets: {actual} supplied, at most {expected} slots"
            ),
            Error::NoSlots => write!(f, "at least one boot offset must be supplied"),
            Error::OffsetTooWide { offset } => {
                write!(f, "boot offset {offset:#x} does not fit in 24 bits")
            }
            Error::OffsetOutOfRange { offset, size } => write!(
                f,
                "boot offset {offset:#x} is beyond the {size:#x} byte flash region"
            ),
            Error::NotSectorAligned { value, sector } => write!(
                f,
                "length {value:#x} is not a multiple of the {sector:#x} byte erase sector"
            ),
            Error::RegionTooLarge { region, size } => {
                write!(f, "region of {region:#x} bytes exceeds flash size {size:#x}")
            }
            Error::UnknownSignal { name } => write!(f, "unknown signal identifier '{name}'"),
            Error::DuplicateSignal { name } => {
                write!(f, "signal '{name}' assigned to more than one pin")
            }
            Error::MissingSignal { name } => write!(f, "board is missing signal '{name}'"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;

pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
