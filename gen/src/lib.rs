// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Generates deployable flash artifacts for IceFlash.
//!
//! Pure byte-buffer operations, split in three:
//! - [`header`] - encodes boot offsets into the fixed-format warmboot
//!   header the iCE40 boot ROM consumes
//! - [`image`] - the merge and pad primitives over raw image buffers
//! - [`compose`] - the builder that assembles the final artifacts
//!
//! Nothing here touches the filesystem; callers load the gateware and
//! firmware images and write the composed buffers out themselves.

#![no_std]

extern crate alloc;

pub mod compose;
pub mod header;
pub mod image;

pub use compose::{ComposedArtifact, Composer};
pub use header::{BOOT_SLOT_COUNT, HEADER_LEN, RECORD_LEN, encode_boot_headers, encode_record};
pub use image::{PadOutcome, merge_images, pad_image};

use alloc::string::String;

/// Error type
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Error {
    /// Boot slot list was rejected by the configuration layer
    InvalidSlots { error: String },

    /// Boot offset does not fit in the 24-bit address field
    OffsetTooWide { offset: u32 },

    /// Pad target was rejected by the configuration layer
    InvalidPadTarget { error: String },

    /// No gateware image supplied to the composer
    MissingGateware,

    /// An input image was present but empty
    EmptyImage { name: &'static str },
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidSlots { error } => write!(f, "invalid boot slots: {error}"),
            Error::OffsetTooWide { offset } => {
                write!(f, "boot offset {offset:#x} does not fit in 24 bits")
            }
            Error::InvalidPadTarget { error } => write!(f, "invalid pad target: {error}"),
            Error::MissingGateware => write!(f, "no gateware image supplied"),
            Error::EmptyImage { name } => write!(f, "{name} image is empty"),
        }
    }
}

impl core::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;

pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
