// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! iceflash-fw-parser
//!
//! Parses the multiboot (warmboot) header out of a composed flash
//! artifact, recovering the five boot records the iCE40 boot ROM will see.
//! Used by the build tooling to verify artifacts before deployment.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod parsing;

pub use parsing::{MultibootHeader, WarmbootRecord};

use alloc::string::String;

/// Length of one warmboot record in flash
pub const RECORD_LEN: usize = iceflash_gen::RECORD_LEN;

/// Number of records in a complete header
pub const BOOT_SLOT_COUNT: usize = iceflash_gen::BOOT_SLOT_COUNT;

/// Length of a complete header in flash
pub const HEADER_LEN: usize = iceflash_gen::HEADER_LEN;

/// Error type
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Error {
    /// Input shorter than a complete header
    Truncated { expected: usize, actual: usize },

    /// Binary-level decode failure
    Decode { error: String },

    /// A fixed field of a record held an unexpected value
    BadField {
        record: usize,
        field: &'static str,
    },

    /// A recovered boot offset fails layout validation
    BadOffset { record: usize, error: String },
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Truncated { expected, actual } => {
                write!(f, "truncated header: need {expected} bytes, have {actual}")
            }
            Error::Decode { error } => write!(f, "header decode failed: {error}"),
            Error::BadField { record, field } => {
                write!(f, "record {record}: unexpected {field} bytes")
            }
            Error::BadOffset { record, error } => {
                write!(f, "record {record}: bad boot offset: {error}")
            }
        }
    }
}

impl core::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;

pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
