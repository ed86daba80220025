// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Composes the deployable flash images: warmboot header, gateware merged
/// with firmware, and their sector-padded variants.
#[derive(Parser, Debug)]
#[command(name = "iceflash-mkimage", version, about)]
pub struct Args {
    /// Prebuilt gateware bitstream; skips synthesis
    #[arg(long, value_name = "FILE", conflicts_with = "rtl")]
    pub gateware: Option<PathBuf>,

    /// RTL directory; runs the icestorm toolchain to produce the bitstream
    #[arg(long, value_name = "DIR")]
    pub rtl: Option<PathBuf>,

    /// Top-level module name for synthesis
    #[arg(long, default_value = "iceflash_top")]
    pub top: String,

    /// Pin constraint file for nextpnr
    #[arg(long, value_name = "FILE")]
    pub pcf: Option<PathBuf>,

    /// Placer to use in nextpnr
    #[arg(long, value_enum, default_value = "heap")]
    pub placer: Placer,

    /// Seed to use in nextpnr
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Firmware image merged behind the gateware
    #[arg(long, value_name = "FILE")]
    pub firmware: Option<PathBuf>,

    /// Boot offset for the warmboot header; repeat for up to 5 slots,
    /// the first is replicated into any remaining
    #[arg(long = "boot-offset", value_name = "OFFSET", value_parser = parse_offset)]
    pub boot_offsets: Vec<u32>,

    /// JSON build configuration (flash layout and boot slots)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Pad target length, must be sector aligned; defaults to the
    /// layout's gateware region
    #[arg(long, value_name = "LEN", value_parser = parse_len)]
    pub pad_to: Option<u32>,

    /// Output directory
    #[arg(long, default_value = "build/gateware", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Base name of the produced artifacts
    #[arg(long, default_value = "iceflash")]
    pub name: String,

    /// Overwrite existing output files
    #[arg(long)]
    pub overwrite: bool,
}

/// nextpnr placer choices
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placer {
    Sa,
    Heap,
}

impl Placer {
    pub fn flag_value(&self) -> &'static str {
        match self {
            Placer::Sa => "sa",
            Placer::Heap => "heap",
        }
    }
}

/// Parses a decimal or 0x-prefixed boot offset and checks it fits the
/// 24-bit flash address space.
pub fn parse_offset(s: &str) -> Result<u32, String> {
    let value = parse_u32(s)?;
    if value >= (1 << iceflash_config::FLASH_ADDR_BITS) {
        return Err(format!("boot offset {value:#x} does not fit in 24 bits"));
    }
    Ok(value)
}

/// Parses a decimal or 0x-prefixed length.
pub fn parse_len(s: &str) -> Result<u32, String> {
    parse_u32(s)
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let result = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    result.map_err(|_| format!("invalid number: {s}"))
}
