// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Flash geometry and region layout.
//!
//! The SPI flash holds, in order: the gateware bitstream region (which the
//! multiboot header, when present, sits in front of), the stage-one loader,
//! and the firmware kernel.  Region sizes are erase-sector multiples so a
//! region can be reflashed without disturbing its neighbours.

use crate::{Error, Result};

/// Total size of the SPI flash part, in bytes (1 MiB / 8 Mbit)
pub const SPI_FLASH_SIZE: u32 = 1024 * 1024;

/// Minimum erasable unit of the flash part
pub const ERASE_SECTOR: u32 = 4096;

/// Width of a flash byte address
pub const FLASH_ADDR_BITS: u32 = 24;

// Slightly larger than the actual bitstream, rounded to the erase sector.
const GATEWARE_REGION: u32 = 0x1a000;

// One erase sector for the stage-one loader.
const LOADER_REGION: u32 = 4096;

// Kernel region limit is primarily set by the loader copy length.
const KERNEL_REGION: u32 = 76 * 1024;

/// Flash region layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FlashLayout {
    /// Total flash size in bytes
    pub total_size: u32,

    /// Erase sector size in bytes
    pub erase_sector: u32,

    /// Bytes reserved for the gateware bitstream (and multiboot header)
    pub gateware_region: u32,

    /// Bytes reserved for the stage-one loader
    pub loader_region: u32,

    /// Bytes reserved for the firmware kernel
    pub kernel_region: u32,
}

impl Default for FlashLayout {
    fn default() -> Self {
        Self {
            total_size: SPI_FLASH_SIZE,
            erase_sector: ERASE_SECTOR,
            gateware_region: GATEWARE_REGION,
            loader_region: LOADER_REGION,
            kernel_region: KERNEL_REGION,
        }
    }
}

impl FlashLayout {
    /// Validates the layout: all regions sector-aligned and the whole
    /// stack fitting in the part.
    pub fn validate(&self) -> Result<()> {
        for region in [
            self.gateware_region,
            self.loader_region,
            self.kernel_region,
        ] {
            if !region.is_multiple_of(self.erase_sector) {
                return Err(Error::NotSectorAligned {
                    value: region,
                    sector: self.erase_sector,
                });
            }
        }

        let used = self.gateware_region + self.loader_region + self.kernel_region;
        if used > self.total_size {
            return Err(Error::RegionTooLarge {
                region: used,
                size: self.total_size,
            });
        }

        Ok(())
    }

    /// Byte offset of the stage-one loader within flash
    pub fn loader_offset(&self) -> u32 {
        self.gateware_region
    }

    /// Byte offset of the firmware kernel within flash
    pub fn kernel_offset(&self) -> u32 {
        self.gateware_region + self.loader_region
    }

    /// Checks a boot offset against the flash region.
    pub fn check_boot_offset(&self, offset: u32) -> Result<()> {
        if offset >= (1 << FLASH_ADDR_BITS) {
            return Err(Error::OffsetTooWide { offset });
        }
        if offset >= self.total_size {
            return Err(Error::OffsetOutOfRange {
                offset,
                size: self.total_size,
            });
        }
        Ok(())
    }

    /// Checks a pad target length for artifact composition.
    pub fn check_pad_target(&self, target: u32) -> Result<()> {
        if !target.is_multiple_of(self.erase_sector) {
            return Err(Error::NotSectorAligned {
                value: target,
                sector: self.erase_sector,
            });
        }
        if target > self.total_size {
            return Err(Error::RegionTooLarge {
                region: target,
                size: self.total_size,
            });
        }
        Ok(())
    }

    /// Number of bus word addresses the memory-mapped region decodes.
    ///
    /// The data bus is 32 bits wide, so the region holds size/4 words.
    pub fn word_count(&self) -> u32 {
        self.total_size / 4
    }
}
