// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Boot slot lists for the warmboot header.
//!
//! The iCE40 warmboot state machine selects between five images: the
//! initial boot image plus the four `SB_WARMBOOT` selections.  A build
//! usually supplies fewer than five distinct offsets; the first offset is
//! replicated into the remaining slots so every selection lands somewhere
//! valid.

use crate::layout::FlashLayout;
use crate::{Error, Result};

/// Number of boot slots the warmboot hardware selects between
pub const BOOT_SLOT_COUNT: usize = 5;

/// Boot offsets used by the original tester build
pub const DEFAULT_BOOT_OFFSETS: [u32; BOOT_SLOT_COUNT] =
    [160, 160, 157696, 262144, 294912];

/// Ordered list of exactly [`BOOT_SLOT_COUNT`] 24-bit boot offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct BootSlots {
    offsets: [u32; BOOT_SLOT_COUNT],
}

impl BootSlots {
    /// Builds a slot list from 1..=5 offsets.
    ///
    /// Fewer than five offsets replicate the first offset into the empty
    /// slots.  More than five is a configuration error - extra offsets are
    /// never silently dropped.
    pub fn from_offsets(offsets: &[u32]) -> Result<Self> {
        if offsets.is_empty() {
            return Err(Error::NoSlots);
        }
        if offsets.len() > BOOT_SLOT_COUNT {
            return Err(Error::TooManySlots {
                expected: BOOT_SLOT_COUNT,
                actual: offsets.len(),
            });
        }

        for &offset in offsets {
            if offset >= (1 << crate::layout::FLASH_ADDR_BITS) {
                return Err(Error::OffsetTooWide { offset });
            }
        }

        let mut slots = [offsets[0]; BOOT_SLOT_COUNT];
        slots[..offsets.len()].copy_from_slice(offsets);

        Ok(Self { offsets: slots })
    }

    /// Checks every slot against the flash region.
    pub fn validate(&self, layout: &FlashLayout) -> Result<()> {
        for &offset in &self.offsets {
            layout.check_boot_offset(offset)?;
        }
        Ok(())
    }

    /// Returns the slot offsets, in warmboot selection order.
    pub fn offsets(&self) -> &[u32; BOOT_SLOT_COUNT] {
        &self.offsets
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.offsets.iter().copied()
    }
}

impl Default for BootSlots {
    fn default() -> Self {
        Self {
            offsets: DEFAULT_BOOT_OFFSETS,
        }
    }
}

impl TryFrom<Vec<u32>> for BootSlots {
    type Error = Error;

    fn try_from(offsets: Vec<u32>) -> Result<Self> {
        Self::from_offsets(&offsets)
    }
}

impl From<BootSlots> for Vec<u32> {
    fn from(slots: BootSlots) -> Self {
        slots.offsets.to_vec()
    }
}
