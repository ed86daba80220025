// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Artifact composer.
//!
//! Assembles the deployable binaries out of the gateware bitstream, the
//! firmware image and a boot slot list.  Two artifacts are produced per
//! build: the plain image (gateware merged with firmware) and the
//! multiboot image (the same bytes behind the warmboot header).  Both are
//! padded, or truncated, to the sector-aligned target length.
//!
//! # Example
//! ```
//! use iceflash_config::{BootSlots, FlashLayout};
//! use iceflash_gen::Composer;
//!
//! let layout = FlashLayout::default();
//! let artifact = Composer::new(BootSlots::default(), &layout)
//!     .gateware(vec![0x5A; 2048])
//!     .firmware(vec![0xC3; 4096])
//!     .build()?;
//! assert_eq!(artifact.image_pad.len(), layout.gateware_region as usize);
//! # Ok::<(), iceflash_gen::Error>(())
//! ```

use alloc::string::ToString;
use alloc::vec::Vec;

use iceflash_config::{BootSlots, FlashLayout};

use crate::header::encode_slots;
use crate::image::{PadOutcome, merge_images, pad_image};
use crate::{Error, Result};

/// Composes the deployable artifacts for one build.
///
/// Model is to create the composer from the boot slots and flash layout,
/// supply the input images, then call [`Composer::build`].
#[derive(Debug)]
pub struct Composer {
    slots: BootSlots,
    layout: FlashLayout,
    pad_target: usize,
    gateware: Option<Vec<u8>>,
    firmware: Vec<u8>,
}

/// The composed artifacts of one build, plus what padding did to each.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ComposedArtifact {
    /// The warmboot header on its own (160 bytes)
    pub header: Vec<u8>,

    /// Gateware merged with firmware, unpadded
    pub image: Vec<u8>,

    /// Header followed by the merged image, unpadded
    pub multiboot: Vec<u8>,

    /// Plain image padded/truncated to the target length
    pub image_pad: Vec<u8>,

    /// Multiboot image padded/truncated to the target length
    pub multiboot_pad: Vec<u8>,

    /// What padding did to the plain image
    pub image_outcome: PadOutcome,

    /// What padding did to the multiboot image
    pub multiboot_outcome: PadOutcome,
}

impl Composer {
    /// Creates a composer padding to the layout's gateware region.
    pub fn new(slots: BootSlots, layout: &FlashLayout) -> Self {
        Self {
            slots,
            layout: *layout,
            pad_target: layout.gateware_region as usize,
            gateware: None,
            firmware: Vec::new(),
        }
    }

    /// Overrides the pad target length.  Must remain sector-aligned.
    pub fn pad_target(mut self, target: usize) -> Self {
        self.pad_target = target;
        self
    }

    /// Supplies the gateware bitstream.  Required.
    pub fn gateware(mut self, image: Vec<u8>) -> Self {
        self.gateware = Some(image);
        self
    }

    /// Supplies the firmware image.  Optional; an absent firmware leaves
    /// the artifact holding gateware alone.
    pub fn firmware(mut self, image: Vec<u8>) -> Self {
        self.firmware = image;
        self
    }

    /// Builds both artifacts.
    pub fn build(self) -> Result<ComposedArtifact> {
        self.layout
            .check_pad_target(self.pad_target as u32)
            .map_err(|e| Error::InvalidPadTarget {
                error: e.to_string(),
            })?;
        self.slots
            .validate(&self.layout)
            .map_err(|e| Error::InvalidSlots {
                error: e.to_string(),
            })?;

        let gateware = self.gateware.ok_or(Error::MissingGateware)?;
        if gateware.is_empty() {
            return Err(Error::EmptyImage { name: "gateware" });
        }

        let header = encode_slots(&self.slots);
        let image = merge_images(&gateware, &self.firmware);

        let mut multiboot = Vec::with_capacity(header.len() + image.len());
        multiboot.extend_from_slice(&header);
        multiboot.extend_from_slice(&image);

        let (image_pad, image_outcome) = pad_image(&image, self.pad_target);
        let (multiboot_pad, multiboot_outcome) = pad_image(&multiboot, self.pad_target);

        Ok(ComposedArtifact {
            header,
            image,
            multiboot,
            image_pad,
            multiboot_pad,
            image_outcome,
            multiboot_outcome,
        })
    }
}
