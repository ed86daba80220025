// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! The flash controller: register file, pin ownership, and the tick loop
//! tying the mode controller, bit-bang bridge, read engine and bus
//! sequencer together.

use iceflash_config::FlashLayout;

use crate::bitbang::BitbangBridge;
use crate::bus::{BusReply, BusRequest, BusSequencer};
use crate::mode::{ControlConfig, ModeController};
use crate::pins::{DqLevels, PinDrive, PinOwner};
use crate::xip::XipReadEngine;

#[allow(unused_imports)]
use log::{debug, trace};

/// The software-visible registers, word addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    /// Read-only sampled state of [hold, wp, cipo, copi]
    Rdata,

    /// Bit 0 bit-bang enable, bit 1 chip select (active low on the pin)
    Mode,

    /// Bits 3:0 data nibble, bits 7:4 per-line output enable; every
    /// write auto-generates one clock pulse one tick later
    Wdata,

    /// Bit 0 sticky cycle-fault flag; any write clears the flags
    Stat,
}

/// What one tick produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutput {
    /// Bus-facing outputs (registered, from the previous transition)
    pub reply: BusReply,

    /// Drive state of the shared pins for this tick
    pub pins: PinDrive,
}

/// The memory-mapped SPI-NOR flash controller
#[derive(Debug)]
pub struct FlashController {
    mode: ModeController,
    bitbang: BitbangBridge,
    xip: XipReadEngine,
    bus: BusSequencer,
    word_mask: u32,
}

impl FlashController {
    pub fn new(layout: &FlashLayout) -> Self {
        Self {
            mode: ModeController::new(),
            bitbang: BitbangBridge::new(),
            xip: XipReadEngine::new(),
            bus: BusSequencer::new(),
            word_mask: layout.word_count() - 1,
        }
    }

    /// Hardware reset: every component back to its initial state, any
    /// in-flight transaction discarded.
    pub fn reset(&mut self) {
        debug!("controller reset");
        self.mode.reset();
        self.bitbang.reset();
        self.xip.reset();
        self.bus.reset();
    }

    /// Register write event.
    pub fn write_reg(&mut self, reg: Reg, value: u32) {
        match reg {
            Reg::Rdata => {} // read-only
            Reg::Mode => self.mode.write(value),
            Reg::Wdata => self.bitbang.write(value),
            Reg::Stat => self.bus.clear_fault(),
        }
    }

    /// Register read.  `dq` is the current sampled state of the data
    /// lines; `rdata` reflects it combinationally, nothing is cached.
    pub fn read_reg(&self, reg: Reg, dq: &DqLevels) -> u32 {
        match reg {
            Reg::Rdata => BitbangBridge::rdata(dq),
            Reg::Mode => self.mode.read(),
            Reg::Wdata => self.bitbang.read(),
            Reg::Stat => self.bus.cycle_fault() as u32,
        }
    }

    /// The current control configuration.
    pub fn config(&self) -> ControlConfig {
        self.mode.config()
    }

    /// The read engine, for observing readiness in tests and tooling.
    pub fn engine(&self) -> &XipReadEngine {
        &self.xip
    }

    /// Translates a bus word address into a 24-bit flash byte address.
    ///
    /// The word address is truncated to the region's width and shifted by
    /// the bus word size; out-of-region addresses wrap rather than fault,
    /// as in the hardware.
    fn flash_addr(&self, adr: u32) -> u32 {
        (adr & self.word_mask) << 2
    }

    /// Advances the whole controller one synchronous clock.
    ///
    /// `dq_in` is the sampled state of the data lines at this tick.
    /// Exactly one of the read engine and the bit-bang bridge drives the
    /// returned pins, selected by the stored mode bit.
    pub fn tick(&mut self, req: &BusRequest, dq_in: &DqLevels) -> TickOutput {
        // Bus outputs are registered: whatever the previous tick decided
        let reply = self.bus.reply();

        if self.mode.tick() {
            self.xip.config_update();
        }

        let strobe = req.stb && req.cyc;
        let flash_addr = self.flash_addr(req.adr);
        let engine_req = self.bus.engine_request(strobe, flash_addr);

        // The auto-clock pulse advances regardless of ownership so a
        // stale arm never fires later
        let bb_drive = self.bitbang.tick(self.mode.config().cs_n);

        let (pins, ready, word) = match self.mode.owner() {
            PinOwner::MemoryMapped => {
                let (valid, addr) = match engine_req {
                    Some(addr) => (true, addr),
                    None => (false, 0),
                };
                let pins = self.xip.tick(valid, addr, dq_in);
                (pins, self.xip.ready(), self.xip.word())
            }
            // While bit-bang owns the pins the engine is frozen: it can
            // neither drive nor observe them
            PinOwner::BitBang => (bb_drive, false, 0),
        };

        self.bus.step(strobe, req.cyc, flash_addr, ready, word);

        TickOutput { reply, pins }
    }
}
