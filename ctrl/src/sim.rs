// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Simulation harness: the controller wired to the behavioral flash.
//!
//! Resolves the shared lines each tick - a line driven by the controller
//! reads back its driven level, an undriven line reads the device's
//! output, and a line neither side drives floats high (board pull-ups).
//! Register reads sample the current resolved lines, so `rdata` stays
//! combinational.

use iceflash_config::FlashLayout;

use crate::bus::{BusReply, BusRequest};
use crate::ctrl::{FlashController, Reg};
use crate::flash::QuadFlash;
use crate::pins::{DqLevels, PinDrive};

/// Controller plus flash device under a common tick
#[derive(Debug)]
pub struct Simulator {
    ctrl: FlashController,
    flash: QuadFlash,
    dq: DqLevels,
}

impl Simulator {
    /// A simulator over a blank flash of the layout's size.
    pub fn new(layout: &FlashLayout) -> Self {
        Self {
            ctrl: FlashController::new(layout),
            flash: QuadFlash::new(layout.total_size as usize),
            dq: [true; 4],
        }
    }

    /// A simulator over a flash preloaded with `contents` from offset 0.
    pub fn with_flash_contents(layout: &FlashLayout, contents: &[u8]) -> Self {
        Self {
            ctrl: FlashController::new(layout),
            flash: QuadFlash::with_contents(contents, layout.total_size as usize),
            dq: [true; 4],
        }
    }

    pub fn controller(&self) -> &FlashController {
        &self.ctrl
    }

    pub fn flash(&self) -> &QuadFlash {
        &self.flash
    }

    /// Hardware reset of the controller.  The flash device keeps its
    /// contents, as a real part would.
    pub fn reset(&mut self) {
        self.ctrl.reset();
        self.dq = [true; 4];
    }

    pub fn write_reg(&mut self, reg: Reg, value: u32) {
        self.ctrl.write_reg(reg, value);
    }

    /// Register read against the current line state.
    pub fn read_reg(&self, reg: Reg) -> u32 {
        self.ctrl.read_reg(reg, &self.dq)
    }

    /// Advances controller and flash one tick.
    pub fn tick(&mut self, req: &BusRequest) -> BusReply {
        let out = self.ctrl.tick(req, &self.dq);

        // The device sees the lines as driven during this tick
        let lines = Self::resolve(&out.pins, &self.flash.line_outputs());
        self.flash.step(out.pins.cs_n, out.pins.clk, &lines);

        // A falling edge may have shifted a new device output onto the
        // lines; that is what the next tick samples
        self.dq = Self::resolve(&out.pins, &self.flash.line_outputs());

        out.reply
    }

    /// One tick with no bus activity.
    pub fn tick_idle(&mut self) -> BusReply {
        self.tick(&BusRequest::idle())
    }

    /// Drives a full bus read transaction and returns the word plus the
    /// number of ticks it took.
    ///
    /// The tick limit exists so tests terminate; the modeled hardware
    /// itself has no timeout.
    pub fn read_word(&mut self, word_addr: u32, max_ticks: usize) -> Option<(u32, usize)> {
        let req = BusRequest::read(word_addr);
        for t in 0..max_ticks {
            let reply = self.tick(&req);
            if reply.ack {
                return Some((reply.dat_r, t + 1));
            }
        }
        None
    }

    fn resolve(pins: &PinDrive, device: &[Option<bool>; 4]) -> DqLevels {
        let mut lines = [true; 4];
        for (i, line) in lines.iter_mut().enumerate() {
            *line = if pins.dq[i].oe {
                pins.dq[i].level
            } else {
                device[i].unwrap_or(true)
            };
        }
        lines
    }
}
