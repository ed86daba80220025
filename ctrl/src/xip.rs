// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Execute-in-place read engine.
//!
//! Translates a flash byte address into quad I/O read cycles on the
//! shared pins and shifts in a 32-bit little-endian word.  One SPI clock
//! spans two model ticks: outputs change on the low tick, the device
//! samples (and the engine samples the device) on the high tick.
//!
//! The first read after a configuration update runs the full sequence:
//! command `EB`, six address nibbles, the continuous-read mode byte, four
//! dummy clocks, then eight data nibbles.  The engine then parks with
//! chip select low; a read at the next sequential address continues
//! clocking data immediately, and a non-sequential address re-issues only
//! the address phase (the mode byte keeps the device in no-command mode).
//!
//! A configuration-update pulse discards all of this and replays the
//! init preamble: sixteen clocks of all-ones, which resets an armed
//! continuous read and is ignored otherwise.

use crate::pins::{DqLevels, LineDrive, PinDrive, lines_to_nibble};
use crate::proto::{
    ADDR_NIBBLES, CONTINUOUS_READ_MODE, DUMMY_CLOCKS, INIT_CLOCKS, MODE_NIBBLES, opcodes,
};

#[allow(unused_imports)]
use log::{debug, trace};

const ADDR_MASK: u32 = 0x00FF_FFFF;

/// Protocol phase of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XipState {
    /// Waiting for the first configuration-update pulse after reset
    PowerDown,

    /// Chip select released for one tick so an interrupted transaction
    /// terminates cleanly before the preamble
    InitRelease,

    /// All-ones preamble after reset or configuration update
    Init { clocks_left: u8 },

    /// Chip select released for one tick after the preamble
    InitGap,

    /// Deselected, waiting for a request
    Idle,

    /// Shifting the read command out on dq0, MSB first
    Command { bits_left: u8 },

    /// Shifting the 24-bit address out on all four lines
    Address { nibbles_left: u8 },

    /// Shifting the continuous-read mode byte out
    Mode { nibbles_left: u8 },

    /// Dummy clocks, lines released
    Dummy { clocks_left: u8 },

    /// Shifting a data word in
    Data { bytes_left: u8, hi_nibble: bool },

    /// Burst parked: chip select held low between sequential reads
    Hold,

    /// Chip select released for one tick before a non-sequential read
    Gap,
}

/// Drives the shared pins to perform memory-mapped flash reads
#[derive(Debug)]
pub struct XipReadEngine {
    state: XipState,
    clk_high: bool,
    addr: u32,
    next_addr: u32,
    word: u32,
    cur: u8,
    ready: bool,
    word_out: u32,
}

impl XipReadEngine {
    pub fn new() -> Self {
        Self {
            state: XipState::PowerDown,
            clk_high: false,
            addr: 0,
            next_addr: 0,
            word: 0,
            cur: 0,
            ready: false,
            word_out: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Configuration-update pulse: back to the initial protocol phase,
    /// any in-progress read discarded.
    pub fn config_update(&mut self) {
        debug!("xip: configuration update, replaying init preamble");
        self.state = XipState::InitRelease;
        self.clk_high = false;
        self.ready = false;
    }

    /// Readiness pulse: true for the single tick the word completes.
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// The last completed word.
    pub fn word(&self) -> u32 {
        self.word_out
    }

    // Advances the SPI clock phase; true once per completed clock.
    fn clock_done(&mut self) -> bool {
        self.clk_high = !self.clk_high;
        !self.clk_high
    }

    /// Advances one tick.
    ///
    /// `valid` requests a read of `addr`; it must stay asserted until the
    /// readiness pulse.  Returns the pin drive for this tick.
    pub fn tick(&mut self, valid: bool, addr: u32, dq_in: &DqLevels) -> PinDrive {
        self.ready = false;
        let clk = self.clk_high;

        match self.state {
            XipState::PowerDown => PinDrive::idle(),

            XipState::InitRelease => {
                self.state = XipState::Init {
                    clocks_left: INIT_CLOCKS,
                };
                self.clk_high = false;
                PinDrive::idle()
            }

            XipState::Init { clocks_left } => {
                let drive = PinDrive::with_nibble(false, clk, 0xF, 0xF);
                if self.clock_done() {
                    self.state = if clocks_left <= 1 {
                        XipState::InitGap
                    } else {
                        XipState::Init {
                            clocks_left: clocks_left - 1,
                        }
                    };
                }
                drive
            }

            XipState::InitGap => {
                self.state = XipState::Idle;
                PinDrive::idle()
            }

            XipState::Idle => {
                if valid {
                    self.addr = addr & ADDR_MASK;
                    self.word = 0;
                    self.clk_high = false;
                    self.state = XipState::Command { bits_left: 8 };
                    trace!("xip: read {:#08x}, full sequence", self.addr);
                    // Select the device; clocking starts next tick
                    PinDrive {
                        cs_n: false,
                        clk: false,
                        dq: [LineDrive::default(); 4],
                    }
                } else {
                    PinDrive::idle()
                }
            }

            XipState::Command { bits_left } => {
                let bit = (opcodes::FAST_READ_QUAD_IO >> (bits_left - 1)) & 1 != 0;
                let mut dq = [LineDrive::default(); 4];
                dq[0] = LineDrive {
                    level: bit,
                    oe: true,
                };
                let drive = PinDrive {
                    cs_n: false,
                    clk,
                    dq,
                };
                if self.clock_done() {
                    self.state = if bits_left <= 1 {
                        XipState::Address {
                            nibbles_left: ADDR_NIBBLES,
                        }
                    } else {
                        XipState::Command {
                            bits_left: bits_left - 1,
                        }
                    };
                }
                drive
            }

            XipState::Address { nibbles_left } => {
                let shift = 4 * (nibbles_left as u32 - 1);
                let nibble = ((self.addr >> shift) & 0xF) as u8;
                let drive = PinDrive::with_nibble(false, clk, nibble, 0xF);
                if self.clock_done() {
                    self.state = if nibbles_left <= 1 {
                        XipState::Mode {
                            nibbles_left: MODE_NIBBLES,
                        }
                    } else {
                        XipState::Address {
                            nibbles_left: nibbles_left - 1,
                        }
                    };
                }
                drive
            }

            XipState::Mode { nibbles_left } => {
                let shift = 4 * (nibbles_left - 1);
                let nibble = (CONTINUOUS_READ_MODE >> shift) & 0xF;
                let drive = PinDrive::with_nibble(false, clk, nibble, 0xF);
                if self.clock_done() {
                    self.state = if nibbles_left <= 1 {
                        XipState::Dummy {
                            clocks_left: DUMMY_CLOCKS,
                        }
                    } else {
                        XipState::Mode {
                            nibbles_left: nibbles_left - 1,
                        }
                    };
                }
                drive
            }

            XipState::Dummy { clocks_left } => {
                let drive = PinDrive {
                    cs_n: false,
                    clk,
                    dq: [LineDrive::default(); 4],
                };
                if self.clock_done() {
                    self.state = if clocks_left <= 1 {
                        XipState::Data {
                            bytes_left: 4,
                            hi_nibble: true,
                        }
                    } else {
                        XipState::Dummy {
                            clocks_left: clocks_left - 1,
                        }
                    };
                }
                drive
            }

            XipState::Data {
                bytes_left,
                hi_nibble,
            } => {
                let drive = PinDrive {
                    cs_n: false,
                    clk,
                    dq: [LineDrive::default(); 4],
                };
                if self.clock_done() {
                    let nibble = lines_to_nibble(dq_in);
                    if hi_nibble {
                        self.cur = nibble << 4;
                        self.state = XipState::Data {
                            bytes_left,
                            hi_nibble: false,
                        };
                    } else {
                        let byte = self.cur | nibble;
                        let index = 4 - bytes_left as u32;
                        self.word |= (byte as u32) << (8 * index);
                        if bytes_left <= 1 {
                            self.word_out = self.word;
                            self.ready = true;
                            self.next_addr = self.addr.wrapping_add(4) & ADDR_MASK;
                            self.state = XipState::Hold;
                            trace!("xip: word {:#010x} at {:#08x}", self.word_out, self.addr);
                        } else {
                            self.state = XipState::Data {
                                bytes_left: bytes_left - 1,
                                hi_nibble: true,
                            };
                        }
                    }
                }
                drive
            }

            XipState::Hold => {
                if valid {
                    let addr = addr & ADDR_MASK;
                    self.addr = addr;
                    self.word = 0;
                    self.clk_high = false;
                    if addr == self.next_addr {
                        trace!("xip: read {addr:#08x}, sequential continue");
                        self.state = XipState::Data {
                            bytes_left: 4,
                            hi_nibble: true,
                        };
                    } else {
                        trace!("xip: read {addr:#08x}, address replay");
                        self.state = XipState::Gap;
                    }
                }
                PinDrive {
                    cs_n: false,
                    clk: false,
                    dq: [LineDrive::default(); 4],
                }
            }

            XipState::Gap => {
                self.clk_high = false;
                self.state = XipState::Address {
                    nibbles_left: ADDR_NIBBLES,
                };
                PinDrive::idle()
            }
        }
    }
}

impl Default for XipReadEngine {
    fn default() -> Self {
        Self::new()
    }
}
