// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Bus access sequencer.
//!
//! Arbitrates a single in-flight transaction over the memory-mapped
//! flash region.  Strictly one transaction at a time: a strobe is
//! accepted only from idle, and acknowledge asserts for exactly one tick,
//! one tick after the engine reports readiness.  The sequencer is ready
//! for the next strobe the tick after acknowledge.
//!
//! A well-behaved master holds strobe and cycle-active until it sees the
//! acknowledge, then deasserts both.  There is no timeout: a stuck device
//! stalls the bus indefinitely.  Cycle-active dropping before readiness
//! does not abort the transaction - it completes anyway - but the event
//! is latched in a sticky fault flag firmware can read and clear.

#[allow(unused_imports)]
use log::{trace, warn};

/// One bus request, sampled at a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusRequest {
    /// Cycle-active
    pub cyc: bool,

    /// Strobe
    pub stb: bool,

    /// Write enable.  The flash region has no write path; writes perform
    /// a read and acknowledge like any other transaction.
    pub we: bool,

    /// Word address within the flash region
    pub adr: u32,

    /// Write data, ignored
    pub dat_w: u32,
}

impl BusRequest {
    /// No transaction this tick.
    pub fn idle() -> Self {
        Self {
            cyc: false,
            stb: false,
            we: false,
            adr: 0,
            dat_w: 0,
        }
    }

    /// Read request for the given word address.
    pub fn read(adr: u32) -> Self {
        Self {
            cyc: true,
            stb: true,
            we: false,
            adr,
            dat_w: 0,
        }
    }
}

/// The bus-facing outputs of a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusReply {
    /// Acknowledge, high for exactly one tick per transaction
    pub ack: bool,

    /// Read data, valid while acknowledge is high
    pub dat_r: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeqState {
    /// No transaction in flight
    Idle,

    /// Transaction accepted, engine working
    Active { addr: u32 },

    /// Engine done; acknowledge asserts this tick
    Ack { word: u32 },
}

/// Sequences bus transactions into engine read requests
#[derive(Debug)]
pub struct BusSequencer {
    state: SeqState,
    cycle_fault: bool,
}

impl BusSequencer {
    pub fn new() -> Self {
        Self {
            state: SeqState::Idle,
            cycle_fault: false,
        }
    }

    /// Reset: force idle, discard any pending transaction.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Registered outputs for this tick, from the previous tick's
    /// transition.
    pub fn reply(&self) -> BusReply {
        match self.state {
            SeqState::Ack { word } => BusReply {
                ack: true,
                dat_r: word,
            },
            _ => BusReply::default(),
        }
    }

    /// The read request the engine should see this tick, if any.
    ///
    /// Acceptance is combinational: a strobe arriving while idle reaches
    /// the engine the same tick.
    pub fn engine_request(&self, strobe: bool, flash_addr: u32) -> Option<u32> {
        match self.state {
            SeqState::Active { addr } => Some(addr),
            SeqState::Idle if strobe => Some(flash_addr),
            _ => None,
        }
    }

    /// Advances the transaction state at the end of a tick.
    pub fn step(&mut self, strobe: bool, cyc: bool, flash_addr: u32, ready: bool, word: u32) {
        self.state = match self.state {
            SeqState::Idle => {
                if strobe {
                    trace!("bus: accept read of {flash_addr:#08x}");
                    SeqState::Active { addr: flash_addr }
                } else {
                    SeqState::Idle
                }
            }
            SeqState::Active { addr } => {
                if !cyc && !self.cycle_fault {
                    warn!("bus: cycle dropped mid-transaction at {addr:#08x}");
                    self.cycle_fault = true;
                }
                if ready {
                    SeqState::Ack { word }
                } else {
                    SeqState::Active { addr }
                }
            }
            SeqState::Ack { .. } => SeqState::Idle,
        };
    }

    /// Sticky fault: cycle-active dropped before readiness.
    pub fn cycle_fault(&self) -> bool {
        self.cycle_fault
    }

    /// Clears the fault flag (status register write).
    pub fn clear_fault(&mut self) {
        self.cycle_fault = false;
    }
}

impl Default for BusSequencer {
    fn default() -> Self {
        Self::new()
    }
}
