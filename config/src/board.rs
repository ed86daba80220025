// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Board description for the SPI flash port.
//!
//! The port has a chip select, a clock, and four bidirectional data lines.
//! In the single-bit layout the data lines carry discrete names (copi,
//! cipo, wp, hold); in the quad layout the same pins are dq0-dq3.  The
//! mapping from signal identifier to package pin is built as an explicit
//! validated table - unknown identifiers are rejected at construction, not
//! resolved dynamically.

use std::collections::BTreeMap;

use crate::{Error, Result};

/// Signals making up the SPI flash port
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Chip select, active low on the physical pin
    CsN,

    /// Serial clock
    Clk,

    /// Controller-out, peripheral-in; dq0 in the quad layout
    Copi,

    /// Controller-in, peripheral-out; dq1 in the quad layout
    Cipo,

    /// Write protect; dq2 in the quad layout
    Wp,

    /// Hold; dq3 in the quad layout
    Hold,
}

/// All signals, in dq order for the data lines
pub const SIGNALS: [Signal; 6] = [
    Signal::CsN,
    Signal::Clk,
    Signal::Copi,
    Signal::Cipo,
    Signal::Wp,
    Signal::Hold,
];

impl Signal {
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cs_n" | "csn" => Some(Signal::CsN),
            "clk" => Some(Signal::Clk),
            "copi" | "dq0" => Some(Signal::Copi),
            "cipo" | "dq1" => Some(Signal::Cipo),
            "wp" | "dq2" => Some(Signal::Wp),
            "hold" | "dq3" => Some(Signal::Hold),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Signal::CsN => "cs_n",
            Signal::Clk => "clk",
            Signal::Copi => "copi",
            Signal::Cipo => "cipo",
            Signal::Wp => "wp",
            Signal::Hold => "hold",
        }
    }

    /// Data line index in the quad layout, if this is a data signal.
    pub fn dq_index(&self) -> Option<usize> {
        match self {
            Signal::Copi => Some(0),
            Signal::Cipo => Some(1),
            Signal::Wp => Some(2),
            Signal::Hold => Some(3),
            _ => None,
        }
    }
}

/// Validated signal-name to package-pin table
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SignalMap {
    pins: BTreeMap<Signal, u8>,
}

impl SignalMap {
    /// Builds the table from (identifier, pin) pairs.
    ///
    /// Every identifier must name a known signal, no signal may appear
    /// twice, and all six port signals must be present.
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, u8)>) -> Result<Self> {
        let mut pins = BTreeMap::new();

        for (name, pin) in pairs {
            let signal = Signal::try_from_str(name).ok_or_else(|| Error::UnknownSignal {
                name: name.to_string(),
            })?;
            if pins.insert(signal, pin).is_some() {
                return Err(Error::DuplicateSignal {
                    name: signal.name().to_string(),
                });
            }
        }

        for signal in SIGNALS {
            if !pins.contains_key(&signal) {
                return Err(Error::MissingSignal {
                    name: signal.name().to_string(),
                });
            }
        }

        Ok(Self { pins })
    }

    /// The UP5K-SG48 flash port of the tester board.
    pub fn up5k_tester() -> Self {
        // Infallible: the table below is complete and well-formed.
        Self::new([
            ("cs_n", 16),
            ("clk", 15),
            ("copi", 14),
            ("cipo", 17),
            ("wp", 18),
            ("hold", 13),
        ])
        .unwrap()
    }

    /// Package pin carrying the given signal.
    pub fn pin(&self, signal: Signal) -> u8 {
        self.pins[&signal]
    }

    /// Package pins of the four data lines, in dq order.
    pub fn dq_pins(&self) -> [u8; 4] {
        [
            self.pin(Signal::Copi),
            self.pin(Signal::Cipo),
            self.pin(Signal::Wp),
            self.pin(Signal::Hold),
        ]
    }
}
