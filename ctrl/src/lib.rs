// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Cycle-accurate model of the IceFlash SPI-NOR flash controller.
//!
//! The controller has two faces:
//! - a memory-mapped execute-in-place read path: bus transactions are
//!   translated into accelerated quad-I/O flash reads by the
//!   [`xip::XipReadEngine`], sequenced by the [`bus::BusSequencer`]
//! - a raw bit-bang path: software drives the data nibble, per-pin output
//!   enables and an auto-generated clock pulse through the
//!   [`bitbang::BitbangBridge`], for the commands the read engine cannot
//!   express (unlock, erase, program)
//!
//! Exactly one of the two drives the shared pins at any tick, selected by
//! the [`mode::ModeController`].  The whole model advances one synchronous
//! clock per [`ctrl::FlashController::tick`]; every transition is atomic
//! and there is no parallelism between components.
//!
//! [`sim::Simulator`] wires the controller to the behavioral
//! [`flash::QuadFlash`] device for tests and host-side tooling, and
//! [`cmd`] layers the flash command set on top of the register interface
//! the way firmware does.

pub mod bitbang;
pub mod bus;
pub mod cmd;
pub mod ctrl;
pub mod flash;
pub mod mode;
pub mod pins;
pub mod proto;
pub mod sim;
pub mod xip;

pub use bus::{BusReply, BusRequest};
pub use cmd::BitbangSession;
pub use ctrl::{FlashController, Reg, TickOutput};
pub use flash::QuadFlash;
pub use mode::{ControlConfig, ModeController};
pub use pins::{DqLevels, LineDrive, PinDrive, PinOwner};
pub use sim::Simulator;
pub use xip::XipReadEngine;

pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
