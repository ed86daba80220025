// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! SPI-NOR protocol constants shared by the read engine, the behavioral
//! flash device and the bit-bang command layer.

/// Flash command opcodes
pub mod opcodes {
    /// Read JEDEC manufacturer/device ID
    pub const READ_JEDEC_ID: u8 = 0x9F;

    /// Read status register 1
    pub const READ_STATUS: u8 = 0x05;

    /// Set the write enable latch
    pub const WRITE_ENABLE: u8 = 0x06;

    /// Erase one 4 KiB sector
    pub const SECTOR_ERASE: u8 = 0x20;

    /// Program up to one page
    pub const PAGE_PROGRAM: u8 = 0x02;

    /// Single-bit read
    pub const READ_DATA: u8 = 0x03;

    /// Quad I/O fast read
    pub const FAST_READ_QUAD_IO: u8 = 0xEB;
}

/// Mode byte that arms continuous (no-command) quad reads
pub const CONTINUOUS_READ_MODE: u8 = 0xA5;

/// Address nibbles in a quad I/O read
pub const ADDR_NIBBLES: u8 = 6;

/// Mode byte nibbles in a quad I/O read
pub const MODE_NIBBLES: u8 = 2;

/// Dummy clocks between the mode byte and data
pub const DUMMY_CLOCKS: u8 = 4;

/// Clocks of all-ones the engine drives after reset or a configuration
/// update.  Resets an armed continuous read (address + mode of all ones)
/// and decodes as a harmless unknown command otherwise.
pub const INIT_CLOCKS: u8 = 16;

/// Flash page size; programming wraps within a page
pub const PAGE_SIZE: usize = 256;

/// Erase sector size of the flash part
pub const SECTOR_SIZE: usize = 4096;

/// Status register write-enable-latch bit
pub const STATUS_WEL: u8 = 0b10;

/// JEDEC ID of the modeled part (Winbond W25Q80, 8 Mbit)
pub const JEDEC_ID: [u8; 3] = [0xEF, 0x40, 0x14];
