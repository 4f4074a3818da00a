//! Reads a Smart Battery (SBS) fuel gauge over SMBus and renders a diagnostic report.
//!
//! ```no_run
//! use smart_battery::{LinuxTransport, Report, ReportOptions, SmartBattery};
//!
//! let mut battery = SmartBattery::new(LinuxTransport::new(1, 0x0B));
//! let mut out = std::io::stdout().lock();
//! Report::default().run(&mut battery, &mut out, ReportOptions::default())?;
//! # Ok::<(), smart_battery::Error>(())
//! ```

use std::io;

mod decode;
mod flags;
#[cfg(test)]
mod mock;
mod registers;
mod report;
mod scale;
mod transport;

pub use crate::decode::{
    decode_word, render_hex_dump, DateCode, DecodedField, DecoderKind, Duration, WordDecoder,
    MONTHS,
};
pub use crate::flags::{BatteryMode, BatteryStatus, ErrorCode};
pub use crate::registers::Register;
pub use crate::report::{Report, ReportEntry, ReportOptions, SMART_BATTERY_REPORT};
pub use crate::scale::{CapacityUnit, ScaleState, SpecificationInfo};
pub use crate::transport::{LinuxTransport, Transport, MIN_DEVICE_ADDRESS};

/// Largest block a device can describe with its one-byte length prefix, prefix included.
pub const BLOCK_CAPACITY: usize = u8::MAX as usize + 1;

const EIO: i32 = 5;
const ENXIO: i32 = 6;
const ENOMEM: i32 = 12;
const EINVAL: i32 = 22;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I2C error: {0}")]
    I2c(#[source] io::Error),
    #[error("no such device at address {0:#04x}")]
    NoSuchDevice(u16),
    #[error("invalid word width of {0} bits, expected 8, 16, 24 or 32")]
    InvalidWidth(u8),
    #[error("could not allocate a {requested} byte block buffer")]
    Allocation { requested: usize },
    #[error("block of {length} bytes exceeds the {capacity} byte buffer")]
    BlockTooLong { length: usize, capacity: usize },
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

impl Error {
    /// Positive OS error code describing this failure, suitable as a process exit status.
    pub fn errno(&self) -> i32 {
        match self {
            Error::I2c(e) | Error::Output(e) => e.raw_os_error().unwrap_or(EIO),
            Error::NoSuchDevice(_) => ENXIO,
            Error::InvalidWidth(_) => EINVAL,
            Error::Allocation { .. } | Error::BlockTooLong { .. } => ENOMEM,
        }
    }
}

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

/// A Smart Battery reached through some [`Transport`].
pub struct SmartBattery<T> {
    transport: T,
}

impl<T: Transport> SmartBattery<T> {
    pub fn new(transport: T) -> SmartBattery<T> {
        SmartBattery { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Reads `bits / 8` bytes from `register` and assembles them little-endian.
    pub fn fetch_word(&mut self, register: Register, bits: u8) -> Result<u32> {
        let len = match bits {
            8 | 16 | 24 | 32 => usize::from(bits / 8),
            _ => return Err(Error::InvalidWidth(bits)),
        };
        let mut buf = [0; 4];
        self.transport.read(Some(register.code()), &mut buf[..len])?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a length-prefixed block and returns its payload without the length byte.
    ///
    /// The device answers with the length byte followed by the payload, so the length is read
    /// first and the whole block is then read again from the same register.
    pub fn fetch_block(&mut self, register: Register) -> Result<Vec<u8>> {
        let length = self.fetch_word(register, 8)? as usize + 1;
        if length > BLOCK_CAPACITY {
            return Err(Error::BlockTooLong {
                length,
                capacity: BLOCK_CAPACITY,
            });
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(length)
            .map_err(|_| Error::Allocation { requested: length })?;
        buf.resize(length, 0);
        self.transport.read(Some(register.code()), &mut buf)?;
        buf.remove(0);
        Ok(buf)
    }

    /// Writes `data` to `register`. The report never writes; this is for callers driving
    /// manufacturer commands themselves.
    pub fn write(&mut self, register: Register, data: &[u8]) -> Result {
        self.transport.write(register.code(), data)
    }
}
