use crate::{Error, Result};
use i2cdev::core::{I2CMessage, I2CTransfer};
use i2cdev::linux::{I2CMessageFlags, LinuxI2CBus, LinuxI2CMessage};
use std::io;
use std::path::PathBuf;
use std::time::Instant;

/// Addresses below this are reserved on SMBus and treated as "not configured".
pub const MIN_DEVICE_ADDRESS: u16 = 3;

/// A single-transaction view of a bus device. Implementations must not keep any handle open
/// between calls.
pub trait Transport {
    /// Reads `buf.len()` bytes. With a register, the register number is written first and the
    /// read follows as one combined transaction.
    fn read(&mut self, register: Option<u8>, buf: &mut [u8]) -> Result;

    /// Writes the register number followed by `data`.
    fn write(&mut self, register: u8, data: &[u8]) -> Result;
}

/// Transport over a Linux `i2c-dev` node using `I2C_RDWR` transfers.
#[derive(Debug, Clone)]
pub struct LinuxTransport {
    bus: PathBuf,
    address: u16,
}

impl LinuxTransport {
    /// Targets `address` on `/dev/i2c-<bus>`. Nothing is opened until the first transaction.
    pub fn new(bus: u32, address: u16) -> LinuxTransport {
        LinuxTransport::with_path(format!("/dev/i2c-{bus}"), address)
    }

    pub fn with_path<P: Into<PathBuf>>(bus: P, address: u16) -> LinuxTransport {
        LinuxTransport {
            bus: bus.into(),
            address,
        }
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn ten_bit(&self) -> bool {
        self.address > 0xFF
    }

    fn flags(&self) -> I2CMessageFlags {
        if self.ten_bit() {
            I2CMessageFlags::TEN_BIT_ADDRESS
        } else {
            I2CMessageFlags::empty()
        }
    }

    fn check_address(&self) -> Result {
        if self.address < MIN_DEVICE_ADDRESS {
            return Err(Error::NoSuchDevice(self.address));
        }
        Ok(())
    }

    fn transfer<'a>(&self, msgs: &'a mut [LinuxI2CMessage<'a>]) -> Result {
        let started = Instant::now();
        // The bus node is closed when `bus` drops, on error paths too.
        let mut bus = LinuxI2CBus::new(&self.bus).map_err(|e| Error::I2c(e.into()))?;
        let expected = msgs.len();
        let done = bus.transfer(msgs).map_err(|e| Error::I2c(e.into()))?;
        if done as usize != expected {
            return Err(Error::I2c(io::Error::new(
                io::ErrorKind::Other,
                format!("transfer completed {done} of {expected} messages"),
            )));
        }
        log::debug!(
            "{} transfer to {:#04x} complete in {:.1}us",
            self.bus.display(),
            self.address,
            started.elapsed().as_secs_f64() * 1e6
        );
        Ok(())
    }
}

impl Transport for LinuxTransport {
    fn read(&mut self, register: Option<u8>, buf: &mut [u8]) -> Result {
        self.check_address()?;
        log::debug!(
            "reading {} bytes from {:?} at {:#04x}",
            buf.len(),
            register,
            self.address
        );
        let read = LinuxI2CMessage::read(buf)
            .with_address(self.address)
            .with_flags(self.flags() | I2CMessageFlags::READ);
        match register {
            Some(register) => {
                let reg = [register];
                let write = LinuxI2CMessage::write(&reg)
                    .with_address(self.address)
                    .with_flags(self.flags());
                self.transfer(&mut [write, read])
            }
            None => self.transfer(&mut [read]),
        }
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result {
        self.check_address()?;
        log::debug!(
            "writing {} bytes to {:#04x} at {:#04x}",
            data.len(),
            register,
            self.address
        );
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(register);
        frame.extend_from_slice(data);
        let write = LinuxI2CMessage::write(&frame)
            .with_address(self.address)
            .with_flags(self.flags());
        self.transfer(&mut [write])
    }
}
