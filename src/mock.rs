use crate::registers::Register;
use crate::transport::Transport;
use crate::{Error, Result};
use std::collections::HashMap;
use std::io;

/// Scripted transport serving fixed register contents.
#[derive(Debug, Default)]
pub struct MockBus {
    registers: HashMap<u8, Vec<u8>>,
    failures: HashMap<u8, i32>,
    read_log: Vec<u8>,
    written: Vec<(u8, Vec<u8>)>,
}

impl MockBus {
    pub fn new() -> MockBus {
        MockBus::default()
    }

    pub fn with_word(self, register: Register, word: u16) -> MockBus {
        self.with_block(register, &word.to_le_bytes())
    }

    pub fn with_block(mut self, register: Register, bytes: &[u8]) -> MockBus {
        self.failures.remove(&register.code());
        self.registers.insert(register.code(), bytes.to_vec());
        self
    }

    pub fn failing(mut self, register: Register, errno: i32) -> MockBus {
        self.registers.remove(&register.code());
        self.failures.insert(register.code(), errno);
        self
    }

    pub fn reads(&self) -> usize {
        self.read_log.len()
    }

    pub fn read_log(&self) -> &[u8] {
        &self.read_log
    }

    pub fn written(&self) -> &[(u8, Vec<u8>)] {
        &self.written
    }
}

impl Transport for MockBus {
    fn read(&mut self, register: Option<u8>, buf: &mut [u8]) -> Result {
        let register = register.unwrap_or_default();
        self.read_log.push(register);
        if let Some(errno) = self.failures.get(&register) {
            return Err(Error::I2c(io::Error::from_raw_os_error(*errno)));
        }
        let data = self.registers.get(&register).map(Vec::as_slice).unwrap_or(&[]);
        buf.fill(0);
        let len = buf.len().min(data.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(())
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result {
        self.written.push((register, data.to_vec()));
        Ok(())
    }
}
