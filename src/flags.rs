use crate::scale::CapacityUnit;
use std::fmt;

const MODE_CLEAR: [Option<&str>; 16] = [
    Some("Internal Charge Controller Not Supported"),
    Some("Primary Battery Not Supported"),
    None,
    None,
    None,
    None,
    None,
    Some("Battery OK"),
    Some("Internal Charge Control Disabled (default)"),
    Some("Battery operating in its secondary role (default)"),
    None,
    None,
    None,
    Some("Broadcasts of AlarmWarning to Host and Smart Battery Charger Enabled (default)"),
    Some("Broadcasts of ChargingVoltage and ChargingCurrent to Smart Battery Charger Enabled (default)"),
    Some("Report in mA or mAh (default)"),
];

const MODE_SET: [Option<&str>; 16] = [
    Some("Internal Charge Controller Supported"),
    Some("Primary Battery Supported"),
    None,
    None,
    None,
    None,
    None,
    Some("Conditioning Cycle Requested"),
    Some("Internal Charge Control Enabled"),
    Some("Battery operating in its primary role"),
    None,
    None,
    None,
    Some("Broadcasts of AlarmWarning to Host and Smart Battery Charger Disabled"),
    Some("Broadcasts of ChargingVoltage and ChargingCurrent to Smart Battery Charger Disabled"),
    Some("Report in 10mW or 10mWh"),
];

// Bits 0-3 hold the error code and are rendered separately.
const STATUS: [Option<&str>; 16] = [
    None,
    None,
    None,
    None,
    Some("FULLY DISCHARGED"),
    Some("FULLY CHARGED"),
    Some("DISCHARGING"),
    Some("INITIALIZED"),
    Some("REMAINING TIME ALARM"),
    Some("REMAINING CAPACITY ALARM"),
    None,
    Some("TERMINATE DISCHARGE ALARM"),
    Some("OVER TEMP ALARM"),
    None,
    Some("TERMINATE CHARGE ALARM"),
    Some("OVER CHARGED ALARM"),
];

const CAPACITY_MODE: u16 = 1 << 15;

/// The BatteryMode word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryMode(pub u16);

impl BatteryMode {
    pub fn capacity_unit(self) -> CapacityUnit {
        if self.0 & CAPACITY_MODE != 0 {
            CapacityUnit::Energy
        } else {
            CapacityUnit::Charge
        }
    }

    pub fn is_set(self, bit: u8) -> bool {
        self.0 & (1 << bit) != 0
    }

    /// `(bit, set, description)` for every bit that is not reserved.
    pub fn describe(self) -> impl Iterator<Item = (u8, bool, &'static str)> {
        (0..16u8).filter_map(move |bit| {
            let set = self.is_set(bit);
            let table = if set { &MODE_SET } else { &MODE_CLEAR };
            table[usize::from(bit)].map(|descr| (bit, set, descr))
        })
    }
}

impl fmt::Display for BatteryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)?;
        for (bit, set, descr) in self.describe() {
            write!(f, "\n  Bit {bit}: {} {descr}", u8::from(set))?;
        }
        Ok(())
    }
}

/// Result of the last command the battery processed, from the low nibble of BatteryStatus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Ok,
    Busy,
    ReservedCommand,
    UnsupportedCommand,
    AccessDenied,
    OverUnderflow,
    BadSize,
    UnknownError,
    Undefined(u8),
}

impl ErrorCode {
    pub fn from_nibble(code: u8) -> ErrorCode {
        match code & 0x0F {
            0 => ErrorCode::Ok,
            1 => ErrorCode::Busy,
            2 => ErrorCode::ReservedCommand,
            3 => ErrorCode::UnsupportedCommand,
            4 => ErrorCode::AccessDenied,
            5 => ErrorCode::OverUnderflow,
            6 => ErrorCode::BadSize,
            7 => ErrorCode::UnknownError,
            other => ErrorCode::Undefined(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            ErrorCode::Ok => 0,
            ErrorCode::Busy => 1,
            ErrorCode::ReservedCommand => 2,
            ErrorCode::UnsupportedCommand => 3,
            ErrorCode::AccessDenied => 4,
            ErrorCode::OverUnderflow => 5,
            ErrorCode::BadSize => 6,
            ErrorCode::UnknownError => 7,
            ErrorCode::Undefined(code) => code,
        }
    }

    fn description(self) -> Option<&'static str> {
        match self {
            ErrorCode::Ok => Some("OK"),
            ErrorCode::Busy => Some("Busy"),
            ErrorCode::ReservedCommand => Some("Reserved command"),
            ErrorCode::UnsupportedCommand => Some("Unsupported command"),
            ErrorCode::AccessDenied => Some("Access denied"),
            ErrorCode::OverUnderflow => Some("Overflow/Underflow"),
            ErrorCode::BadSize => Some("Bad size"),
            ErrorCode::UnknownError => Some("Unknown error"),
            ErrorCode::Undefined(_) => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description() {
            Some(descr) => write!(f, "{} ({descr})", self.code()),
            None => write!(f, "{}", self.code()),
        }
    }
}

/// The BatteryStatus word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus(pub u16);

impl BatteryStatus {
    pub fn error_code(self) -> ErrorCode {
        ErrorCode::from_nibble((self.0 & 0x0F) as u8)
    }

    pub fn is_set(self, bit: u8) -> bool {
        self.0 & (1 << bit) != 0
    }

    /// Set status bits above the error code, with a name unless the bit is reserved.
    pub fn alarms(self) -> impl Iterator<Item = (u8, Option<&'static str>)> {
        (4..16u8)
            .filter(move |bit| self.is_set(*bit))
            .map(|bit| (bit, STATUS[usize::from(bit)]))
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}\n  Error code: {}", self.0, self.error_code())?;
        for (bit, descr) in self.alarms() {
            match descr {
                Some(descr) => write!(f, "\n  Bit {bit}: {descr}")?,
                None => write!(f, "\n  Bit {bit}")?,
            }
        }
        Ok(())
    }
}
