use std::fmt;

/// How capacity registers are reported, selected by bit 15 of BatteryMode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CapacityUnit {
    /// mAh (and mA for rates).
    #[default]
    Charge,
    /// 10 mWh (and 10 mW for rates).
    Energy,
}

/// Scale factors learned while a report runs. Starts out as 1/1/[`CapacityUnit::Charge`] and is
/// only meaningful once SpecificationInfo and BatteryMode have been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleState {
    pub voltage_scale: u64,
    pub current_scale: u64,
    pub capacity_unit: CapacityUnit,
}

impl Default for ScaleState {
    fn default() -> Self {
        ScaleState {
            voltage_scale: 1,
            current_scale: 1,
            capacity_unit: CapacityUnit::Charge,
        }
    }
}

impl ScaleState {
    pub fn learn_specification(&mut self, info: &SpecificationInfo) {
        self.voltage_scale = info.voltage_scale();
        self.current_scale = info.current_scale();
    }

    pub fn learn_capacity_unit(&mut self, unit: CapacityUnit) {
        self.capacity_unit = unit;
    }
}

/// Versions of the data specification, indexed by the version nibble.
const VERSIONS: [Option<&str>; 16] = [
    None,
    Some("1.0"),
    Some("1.1"),
    Some("1.1 with optional PEC"),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

/// The SpecificationInfo word: four nibbles, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecificationInfo {
    pub revision: u8,
    pub version: u8,
    pub voltage_exponent: u8,
    pub current_exponent: u8,
}

impl SpecificationInfo {
    pub fn from_raw(raw: u16) -> SpecificationInfo {
        SpecificationInfo {
            revision: (raw & 0x0F) as u8,
            version: ((raw >> 4) & 0x0F) as u8,
            voltage_exponent: ((raw >> 8) & 0x0F) as u8,
            current_exponent: ((raw >> 12) & 0x0F) as u8,
        }
    }

    pub fn voltage_scale(&self) -> u64 {
        10u64.pow(u32::from(self.voltage_exponent))
    }

    pub fn current_scale(&self) -> u64 {
        10u64.pow(u32::from(self.current_exponent))
    }

    /// Human name of the version nibble, if it is a known one.
    pub fn version_label(&self) -> Option<&'static str> {
        VERSIONS[usize::from(self.version & 0x0F)]
    }
}

impl fmt::Display for SpecificationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rev. {}, Ver. {}", self.revision, self.version)?;
        if let Some(label) = self.version_label() {
            write!(f, " ({label})")?;
        }
        write!(
            f,
            ", vscale 10^{} = {}, ipscale 10^{} = {}",
            self.voltage_exponent,
            self.voltage_scale(),
            self.current_exponent,
            self.current_scale()
        )
    }
}
