/// Function codes defined by the Smart Battery Data Specification. Codes 0x1D-0x1F, 0x24-0x2E and
/// 0x30-0x3B are reserved and have no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    ManufacturerAccess = 0x00,
    RemainingCapacityAlarm = 0x01,
    RemainingTimeAlarm = 0x02,
    BatteryMode = 0x03,
    AtRate = 0x04,
    AtRateTimeToFull = 0x05,
    AtRateTimeToEmpty = 0x06,
    AtRateOk = 0x07,
    Temperature = 0x08,
    Voltage = 0x09,
    Current = 0x0A,
    AverageCurrent = 0x0B,
    MaxError = 0x0C,
    RelativeStateOfCharge = 0x0D,
    AbsoluteStateOfCharge = 0x0E,
    RemainingCapacity = 0x0F,
    FullChargeCapacity = 0x10,
    RunTimeToEmpty = 0x11,
    AverageTimeToEmpty = 0x12,
    AverageTimeToFull = 0x13,
    ChargingCurrent = 0x14,
    ChargingVoltage = 0x15,
    BatteryStatus = 0x16,
    CycleCount = 0x17,
    DesignCapacity = 0x18,
    DesignVoltage = 0x19,
    SpecificationInfo = 0x1A,
    ManufactureDate = 0x1B,
    SerialNumber = 0x1C,
    ManufacturerName = 0x20,
    DeviceName = 0x21,
    DeviceChemistry = 0x22,
    ManufacturerData = 0x23,
    OptionalMfgFunction5 = 0x2F,
    OptionalMfgFunction4 = 0x3C,
    OptionalMfgFunction3 = 0x3D,
    OptionalMfgFunction2 = 0x3E,
    OptionalMfgFunction1 = 0x3F,
}

impl Register {
    // Most packs wire the optional manufacturer functions to per-cell voltages, highest code first.
    pub const CELL1_VOLTAGE: Register = Register::OptionalMfgFunction1;
    pub const CELL2_VOLTAGE: Register = Register::OptionalMfgFunction2;
    pub const CELL3_VOLTAGE: Register = Register::OptionalMfgFunction3;
    pub const CELL4_VOLTAGE: Register = Register::OptionalMfgFunction4;

    /// The raw function code sent on the bus.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Register {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        let register = match code {
            0x00 => Register::ManufacturerAccess,
            0x01 => Register::RemainingCapacityAlarm,
            0x02 => Register::RemainingTimeAlarm,
            0x03 => Register::BatteryMode,
            0x04 => Register::AtRate,
            0x05 => Register::AtRateTimeToFull,
            0x06 => Register::AtRateTimeToEmpty,
            0x07 => Register::AtRateOk,
            0x08 => Register::Temperature,
            0x09 => Register::Voltage,
            0x0A => Register::Current,
            0x0B => Register::AverageCurrent,
            0x0C => Register::MaxError,
            0x0D => Register::RelativeStateOfCharge,
            0x0E => Register::AbsoluteStateOfCharge,
            0x0F => Register::RemainingCapacity,
            0x10 => Register::FullChargeCapacity,
            0x11 => Register::RunTimeToEmpty,
            0x12 => Register::AverageTimeToEmpty,
            0x13 => Register::AverageTimeToFull,
            0x14 => Register::ChargingCurrent,
            0x15 => Register::ChargingVoltage,
            0x16 => Register::BatteryStatus,
            0x17 => Register::CycleCount,
            0x18 => Register::DesignCapacity,
            0x19 => Register::DesignVoltage,
            0x1A => Register::SpecificationInfo,
            0x1B => Register::ManufactureDate,
            0x1C => Register::SerialNumber,
            0x20 => Register::ManufacturerName,
            0x21 => Register::DeviceName,
            0x22 => Register::DeviceChemistry,
            0x23 => Register::ManufacturerData,
            0x2F => Register::OptionalMfgFunction5,
            0x3C => Register::OptionalMfgFunction4,
            0x3D => Register::OptionalMfgFunction3,
            0x3E => Register::OptionalMfgFunction2,
            0x3F => Register::OptionalMfgFunction1,
            other => return Err(other),
        };
        Ok(register)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_voltages_alias_manufacturer_functions() {
        assert_eq!(Register::CELL1_VOLTAGE.code(), 0x3F);
        assert_eq!(Register::CELL4_VOLTAGE.code(), 0x3C);
    }

    #[test]
    fn reserved_codes_are_rejected() {
        assert_eq!(Register::try_from(0x1D), Err(0x1D));
        assert_eq!(Register::try_from(0x30), Err(0x30));
        assert_eq!(Register::try_from(0x40), Err(0x40));
        assert_eq!(Register::try_from(0x1A), Ok(Register::SpecificationInfo));
    }
}
