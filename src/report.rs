use crate::decode::{DecodedField, DecoderKind, WordDecoder};
use crate::registers::Register;
use crate::scale::ScaleState;
use crate::transport::Transport;
use crate::{Result, SmartBattery};
use std::io::{self, Write};

/// One line of the report: which register to read, how to decode it and what to call it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportEntry {
    pub register: Register,
    pub decoder: DecoderKind,
    pub label: &'static str,
}

impl ReportEntry {
    pub const fn new(register: Register, decoder: DecoderKind, label: &'static str) -> Self {
        ReportEntry {
            register,
            decoder,
            label,
        }
    }

    const fn word(register: Register, decoder: WordDecoder, label: &'static str) -> Self {
        ReportEntry::new(register, DecoderKind::Word(decoder), label)
    }
}

/// The full Smart Battery report.
///
/// SpecificationInfo and BatteryMode must stay the first two entries: every voltage, current and
/// capacity decoded after them depends on the scale factors and capacity unit they establish.
pub const SMART_BATTERY_REPORT: &[ReportEntry] = &[
    ReportEntry::word(
        Register::SpecificationInfo,
        WordDecoder::SpecificationInfo,
        "Specification info",
    ),
    ReportEntry::word(Register::BatteryMode, WordDecoder::BatteryMode, "Battery mode"),
    ReportEntry::word(
        Register::BatteryStatus,
        WordDecoder::BatteryStatus,
        "Battery status",
    ),
    ReportEntry::word(
        Register::ManufacturerAccess,
        WordDecoder::HexInt16,
        "Manufacturer access",
    ),
    ReportEntry::new(
        Register::ManufacturerName,
        DecoderKind::Text,
        "Manufacturer name",
    ),
    ReportEntry::new(Register::DeviceName, DecoderKind::Text, "Device name"),
    ReportEntry::new(
        Register::DeviceChemistry,
        DecoderKind::Text,
        "Device chemistry",
    ),
    ReportEntry::word(Register::SerialNumber, WordDecoder::HexInt16, "S/N"),
    ReportEntry::word(
        Register::ManufactureDate,
        WordDecoder::DateCode,
        "Manufacture date",
    ),
    ReportEntry::new(
        Register::ManufacturerData,
        DecoderKind::ByteBlob,
        "Manufacturer data",
    ),
    ReportEntry::word(
        Register::DesignCapacity,
        WordDecoder::Capacity,
        "Design capacity",
    ),
    ReportEntry::word(Register::DesignVoltage, WordDecoder::Voltage, "Design voltage"),
    ReportEntry::word(
        Register::ChargingVoltage,
        WordDecoder::Voltage,
        "Charging voltage",
    ),
    ReportEntry::word(
        Register::ChargingCurrent,
        WordDecoder::Current,
        "Charging current",
    ),
    ReportEntry::word(Register::Temperature, WordDecoder::Temperature, "Temperature"),
    ReportEntry::word(Register::Voltage, WordDecoder::Voltage, "Voltage"),
    ReportEntry::word(Register::CELL1_VOLTAGE, WordDecoder::Voltage, "Cell 1 voltage"),
    ReportEntry::word(Register::CELL2_VOLTAGE, WordDecoder::Voltage, "Cell 2 voltage"),
    ReportEntry::word(Register::CELL3_VOLTAGE, WordDecoder::Voltage, "Cell 3 voltage"),
    ReportEntry::word(Register::CELL4_VOLTAGE, WordDecoder::Voltage, "Cell 4 voltage"),
    ReportEntry::word(Register::Current, WordDecoder::Current, "Current"),
    ReportEntry::word(
        Register::AverageCurrent,
        WordDecoder::Current,
        "Average current",
    ),
    ReportEntry::word(
        Register::FullChargeCapacity,
        WordDecoder::Capacity,
        "Full charge capacity",
    ),
    ReportEntry::word(
        Register::RemainingCapacity,
        WordDecoder::Capacity,
        "Remaining capacity",
    ),
    ReportEntry::word(
        Register::RelativeStateOfCharge,
        WordDecoder::Percentage,
        "Relative state of charge",
    ),
    ReportEntry::word(
        Register::AbsoluteStateOfCharge,
        WordDecoder::Percentage,
        "Absolute state of charge",
    ),
    ReportEntry::word(
        Register::AverageTimeToFull,
        WordDecoder::Minutes,
        "Average time to full",
    ),
    ReportEntry::word(
        Register::AverageTimeToEmpty,
        WordDecoder::Minutes,
        "Average time to empty",
    ),
    ReportEntry::word(Register::CycleCount, WordDecoder::UInt16, "Cycle count"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Keep going after a failed register instead of stopping at the first one.
    pub force: bool,
}

/// Runs a table of [`ReportEntry`] against a battery, writing one labelled line (or block) per
/// entry.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    entries: &'a [ReportEntry],
}

impl Default for Report<'static> {
    fn default() -> Self {
        Report::new(SMART_BATTERY_REPORT)
    }
}

impl<'a> Report<'a> {
    pub fn new(entries: &'a [ReportEntry]) -> Report<'a> {
        Report { entries }
    }

    pub fn entries(&self) -> &'a [ReportEntry] {
        self.entries
    }

    /// Without `force` the first failing entry ends the run and is returned. With `force` every
    /// entry is attempted and the last failure, if any, is returned. Failures to write `out` always
    /// end the run.
    pub fn run<T: Transport, W: Write>(
        &self,
        battery: &mut SmartBattery<T>,
        out: &mut W,
        options: ReportOptions,
    ) -> Result {
        let mut scale = ScaleState::default();
        let mut outcome = Ok(());

        for entry in self.entries {
            log::debug!(
                "reading {} from register {:#04x}",
                entry.label,
                entry.register.code()
            );
            match entry.decoder.fetch(battery, entry.register, &scale) {
                Ok(field) => {
                    learn(&mut scale, &field);
                    write_field(out, entry.label, &field)?;
                }
                Err(e) => {
                    writeln!(out, "{} failed: {e}", entry.label)?;
                    if !options.force {
                        return Err(e);
                    }
                    log::warn!("{} failed, continuing: {e}", entry.label);
                    outcome = Err(e);
                }
            }
        }

        match capacity_health(battery) {
            Some(health) => writeln!(out, "Maximum capacity (health): {health:.0} %")?,
            None => log::debug!("capacity health unavailable"),
        }

        outcome
    }
}

fn learn(scale: &mut ScaleState, field: &DecodedField) {
    match field {
        DecodedField::SpecVersion(info) => scale.learn_specification(info),
        DecodedField::BatteryMode(mode) => scale.learn_capacity_unit(mode.capacity_unit()),
        _ => {}
    }
}

fn write_field<W: Write>(out: &mut W, label: &str, field: &DecodedField) -> io::Result<()> {
    match field {
        DecodedField::ByteBlob(bytes) if bytes.is_empty() => writeln!(out, "{label}:"),
        DecodedField::ByteBlob(_) => writeln!(out, "{label}:\n{field}"),
        _ => writeln!(out, "{label}: {field}"),
    }
}

/// Full-charge capacity as a percentage of design capacity, from raw unscaled words. Any read
/// failure just means there is nothing to show.
fn capacity_health<T: Transport>(battery: &mut SmartBattery<T>) -> Option<f64> {
    let design = battery.fetch_word(Register::DesignCapacity, 16).ok()?;
    let full = battery.fetch_word(Register::FullChargeCapacity, 16).ok()?;
    Some(f64::from(full) / f64::from(design) * 100.0)
}
