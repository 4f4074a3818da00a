use crate::flags::{BatteryMode, BatteryStatus};
use crate::registers::Register;
use crate::scale::{CapacityUnit, ScaleState, SpecificationInfo};
use crate::transport::Transport;
use crate::{Result, SmartBattery};
use std::fmt;

/// Month names for the ManufactureDate month field, which counts from 1.
pub const MONTHS: [&str; 13] = [
    "", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const UNKNOWN_MINUTES: u16 = u16::MAX;
const BYTES_PER_LINE: usize = 16;

/// Interpretation of a register's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderKind {
    /// A 16-bit word decoded by [`decode_word`].
    Word(WordDecoder),
    /// Length-prefixed ASCII string.
    Text,
    /// Length-prefixed binary data, dumped as hex.
    ByteBlob,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordDecoder {
    UInt16,
    HexInt16,
    Voltage,
    Current,
    Capacity,
    Temperature,
    Minutes,
    Percentage,
    DateCode,
    SpecificationInfo,
    BatteryMode,
    BatteryStatus,
}

impl DecoderKind {
    /// Reads `register` and decodes it with the scale factors learned so far.
    pub fn fetch<T: Transport>(
        self,
        battery: &mut SmartBattery<T>,
        register: Register,
        scale: &ScaleState,
    ) -> Result<DecodedField> {
        match self {
            DecoderKind::Word(decoder) => {
                let raw = battery.fetch_word(register, 16)? as u16;
                Ok(decode_word(decoder, raw, scale))
            }
            DecoderKind::Text => Ok(DecodedField::text(&battery.fetch_block(register)?)),
            DecoderKind::ByteBlob => Ok(DecodedField::ByteBlob(battery.fetch_block(register)?)),
        }
    }
}

/// A register value after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedField {
    UInt16(u16),
    HexInt16(u16),
    /// Volts.
    Voltage(f64),
    /// Amps, negative while discharging.
    Current(f64),
    /// mAh in [`CapacityUnit::Charge`], Wh in [`CapacityUnit::Energy`].
    Capacity { value: f64, unit: CapacityUnit },
    Temperature { celsius: f64, fahrenheit: f64 },
    Duration(Duration),
    Percentage(u16),
    Text(String),
    ByteBlob(Vec<u8>),
    DateCode(DateCode),
    BatteryMode(BatteryMode),
    BatteryStatus(BatteryStatus),
    SpecVersion(SpecificationInfo),
}

impl DecodedField {
    /// Renders a string payload as ASCII, stopping at the first NUL.
    pub fn text(bytes: &[u8]) -> DecodedField {
        let text = bytes
            .iter()
            .take_while(|b| **b != 0)
            .map(|b| if b.is_ascii() { char::from(*b) } else { '?' })
            .collect();
        DecodedField::Text(text)
    }
}

/// Pure decoding of a 16-bit register word.
pub fn decode_word(decoder: WordDecoder, raw: u16, scale: &ScaleState) -> DecodedField {
    match decoder {
        WordDecoder::UInt16 => DecodedField::UInt16(raw),
        WordDecoder::HexInt16 => DecodedField::HexInt16(raw),
        WordDecoder::Voltage => {
            DecodedField::Voltage(f64::from(raw) * scale.voltage_scale as f64 / 1000.0)
        }
        WordDecoder::Current => {
            DecodedField::Current(f64::from(raw as i16) * scale.current_scale as f64 / 1000.0)
        }
        WordDecoder::Capacity => {
            let value = f64::from(raw) * scale.current_scale as f64;
            match scale.capacity_unit {
                CapacityUnit::Charge => DecodedField::Capacity {
                    value,
                    unit: CapacityUnit::Charge,
                },
                CapacityUnit::Energy => DecodedField::Capacity {
                    value: value / 100.0,
                    unit: CapacityUnit::Energy,
                },
            }
        }
        WordDecoder::Temperature => {
            let celsius = f64::from(raw) / 10.0 - 273.15;
            DecodedField::Temperature {
                celsius,
                fahrenheit: celsius * 1.8 + 32.0,
            }
        }
        WordDecoder::Minutes => DecodedField::Duration(Duration::from_raw(raw)),
        WordDecoder::Percentage => DecodedField::Percentage(raw),
        WordDecoder::DateCode => DecodedField::DateCode(DateCode::from_raw(raw)),
        WordDecoder::SpecificationInfo => {
            DecodedField::SpecVersion(SpecificationInfo::from_raw(raw))
        }
        WordDecoder::BatteryMode => DecodedField::BatteryMode(BatteryMode(raw)),
        WordDecoder::BatteryStatus => DecodedField::BatteryStatus(BatteryStatus(raw)),
    }
}

impl fmt::Display for DecodedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedField::UInt16(v) => write!(f, "{v}"),
            DecodedField::HexInt16(v) => write!(f, "0x{v:X} ({v})"),
            DecodedField::Voltage(v) => write!(f, "{v:.3} V"),
            DecodedField::Current(a) => write!(f, "{a:.3} A"),
            DecodedField::Capacity {
                value,
                unit: CapacityUnit::Charge,
            } => write!(f, "{value} mAh"),
            DecodedField::Capacity {
                value,
                unit: CapacityUnit::Energy,
            } => write!(f, "{value:.2} Wh"),
            DecodedField::Temperature {
                celsius,
                fahrenheit,
            } => write!(f, "{celsius:.2}°C ({fahrenheit:.2}°F)"),
            DecodedField::Duration(d) => write!(f, "{d}"),
            DecodedField::Percentage(p) => write!(f, "{p} %"),
            DecodedField::Text(s) => f.write_str(s),
            DecodedField::ByteBlob(bytes) => f.write_str(&render_hex_dump(bytes)),
            DecodedField::DateCode(date) => write!(f, "{date}"),
            DecodedField::BatteryMode(mode) => write!(f, "{mode}"),
            DecodedField::BatteryStatus(status) => write!(f, "{status}"),
            DecodedField::SpecVersion(info) => write!(f, "{info}"),
        }
    }
}

/// A time estimate in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    /// The battery reports 65535 when it has no estimate.
    Unknown,
    Minutes(u16),
}

impl Duration {
    pub fn from_raw(raw: u16) -> Duration {
        if raw == UNKNOWN_MINUTES {
            Duration::Unknown
        } else {
            Duration::Minutes(raw)
        }
    }

    /// `(hours, minutes)` breakdown.
    pub fn hours_minutes(self) -> Option<(u16, u16)> {
        match self {
            Duration::Unknown => None,
            Duration::Minutes(m) => Some((m / 60, m % 60)),
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duration::Unknown => f.write_str("unknown"),
            Duration::Minutes(total) => {
                write!(f, "{total} min ({} h {} min)", total / 60, total % 60)
            }
        }
    }
}

/// ManufactureDate: day in bits 0-4, month in bits 5-8, years since 1980 in bits 9-15.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateCode {
    pub raw: u16,
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl DateCode {
    pub fn from_raw(raw: u16) -> DateCode {
        DateCode {
            raw,
            day: (raw & 0x1F) as u8,
            month: ((raw >> 5) & 0x0F) as u8,
            year: 1980 + ((raw >> 9) & 0x7F),
        }
    }

    pub fn month_name(&self) -> Option<&'static str> {
        match self.month {
            1..=12 => Some(MONTHS[usize::from(self.month)]),
            _ => None,
        }
    }
}

impl fmt::Display for DateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:X} ({} {}, {})",
            self.raw,
            self.month_name().unwrap_or("???"),
            self.day,
            self.year
        )
    }
}

/// Uppercase hex, 16 bytes per indented line.
pub fn render_hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(BYTES_PER_LINE)
        .map(|line| {
            let hex: Vec<String> = line.iter().map(|b| format!("{b:02X}")).collect();
            format!("  {}", hex.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;

    fn unit_scale() -> ScaleState {
        ScaleState::default()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn voltage_is_millivolts_times_scale() {
        let field = decode_word(WordDecoder::Voltage, 4200, &unit_scale());
        assert_eq!(field, DecodedField::Voltage(4.2));
        assert_eq!(field.to_string(), "4.200 V");

        let scale = ScaleState {
            voltage_scale: 10,
            ..ScaleState::default()
        };
        assert_eq!(
            decode_word(WordDecoder::Voltage, 1260, &scale),
            DecodedField::Voltage(12.6)
        );
    }

    #[test]
    fn current_is_signed() {
        let field = decode_word(WordDecoder::Current, 0xFF9C, &unit_scale());
        assert_eq!(field, DecodedField::Current(-0.1));
        assert_eq!(field.to_string(), "-0.100 A");
    }

    #[test]
    fn capacity_follows_unit_mode() {
        let field = decode_word(WordDecoder::Capacity, 2000, &unit_scale());
        assert_eq!(field.to_string(), "2000 mAh");

        let energy = ScaleState {
            capacity_unit: CapacityUnit::Energy,
            ..ScaleState::default()
        };
        let field = decode_word(WordDecoder::Capacity, 2000, &energy);
        assert_eq!(
            field,
            DecodedField::Capacity {
                value: 20.0,
                unit: CapacityUnit::Energy
            }
        );
        assert_eq!(field.to_string(), "20.00 Wh");
    }

    #[test]
    fn capacity_applies_current_scale() {
        let scale = ScaleState {
            current_scale: 10,
            ..ScaleState::default()
        };
        assert_eq!(
            decode_word(WordDecoder::Capacity, 440, &scale).to_string(),
            "4400 mAh"
        );
    }

    #[test]
    fn temperature_from_decikelvin() {
        match decode_word(WordDecoder::Temperature, 2981, &unit_scale()) {
            DecodedField::Temperature {
                celsius,
                fahrenheit,
            } => {
                assert!(approx(celsius, 24.95));
                assert!(approx(fahrenheit, 76.91));
            }
            other => panic!("unexpected field {other:?}"),
        }
        assert_eq!(
            decode_word(WordDecoder::Temperature, 2981, &unit_scale()).to_string(),
            "24.95°C (76.91°F)"
        );
    }

    #[test]
    fn minutes_with_unknown_sentinel() {
        assert_eq!(
            decode_word(WordDecoder::Minutes, 65535, &unit_scale()).to_string(),
            "unknown"
        );
        let field = decode_word(WordDecoder::Minutes, 125, &unit_scale());
        assert_eq!(field, DecodedField::Duration(Duration::Minutes(125)));
        assert_eq!(field.to_string(), "125 min (2 h 5 min)");
        assert_eq!(Duration::from_raw(65534).hours_minutes(), Some((1092, 14)));
    }

    #[test]
    fn plain_words() {
        let scale = unit_scale();
        assert_eq!(decode_word(WordDecoder::UInt16, 312, &scale).to_string(), "312");
        assert_eq!(
            decode_word(WordDecoder::HexInt16, 0x1A2B, &scale).to_string(),
            "0x1A2B (6699)"
        );
        assert_eq!(decode_word(WordDecoder::Percentage, 87, &scale).to_string(), "87 %");
    }

    #[test]
    fn date_code_unpacks() {
        let date = DateCode::from_raw(0x3A45);
        assert_eq!((date.day, date.month, date.year), (5, 2, 2009));
        assert_eq!(date.month_name(), Some("Feb"));
        assert_eq!(date.to_string(), "0x3A45 (Feb 5, 2009)");
    }

    #[test]
    fn date_code_with_out_of_range_month() {
        let date = DateCode::from_raw(0x01A1);
        assert_eq!(date.month, 13);
        assert_eq!(date.month_name(), None);
        assert_eq!(date.to_string(), "0x1A1 (??? 1, 1980)");
        assert_eq!(DateCode::from_raw(0).month_name(), None);
    }

    #[test]
    fn text_is_ascii_up_to_nul() {
        assert_eq!(DecodedField::text(b"LION"), DecodedField::Text("LION".into()));
        assert_eq!(
            DecodedField::text(b"SMP\0junk"),
            DecodedField::Text("SMP".into())
        );
        assert_eq!(
            DecodedField::text(&[b'A', 0xC3, b'B']),
            DecodedField::Text("A?B".into())
        );
    }

    #[test]
    fn hex_dump_wraps_at_sixteen() {
        let bytes: Vec<u8> = (0..18).collect();
        assert_eq!(
            render_hex_dump(&bytes),
            "  00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F\n  10 11"
        );
        assert_eq!(render_hex_dump(&[0xAB]), "  AB");
        assert_eq!(render_hex_dump(&[]), "");
    }

    #[test]
    fn fetch_reads_blocks_for_text_and_blob() -> anyhow::Result<()> {
        let bus = MockBus::new()
            .with_block(Register::DeviceChemistry, b"\x04LION")
            .with_block(Register::ManufacturerData, &[2, 0xDE, 0xAD]);
        let mut battery = SmartBattery::new(bus);
        let scale = unit_scale();
        assert_eq!(
            DecoderKind::Text.fetch(&mut battery, Register::DeviceChemistry, &scale)?,
            DecodedField::Text("LION".into())
        );
        assert_eq!(
            DecoderKind::ByteBlob.fetch(&mut battery, Register::ManufacturerData, &scale)?,
            DecodedField::ByteBlob(vec![0xDE, 0xAD])
        );
        assert_eq!(battery.transport().reads(), 4);
        Ok(())
    }

    #[test]
    fn fetch_fails_when_block_read_fails() {
        let bus = MockBus::new().failing(Register::DeviceName, 5);
        let mut battery = SmartBattery::new(bus);
        let err = DecoderKind::Text
            .fetch(&mut battery, Register::DeviceName, &unit_scale())
            .unwrap_err();
        assert_eq!(err.errno(), 5);
    }
}
