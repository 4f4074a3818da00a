use clap::{ArgAction, CommandFactory, Parser};
use smart_battery::{LinuxTransport, Report, ReportOptions, SmartBattery};
use std::io::Write;
use std::process::ExitCode;

const EINVAL: u8 = 22;

/// Prints the state of a Smart Battery (SBS) on an I2C bus
#[derive(Debug, Parser)]
#[command(version, about, disable_help_flag = true)]
struct Args {
    /// I2C bus number
    #[arg(short = 'i', long = "bus", default_value = "1", value_parser = parse_bus)]
    bus: u32,

    /// SmartBattery device address (3 .. 119)
    #[arg(short, long, default_value = "0x0b", value_parser = parse_address)]
    address: u16,

    /// Force acquisition of all data, continuing past failed registers
    #[arg(short, long)]
    force: bool,

    /// Print usage
    #[arg(short, long, action = ArgAction::SetTrue)]
    help: bool,
}

/// Accepts decimal, `0x` hexadecimal and `0` octal numbers.
fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        u32::from_str_radix(&s[1..], 8)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid number {s:?}: {e}"))
}

fn parse_bus(s: &str) -> Result<u32, String> {
    parse_number(s)
}

fn parse_address(s: &str) -> Result<u16, String> {
    match parse_number(s)? {
        addr @ 3..=119 => Ok(addr as u16),
        _ => Err("address range is 3 .. 119".to_string()),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    if args.help {
        Args::command().print_help()?;
        return Ok(ExitCode::from(EINVAL));
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init()?;
    log::debug!("querying address {:#04x} on bus {}", args.address, args.bus);

    let mut battery = SmartBattery::new(LinuxTransport::new(args.bus, args.address));
    let mut out = std::io::stdout().lock();
    let result = Report::default().run(&mut battery, &mut out, ReportOptions { force: args.force });
    out.flush()?;

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            log::error!("report failed: {e}");
            Ok(ExitCode::from(u8::try_from(e.errno()).unwrap_or(u8::MAX)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_follow_c_prefixes() {
        assert_eq!(parse_number("11"), Ok(11));
        assert_eq!(parse_number("0x0b"), Ok(11));
        assert_eq!(parse_number("013"), Ok(11));
        assert_eq!(parse_number("0"), Ok(0));
        assert!(parse_number("eleven").is_err());
    }

    #[test]
    fn address_range_is_enforced() {
        assert_eq!(parse_address("3"), Ok(3));
        assert_eq!(parse_address("0x77"), Ok(119));
        assert!(parse_address("2").is_err());
        assert!(parse_address("120").is_err());
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["smartbatt"]).unwrap();
        assert_eq!(args.bus, 1);
        assert_eq!(args.address, 0x0B);
        assert!(!args.force);
        assert!(!args.help);
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from(["smartbatt", "-i", "3", "-a", "0x16", "-f"]).unwrap();
        assert_eq!(args.bus, 3);
        assert_eq!(args.address, 0x16);
        assert!(args.force);
        assert!(Args::try_parse_from(["smartbatt", "-a", "200"]).is_err());
        assert!(Args::try_parse_from(["smartbatt", "-x"]).is_err());
        assert!(Args::try_parse_from(["smartbatt", "-h"]).unwrap().help);
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }
}
