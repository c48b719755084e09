//! `NAME=VALUE` assignments for the encode command

use anyhow::{anyhow, bail, Context, Result};
use can_signal_codec::{SignalTable, SignalType, SignalValue};

/// Parse an assignment into a signal name and a value of the signal's declared type
///
/// Booleans accept `true`/`false`/`on`/`off`/`1`/`0`; integers accept decimal
/// or `0x`-prefixed hex.
pub fn parse_assignment(table: &SignalTable, assignment: &str) -> Result<(String, SignalValue)> {
    let (name, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected NAME=VALUE, got '{assignment}'"))?;
    let name = name.trim();
    let value = value.trim();

    let signal = table
        .find_by_name(name)
        .ok_or_else(|| anyhow!("Unknown signal '{name}'"))?;

    let parsed = match signal.signal_type {
        SignalType::Bool => SignalValue::Bool(parse_bool(value)?),
        SignalType::UInt8 => {
            let v = parse_int(value)?;
            SignalValue::UInt8(u8::try_from(v).with_context(|| format!("{name}: {v} does not fit uint8"))?)
        }
        SignalType::UInt16 => {
            let v = parse_int(value)?;
            SignalValue::UInt16(u16::try_from(v).with_context(|| format!("{name}: {v} does not fit uint16"))?)
        }
    };

    Ok((name.to_string(), parsed))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => bail!("Invalid boolean '{value}'"),
    }
}

fn parse_int(value: &str) -> Result<u32> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    };
    parsed.with_context(|| format!("Invalid integer '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_signal_codec::SignalDescriptor;

    fn table() -> SignalTable {
        let descriptor = |name: &str, start: u8, end: u8, ty: SignalType| SignalDescriptor {
            frame_id: 0x400,
            signal_id: 1,
            name: name.to_string(),
            start_bit: start,
            end_bit: end,
            min: 0,
            max: if ty == SignalType::Bool { 1 } else { 1000 },
            signal_type: ty,
        };

        SignalTable::new(vec![
            descriptor("Brake", 0, 0, SignalType::Bool),
            descriptor("Speed", 8, 15, SignalType::UInt8),
            descriptor("Rpm", 16, 31, SignalType::UInt16),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_by_declared_type() {
        let table = table();
        assert_eq!(
            parse_assignment(&table, "Brake=on").unwrap(),
            ("Brake".to_string(), SignalValue::Bool(true))
        );
        assert_eq!(
            parse_assignment(&table, " Speed = 42 ").unwrap().1,
            SignalValue::UInt8(42)
        );
        assert_eq!(
            parse_assignment(&table, "Rpm=0x0BB8").unwrap().1,
            SignalValue::UInt16(3000)
        );
    }

    #[test]
    fn test_parse_errors() {
        let table = table();
        assert!(parse_assignment(&table, "Speed").is_err());
        assert!(parse_assignment(&table, "Unknown=1").is_err());
        assert!(parse_assignment(&table, "Speed=256").is_err());
        assert!(parse_assignment(&table, "Brake=maybe").is_err());
        assert!(parse_assignment(&table, "Rpm=-1").is_err());
    }
}
