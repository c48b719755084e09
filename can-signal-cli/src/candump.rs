//! candump log format
//!
//! Reads and writes classic CAN frames in the text format produced by
//! `candump -L`:
//!
//! ```text
//! (1436509053.850870) vcan0 1A0#9C20407F96EA167B
//! ```
//!
//! The timestamp and interface are optional on input. CAN FD frames (`##`) are
//! rejected since their payload does not fit a classic frame.

use anyhow::{anyhow, bail, Context, Result};
use can_signal_codec::signals::MAX_CAN_ID;
use can_signal_codec::CanFrame;

/// Parse one candump line
///
/// Returns `Ok(None)` for blank lines and `#`-prefixed comments.
pub fn parse_line(line: &str) -> Result<Option<CanFrame>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    // The id#data token is always last
    let token = line
        .split_whitespace()
        .last()
        .ok_or_else(|| anyhow!("Error no id#data on {line}"))?;

    if token.contains("##") {
        bail!("CAN FD frame not supported: {token}");
    }

    let (id_str, data_str) = token
        .split_once('#')
        .ok_or_else(|| anyhow!("Error no id#data on {line}"))?;

    if id_str.is_empty() || !is_hex(id_str) {
        bail!("Invalid CAN ID '{id_str}' on {line}");
    }
    let id = u32::from_str_radix(id_str, 16)
        .with_context(|| format!("Invalid CAN ID '{id_str}' on {line}"))?;
    if id > MAX_CAN_ID {
        bail!("CAN ID 0x{id:X} exceeds 29 bits on {line}");
    }

    // Remote transmission request carries no payload
    if data_str.starts_with('R') {
        return Ok(Some(CanFrame::new(id, 0, [0; 8])));
    }

    let payload = hex_to_bytes(data_str).with_context(|| format!("Invalid payload on {line}"))?;
    let frame = CanFrame::from_slice(id, &payload)?;
    Ok(Some(frame))
}

/// Turn the hex payload of a candump line into bytes
fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    if !is_hex(hex) {
        bail!("non-hex characters in '{hex}'");
    }
    if hex.len() % 2 != 0 {
        bail!("odd number of hex digits in '{hex}'");
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(anyhow::Error::from))
        .collect()
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Format a frame as a candump line for the given interface
///
/// IDs above the 11-bit range are written with 8 digits, as candump does for
/// extended frames.
pub fn format_frame(interface: &str, frame: &CanFrame) -> String {
    let id = if frame.id > 0x7FF {
        format!("{:08X}", frame.id)
    } else {
        format!("{:03X}", frame.id)
    };

    let data: String = frame.payload().iter().map(|b| format!("{:02X}", b)).collect();
    format!("{} {}#{}", interface, id, data)
}
