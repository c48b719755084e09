//! Encode/decode loop over a small dashboard signal table
//!
//! Sends a few values through the encoder, feeds every transmitted frame back
//! into the decoder and prints what the application would receive.
//!
//! Usage:
//!   RUST_LOG=debug cargo run --example dashboard_loop

use can_signal_codec::{
    CanFrame, FrameBuffers, SignalDecoder, SignalDescriptor, SignalEncoder, SignalSink,
    SignalTable, SignalType,
};

struct Dashboard;

impl SignalSink for Dashboard {
    fn on_frame(&mut self, frame: &CanFrame) {
        println!("frame 0x{:03X} [{}] {:02X?}", frame.id, frame.dlc, frame.payload());
    }

    fn on_bool(&mut self, name: &str, signal_id: u32, value: bool) {
        println!("  {:<12} ({:>3}) = {}", name, signal_id, value);
    }

    fn on_u8(&mut self, name: &str, signal_id: u32, value: u8) {
        println!("  {:<12} ({:>3}) = {}", name, signal_id, value);
    }

    fn on_u16(&mut self, name: &str, signal_id: u32, value: u16) {
        println!("  {:<12} ({:>3}) = {}", name, signal_id, value);
    }
}

fn descriptor(
    frame_id: u32,
    signal_id: u32,
    name: &str,
    bits: (u8, u8),
    range: (u32, u32),
    signal_type: SignalType,
) -> SignalDescriptor {
    SignalDescriptor {
        frame_id,
        signal_id,
        name: name.to_string(),
        start_bit: bits.0,
        end_bit: bits.1,
        min: range.0,
        max: range.1,
        signal_type,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let table = SignalTable::new(vec![
        descriptor(0x100, 1, "Headlights", (0, 0), (0, 1), SignalType::Bool),
        descriptor(0x100, 2, "Blinker", (1, 2), (0, 2), SignalType::UInt8),
        descriptor(0x200, 3, "Speed", (0, 7), (0, 240), SignalType::UInt8),
        descriptor(0x200, 4, "Rpm", (8, 23), (0, 9000), SignalType::UInt16),
    ])?;

    let buffers = FrameBuffers::new(vec![
        CanFrame::new(0x100, 1, [0; 8]),
        CanFrame::new(0x200, 3, [0; 8]),
    ])?;
    let mut encoder = SignalEncoder::new(&table, buffers, Vec::new())?;

    encoder.send_bool("Headlights", true)?;
    encoder.send_u8("Blinker", 2)?;
    encoder.send_u8("Speed", 88)?;
    encoder.send_u16("Rpm", 2450)?;

    // Rejected: above the Speed range, nothing is transmitted
    if let Err(e) = encoder.send_u8("Speed", 250) {
        println!("rejected: {}", e);
    }

    let (_, sent) = encoder.into_parts();
    let mut decoder = SignalDecoder::new(&table, Dashboard);
    for frame in &sent {
        decoder.process_frame(frame);
    }

    Ok(())
}
