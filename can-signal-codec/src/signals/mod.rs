//! Signal descriptor table and bit mask lookup
//!
//! This module contains the descriptor type, its validation rules and the
//! indexed table the decoder and encoder share.

pub mod database;
pub mod mask;

// Re-export key types for convenience
pub use database::{FieldLayout, SignalDescriptor, SignalTable, TableStats, MAX_CAN_ID};
pub use mask::{mask_for, MAX_SIGNAL_WIDTH};
