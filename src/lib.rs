//! Canonical S-expression (csexp) reader and writer.
//!

pub mod reader;

pub mod data;

#[cfg(feature = "render")]
mod render;
#[cfg(feature = "render")]
pub use render::{render_value, save_graph};

pub use data::Value;
pub use reader::{decode, DecodeError, ReadResult};

/// Render the value as canonical bytes.
pub fn encode(value: &Value) -> Vec<u8> {
    value.encode()
}
