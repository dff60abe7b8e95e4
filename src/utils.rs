//! Helpers for encoding field values and formatting wire bytes.
//!
//! # Example
//!
//! ```
//! use plc_field_link::utils::{ascii_bytes, format_bytes, format_hex};
//!
//! let bytes = ascii_bytes("T00").unwrap();
//! assert_eq!(format_bytes(bytes), "84 48 48");
//! assert_eq!(format_hex(bytes), "54 30 30");
//! ```

/// Returns the single-byte ASCII encoding of `value`.
///
/// ASCII text is already its own encoding, so the bytes are borrowed.
/// On failure returns the byte offset of the first non-ASCII character.
pub fn ascii_bytes(value: &str) -> Result<&[u8], usize> {
    match value.bytes().position(|b| !b.is_ascii()) {
        Some(position) => Err(position),
        None => Ok(value.as_bytes()),
    }
}

/// Formats bytes as space-separated decimal values.
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats bytes as space-separated uppercase hex pairs.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
