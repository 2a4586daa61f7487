//! Conversions between the binary and ASCII forms of firmware GUIDs.
//!
//! Firmware descriptor tables store the first three groups of a GUID in
//! reversed byte order, so a binary GUID read out of such a table must go
//! through [`swap_bytes`] before it can be formatted or compared against a
//! canonical GUID string. Conversely, a parsed string must be swapped back
//! before it can be matched against raw firmware bytes.

#![no_std]

extern crate alloc;

use alloc::string::String;
use core::fmt::Write;

/// The length in bytes of a binary GUID.
pub const GUID_SIZE: usize = 16;

/// The length in characters of a canonical hyphenated GUID string.
pub const GUID_STRING_LENGTH: usize = 36;

/// The number of bytes in each hyphen-separated group of a GUID string,
/// e.g., `FA50FF2B-F2E8-45DE-83FA-65417F2F49BA`.
const GROUP_SIZES: [usize; 5] = [4, 2, 2, 2, 6];

/// Converts a 36-character hyphenated GUID string into its binary form.
///
/// Hyphens must appear at offsets 8, 13, 18, and 23, with hex digits
/// (of either case) everywhere else.
/// Returns an error if the string is malformed; the caller must check.
pub fn parse_guid(src: &str) -> Result<[u8; GUID_SIZE], &'static str> {
    let src = src.as_bytes();
    if src.len() != GUID_STRING_LENGTH {
        return Err("GUID string must be exactly 36 characters");
    }
    if src[8] != b'-' || src[13] != b'-' || src[18] != b'-' || src[23] != b'-' {
        return Err("GUID string must have hyphens at offsets 8, 13, 18, and 23");
    }

    let mut dest = [0; GUID_SIZE];
    let mut src_idx = 0;
    let mut dest_idx = 0;
    for group_size in GROUP_SIZES {
        for _ in 0..group_size {
            dest[dest_idx] = parse_hex_byte(src[src_idx], src[src_idx + 1])?;
            src_idx += 2;
            dest_idx += 1;
        }
        src_idx += 1; // skip the group's trailing hyphen (or the end of the string)
    }
    Ok(dest)
}

/// Converts two ASCII hex characters into the byte they spell.
fn parse_hex_byte(high: u8, low: u8) -> Result<u8, &'static str> {
    let hex_value = |c: u8| match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err("invalid hex character in GUID string"),
    };
    Ok((hex_value(high)? << 4) | hex_value(low)?)
}

/// Rearranges the bytes of a binary GUID between firmware order and
/// display order.
///
/// The first group of 4 bytes and the next two groups of 2 bytes are each
/// reversed; the final 8 bytes are copied through unchanged.
/// Applying this twice returns the original bytes.
pub fn swap_bytes(src: &[u8; GUID_SIZE]) -> [u8; GUID_SIZE] {
    let mut dest = [0; GUID_SIZE];
    for i in 0..=3 {
        dest[i] = src[3 - i];
    }
    for i in 0..=1 {
        dest[4 + i] = src[5 - i];
    }
    for i in 0..=1 {
        dest[6 + i] = src[7 - i];
    }
    dest[8..].copy_from_slice(&src[8..]);
    dest
}

/// Converts a binary GUID into its canonical hyphenated string form:
/// exactly 36 characters, upper-case hex, in groups of 8-4-4-4-12 digits.
///
/// This is the inverse of [`parse_guid`].
pub fn format_guid(guid: &[u8; GUID_SIZE]) -> String {
    let mut out = String::with_capacity(GUID_STRING_LENGTH);
    let mut idx = 0;
    for (group, group_size) in GROUP_SIZES.iter().enumerate() {
        if group > 0 {
            out.push('-');
        }
        for _ in 0..*group_size {
            // Writing hex digits to a String cannot fail.
            let _ = write!(out, "{:02X}", guid[idx]);
            idx += 1;
        }
    }
    out
}

#[cfg(test)]
mod test;
