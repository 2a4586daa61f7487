//! Unit tests for GUID string/binary conversions.

extern crate std;
use super::*;

const EXAMPLE: &str = "FA50FF2B-F2E8-45DE-83FA-65417F2F49BA";

#[test]
fn parse_then_format_round_trips() {
    let binary = parse_guid(EXAMPLE).unwrap();
    assert_eq!(format_guid(&binary), EXAMPLE);
}

#[test]
fn format_then_parse_round_trips() {
    let guid: [u8; GUID_SIZE] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
        0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
    ];
    assert_eq!(parse_guid(&format_guid(&guid)), Ok(guid));
}

#[test]
fn parse_is_case_insensitive_and_format_is_upper_case() {
    let lower = parse_guid("fa50ff2b-f2e8-45de-83fa-65417f2f49ba").unwrap();
    let upper = parse_guid(EXAMPLE).unwrap();
    assert_eq!(lower, upper);
    assert_eq!(format_guid(&lower), EXAMPLE);
}

#[test]
fn format_produces_exactly_36_characters() {
    assert_eq!(format_guid(&[0; GUID_SIZE]).len(), GUID_STRING_LENGTH);
}

#[test]
fn parse_rejects_misplaced_hyphen() {
    assert!(parse_guid("FA50FF2BF-2E8-45DE-83FA-65417F2F49BA").is_err());
}

#[test]
fn parse_rejects_non_hex_character() {
    assert!(parse_guid("GA50FF2B-F2E8-45DE-83FA-65417F2F49BA").is_err());
    assert!(parse_guid("FA50FF2B-F2E8-45DE-83FA-65417F2F49Bz").is_err());
}

#[test]
fn parse_rejects_wrong_length() {
    assert!(parse_guid("FA50FF2B").is_err());
    assert!(parse_guid("").is_err());
}

#[test]
fn swap_is_an_involution() {
    let guid: [u8; GUID_SIZE] = [
        0x2B, 0xFF, 0x50, 0xFA, 0xE8, 0xF2, 0xDE, 0x45,
        0x83, 0xFA, 0x65, 0x41, 0x7F, 0x2F, 0x49, 0xBA,
    ];
    assert_eq!(swap_bytes(&swap_bytes(&guid)), guid);
}

#[test]
fn swap_reverses_first_three_groups_only() {
    let guid: [u8; GUID_SIZE] = [
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
    ];
    let swapped = swap_bytes(&guid);
    assert_eq!(swapped[..8], [3, 2, 1, 0, 5, 4, 7, 6]);
    // bytes 8..16 are always passed through unchanged
    assert_eq!(swapped[8..], guid[8..]);
}

#[test]
fn swap_matches_firmware_byte_order() {
    // The display form of a GUID whose firmware bytes are stored
    // little-endian in the first three groups.
    let firmware_order = parse_guid(EXAMPLE).map(|g| swap_bytes(&g)).unwrap();
    assert_eq!(firmware_order[0], 0x2B);
    assert_eq!(firmware_order[3], 0xFA);
    assert_eq!(firmware_order[4], 0xE8);
    assert_eq!(firmware_order[5], 0xF2);
    assert_eq!(firmware_order[8..], parse_guid(EXAMPLE).unwrap()[8..]);
}
