//! Definitions for the `_WDG` firmware descriptor table, which catalogs the
//! WMI method and event blocks a vendor exposes through ACPI.
//!
//! The table is a flat byte buffer holding a sequence of fixed-size records
//! ([`GuidBlock`]), one per WMI-exposed capability. Each record names a GUID
//! and either a two-character method tag (from which firmware method names
//! like `WMxx` and `WQxx` are derived) or, for event sources, a one-byte
//! notification id.

#![no_std]

#[macro_use] extern crate bitflags;

use core::mem::size_of;
use zerocopy::FromBytes;

/// The name of the firmware method that returns the binary descriptor table.
pub const WDG_METHOD: &str = "_WDG";

bitflags! {
    /// Flags describing how a WMI GUID block can be accessed.
    pub struct WmiFlags: u8 {
        /// Querying this block is costly; collection should be switched on first.
        const EXPENSIVE = 0x1;
        /// The block is a callable method rather than a plain data block.
        const METHOD    = 0x2;
        /// The block's data is a string.
        const STRING    = 0x4;
        /// The block describes an asynchronous event source.
        const EVENT     = 0x8;
    }
}

/// One fixed-size record of the `_WDG` descriptor table.
///
/// Its layout and total size must exactly match the firmware binary format.
///
/// The `object_id` field is a storage union: for EVENT-flagged blocks its
/// first byte is the notification id, otherwise it holds a two-character
/// ASCII method tag. Use [`GuidBlock::id`] to decode it exactly once;
/// never read the raw bytes under the wrong interpretation.
#[derive(Clone, Copy, Debug, FromBytes)]
#[repr(C, packed)]
pub struct GuidBlock {
    /// The block's GUID, in firmware byte order
    /// (see `wmi_guid::swap_bytes` for the display-order conversion).
    pub guid: [u8; 16],
    object_id: [u8; 2],
    /// The number of instances of this block the firmware exposes.
    pub instance_count: u8,
    /// Bitmask of [`WmiFlags`] values.
    pub flags: u8,
}

/// The size in bytes of one [`GuidBlock`] record.
pub const GUID_BLOCK_SIZE: usize = size_of::<GuidBlock>();
const _: () = assert!(core::mem::size_of::<GuidBlock>() == 20);
const _: () = assert!(core::mem::align_of::<GuidBlock>() == 1);

/// The decoded identity of a [`GuidBlock`]: either the notification value of
/// an event source or the ASCII tag that firmware method names are derived
/// from. Exactly one of the two exists per block, selected by the EVENT flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockId {
    /// An EVENT-flagged block, identified by its notification value.
    Event {
        /// The value the firmware notifies with when this event fires.
        notify_id: u8,
    },
    /// A method or data block, identified by a two-character ASCII tag.
    Object {
        /// The tag appended to `WM`/`WQ`/`WS` prefixes to form method names.
        object_id: [u8; 2],
    },
}

impl GuidBlock {
    /// Returns this block's flags as a typed bitmask.
    /// Bits with no defined meaning are dropped.
    pub fn flags(&self) -> WmiFlags {
        WmiFlags::from_bits_truncate(self.flags)
    }

    /// Decodes the object-id/notify-id storage union,
    /// selected by the EVENT flag.
    pub fn id(&self) -> BlockId {
        if self.flags().contains(WmiFlags::EVENT) {
            BlockId::Event { notify_id: self.object_id[0] }
        } else {
            BlockId::Object { object_id: self.object_id }
        }
    }
}

/// Returns an [`Iterator`] over the complete [`GuidBlock`] records of a
/// `_WDG` table blob, in blob order.
///
/// The blob is split at a fixed stride of [`GUID_BLOCK_SIZE`]; trailing
/// bytes that do not form a complete record are ignored.
pub fn guid_blocks(table: &[u8]) -> impl Iterator<Item = GuidBlock> + '_ {
    table
        .chunks_exact(GUID_BLOCK_SIZE)
        .filter_map(GuidBlock::read_from)
}
