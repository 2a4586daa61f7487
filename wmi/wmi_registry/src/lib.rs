//! The in-memory catalog of WMI GUID blocks discovered from firmware.
//!
//! A [`WmiRegistry`] is built once per device-initialization cycle from the
//! raw `_WDG` descriptor table and is immutable afterwards: a rebuild
//! constructs a fresh snapshot for the owner to publish atomically, rather
//! than mutating entries in place under concurrent readers.
//!
//! Each entry maps a canonical GUID string to the block's decoded identity
//! (method tag or notification value), its instance count and flags, and —
//! for flagless data blocks — the block's contents, fetched once from the
//! firmware's `WQxx` method at build time and never refreshed automatically.

#![no_std]

extern crate alloc;

use alloc::{format, string::String, vec::Vec};
use acpi_device::{AcpiDevice, AcpiValue};
use log::{debug, warn};
use wmi_guid::{format_guid, swap_bytes};
use wmi_wdg::{guid_blocks, BlockId, GuidBlock, WmiFlags, GUID_BLOCK_SIZE};

/// The prefix of firmware data-block query methods (`"WQ"` + object id).
const DATA_BLOCK_METHOD_PREFIX: &str = "WQ";

/// A named opaque value associated with a flagless, non-event GUID block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WmiDataBlock {
    /// The firmware method name the block was read from (`"WQ"` + object id).
    pub name: String,
    /// The raw bytes the method returned.
    pub data: Vec<u8>,
}

/// One registry entry, decoded from a [`GuidBlock`] descriptor record.
#[derive(Clone, Debug)]
pub struct WmiEntry {
    /// The block's GUID in canonical upper-case hyphenated string form.
    pub uuid: String,
    /// The decoded identity: method tag or notification value,
    /// exactly one of the two per entry.
    pub id: BlockId,
    /// The number of instances of this block the firmware exposes.
    pub instance_count: u8,
    /// The block's access flags.
    pub flags: WmiFlags,
    /// The cached data block, present only for flagless non-event entries
    /// whose `WQxx` method could be read at build time.
    pub data_block: Option<WmiDataBlock>,
}

impl WmiEntry {
    /// Returns the two-character ASCII method tag of this entry,
    /// or `None` if the entry describes an event source.
    pub fn object_id(&self) -> Option<&[u8; 2]> {
        match &self.id {
            BlockId::Object { object_id } => Some(object_id),
            BlockId::Event { .. } => None,
        }
    }

    /// Returns the notification value of this entry,
    /// or `None` if the entry is not an event source.
    pub fn notify_id(&self) -> Option<u8> {
        match self.id {
            BlockId::Event { notify_id } => Some(notify_id),
            BlockId::Object { .. } => None,
        }
    }

    /// Decodes one descriptor record into an entry,
    /// fetching its data block through `device` when applicable.
    fn from_block(block: &GuidBlock, device: &dyn AcpiDevice) -> WmiEntry {
        let uuid = format_guid(&swap_bytes(&block.guid));
        let id = block.id();
        // Only flagless blocks carry a queryable data block.
        let data_block = match id {
            BlockId::Object { object_id } if block.flags().is_empty() => {
                read_data_block(&object_id, device)
            }
            _ => None,
        };
        WmiEntry {
            uuid,
            id,
            instance_count: block.instance_count,
            flags: block.flags(),
            data_block,
        }
    }
}

/// Reads the `WQxx` data block for the given object id.
///
/// Returns `None` (and logs) if the method is missing, fails, or does not
/// evaluate to a buffer; a missing data block degrades the entry, never the
/// whole registry build.
fn read_data_block(object_id: &[u8; 2], device: &dyn AcpiDevice) -> Option<WmiDataBlock> {
    let Ok(tag) = core::str::from_utf8(object_id) else {
        warn!("object id {:?} is not ASCII; skipping its data block", object_id);
        return None;
    };
    let name = format!("{}{}", DATA_BLOCK_METHOD_PREFIX, tag);
    match device.evaluate_method(&name, &[]) {
        Ok(AcpiValue::Buffer(data)) => Some(WmiDataBlock { name, data }),
        Ok(_) => {
            warn!("data block method {} returned a non-buffer object", name);
            None
        }
        Err(e) => {
            warn!("no object of method {}: {}", name, e);
            None
        }
    }
}

/// An immutable snapshot of all GUID blocks parsed out of one firmware
/// descriptor table.
#[derive(Clone, Debug, Default)]
pub struct WmiRegistry {
    entries: Vec<WmiEntry>,
}

impl WmiRegistry {
    /// Returns an empty registry: the degraded state used when the firmware
    /// descriptor table cannot be read at all.
    pub const fn empty() -> WmiRegistry {
        WmiRegistry { entries: Vec::new() }
    }

    /// Builds a registry from a raw `_WDG` table blob.
    ///
    /// Every complete record in the blob becomes one entry, in blob order;
    /// trailing bytes short of a full record are ignored, and duplicate
    /// GUIDs are kept as-is. For each flagless non-event record, the
    /// associated `WQxx` data block is fetched through `device` and cached
    /// in the entry.
    pub fn build(table: &[u8], device: &dyn AcpiDevice) -> WmiRegistry {
        let mut entries = Vec::with_capacity(table.len() / GUID_BLOCK_SIZE);
        for block in guid_blocks(table) {
            entries.push(WmiEntry::from_block(&block, device));
        }
        WmiRegistry { entries }
    }

    /// Finds the first entry whose canonical GUID string equals `guid`.
    ///
    /// The scan runs front-to-back in insertion (blob) order, so on
    /// duplicate GUIDs the first-parsed entry wins. Comparison is
    /// case-sensitive against the stored upper-case canonical form.
    pub fn lookup(&self, guid: &str) -> Option<&WmiEntry> {
        self.entries.iter().find(|entry| entry.uuid == guid)
    }

    /// Returns all entries in insertion order,
    /// the read-only surface used for external inspection and debugging.
    pub fn entries(&self) -> &[WmiEntry] {
        &self.entries
    }

    /// Returns the number of entries in this registry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if this registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Logs every entry at debug level: UUID, identity, instance count,
    /// and symbolic flag names.
    pub fn dump(&self) {
        for entry in &self.entries {
            match entry.id {
                BlockId::Event { notify_id } => debug!(
                    "{}: notify_value: {:02X}, instance_count: {}, flags: {:?}",
                    entry.uuid, notify_id, entry.instance_count, entry.flags,
                ),
                BlockId::Object { object_id } => debug!(
                    "{}: object_id: {}, instance_count: {}, flags: {:?}",
                    entry.uuid,
                    core::str::from_utf8(&object_id).unwrap_or("??"),
                    entry.instance_count,
                    entry.flags,
                ),
            }
        }
    }
}
