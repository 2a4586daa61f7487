//! Dell's vendor specialization of the WMI event controller.
//!
//! Dell firmware raises its notifications with the vendor sentinel value and
//! hides the real event code inside the extended-data buffer, so by the time
//! this policy sees a code the dispatcher has already normalized it. What
//! remains vendor-specific here is the subscription to Dell's event GUID
//! block and the hotkey table mapping raw event codes onto consumer keys.

#![no_std]

use log::{debug, warn};
use wmi::{WmiController, WmiEventPolicy};
use wmi_key_types::ConsumerKey;

/// The GUID of the Dell WMI event block this policy subscribes to.
pub const DELL_WMI_EVENT_GUID: &str = "9DBB5994-A997-11DA-B012-B622A1EF5492";

/// One row of the Dell hotkey table: a raw WMI event code
/// and the consumer key it stands for.
struct KeyMapping {
    wmi_code: u32,
    key: ConsumerKey,
}

/// Raw Dell event codes as they appear in the extended-data buffer.
const KEY_MAP: &[KeyMapping] = &[
    KeyMapping { wmi_code: 0x02, key: ConsumerKey::BrightnessUp },
    KeyMapping { wmi_code: 0x03, key: ConsumerKey::BrightnessDown },
    KeyMapping { wmi_code: 0x10, key: ConsumerKey::VolumeUp },
    KeyMapping { wmi_code: 0x11, key: ConsumerKey::VolumeDown },
    KeyMapping { wmi_code: 0x12, key: ConsumerKey::Mute },
    KeyMapping { wmi_code: 0x2A, key: ConsumerKey::WirelessToggle },
    KeyMapping { wmi_code: 0x4B, key: ConsumerKey::KeyboardIlluminationToggle },
];

/// The Dell event policy: subscribes the Dell event GUID on enable and
/// remaps raw event codes through the hotkey table before they reach the sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct DellWmiPolicy;

impl WmiEventPolicy for DellWmiPolicy {
    fn on_enable(&self, ctl: &WmiController) {
        if let Err(e) = ctl.set_event(DELL_WMI_EVENT_GUID, true) {
            warn!("failed to enable Dell WMI event generation: {}", e);
        }
    }

    fn on_disable(&self, ctl: &WmiController) {
        // Safe to run twice: repeating set_event(false) is harmless to the
        // firmware, and detaching an absent sink does nothing.
        if let Err(e) = ctl.set_event(DELL_WMI_EVENT_GUID, false) {
            warn!("failed to disable Dell WMI event generation: {}", e);
        }
        ctl.detach_sink();
    }

    fn handle_code(&self, ctl: &WmiController, code: u32) {
        match KEY_MAP.iter().find(|mapping| mapping.wmi_code == code) {
            Some(mapping) => ctl.deliver_key(mapping.key as u32),
            None => debug!("unmapped Dell WMI event code {:#x}; dropping it", code),
        }
    }
}
