//! The WMI controller core.
//!
//! A [`WmiController`] binds one vendor ACPI WMI device to the rest of the
//! system. It discovers the device's GUID blocks from the `_WDG` descriptor
//! table into a [`WmiRegistry`] snapshot, exposes the blocks as control
//! points that can be queried and set through derived firmware method names
//! (`WMxx`, `WExx`), and demultiplexes firmware event notifications into
//! normalized codes delivered to a [`KeyEventSink`].
//!
//! Vendor quirks live behind the [`WmiEventPolicy`] strategy trait: a
//! specialization overrides only the hooks it needs (event subscription,
//! code remapping) and everything else falls through to the defaults here.

#![no_std]

extern crate alloc;

use alloc::{boxed::Box, format, string::String, sync::Arc};
use acpi_device::{AcpiDevice, AcpiValue};
use log::{debug, warn};
use spin::RwLock;
use wmi_key_types::KeyEventSink;
use wmi_registry::WmiRegistry;

/// The notification type delivered for ACPI device notifies.
/// Anything else arriving at [`WmiController::on_notification`] is a
/// misrouted message from an unrelated sender.
pub const ACPI_DEVICE_NOTIFY: u32 = 0x80;

/// The raw notification value that vendor firmware uses as a placeholder:
/// the real event code is not this value but lives at a fixed offset inside
/// the extended event data buffer.
pub const VENDOR_EVENT_SENTINEL: u32 = 0xD0;

/// The firmware method that returns supplementary data for an event,
/// given the just-received event code as its argument.
pub const EXTENDED_EVENT_DATA_METHOD: &str = "_WED";

/// The prefix of device-control firmware methods (`"WM"` + object id).
const DEVICE_METHOD_PREFIX: &str = "WM";

/// The prefix of event-control firmware methods (`"WE"` + 2-hex-digit notify id).
const EVENT_METHOD_PREFIX: &str = "WE";

/// The fixed first argument of every `WMxx` device-control evaluation.
const DEVICE_CONTROL_ARG: u64 = 0x00D;

/// The offset within a vendor extended-data buffer where the event code lives.
const VENDOR_BUFFER_CODE_OFFSET: usize = 4;

/// The result returned when a set-style accessor never reached firmware or
/// firmware reported failure; all-ones matches the firmware failure status.
const NOT_EXECUTED: u32 = !0;

/// The outcome of building (or rebuilding) the registry from firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryBuildResult {
    /// Whether the `_WDG` table was successfully evaluated and parsed.
    /// On failure the controller continues with an empty registry.
    pub success: bool,
    /// The number of entries in the newly published registry.
    pub entry_count: usize,
}

/// The terminal outcome of one dispatched notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Exactly one normalized code was forwarded to the sink.
    Forwarded(u32),
    /// The notification type was not recognized; nothing was forwarded.
    Ignored,
}

/// Vendor-specific overrides for event subscription and final code handling.
///
/// The default implementations give the base controller behavior: enabling
/// events does nothing, disabling detaches the sink, and codes pass through
/// to the sink unmodified. A vendor policy implements only the hooks it
/// needs to change.
pub trait WmiEventPolicy: Send + Sync {
    /// Called when the host framework starts event delivery.
    fn on_enable(&self, _ctl: &WmiController) {
        debug!("enable_events(): nothing to do");
    }

    /// Called when the host framework stops event delivery.
    /// Must be safe to call more than once.
    fn on_disable(&self, ctl: &WmiController) {
        ctl.detach_sink();
    }

    /// Handles one normalized event code. The default forwards it to the
    /// attached sink unchanged; specializations may remap or filter.
    fn handle_code(&self, ctl: &WmiController, code: u32) {
        ctl.deliver_key(code);
    }

    /// Called on a wireless-switch hardware event. Nothing to do by default.
    fn rfkill_event(&self, _ctl: &WmiController) {}
}

/// The pass-through policy used when no vendor specialization is installed.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultEventPolicy;

impl WmiEventPolicy for DefaultEventPolicy {}

/// A controller for one ACPI WMI device.
///
/// Notifications are delivered serially by the host framework, so steady-state
/// dispatch takes no locks beyond cloning the current registry snapshot;
/// only [`initialize`](Self::initialize) swaps the snapshot, atomically.
pub struct WmiController {
    /// The ACPI device node all firmware method evaluations go through.
    device: Arc<dyn AcpiDevice + Send + Sync>,
    /// The current registry snapshot, replaced wholesale on (re)initialization.
    registry: RwLock<Arc<WmiRegistry>>,
    /// The downstream consumer of normalized event codes, if one is attached.
    sink: RwLock<Option<Arc<dyn KeyEventSink>>>,
    /// The vendor specialization hooks.
    policy: Box<dyn WmiEventPolicy>,
}

impl WmiController {
    /// Creates a controller bound to the given ACPI device node,
    /// with the default pass-through event policy.
    ///
    /// The registry starts empty; call [`initialize`](Self::initialize)
    /// to populate it from the device's `_WDG` table.
    pub fn new(device: Arc<dyn AcpiDevice + Send + Sync>) -> WmiController {
        WmiController::with_policy(device, Box::new(DefaultEventPolicy))
    }

    /// Creates a controller with a vendor-specific event policy.
    pub fn with_policy(
        device: Arc<dyn AcpiDevice + Send + Sync>,
        policy: Box<dyn WmiEventPolicy>,
    ) -> WmiController {
        WmiController {
            device,
            registry: RwLock::new(Arc::new(WmiRegistry::empty())),
            sink: RwLock::new(None),
            policy,
        }
    }

    /// Evaluates the device's `_WDG` method and (re)builds the registry
    /// from the descriptor table it returns.
    ///
    /// On any failure — the method cannot be evaluated, or returns something
    /// other than a buffer — the parse is abandoned and an empty registry is
    /// published: initialization continues in a degraded state with no GUID
    /// coverage rather than failing outright.
    ///
    /// The new snapshot is published atomically; readers that already hold
    /// the previous snapshot keep using it unharmed.
    pub fn initialize(&self) -> RegistryBuildResult {
        let (registry, success) = match self.device.evaluate_method(wmi_wdg::WDG_METHOD, &[]) {
            Ok(AcpiValue::Buffer(table)) => {
                (WmiRegistry::build(&table, &*self.device), true)
            }
            Ok(_) => {
                warn!("{} did not evaluate to a buffer; no GUID blocks registered",
                    wmi_wdg::WDG_METHOD);
                (WmiRegistry::empty(), false)
            }
            Err(e) => {
                warn!("no object of method {}: {}; no GUID blocks registered",
                    wmi_wdg::WDG_METHOD, e);
                (WmiRegistry::empty(), false)
            }
        };
        let entry_count = registry.len();
        registry.dump();
        *self.registry.write() = Arc::new(registry);
        RegistryBuildResult { success, entry_count }
    }

    /// Returns the current registry snapshot.
    ///
    /// The snapshot is immutable; it remains valid (if possibly stale)
    /// across a concurrent [`initialize`](Self::initialize).
    pub fn registry(&self) -> Arc<WmiRegistry> {
        self.registry.read().clone()
    }

    /// Attaches the downstream consumer of normalized event codes.
    pub fn attach_sink(&self, sink: Arc<dyn KeyEventSink>) {
        *self.sink.write() = Some(sink);
    }

    /// Detaches the downstream sink, if any. Safe to call repeatedly.
    pub fn detach_sink(&self) {
        *self.sink.write() = None;
    }

    /// Lifecycle hook: the host framework is starting event delivery.
    pub fn enable_events(&self) {
        self.policy.on_enable(self);
    }

    /// Lifecycle hook: the host framework is stopping event delivery.
    /// Calling this more than once is safe.
    pub fn disable_events(&self) {
        self.policy.on_disable(self);
    }

    /// Hook for wireless-switch hardware events.
    pub fn rfkill_event(&self) {
        self.policy.rfkill_event(self);
    }

    /// Queries the status of a device controlled by the given GUID block:
    /// evaluates `WMxx(0x00D, method_id, device_id)` as an integer.
    ///
    /// Fails without any firmware call if the GUID is not registered or
    /// names an event block (which has no object id).
    pub fn get_device_status(
        &self,
        guid: &str,
        method_id: u32,
        device_id: u32,
    ) -> Result<u32, &'static str> {
        let method = self.resolve_object_method(guid)?;
        let args = [
            AcpiValue::Integer(DEVICE_CONTROL_ARG),
            AcpiValue::Integer(method_id as u64),
            AcpiValue::Integer(device_id as u64),
        ];
        self.device.evaluate_method_as_integer(&method, &args)
    }

    /// Sets the status of a device controlled by the given GUID block:
    /// evaluates `WMxx(0x00D, method_id, buffer)` where the 8-byte buffer
    /// packs `device_id` (bytes 0-3) and `status` (bytes 4-7) little-endian.
    ///
    /// Returns the firmware result, or the all-ones not-executed sentinel if
    /// the GUID could not be resolved (no firmware call is made) or the
    /// evaluation failed.
    pub fn set_device_status(
        &self,
        guid: &str,
        method_id: u32,
        device_id: u32,
        status: u32,
    ) -> u32 {
        let method = match self.resolve_object_method(guid) {
            Ok(method) => method,
            Err(e) => {
                warn!("set_device_status: {}", e);
                return NOT_EXECUTED;
            }
        };
        let mut payload = [0u8; 8];
        payload[..4].copy_from_slice(&device_id.to_le_bytes());
        payload[4..].copy_from_slice(&status.to_le_bytes());
        self.evaluate_set_method(&method, method_id, payload)
    }

    /// Sets a device controlled by the given GUID block: like
    /// [`set_device_status`](Self::set_device_status) but the payload
    /// carries only `status` in its first 4 bytes.
    ///
    /// The unused payload half is zeroed so firmware never sees
    /// indeterminate bytes.
    pub fn set_device(&self, guid: &str, method_id: u32, status: u32) -> u32 {
        let method = match self.resolve_object_method(guid) {
            Ok(method) => method,
            Err(e) => {
                warn!("set_device: {}", e);
                return NOT_EXECUTED;
            }
        };
        let mut payload = [0u8; 8];
        payload[..4].copy_from_slice(&status.to_le_bytes());
        self.evaluate_set_method(&method, method_id, payload)
    }

    /// Enables or disables event generation for the EVENT-flagged GUID
    /// block: evaluates `WExx(enable)` where `xx` is the block's notify id
    /// in two upper-case hex digits.
    ///
    /// Fails without any firmware call if the GUID is not registered or
    /// the entry is not an event source.
    pub fn set_event(&self, guid: &str, enable: bool) -> Result<(), &'static str> {
        let registry = self.registry();
        let entry = registry.lookup(guid).ok_or("no WMI block registered for GUID")?;
        let notify_id = entry.notify_id().ok_or("WMI block is not an event source")?;
        let method = format!("{}{:02X}", EVENT_METHOD_PREFIX, notify_id);
        self.device
            .evaluate_method(&method, &[AcpiValue::Integer(enable as u64)])
            .map(|_| ())
    }

    /// Handles one raw firmware notification, normalizing its payload into
    /// a single event code and forwarding that code (through the policy) to
    /// the sink at most once.
    ///
    /// An unrecognized notification type is logged and ignored. A payload
    /// that cannot be normalized — empty extended-data buffer, a package
    /// whose first element is not an integer, an unrecognized shape —
    /// aborts this notification with an error and forwards nothing; later
    /// notifications are unaffected. Delivery is best-effort: an aborted
    /// notification is never replayed.
    pub fn on_notification(
        &self,
        typ: u32,
        argument: u32,
    ) -> Result<DispatchOutcome, &'static str> {
        if typ != ACPI_DEVICE_NOTIFY {
            warn!("unexpected notification, type {:#x} argument {:#x}; dropping it",
                typ, argument);
            return Ok(DispatchOutcome::Ignored);
        }

        // Vendor firmware notifies with a fixed placeholder value; the real
        // code only exists in the extended event data buffer, so the raw
        // value must never reach the sink.
        let vendor_specific = argument == VENDOR_EVENT_SENTINEL;
        if vendor_specific {
            debug!("vendor notification; reading the code from the extended data buffer");
        }

        let payload = match self.device.evaluate_method(
            EXTENDED_EVENT_DATA_METHOD,
            &[AcpiValue::Integer(argument as u64)],
        ) {
            Ok(payload) => payload,
            Err(_) if !vendor_specific => {
                // No extended data to consult: the raw value is itself the
                // event code (directly-coded events).
                self.handle_code(argument);
                return Ok(DispatchOutcome::Forwarded(argument));
            }
            Err(_) => return Err("vendor notification carried no extended event data"),
        };

        let code = extract_event_code(&payload, vendor_specific)?;
        self.handle_code(code);
        Ok(DispatchOutcome::Forwarded(code))
    }

    /// Forwards a normalized event code to the attached sink, if any.
    /// With no sink attached the code is logged and dropped.
    pub fn deliver_key(&self, code: u32) {
        if let Some(sink) = self.sink.read().as_ref() {
            sink.key_pressed(code);
        } else {
            warn!("no key event sink attached; dropping event code {:#x}", code);
        }
    }

    /// Routes a normalized code through the vendor policy.
    fn handle_code(&self, code: u32) {
        self.policy.handle_code(self, code);
    }

    /// Resolves `guid` to its `WMxx` device-control method name.
    fn resolve_object_method(&self, guid: &str) -> Result<String, &'static str> {
        let registry = self.registry();
        let entry = registry.lookup(guid).ok_or("no WMI block registered for GUID")?;
        let object_id = entry.object_id().ok_or("WMI block has no object id (event block)")?;
        let tag = core::str::from_utf8(object_id).map_err(|_| "WMI object id is not ASCII")?;
        Ok(format!("{}{}", DEVICE_METHOD_PREFIX, tag))
    }

    /// Evaluates a `WMxx` set-style call with an 8-byte payload buffer,
    /// mapping any failure onto the all-ones not-executed result.
    fn evaluate_set_method(&self, method: &str, method_id: u32, payload: [u8; 8]) -> u32 {
        let args = [
            AcpiValue::Integer(DEVICE_CONTROL_ARG),
            AcpiValue::Integer(method_id as u64),
            AcpiValue::Buffer(payload.to_vec()),
        ];
        match self.device.evaluate_method_as_integer(method, &args) {
            Ok(result) => {
                debug!("{} returned {:#x}", method, result);
                result
            }
            Err(e) => {
                warn!("{} failed: {}", method, e);
                NOT_EXECUTED
            }
        }
    }
}

/// Extracts the normalized event code from an extended-event-data payload.
///
/// Payload shapes are tried in priority order: integer, then ordered
/// package, then opaque buffer. An empty buffer, a package whose first
/// element is not an integer, or any other shape is a mismatch that aborts
/// the notification.
fn extract_event_code(payload: &AcpiValue, vendor_specific: bool) -> Result<u32, &'static str> {
    match payload {
        AcpiValue::Integer(code) => Ok(*code as u32),
        AcpiValue::Package(elements) => match elements.first() {
            Some(AcpiValue::Integer(code)) => Ok(*code as u32),
            Some(_) => Err("first element of extended event data package is not an integer"),
            None => Err("extended event data package is empty"),
        },
        AcpiValue::Buffer(bytes) => {
            let offset = if vendor_specific { VENDOR_BUFFER_CODE_OFFSET } else { 0 };
            match bytes.get(offset) {
                Some(code) => Ok(*code as u32),
                None if bytes.is_empty() => Err("extended event data buffer is empty"),
                None => Err("extended event data buffer is too short for the vendor code offset"),
            }
        }
        AcpiValue::String(_) => Err("extended event data has an unrecognized shape"),
    }
}
