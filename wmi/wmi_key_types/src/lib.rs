//! Types shared between the WMI event dispatcher and the consumers of the
//! key/device events it produces.

#![no_std]

/// The downstream consumer of normalized WMI event codes.
///
/// Implementors turn a code into whatever the platform needs — a keypress,
/// an rfkill toggle, a backlight step. The dispatcher only ever calls
/// [`key_pressed`](Self::key_pressed), at most once per firmware
/// notification; delivery is best-effort and never retried.
pub trait KeyEventSink: Send + Sync {
    /// Delivers one normalized event code.
    fn key_pressed(&self, code: u32);
}

/// Consumer-control keys that vendor hotkey policies map raw WMI event
/// codes onto before forwarding them to a [`KeyEventSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ConsumerKey {
    VolumeUp = 0x01,
    VolumeDown = 0x02,
    Mute = 0x03,
    BrightnessUp = 0x04,
    BrightnessDown = 0x05,
    /// Toggles the wireless (rfkill) switch state.
    WirelessToggle = 0x06,
    Sleep = 0x07,
    KeyboardIlluminationToggle = 0x08,
}
