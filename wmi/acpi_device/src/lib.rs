//! The interface to the ACPI control-method evaluation subsystem.
//!
//! The WMI bridge never interprets AML itself; it hands a method name and an
//! argument list to whatever implements [`AcpiDevice`] — the host framework's
//! ACPI namespace in production, a scripted mock in tests — and gets back a
//! loosely-typed [`AcpiValue`].

#![no_std]

extern crate alloc;

use alloc::{string::String, vec::Vec};

/// A value passed to or returned from an ACPI control-method evaluation.
///
/// Firmware methods are loosely typed: the same method may return a scalar
/// integer, an opaque byte buffer, or an ordered package of further values,
/// and callers must match on the variant they actually received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcpiValue {
    /// A scalar integer.
    Integer(u64),
    /// An opaque byte buffer.
    Buffer(Vec<u8>),
    /// An ordered sequence of typed elements.
    Package(Vec<AcpiValue>),
    /// A string.
    String(String),
}

/// An ACPI device node that can evaluate named control methods.
///
/// All evaluations are synchronous: a call returns only once the underlying
/// firmware method has run to completion or failed. The bridge performs no
/// timeout handling of its own, so a hang in the implementor blocks the
/// calling thread.
pub trait AcpiDevice {
    /// Evaluates the named control method with the given arguments,
    /// returning its loosely-typed result.
    fn evaluate_method(&self, name: &str, args: &[AcpiValue]) -> Result<AcpiValue, &'static str>;

    /// Evaluates the named control method and interprets its result
    /// as a 32-bit integer.
    fn evaluate_method_as_integer(
        &self,
        name: &str,
        args: &[AcpiValue],
    ) -> Result<u32, &'static str> {
        match self.evaluate_method(name, args)? {
            AcpiValue::Integer(i) => Ok(i as u32),
            _ => Err("ACPI method did not evaluate to an integer"),
        }
    }
}
