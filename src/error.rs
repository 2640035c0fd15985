//! Transport error types

use core::fmt;

/// Result type for HID transport operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while handing a report to the USB transport.
///
/// None of these escalate past the polling loop: the report is simply not
/// recorded as sent and the next cycle recomputes it from the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Endpoint is not configured (device reset, suspended or unplugged)
    Disabled,
    /// Report does not fit in the endpoint buffer
    BufferOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Endpoint disabled"),
            Self::BufferOverflow => write!(f, "Buffer overflow"),
        }
    }
}

#[cfg(feature = "rp2040")]
impl From<embassy_usb::driver::EndpointError> for Error {
    fn from(e: embassy_usb::driver::EndpointError) -> Self {
        match e {
            embassy_usb::driver::EndpointError::Disabled => Self::Disabled,
            embassy_usb::driver::EndpointError::BufferOverflow => Self::BufferOverflow,
        }
    }
}
