//! HID transport capability
//!
//! The polling loop and the macro player only ever see this trait. The
//! firmware implements it over the embassy-usb HID endpoints; tests
//! implement it with a recorder.

use crate::error::Result;
use crate::report::{KeyboardReport, MediaReport};

#[allow(async_fn_in_trait)]
pub trait HidTransport {
    /// Whether the IN endpoints can accept a report right now
    fn is_ready(&self) -> bool;

    async fn write_keyboard(&mut self, report: &KeyboardReport) -> Result<()>;

    async fn write_media(&mut self, report: &MediaReport) -> Result<()>;

    /// Let the USB stack service the bus before continuing.
    async fn keep_alive(&mut self) {
        embassy_futures::yield_now().await;
    }

    /// Wait until the endpoints accept reports, servicing the bus meanwhile.
    async fn wait_ready(&mut self) {
        while !self.is_ready() {
            self.keep_alive().await;
        }
    }
}
