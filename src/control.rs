//! HID class control requests
//!
//! The USB stack answers GET_REPORT, SET_REPORT, GET/SET_PROTOCOL and
//! GET/SET_IDLE by calling into [`HidControl`]; nothing here depends on the
//! concrete USB driver.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use portable_atomic::{AtomicBool, Ordering};

use crate::config::{KEYBOARD_REPORT_SIZE, MEDIA_REPORT_SIZE};
use crate::keyscan::KeyscanReport;
use crate::report::{KeyboardReport, MediaReport};
use crate::scheduler::IdleState;

/// Num Lock bit in the host LED report
pub const LED_NUM_LOCK: u8 = 1 << 0;
pub const LED_CAPS_LOCK: u8 = 1 << 1;
pub const LED_SCROLL_LOCK: u8 = 1 << 2;

/// Interface index of the keyboard; every other index is the media controller
pub const KEYBOARD_INTERFACE: u16 = 0;

/// Boot protocol value of SET_PROTOCOL
pub const PROTOCOL_BOOT: u8 = 0;
pub const PROTOCOL_REPORT: u8 = 1;

/// HID class request codes
pub const HID_REQ_GET_PROTOCOL: u8 = 0x03;
pub const HID_REQ_SET_PROTOCOL: u8 = 0x0b;

/// Duration the USB stack reports for SET_IDLE with a zero period
pub const IDLE_INDEFINITE: u32 = u32::MAX;

/// Idle period in milliseconds for a SET_IDLE duration from the USB stack.
///
/// An indefinite duration means "only report on change", which is period 0.
pub const fn idle_period_ms(duration_ms: u32) -> u16 {
    if duration_ms == IDLE_INDEFINITE {
        0
    } else if duration_ms > u16::MAX as u32 {
        u16::MAX
    } else {
        duration_ms as u16
    }
}

/// Most recent keyscan, shared between the polling loop and GET_REPORT.
pub struct LatestReport {
    inner: Mutex<CriticalSectionRawMutex, Cell<KeyscanReport>>,
}

impl LatestReport {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(KeyscanReport::new())),
        }
    }

    pub fn publish(&self, report: KeyscanReport) {
        self.inner.lock(|cell| cell.set(report));
    }

    pub fn get(&self) -> KeyscanReport {
        self.inner.lock(|cell| cell.get())
    }
}

impl Default for LatestReport {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HidControl<'a> {
    idle: &'a IdleState,
    latest: &'a LatestReport,
    report_protocol: AtomicBool,
}

impl<'a> HidControl<'a> {
    pub const fn new(idle: &'a IdleState, latest: &'a LatestReport) -> Self {
        Self {
            idle,
            latest,
            report_protocol: AtomicBool::new(true),
        }
    }

    /// GET_REPORT: serialize the current keyboard or media report into `buf`.
    pub fn get_report(&self, interface: u16, buf: &mut [u8]) -> Option<usize> {
        let scan = self.latest.get();
        if interface == KEYBOARD_INTERFACE {
            let bytes = KeyboardReport::from(&scan).to_bytes();
            let out = buf.get_mut(..KEYBOARD_REPORT_SIZE)?;
            out.copy_from_slice(&bytes);
            Some(KEYBOARD_REPORT_SIZE)
        } else {
            let bytes = MediaReport::from(&scan).to_bytes();
            let out = buf.get_mut(..MEDIA_REPORT_SIZE)?;
            out.copy_from_slice(&bytes);
            Some(MEDIA_REPORT_SIZE)
        }
    }

    /// SET_REPORT: the first byte is the host LED state. Returns Num Lock.
    pub fn set_report(&self, data: &[u8]) -> Option<bool> {
        let leds = *data.first()?;
        debug!("LED report: {=u8:#x}", leds);
        Some(leds & LED_NUM_LOCK != 0)
    }

    /// SET_PROTOCOL. Stored only; report layout is identical in both modes.
    pub fn set_protocol(&self, value: u8) {
        self.report_protocol
            .store(value != PROTOCOL_BOOT, Ordering::Release);
    }

    /// `true` in report protocol, `false` in boot protocol.
    pub fn protocol(&self) -> bool {
        self.report_protocol.load(Ordering::Acquire)
    }

    /// GET_PROTOCOL response byte
    pub fn get_protocol(&self) -> u8 {
        if self.protocol() {
            PROTOCOL_REPORT
        } else {
            PROTOCOL_BOOT
        }
    }

    /// Back to report protocol, as after enumeration.
    pub fn reset_protocol(&self) {
        self.report_protocol.store(true, Ordering::Release);
    }

    pub fn set_idle_ms(&self, ms: u16) {
        info!("idle period set to {} ms", ms);
        self.idle.set_idle_ms(ms);
    }

    pub fn idle_ms(&self) -> u16 {
        self.idle.idle_ms()
    }

    /// SET_IDLE as decoded by the USB stack, in milliseconds
    pub fn set_idle_duration(&self, duration_ms: u32) {
        self.set_idle_ms(idle_period_ms(duration_ms));
    }

    /// SET_IDLE with the raw request wValue
    pub fn set_idle(&self, w_value: u16) {
        self.idle.set_idle(w_value);
    }

    /// GET_IDLE, in 4 ms units
    pub fn get_idle(&self) -> u8 {
        self.idle.get_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scancode::*;

    fn held(codes: &[Keycode]) -> KeyscanReport {
        let mut scan = KeyscanReport::new();
        for &code in codes {
            scan.add_key(code);
        }
        scan
    }

    #[test]
    fn get_report_selects_by_interface() {
        let idle = IdleState::default();
        let latest = LatestReport::new();
        let control = HidControl::new(&idle, &latest);
        latest.publish(held(&[LEFT_SHIFT, KEYPAD_9_AND_PAGE_UP, MEDIA_VOLUME_UP]));

        let mut buf = [0xaa; 16];
        assert_eq!(control.get_report(KEYBOARD_INTERFACE, &mut buf), Some(8));
        assert_eq!(&buf[..8], &[0x02, 0x00, 0x61, 0, 0, 0, 0, 0]);

        let mut buf = [0xaa; 16];
        assert_eq!(control.get_report(1, &mut buf), Some(2));
        assert_eq!(&buf[..2], &[0x00, 0x02]);
    }

    #[test]
    fn get_report_rejects_short_buffer() {
        let idle = IdleState::default();
        let latest = LatestReport::new();
        let control = HidControl::new(&idle, &latest);
        let mut buf = [0u8; 4];
        assert_eq!(control.get_report(KEYBOARD_INTERFACE, &mut buf), None);
    }

    #[test]
    fn set_report_reads_num_lock() {
        let idle = IdleState::default();
        let latest = LatestReport::new();
        let control = HidControl::new(&idle, &latest);
        assert_eq!(control.set_report(&[LED_NUM_LOCK | LED_CAPS_LOCK]), Some(true));
        assert_eq!(control.set_report(&[LED_SCROLL_LOCK]), Some(false));
        assert_eq!(control.set_report(&[]), None);
    }

    #[test]
    fn protocol_defaults_to_report_mode() {
        let idle = IdleState::default();
        let latest = LatestReport::new();
        let control = HidControl::new(&idle, &latest);
        assert!(control.protocol());
        control.set_protocol(PROTOCOL_BOOT);
        assert!(!control.protocol());
        assert_eq!(control.get_protocol(), PROTOCOL_BOOT);
        control.reset_protocol();
        assert!(control.protocol());
        assert_eq!(control.get_protocol(), PROTOCOL_REPORT);
    }

    #[test]
    fn idle_requests_share_the_scheduler_state() {
        let idle = IdleState::default();
        let latest = LatestReport::new();
        let control = HidControl::new(&idle, &latest);

        control.set_idle(0x0a00);
        assert_eq!(idle.idle_ms(), 40);
        assert_eq!(control.get_idle(), 10);

        control.set_idle_ms(0);
        assert_eq!(control.idle_ms(), 0);
        assert!(!idle.elapsed());
    }

    #[test]
    fn indefinite_idle_disables_repeats() {
        let idle = IdleState::default();
        let latest = LatestReport::new();
        let control = HidControl::new(&idle, &latest);

        control.set_idle_duration(IDLE_INDEFINITE);
        assert_eq!(control.idle_ms(), 0);
        assert_eq!(control.get_idle(), 0);
        assert!(!idle.elapsed());
    }

    #[test]
    fn idle_duration_conversion() {
        assert_eq!(idle_period_ms(0), 0);
        assert_eq!(idle_period_ms(IDLE_INDEFINITE), 0);
        assert_eq!(idle_period_ms(1020), 1020);
        assert_eq!(idle_period_ms(70_000), u16::MAX);
    }
}
