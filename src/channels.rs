//! Inter-task communication
//!
//! Statics shared by the keypad loop, the USB task and the peripheral tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::config::DEFAULT_IDLE_MS;
use crate::control::{HidControl, LatestReport};
use crate::leds::LedCommand;
use crate::scheduler::IdleState;
use crate::types::Event;

/// Events for the keypad driver (mode button)
/// Buffer size: 4 (presses are rare; extra ones are dropped)
pub static EVENTS: Channel<CriticalSectionRawMutex, Event, 4> = Channel::new();

/// Num Lock indicator state from the host LED report
pub static NUM_LOCK: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Latest backlight command for the LED task
pub static LED_COMMANDS: Signal<CriticalSectionRawMutex, LedCommand> = Signal::new();

/// Host idle period, ticked every millisecond
pub static IDLE: IdleState = IdleState::new(DEFAULT_IDLE_MS);

/// Most recent keyscan, read back by GET_REPORT
pub static LATEST_REPORT: LatestReport = LatestReport::new();

/// Control request state shared by both HID interfaces
pub static HID_CONTROL: HidControl<'static> = HidControl::new(&IDLE, &LATEST_REPORT);
