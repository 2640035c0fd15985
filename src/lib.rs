//! jankpad - USB numpad and macro pad firmware for RP2040
//!
//! This library holds the keypad logic and the Embassy glue for the board.
//!
//! ## Input pipeline
//! matrix scan → keyscan report → keyboard/media HID reports → change and
//! idle scheduling → USB. Macro keys bypass the keyscan and drive the
//! keyboard report directly through the macro player.
//!
//! ## Architecture
//! - **Core**: platform independent, generic over `embedded-hal` pins and
//!   `embedded-hal-async` delays; builds and tests on the host
//! - **Async**: Embassy tasks on target (`rp2040` feature)
//! - **Channels**: embassy-sync statics between the keypad loop, USB, LED
//!   and button tasks

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod channels;
pub mod config;
pub mod control;
pub mod error;
pub mod keymap;
pub mod keypad;
pub mod keyscan;
pub mod leds;
pub mod macros;
pub mod matrix;
pub mod player;
pub mod report;
pub mod scancode;
pub mod scheduler;
pub mod transport;
pub mod types;

#[cfg(feature = "rp2040")]
pub mod hardware;
#[cfg(feature = "rp2040")]
pub mod supervisor;
#[cfg(feature = "rp2040")]
pub mod usb;

pub use error::{Error, Result};

// USB interrupt binding
#[cfg(feature = "rp2040")]
embassy_rp::bind_interrupts!(pub struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<embassy_rp::peripherals::USB>;
});
