//! HID wire reports
//!
//! Converts a [`KeyscanReport`] into the two input reports the host reads:
//! the boot-compatible keyboard report and the consumer-control (media)
//! report. The macro player builds single-key keyboard reports here too.

use usbd_hid::descriptor::{KeyboardReport as UsbdKeyboardReport, SerializedDescriptor};

use crate::config::{KEYBOARD_REPORT_SIZE, MAX_KEYS, MEDIA_REPORT_SIZE};
use crate::keyscan::*;
use crate::scancode::{char_to_code, needs_shift, Keycode, MODIFIER_LEFT_SHIFT};

// ===================================================================
// Keyboard Report
// ===================================================================

/// Keyboard input report: `{modifier, reserved, keycode[6]}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    pub modifier: u8,
    pub reserved: u8,
    pub keycodes: [Keycode; MAX_KEYS],
}

impl KeyboardReport {
    /// Every key released
    pub const EMPTY: Self = Self {
        modifier: 0,
        reserved: 0,
        keycodes: [0; MAX_KEYS],
    };

    /// One simultaneous combination of keys and modifiers.
    pub const fn single(keycodes: [Keycode; MAX_KEYS], modifier: u8) -> Self {
        Self {
            modifier,
            reserved: 0,
            keycodes,
        }
    }

    /// Press report that types `c`, with left shift when the character needs it.
    pub fn for_char(c: char) -> Self {
        let mut keycodes = [0; MAX_KEYS];
        keycodes[0] = char_to_code(c);
        let modifier = if needs_shift(c) { MODIFIER_LEFT_SHIFT } else { 0 };
        Self::single(keycodes, modifier)
    }

    pub fn to_bytes(&self) -> [u8; KEYBOARD_REPORT_SIZE] {
        let mut bytes = [0u8; KEYBOARD_REPORT_SIZE];
        bytes[0] = self.modifier;
        bytes[1] = self.reserved;
        bytes[2..].copy_from_slice(&self.keycodes);
        bytes
    }
}

impl From<&KeyscanReport> for KeyboardReport {
    fn from(scan: &KeyscanReport) -> Self {
        Self::single(scan.keys, scan.modifier)
    }
}

// ===================================================================
// Media Controller Report
// ===================================================================

/// Consumer-control input report: 11 one-bit flags followed by 5 padding bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MediaReport {
    pub play: bool,
    pub pause: bool,
    pub fast_forward: bool,
    pub rewind: bool,
    pub next_track: bool,
    pub previous_track: bool,
    pub stop: bool,
    pub play_pause: bool,
    pub mute: bool,
    pub volume_up: bool,
    pub volume_down: bool,
}

impl MediaReport {
    pub const EMPTY: Self = Self {
        play: false,
        pause: false,
        fast_forward: false,
        rewind: false,
        next_track: false,
        previous_track: false,
        stop: false,
        play_pause: false,
        mute: false,
        volume_up: false,
        volume_down: false,
    };

    fn flags(&self) -> [bool; 11] {
        [
            self.play,
            self.pause,
            self.fast_forward,
            self.rewind,
            self.next_track,
            self.previous_track,
            self.stop,
            self.play_pause,
            self.mute,
            self.volume_up,
            self.volume_down,
        ]
    }

    /// Packed little-endian, Play in bit 0.
    pub fn to_bytes(&self) -> [u8; MEDIA_REPORT_SIZE] {
        let bits = self
            .flags()
            .iter()
            .enumerate()
            .fold(0u16, |acc, (bit, &set)| acc | ((set as u16) << bit));
        bits.to_le_bytes()
    }
}

impl From<&KeyscanReport> for MediaReport {
    fn from(scan: &KeyscanReport) -> Self {
        Self {
            play: scan.is_media_set(MK_PLAY),
            pause: scan.is_media_set(MK_PAUSE),
            fast_forward: scan.is_media_set(MK_FF),
            rewind: scan.is_media_set(MK_RW),
            next_track: scan.is_media_set(MK_NEXT),
            previous_track: scan.is_media_set(MK_PREVIOUS),
            stop: scan.is_media_set(MK_STOP),
            play_pause: scan.is_media_set(MK_TOGGLE),
            mute: scan.is_media_set(MK_MUTE),
            volume_up: scan.is_media_set(MK_VOL_UP),
            volume_down: scan.is_media_set(MK_VOL_DOWN),
        }
    }
}

// ===================================================================
// HID Report Descriptors
// ===================================================================

/// Boot keyboard descriptor: modifier byte, reserved byte, 5 LED output bits,
/// 6 keycode bytes. Matches [`KeyboardReport::to_bytes`] for the input part.
pub fn keyboard_report_descriptor() -> &'static [u8] {
    UsbdKeyboardReport::desc()
}

/// Consumer-control descriptor with one bit per media flag, in the same
/// order as [`MediaReport::to_bytes`].
pub const MEDIA_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x0c, // Usage Page (Consumer)
    0x09, 0x01, // Usage (Consumer Control)
    0xa1, 0x01, // Collection (Application)
    0x09, 0xb0, //   Usage (Play)
    0x09, 0xb1, //   Usage (Pause)
    0x09, 0xb3, //   Usage (Fast Forward)
    0x09, 0xb4, //   Usage (Rewind)
    0x09, 0xb5, //   Usage (Scan Next Track)
    0x09, 0xb6, //   Usage (Scan Previous Track)
    0x09, 0xb7, //   Usage (Stop)
    0x09, 0xcd, //   Usage (Play/Pause)
    0x09, 0xe2, //   Usage (Mute)
    0x09, 0xe9, //   Usage (Volume Increment)
    0x09, 0xea, //   Usage (Volume Decrement)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x0b, //   Report Count (11)
    0x81, 0x06, //   Input (Data, Variable, Relative)
    0x95, 0x05, //   Report Count (5)
    0x81, 0x01, //   Input (Constant) - padding
    0xc0,       // End Collection
];
