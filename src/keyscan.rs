//! Keyscan report: every key currently held on the regular matrix
//!
//! Rebuilt from scratch on each polling cycle. Both the keyboard and the
//! media HID reports are derived from it.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;

use crate::config::MAX_KEYS;
use crate::keymap::Keymap;
use crate::matrix::{Matrix, KEY_DOMAIN};
use crate::scancode::{classify, KeyKind, Keycode};

// Bit positions inside `KeyscanReport::media_keys`
pub const MK_PLAY: u16 = 0;
pub const MK_PAUSE: u16 = 1;
pub const MK_FF: u16 = 2;
pub const MK_RW: u16 = 3;
pub const MK_NEXT: u16 = 4;
pub const MK_PREVIOUS: u16 = 5;
pub const MK_STOP: u16 = 6;
pub const MK_TOGGLE: u16 = 7;
pub const MK_MUTE: u16 = 8;
pub const MK_VOL_UP: u16 = 9;
pub const MK_VOL_DOWN: u16 = 10;

/// Current key presses, split by report bucket.
///
/// - `media_keys`: bits 0-10 are Play, Pause, Fast Forward, Rewind, Next,
///   Previous, Stop, Play/Pause, Mute, Volume Up, Volume Down
/// - `modifier`: bits 0-7 are LCtrl, LShift, LAlt, LGui, RCtrl, RShift,
///   RAlt, RGui
/// - `keys`: up to [`MAX_KEYS`] regular keycodes in scan order, zero padded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyscanReport {
    pub media_keys: u16,
    pub modifier: u8,
    pub keys: [Keycode; MAX_KEYS],
}

impl KeyscanReport {
    pub const fn new() -> Self {
        Self {
            media_keys: 0,
            modifier: 0,
            keys: [0; MAX_KEYS],
        }
    }

    /// Fold one detected keycode into the report.
    ///
    /// Regular keys take the first free slot; once all slots are used further
    /// keys are dropped.
    pub fn add_key(&mut self, code: Keycode) {
        match classify(code) {
            KeyKind::None => {}
            KeyKind::Regular(code) => {
                if let Some(slot) = self.keys.iter_mut().find(|slot| **slot == 0) {
                    *slot = code;
                }
            }
            KeyKind::Modifier(bit) => self.modifier |= bit,
            KeyKind::Media(bit) => self.media_keys |= bit,
        }
    }

    pub fn is_media_set(&self, bit: u16) -> bool {
        self.media_keys & (1 << bit) != 0
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::new()
    }
}

/// Scan the regular key matrix and collect everything held down.
pub async fn build_report<O, I, D, const ROWS: usize, const COLS: usize>(
    matrix: &mut Matrix<O, I, ROWS, COLS>,
    keymap: &Keymap,
    delay: &mut D,
) -> KeyscanReport
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
{
    let mut report = KeyscanReport::new();
    matrix
        .scan(KEY_DOMAIN, delay, |pos| {
            let code = keymap
                .get(pos.row)
                .and_then(|row| row.get(pos.col))
                .copied()
                .unwrap_or(0);
            report.add_key(code);
        })
        .await;
    report
}
