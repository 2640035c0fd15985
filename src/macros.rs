//! Macro actions
//!
//! A macro is an ordered list of [`MacroAction`]s played back while a macro
//! key is held. Compiled-in tables use the typed form directly; the
//! fixed-size [`RawMacroAction`] is the tagged wire form (`kind` byte plus a
//! zero-terminated payload) and decodes into the typed form.
//!
//! The wire codec is for tables stored or transferred as bytes. The firmware
//! itself never decodes: its table is typed and checked at compile time.

use crate::config::{MAX_MACRO_ACTIONS, MAX_MACRO_CHARS};
use crate::scancode::Keycode;

// Wire tags
pub const M_END: u8 = 0x00;
pub const M_STRING: u8 = 0x23;
pub const M_KEYS: u8 = 0x32;
pub const M_WAIT: u8 = 0x57;

/// One step of a macro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroAction<'a> {
    /// Type each character in turn, stopping at a zero byte
    Type(&'a [u8]),
    /// Press all keycodes together, then release
    Keys(&'a [Keycode]),
    /// Pause for each listed number of seconds in turn
    Wait(&'a [u8]),
}

impl MacroAction<'_> {
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Type(_) => M_STRING,
            Self::Keys(_) => M_KEYS,
            Self::Wait(_) => M_WAIT,
        }
    }

    const fn payload_len(&self) -> usize {
        match self {
            Self::Type(bytes) | Self::Keys(bytes) | Self::Wait(bytes) => bytes.len(),
        }
    }
}

/// Action sequence bound to one macro key
pub type Macro = &'static [MacroAction<'static>];

/// Tagged wire form of a macro action.
///
/// `kind == M_END` marks the end of a sequence. Payloads shorter than
/// [`MAX_MACRO_CHARS`] are zero padded; a full payload has no terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMacroAction {
    pub kind: u8,
    pub payload: [u8; MAX_MACRO_CHARS],
}

impl RawMacroAction {
    pub const END: Self = Self {
        kind: M_END,
        payload: [0; MAX_MACRO_CHARS],
    };

    /// Payloads longer than [`MAX_MACRO_CHARS`] are truncated.
    pub const fn new(kind: u8, data: &[u8]) -> Self {
        let mut payload = [0; MAX_MACRO_CHARS];
        let mut i = 0;
        while i < data.len() && i < MAX_MACRO_CHARS {
            payload[i] = data[i];
            i += 1;
        }
        Self { kind, payload }
    }

    pub const fn string(text: &[u8]) -> Self {
        Self::new(M_STRING, text)
    }

    pub const fn keys(codes: &[Keycode]) -> Self {
        Self::new(M_KEYS, codes)
    }

    pub const fn wait(seconds: &[u8]) -> Self {
        Self::new(M_WAIT, seconds)
    }

    /// Typed view of this action, `None` for the terminator or an unknown tag.
    pub fn decode(&self) -> Option<MacroAction<'_>> {
        let len = self
            .payload
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_MACRO_CHARS);
        let data = &self.payload[..len];

        match self.kind {
            M_STRING => Some(MacroAction::Type(data)),
            M_KEYS => Some(MacroAction::Keys(data)),
            M_WAIT => Some(MacroAction::Wait(data)),
            _ => None,
        }
    }
}

impl From<&MacroAction<'_>> for RawMacroAction {
    fn from(action: &MacroAction<'_>) -> Self {
        match action {
            MacroAction::Type(bytes) => Self::string(bytes),
            MacroAction::Keys(codes) => Self::keys(codes),
            MacroAction::Wait(seconds) => Self::wait(seconds),
        }
    }
}

/// Decode a wire sequence, stopping at the first terminator or unknown tag
/// and never reading more than [`MAX_MACRO_ACTIONS`] entries.
pub fn decode_sequence(raw: &[RawMacroAction]) -> impl Iterator<Item = MacroAction<'_>> {
    raw.iter()
        .take(MAX_MACRO_ACTIONS)
        .map_while(RawMacroAction::decode)
}

/// Whether every sequence fits in [`MAX_MACRO_ACTIONS`] and every payload in
/// [`MAX_MACRO_CHARS`]. Evaluated at compile time against the macro table.
pub const fn table_is_valid<const ROWS: usize, const COLS: usize>(
    table: &[[Macro; COLS]; ROWS],
) -> bool {
    let mut row = 0;
    while row < ROWS {
        let mut col = 0;
        while col < COLS {
            if !sequence_is_valid(table[row][col]) {
                return false;
            }
            col += 1;
        }
        row += 1;
    }
    true
}

pub const fn sequence_is_valid(actions: &[MacroAction<'_>]) -> bool {
    if actions.len() > MAX_MACRO_ACTIONS {
        return false;
    }
    let mut i = 0;
    while i < actions.len() {
        if actions[i].payload_len() > MAX_MACRO_CHARS {
            return false;
        }
        i += 1;
    }
    true
}
