//! Compiled-in key layout and macro table
//!
//! Numpad on the regular matrix, with volume and mute in the spare
//! positions. Four macro keys sit on the row above.

use crate::config::{KEY_COLS, KEY_ROWS, MACRO_COLS, MACRO_ROWS};
use crate::macros::{table_is_valid, Macro, MacroAction};
use crate::matrix::KeyPosition;
use crate::scancode::*;

/// Keycode for every regular key position (0 = unassigned)
pub type Keymap = [[Keycode; KEY_COLS]; KEY_ROWS];

/// Action sequence for every macro key position
pub type MacroTable = [[Macro; MACRO_COLS]; MACRO_ROWS];

#[rustfmt::skip]
pub static KEYMAP: Keymap = [
    // Column 0                 Column 1                   Column 2                  Column 3
    [NUM_LOCK,                  KEYPAD_SLASH,              KEYPAD_ASTERISK,          KEYPAD_MINUS],      // Row 0
    [KEYPAD_7_AND_HOME,         KEYPAD_8_AND_UP_ARROW,     KEYPAD_9_AND_PAGE_UP,     KEYPAD_PLUS],       // Row 1
    [KEYPAD_4_AND_LEFT_ARROW,   KEYPAD_5,                  KEYPAD_6_AND_RIGHT_ARROW, MEDIA_VOLUME_UP],   // Row 2
    [KEYPAD_1_AND_END,          KEYPAD_2_AND_DOWN_ARROW,   KEYPAD_3_AND_PAGE_DOWN,   KEYPAD_ENTER],      // Row 3
    [KEYPAD_0_AND_INSERT,       MEDIA_MUTE,                KEYPAD_DOT_AND_DELETE,    MEDIA_VOLUME_DOWN], // Row 4
];

// Macro key 1: open a terminal through the launcher
const OPEN_TERMINAL: Macro = &[
    MacroAction::Keys(&[LEFT_GUI]),
    MacroAction::Wait(&[1]),
    MacroAction::Type(b"terminal"),
    MacroAction::Keys(&[ENTER]),
];

// Macro key 2
const GREETING: Macro = &[MacroAction::Type(b"Hello, World!\n")];

// Macro key 3: task manager
const TASK_MANAGER: Macro = &[MacroAction::Keys(&[LEFT_CONTROL, LEFT_SHIFT, ESCAPE])];

// Macro key 4: lock screen
const LOCK_SCREEN: Macro = &[MacroAction::Keys(&[LEFT_GUI, L])];

pub const MACROS: MacroTable = [[OPEN_TERMINAL, GREETING, TASK_MANAGER, LOCK_SCREEN]];

const _: () = assert!(table_is_valid(&MACROS), "macro table exceeds action or payload bounds");

/// Macro bound to `pos`, if the position is inside the macro table.
pub fn macro_at(table: &MacroTable, pos: KeyPosition) -> Option<Macro> {
    table.get(pos.row)?.get(pos.col).copied()
}

/// Number of macro keys with a non-empty sequence
pub fn macro_count(table: &MacroTable) -> usize {
    table
        .iter()
        .flatten()
        .filter(|actions| !actions.is_empty())
        .count()
}
