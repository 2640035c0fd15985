//! Keyboard and media-control scancodes
//!
//! Codes 0x00-0x65 are the standard HID keyboard usages, 0xE0-0xE7 the
//! modifiers. Media controls have no keyboard usage, so this firmware numbers
//! them from 0xF0 upwards; the keyscan builder relies on these three ranges to
//! route a code into the right part of the report.

/// One byte identifying a key, a modifier or a media control
pub type Keycode = u8;

// ===================================================================
// Keyboard scancodes (0x00 - 0x65)
// ===================================================================

pub const RESERVED: Keycode = 0x00; // No key
pub const ERROR_ROLLOVER: Keycode = 0x01;
pub const POST_FAIL: Keycode = 0x02;
pub const ERROR_UNDEFINED: Keycode = 0x03;
pub const A: Keycode = 0x04;
pub const B: Keycode = 0x05;
pub const C: Keycode = 0x06;
pub const D: Keycode = 0x07;
pub const E: Keycode = 0x08;
pub const F: Keycode = 0x09;
pub const G: Keycode = 0x0A;
pub const H: Keycode = 0x0B;
pub const I: Keycode = 0x0C;
pub const J: Keycode = 0x0D;
pub const K: Keycode = 0x0E;
pub const L: Keycode = 0x0F;
pub const M: Keycode = 0x10;
pub const N: Keycode = 0x11;
pub const O: Keycode = 0x12;
pub const P: Keycode = 0x13;
pub const Q: Keycode = 0x14;
pub const R: Keycode = 0x15;
pub const S: Keycode = 0x16;
pub const T: Keycode = 0x17;
pub const U: Keycode = 0x18;
pub const V: Keycode = 0x19;
pub const W: Keycode = 0x1A;
pub const X: Keycode = 0x1B;
pub const Y: Keycode = 0x1C;
pub const Z: Keycode = 0x1D;
pub const N1_AND_EXCLAMATION: Keycode = 0x1E;
pub const N2_AND_AT: Keycode = 0x1F;
pub const N3_AND_HASHMARK: Keycode = 0x20;
pub const N4_AND_DOLLAR: Keycode = 0x21;
pub const N5_AND_PERCENTAGE: Keycode = 0x22;
pub const N6_AND_CARET: Keycode = 0x23;
pub const N7_AND_AMPERSAND: Keycode = 0x24;
pub const N8_AND_ASTERISK: Keycode = 0x25;
pub const N9_AND_OPENING_PARENTHESIS: Keycode = 0x26;
pub const N0_AND_CLOSING_PARENTHESIS: Keycode = 0x27;
pub const ENTER: Keycode = 0x28;
pub const ESCAPE: Keycode = 0x29;
pub const BACKSPACE: Keycode = 0x2A;
pub const TAB: Keycode = 0x2B;
pub const SPACE: Keycode = 0x2C;
pub const MINUS_AND_UNDERSCORE: Keycode = 0x2D;
pub const EQUAL_AND_PLUS: Keycode = 0x2E;
pub const OPENING_BRACKET_AND_OPENING_BRACE: Keycode = 0x2F;
pub const CLOSING_BRACKET_AND_CLOSING_BRACE: Keycode = 0x30;
pub const BACKSLASH_AND_PIPE: Keycode = 0x31;
pub const NON_US_HASHMARK_AND_TILDE: Keycode = 0x32;
pub const SEMICOLON_AND_COLON: Keycode = 0x33;
pub const APOSTROPHE_AND_QUOTE: Keycode = 0x34;
pub const GRAVE_ACCENT_AND_TILDE: Keycode = 0x35;
pub const COMMA_AND_LESS_THAN_SIGN: Keycode = 0x36;
pub const DOT_AND_GREATER_THAN_SIGN: Keycode = 0x37;
pub const SLASH_AND_QUESTION_MARK: Keycode = 0x38;
pub const CAPS_LOCK: Keycode = 0x39;
pub const F1: Keycode = 0x3A;
pub const F2: Keycode = 0x3B;
pub const F3: Keycode = 0x3C;
pub const F4: Keycode = 0x3D;
pub const F5: Keycode = 0x3E;
pub const F6: Keycode = 0x3F;
pub const F7: Keycode = 0x40;
pub const F8: Keycode = 0x41;
pub const F9: Keycode = 0x42;
pub const F10: Keycode = 0x43;
pub const F11: Keycode = 0x44;
pub const F12: Keycode = 0x45;
pub const PRINT_SCREEN: Keycode = 0x46;
pub const SCROLL_LOCK: Keycode = 0x47;
pub const PAUSE: Keycode = 0x48;
pub const INSERT: Keycode = 0x49;
pub const HOME: Keycode = 0x4A;
pub const PAGE_UP: Keycode = 0x4B;
pub const DELETE: Keycode = 0x4C;
pub const END: Keycode = 0x4D;
pub const PAGE_DOWN: Keycode = 0x4E;
pub const RIGHT_ARROW: Keycode = 0x4F;
pub const LEFT_ARROW: Keycode = 0x50;
pub const DOWN_ARROW: Keycode = 0x51;
pub const UP_ARROW: Keycode = 0x52;
pub const NUM_LOCK: Keycode = 0x53;
pub const KEYPAD_SLASH: Keycode = 0x54;
pub const KEYPAD_ASTERISK: Keycode = 0x55;
pub const KEYPAD_MINUS: Keycode = 0x56;
pub const KEYPAD_PLUS: Keycode = 0x57;
pub const KEYPAD_ENTER: Keycode = 0x58;
pub const KEYPAD_1_AND_END: Keycode = 0x59;
pub const KEYPAD_2_AND_DOWN_ARROW: Keycode = 0x5A;
pub const KEYPAD_3_AND_PAGE_DOWN: Keycode = 0x5B;
pub const KEYPAD_4_AND_LEFT_ARROW: Keycode = 0x5C;
pub const KEYPAD_5: Keycode = 0x5D;
pub const KEYPAD_6_AND_RIGHT_ARROW: Keycode = 0x5E;
pub const KEYPAD_7_AND_HOME: Keycode = 0x5F;
pub const KEYPAD_8_AND_UP_ARROW: Keycode = 0x60;
pub const KEYPAD_9_AND_PAGE_UP: Keycode = 0x61;
pub const KEYPAD_0_AND_INSERT: Keycode = 0x62;
pub const KEYPAD_DOT_AND_DELETE: Keycode = 0x63;
pub const NON_US_BACKSLASH_AND_PIPE: Keycode = 0x64;
pub const APPLICATION: Keycode = 0x65; // Last regular keycode

// ===================================================================
// Modifiers (0xE0 - 0xE7), bit (code - 0xE0) of the modifier byte
// ===================================================================

pub const LEFT_CONTROL: Keycode = 0xE0;
pub const LEFT_SHIFT: Keycode = 0xE1;
pub const LEFT_ALT: Keycode = 0xE2;
pub const LEFT_GUI: Keycode = 0xE3;
pub const RIGHT_CONTROL: Keycode = 0xE4;
pub const RIGHT_SHIFT: Keycode = 0xE5;
pub const RIGHT_ALT: Keycode = 0xE6;
pub const RIGHT_GUI: Keycode = 0xE7;

// ===================================================================
// Media controls (0xF0 - 0xFA), bit (code - 0xF0) of the media flags
// ===================================================================

pub const MEDIA_PLAY: Keycode = 0xF0;
pub const MEDIA_PAUSE: Keycode = 0xF1;
pub const MEDIA_FAST_FORWARD: Keycode = 0xF2;
pub const MEDIA_REWIND: Keycode = 0xF3;
pub const MEDIA_NEXT: Keycode = 0xF4;
pub const MEDIA_PREVIOUS: Keycode = 0xF5;
pub const MEDIA_STOP: Keycode = 0xF6;
pub const MEDIA_TOGGLE: Keycode = 0xF7;
pub const MEDIA_MUTE: Keycode = 0xF8;
pub const MEDIA_VOLUME_UP: Keycode = 0xF9;
pub const MEDIA_VOLUME_DOWN: Keycode = 0xFA;

/// Modifier byte with only left shift held
pub const MODIFIER_LEFT_SHIFT: u8 = 1 << (LEFT_SHIFT - LEFT_CONTROL);

/// How a keycode is folded into a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyKind {
    /// 0x00, nothing assigned
    None,
    /// 0x01-0x65, goes into the key array
    Regular(Keycode),
    /// 0xE0-0xE7, carries its bit in the modifier byte
    Modifier(u8),
    /// Above 0xE7, carries its bit in the media flags
    Media(u16),
}

/// Sort a keycode into its report bucket.
///
/// Codes between 0x66 and 0xDF have no meaning in this firmware and are
/// treated as "no key". Codes past 0xFA would shift beyond the 11 media
/// flags and are dropped the same way.
pub fn classify(code: Keycode) -> KeyKind {
    match code {
        RESERVED => KeyKind::None,
        ERROR_ROLLOVER..=APPLICATION => KeyKind::Regular(code),
        LEFT_CONTROL..=RIGHT_GUI => KeyKind::Modifier(1u8 << (code - LEFT_CONTROL)),
        MEDIA_PLAY..=MEDIA_VOLUME_DOWN => KeyKind::Media(1u16 << (code - MEDIA_PLAY)),
        _ => KeyKind::None,
    }
}

/// Converts a character to the keycode that produces it on a US layout.
///
/// Letters map case-insensitively; whether shift is needed comes from
/// [`needs_shift`]. Anything unmapped returns [`RESERVED`].
pub fn char_to_code(c: char) -> Keycode {
    match c {
        'A'..='Z' => (c as u8) - b'A' + A,
        'a'..='z' => (c as u8) - b'a' + A,
        '1'..='9' => (c as u8) - b'1' + N1_AND_EXCLAMATION,
        '0' => N0_AND_CLOSING_PARENTHESIS,
        '!' => N1_AND_EXCLAMATION,
        '@' => N2_AND_AT,
        '#' => N3_AND_HASHMARK,
        '$' => N4_AND_DOLLAR,
        '%' => N5_AND_PERCENTAGE,
        '^' => N6_AND_CARET,
        '&' => N7_AND_AMPERSAND,
        '*' => N8_AND_ASTERISK,
        '(' => N9_AND_OPENING_PARENTHESIS,
        ')' => N0_AND_CLOSING_PARENTHESIS,
        '\n' => ENTER,
        '\x1b' => ESCAPE,
        '\x08' => BACKSPACE,
        '\t' => TAB,
        ' ' => SPACE,
        '-' | '_' => MINUS_AND_UNDERSCORE,
        '=' | '+' => EQUAL_AND_PLUS,
        '[' | '{' => OPENING_BRACKET_AND_OPENING_BRACE,
        ']' | '}' => CLOSING_BRACKET_AND_CLOSING_BRACE,
        '\\' | '|' => BACKSLASH_AND_PIPE,
        ';' | ':' => SEMICOLON_AND_COLON,
        '\'' | '"' => APOSTROPHE_AND_QUOTE,
        '`' | '~' => GRAVE_ACCENT_AND_TILDE,
        ',' | '<' => COMMA_AND_LESS_THAN_SIGN,
        '.' | '>' => DOT_AND_GREATER_THAN_SIGN,
        '/' | '?' => SLASH_AND_QUESTION_MARK,
        _ => RESERVED,
    }
}

/// Whether a shift modifier is required to reproduce a character.
pub fn needs_shift(c: char) -> bool {
    matches!(
        c,
        '!'..='&' | '('..='+' | ':' | '<' | '>'..='Z' | '^'..='_' | '{'..='~'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_are_case_insensitive() {
        assert_eq!(char_to_code('A'), char_to_code('a'));
        assert_eq!(char_to_code('a'), A);
        assert_eq!(char_to_code('Z'), Z);
        assert!(needs_shift('A'));
        assert!(!needs_shift('a'));
    }

    #[test]
    fn digits_and_their_symbols_share_a_key() {
        assert_eq!(char_to_code('1'), N1_AND_EXCLAMATION);
        assert_eq!(char_to_code('9'), N9_AND_OPENING_PARENTHESIS);
        assert_eq!(char_to_code('0'), N0_AND_CLOSING_PARENTHESIS);
        assert_eq!(char_to_code('!'), char_to_code('1'));
        assert_eq!(char_to_code(')'), char_to_code('0'));
        assert!(!needs_shift('5'));
        assert!(needs_shift('%'));
    }

    #[test]
    fn control_characters() {
        assert_eq!(char_to_code('\n'), ENTER);
        assert_eq!(char_to_code('\t'), TAB);
        assert_eq!(char_to_code('\x1b'), ESCAPE);
        assert_eq!(char_to_code('\x08'), BACKSPACE);
        assert!(!needs_shift('\n'));
    }

    #[test]
    fn unmapped_characters_are_no_key() {
        assert_eq!(char_to_code('\0'), RESERVED);
        assert_eq!(char_to_code('é'), RESERVED);
        assert_eq!(char_to_code('\x7f'), RESERVED);
    }

    #[test]
    fn shift_table_matches_us_layout() {
        let shifted = "!\"#$%&()*+:<>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ^_{|}~";
        let plain = "'-./0123456789;=[\\]`abcdefghijklmnopqrstuvwxyz ,\n\t";
        for c in shifted.chars() {
            assert!(needs_shift(c), "{:?} should need shift", c);
        }
        for c in plain.chars() {
            assert!(!needs_shift(c), "{:?} should not need shift", c);
        }
    }

    #[test]
    fn every_printable_ascii_char_types_something() {
        for b in 0x20u8..0x7f {
            assert_ne!(char_to_code(b as char), RESERVED, "{:?}", b as char);
        }
    }

    #[test]
    fn classify_buckets() {
        assert_eq!(classify(RESERVED), KeyKind::None);
        assert_eq!(classify(KEYPAD_5), KeyKind::Regular(KEYPAD_5));
        assert_eq!(classify(APPLICATION), KeyKind::Regular(APPLICATION));
        assert_eq!(classify(LEFT_CONTROL), KeyKind::Modifier(0b0000_0001));
        assert_eq!(classify(RIGHT_GUI), KeyKind::Modifier(0b1000_0000));
        assert_eq!(classify(MEDIA_PLAY), KeyKind::Media(1));
        assert_eq!(classify(MEDIA_MUTE), KeyKind::Media(1 << 8));
        assert_eq!(classify(MEDIA_VOLUME_DOWN), KeyKind::Media(1 << 10));
        assert_eq!(classify(0x70), KeyKind::None);
        assert_eq!(classify(0xFF), KeyKind::None);
    }
}
