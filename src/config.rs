//! Hardware configuration for jankpad
//! RP2040-based USB keypad with a macro row and a pulsing status LED

// ===================================================================
// USB Configuration
// ===================================================================

pub const USB_VID: u16 = 0x03eb; // Atmel VID used by the LUFA keyboard demos
pub const USB_PID: u16 = 0x2042; // LUFA keyboard/media composite PID
pub const USB_MANUFACTURER: &str = "clewsy";
pub const USB_PRODUCT: &str = "jank";
pub const USB_SERIAL: &str = "JANKPAD00001"; // 12 chars

pub const USB_BCD_DEVICE: u16 = 0x0100; // Device version 1.0
pub const USB_MAX_POWER_MA: u16 = 100;

// ===================================================================
// Matrix Specifications
// ===================================================================

pub const KEY_ROWS: usize = 5; // Regular key rows (numpad)
pub const KEY_COLS: usize = 4; // Regular key columns
pub const MACRO_ROWS: usize = 1; // Macro trigger rows
pub const MACRO_COLS: usize = 4; // Macro trigger columns

// Both domains share the column lines; macro rows follow the key rows.
pub const MATRIX_ROWS: usize = KEY_ROWS + MACRO_ROWS;
pub const MATRIX_COLS: usize = if KEY_COLS > MACRO_COLS { KEY_COLS } else { MACRO_COLS };

// ===================================================================
// HID Report Limits
// ===================================================================

pub const MAX_KEYS: usize = 6; // Simultaneous regular keys in a keyboard report
pub const MAX_MACRO_CHARS: usize = 50; // Longer macro strings are truncated
pub const MAX_MACRO_ACTIONS: usize = 50; // Actions per macro key

pub const KEYBOARD_REPORT_SIZE: usize = 8; // modifier + reserved + 6 keycodes
pub const MEDIA_REPORT_SIZE: usize = 2; // 11 flag bits + 5 padding bits
pub const LED_REPORT_SIZE: usize = 1;

// ===================================================================
// GPIO Pin Assignments - Raspberry Pi Pico
// ===================================================================

// Rows 0-4 scan the numpad, row 5 scans the macro keys.
pub const MATRIX_ROW_PINS: [u8; MATRIX_ROWS] = [2, 3, 4, 5, 6, 7]; // GPIO 2-7
pub const MATRIX_COL_PINS: [u8; MATRIX_COLS] = [8, 9, 10, 11]; // GPIO 8-11

pub const LED_PWM_PIN: u8 = 16; // Key backlight (PWM slice 0, channel A)
pub const MODE_BUTTON_PIN: u8 = 15; // LED mode button (active low)
pub const NUM_LOCK_LED_PIN: u8 = 20; // Num Lock indicator
pub const LED_STATUS_PIN: u8 = 25; // Built-in LED on Pico

// ===================================================================
// Timing
// ===================================================================

pub const DEBOUNCE_MS: u32 = 1; // Pause after each polling cycle / macro key hold
pub const BUTTON_DEBOUNCE_MS: u64 = 20; // Mode button debounce time
pub const ROW_SETTLE_US: u32 = 10; // Row line settling time before sampling columns
pub const USB_POLL_RATE_MS: u8 = 1; // 1ms interrupt endpoint polling (1000Hz)
pub const IDLE_TICK_MS: u64 = 1; // Idle countdown resolution
pub const DEFAULT_IDLE_MS: u16 = 500; // Idle period before the host sends SET_IDLE
pub const WAIT_STEP_MS: u32 = 250; // Macro WAIT granularity (quarter second)
pub const STATUS_INTERVAL_SECS: u32 = 60; // Supervisor status log period

// ===================================================================
// Status LED
// ===================================================================

pub const LED_START_MODE: usize = 4;
pub const PWM_TOP: u16 = 0x00ff; // 8-bit duty cycle
