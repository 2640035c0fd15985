//! Key backlight modes
//!
//! Twelve fixed modes: eight steady brightness levels from off to full, then
//! full brightness with a fast, medium or slow pulse. The mode button steps
//! through them and wraps back to off.

use crate::config::LED_START_MODE;

/// One backlight mode. `pulse_speed == 0` means a steady level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedMode {
    pub brightness: u8,
    pub pulse_speed: u16,
}

impl LedMode {
    const fn steady(brightness: u8) -> Self {
        Self {
            brightness,
            pulse_speed: 0,
        }
    }

    const fn pulsing(pulse_speed: u16) -> Self {
        Self {
            brightness: u8::MAX,
            pulse_speed,
        }
    }

    /// Microseconds between pulse steps, `None` for a steady level.
    ///
    /// `pulse_speed` counts ticks of a 2 MHz timer.
    pub const fn pulse_interval_us(&self) -> Option<u32> {
        if self.pulse_speed == 0 {
            None
        } else {
            Some(self.pulse_speed as u32 / 2)
        }
    }

    pub const fn command(&self) -> LedCommand {
        LedCommand {
            brightness: self.brightness,
            pulse_interval_us: self.pulse_interval_us(),
        }
    }
}

pub const LED_MODES: [LedMode; 12] = [
    LedMode::steady(0), // Off
    LedMode::steady(2),
    LedMode::steady(4),
    LedMode::steady(8),
    LedMode::steady(16),
    LedMode::steady(32),
    LedMode::steady(64),
    LedMode::steady(128),
    LedMode::steady(255), // Max brightness
    LedMode::pulsing(2000), // Fast pulse
    LedMode::pulsing(8000), // Medium pulse
    LedMode::pulsing(32000), // Slow pulse
];

/// What the PWM driver should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedCommand {
    /// Duty cycle to start from
    pub brightness: u8,
    /// Pulse step interval; `None` holds the brightness steady
    pub pulse_interval_us: Option<u32>,
}

/// Brightness and pulse capability of the backlight driver
pub trait StatusLed {
    fn apply(&mut self, command: LedCommand);
}

pub struct LedController<L> {
    led: L,
    mode: usize,
}

impl<L: StatusLed> LedController<L> {
    /// Take over the backlight and apply `start_mode` (clamped to the last mode).
    pub fn new(led: L, start_mode: usize) -> Self {
        let mut controller = Self {
            led,
            mode: start_mode.min(LED_MODES.len() - 1),
        };
        controller.apply();
        controller
    }

    pub fn with_default_mode(led: L) -> Self {
        Self::new(led, LED_START_MODE)
    }

    /// Step to the next mode, wrapping after the last.
    pub fn cycle_mode(&mut self) -> usize {
        self.mode = (self.mode + 1) % LED_MODES.len();
        info!("LED mode {}", self.mode);
        self.apply();
        self.mode
    }

    pub fn mode(&self) -> usize {
        self.mode
    }

    pub fn current(&self) -> LedMode {
        LED_MODES[self.mode]
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    fn apply(&mut self) {
        let command = self.current().command();
        self.led.apply(command);
    }
}

/// Triangle wave over the duty cycle, one step per pulse interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulser {
    duty: u8,
    rising: bool,
}

impl Pulser {
    pub const fn new(duty: u8) -> Self {
        Self { duty, rising: true }
    }

    pub fn duty(&self) -> u8 {
        self.duty
    }

    /// Advance one step and return the new duty cycle.
    pub fn step(&mut self) -> u8 {
        if self.duty == u8::MAX {
            self.rising = false;
        } else if self.duty == 0 {
            self.rising = true;
        }
        self.duty = if self.rising {
            self.duty + 1
        } else {
            self.duty - 1
        };
        self.duty
    }
}
