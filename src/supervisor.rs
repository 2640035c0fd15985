//! Application supervisor and monitoring
//!
//! Startup banner and a periodic status line (uptime, host idle period,
//! protocol, keys held).

use embassy_time::{Duration, Ticker};

use crate::channels::{HID_CONTROL, LATEST_REPORT};
use crate::config;
use crate::keymap::{macro_count, MACROS};
use crate::types::APP_VERSION;

/// Startup reporting and the periodic device status log
pub struct AppSupervisor {
    uptime_seconds: u32,
}

impl AppSupervisor {
    pub const fn new() -> Self {
        Self { uptime_seconds: 0 }
    }

    /// Print application startup banner with device information
    pub fn print_startup_banner(&self) {
        info!("========================================");
        info!("jankpad v{}", APP_VERSION.as_str());
        info!("USB numpad and macro pad");
        info!("========================================");
        info!("Hardware: RP2040 (Raspberry Pi Pico)");
        info!(
            "USB: VID=0x{:04X} PID=0x{:04X}",
            config::USB_VID,
            config::USB_PID
        );
        info!(
            "Keys: {}x{} matrix, {} macro keys",
            config::KEY_ROWS,
            config::KEY_COLS,
            macro_count(&MACROS)
        );
        info!("Backlight start mode: {}", config::LED_START_MODE);
        info!("========================================");
    }

    /// Print successful initialization message
    pub fn print_init_success(&self) {
        info!("jankpad initialized successfully");
        info!("Waiting for USB connection...");
    }

    /// Log host-visible state once per `STATUS_INTERVAL_SECS`, forever.
    pub async fn run(&mut self) -> ! {
        info!("Application supervisor started");

        let mut ticker = Ticker::every(Duration::from_secs(u64::from(config::STATUS_INTERVAL_SECS)));
        loop {
            ticker.next().await;
            self.uptime_seconds += config::STATUS_INTERVAL_SECS;
            self.print_status();
        }
    }

    fn print_status(&self) {
        let minutes = self.uptime_seconds / 60;
        let scan = LATEST_REPORT.get();
        let held = scan.keys.iter().filter(|&&code| code != 0).count();

        info!(
            "Status: up {}h{}m, idle {} ms, {} protocol, {} keys held",
            minutes / 60,
            minutes % 60,
            HID_CONTROL.idle_ms(),
            if HID_CONTROL.protocol() { "report" } else { "boot" },
            held
        );
    }

    /// Get current uptime in seconds
    pub fn uptime(&self) -> u32 {
        self.uptime_seconds
    }
}

impl Default for AppSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
