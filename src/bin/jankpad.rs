//! jankpad firmware
//!
//! - 5x4 numpad matrix with volume and mute keys
//! - 4 macro keys
//! - Pulsing key backlight with a mode button
//! - USB VID:PID 0x03eb:0x2042, keyboard + consumer control

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use panic_halt as _;
use defmt_rtt as _;

use jankpad::{hardware, supervisor};

/// Main application entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // Initialize hardware
    let p = embassy_rp::init(Default::default());

    let mut supervisor = supervisor::AppSupervisor::new();
    supervisor.print_startup_banner();

    // Initialize and spawn all hardware tasks
    match hardware::init_hardware_tasks(&spawner, p) {
        Ok(()) => supervisor.print_init_success(),
        Err(e) => {
            error!("Failed to spawn hardware tasks: {:?}", e);
            core::panic!("Hardware initialization failed");
        }
    }

    // Run the main supervisor loop
    supervisor.run().await;
}
