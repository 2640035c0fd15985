//! Hardware initialization and peripheral tasks
//!
//! Pin assignments follow `config`. The keypad loop, USB device, backlight
//! PWM, mode button, Num Lock LED, idle tick and heartbeat each run as their
//! own Embassy task.

use embassy_executor::{SpawnError, Spawner};
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::usb::Driver;
use embassy_rp::Peripherals;
use embassy_time::{Delay, Duration, Ticker, Timer};

use crate::channels::{EVENTS, IDLE, LATEST_REPORT, LED_COMMANDS, NUM_LOCK};
use crate::config::*;
use crate::keypad::Keypad;
use crate::leds::{LedCommand, LedController, Pulser, StatusLed};
use crate::matrix::Matrix;
use crate::types::Event;
use crate::usb::{init_usb, led_report_task, usb_task, UsbTransport};

pub type JankMatrix = Matrix<Output<'static>, Input<'static>, MATRIX_ROWS, MATRIX_COLS>;

pub type JankKeypad =
    Keypad<'static, Output<'static>, Input<'static>, UsbTransport, Delay, SignalLed, MATRIX_ROWS, MATRIX_COLS>;

/// Backlight capability that forwards commands to [`led_task`]
pub struct SignalLed;

impl StatusLed for SignalLed {
    fn apply(&mut self, command: LedCommand) {
        LED_COMMANDS.signal(command);
    }
}

/// Create all pins and spawn every task.
pub fn init_hardware_tasks(spawner: &Spawner, p: Peripherals) -> Result<(), SpawnError> {
    info!("Initializing jankpad hardware");
    info!(
        "Matrix: {} key rows + {} macro rows x {} cols",
        KEY_ROWS, MACRO_ROWS, MATRIX_COLS
    );

    // USB first so enumeration starts as early as possible
    let driver = Driver::new(p.USB, crate::Irqs);
    let usb = init_usb(driver);
    spawner.spawn(usb_task(usb.device))?;
    spawner.spawn(led_report_task(usb.led_reader))?;

    // Rows 0-4 scan the numpad, row 5 the macro keys
    let rows = [
        Output::new(p.PIN_2, Level::High),
        Output::new(p.PIN_3, Level::High),
        Output::new(p.PIN_4, Level::High),
        Output::new(p.PIN_5, Level::High),
        Output::new(p.PIN_6, Level::High),
        Output::new(p.PIN_7, Level::High),
    ];
    let cols = [
        Input::new(p.PIN_8, Pull::Up),
        Input::new(p.PIN_9, Pull::Up),
        Input::new(p.PIN_10, Pull::Up),
        Input::new(p.PIN_11, Pull::Up),
    ];
    let matrix: JankMatrix = Matrix::new(rows, cols);

    // Backlight on PWM slice 0, channel A (GPIO 16)
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = PWM_TOP;
    let pwm = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, pwm_config.clone());
    spawner.spawn(led_task(pwm, pwm_config))?;

    let leds = LedController::with_default_mode(SignalLed);
    let keypad: JankKeypad = Keypad::new(matrix, usb.transport, Delay, leds, &IDLE, &LATEST_REPORT);
    spawner.spawn(keypad_task(keypad))?;

    let button = Input::new(p.PIN_15, Pull::Up);
    spawner.spawn(mode_button_task(button))?;

    let num_lock_led = Output::new(p.PIN_20, Level::Low);
    spawner.spawn(num_lock_task(num_lock_led))?;

    spawner.spawn(idle_tick_task())?;

    let status_led = Output::new(p.PIN_25, Level::Low);
    spawner.spawn(status_task(status_led))?;

    Ok(())
}

/// Polling loop: macros, keyscan, reports
#[embassy_executor::task]
pub async fn keypad_task(mut keypad: JankKeypad) -> ! {
    keypad.run(EVENTS.receiver()).await
}

/// Backlight driver: applies brightness commands and runs the pulse effect
#[embassy_executor::task]
pub async fn led_task(mut pwm: Pwm<'static>, mut config: PwmConfig) -> ! {
    info!("LED task started");

    let mut command = LED_COMMANDS.wait().await;
    loop {
        config.compare_a = u16::from(command.brightness);
        pwm.set_config(&config);

        let Some(interval_us) = command.pulse_interval_us else {
            command = LED_COMMANDS.wait().await;
            continue;
        };

        let mut pulser = Pulser::new(command.brightness);
        let mut ticker = Ticker::every(Duration::from_micros(u64::from(interval_us)));
        command = loop {
            match select(ticker.next(), LED_COMMANDS.wait()).await {
                Either::First(()) => {
                    config.compare_a = u16::from(pulser.step());
                    pwm.set_config(&config);
                }
                Either::Second(next) => break next,
            }
        };
    }
}

/// Mode button: debounce, then ask the keypad loop to cycle the LED mode
#[embassy_executor::task]
pub async fn mode_button_task(mut button: Input<'static>) -> ! {
    info!("Mode button task started");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after_millis(BUTTON_DEBOUNCE_MS).await;

        // Still pressed: not a bounce or a release
        if button.is_low() && EVENTS.try_send(Event::CycleLedMode).is_err() {
            warn!("Event queue full, mode press dropped");
        }

        button.wait_for_high().await;
    }
}

/// Num Lock indicator follows the host LED report
#[embassy_executor::task]
pub async fn num_lock_task(mut led: Output<'static>) -> ! {
    loop {
        let on = NUM_LOCK.wait().await;
        led.set_level(Level::from(on));
    }
}

/// 1 ms tick for the host idle countdown
#[embassy_executor::task]
pub async fn idle_tick_task() -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(IDLE_TICK_MS));
    loop {
        ticker.next().await;
        IDLE.tick();
    }
}

/// Status LED task implementation
#[embassy_executor::task]
pub async fn status_task(mut status_led: Output<'static>) -> ! {
    info!("Status LED task started");

    loop {
        // Heartbeat pattern - short blink every second
        status_led.set_high();
        Timer::after(Duration::from_millis(100)).await;
        status_led.set_low();
        Timer::after(Duration::from_millis(900)).await;
    }
}
