//! Keypad driver
//!
//! Owns the matrix and all per-cycle state. One [`Keypad::poll`] is one
//! polling cycle: macro check, keyscan, report scheduling. Events from other
//! tasks (the mode button) are handled between cycles, so nothing ever
//! re-enters the polling path.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;

use crate::config::DEBOUNCE_MS;
use crate::control::LatestReport;
use crate::keymap::{Keymap, MacroTable, KEYMAP, MACROS};
use crate::keyscan::{build_report, KeyscanReport};
use crate::leds::{LedController, StatusLed};
use crate::matrix::{KeyPosition, Matrix};
use crate::player::{MacroPlayer, MacroState};
use crate::report::KeyboardReport;
use crate::scheduler::{Dispatch, IdleState, Scheduler};
use crate::transport::HidTransport;
use crate::types::Event;

/// Outcome of one polling cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Poll {
    /// Macro key that was played to completion this cycle
    pub macro_played: Option<KeyPosition>,
    /// Regular keys held at the end of the cycle
    pub scan: KeyscanReport,
    /// Reports that went out
    pub sent: Dispatch,
}

pub struct Keypad<'a, O, I, T, D, L, const ROWS: usize, const COLS: usize> {
    matrix: Matrix<O, I, ROWS, COLS>,
    keymap: &'a Keymap,
    macros: &'a MacroTable,
    scheduler: Scheduler<'a>,
    player: MacroPlayer,
    leds: LedController<L>,
    latest: &'a LatestReport,
    transport: T,
    delay: D,
}

impl<'a, O, I, T, D, L, const ROWS: usize, const COLS: usize> Keypad<'a, O, I, T, D, L, ROWS, COLS>
where
    O: OutputPin,
    I: InputPin,
    T: HidTransport,
    D: DelayNs,
    L: StatusLed,
{
    /// Keypad with the compiled-in keymap and macro table
    pub fn new(
        matrix: Matrix<O, I, ROWS, COLS>,
        transport: T,
        delay: D,
        leds: LedController<L>,
        idle: &'a IdleState,
        latest: &'a LatestReport,
    ) -> Self {
        Self {
            matrix,
            keymap: &KEYMAP,
            macros: &MACROS,
            scheduler: Scheduler::new(idle),
            player: MacroPlayer::new(),
            leds,
            latest,
            transport,
            delay,
        }
    }

    /// Replace the key layout and macro table.
    pub fn with_layout(mut self, keymap: &'a Keymap, macros: &'a MacroTable) -> Self {
        self.keymap = keymap;
        self.macros = macros;
        self
    }

    /// Run one polling cycle.
    ///
    /// Nothing is scanned while the host has not configured the device.
    pub async fn poll(&mut self) -> Poll {
        let mut outcome = Poll::default();

        if self.transport.is_ready() {
            outcome.macro_played = self
                .player
                .service(
                    &mut self.matrix,
                    self.macros,
                    &mut self.transport,
                    &mut self.delay,
                )
                .await;
            if outcome.macro_played.is_some() {
                // The player's final release is what the host last saw
                self.scheduler.reset_keyboard(KeyboardReport::EMPTY);
            }

            outcome.scan = build_report(&mut self.matrix, self.keymap, &mut self.delay).await;
            self.latest.publish(outcome.scan);
            outcome.sent = self.scheduler.dispatch(&outcome.scan, &mut self.transport).await;
        }

        self.delay.delay_ms(DEBOUNCE_MS).await;
        outcome
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::CycleLedMode => {
                self.leds.cycle_mode();
            }
        }
    }

    /// Drain pending events, then poll; forever.
    pub async fn run<M: RawMutex, const N: usize>(&mut self, events: Receiver<'_, M, Event, N>) -> ! {
        info!("keypad running");
        loop {
            while let Ok(event) = events.try_receive() {
                debug!("event: {}", event);
                self.handle_event(event);
            }
            self.poll().await;
        }
    }

    pub fn leds(&self) -> &LedController<L> {
        &self.leds
    }

    pub fn scheduler(&self) -> &Scheduler<'a> {
        &self.scheduler
    }

    pub fn macro_state(&self) -> MacroState {
        self.player.state()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}
