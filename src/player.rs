//! Macro playback
//!
//! While a macro key is held the player walks its action list, typing
//! strings, pressing key combinations and waiting, then holds until the key
//! is released. Every blocking step hands control back to the transport's
//! keep-alive so the USB stack keeps being serviced.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use crate::config::{DEBOUNCE_MS, MAX_KEYS, MAX_MACRO_CHARS, WAIT_STEP_MS};
use crate::keymap::{macro_at, MacroTable};
use crate::macros::MacroAction;
use crate::matrix::{KeyPosition, Matrix, MACRO_DOMAIN};
use crate::report::KeyboardReport;
use crate::scancode::{classify, KeyKind, Keycode};
use crate::transport::HidTransport;

/// Quarter-second steps per second of WAIT
const WAIT_STEPS_PER_SECOND: u32 = 1000 / WAIT_STEP_MS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroState {
    /// No macro key down
    #[default]
    Idle,
    /// Walking the action list
    Playing,
    /// Actions done, macro key still held
    AwaitRelease,
}

#[derive(Debug, Default)]
pub struct MacroPlayer {
    state: MacroState,
}

impl MacroPlayer {
    pub const fn new() -> Self {
        Self {
            state: MacroState::Idle,
        }
    }

    pub fn state(&self) -> MacroState {
        self.state
    }

    /// Check the macro keys and, if one is down, run its macro to completion.
    ///
    /// Only the first pressed macro key in scan order is serviced. Returns
    /// the position that was played, if any.
    pub async fn service<O, I, T, D, const ROWS: usize, const COLS: usize>(
        &mut self,
        matrix: &mut Matrix<O, I, ROWS, COLS>,
        table: &MacroTable,
        transport: &mut T,
        delay: &mut D,
    ) -> Option<KeyPosition>
    where
        O: OutputPin,
        I: InputPin,
        T: HidTransport,
        D: DelayNs,
    {
        let pos = matrix.first_pressed(MACRO_DOMAIN, delay).await?;
        let actions = macro_at(table, pos)?;

        info!("macro {}:{} started", pos.row, pos.col);
        self.play(actions, transport, delay).await;
        self.await_release(matrix, pos, transport, delay).await;
        info!("macro {}:{} finished", pos.row, pos.col);

        Some(pos)
    }

    /// Run every action in order. Leaves the player in `AwaitRelease`.
    pub async fn play<T, D>(&mut self, actions: &[MacroAction<'_>], transport: &mut T, delay: &mut D)
    where
        T: HidTransport,
        D: DelayNs,
    {
        self.state = MacroState::Playing;

        for action in actions {
            match *action {
                MacroAction::Type(text) => type_string(text, transport).await,
                MacroAction::Keys(codes) => press_combo(codes, transport, delay).await,
                MacroAction::Wait(seconds) => wait(seconds, transport, delay).await,
            }
        }

        self.state = MacroState::AwaitRelease;
    }

    /// Hold until the macro key at `pos` is released, then release everything.
    pub async fn await_release<O, I, T, D, const ROWS: usize, const COLS: usize>(
        &mut self,
        matrix: &mut Matrix<O, I, ROWS, COLS>,
        pos: KeyPosition,
        transport: &mut T,
        delay: &mut D,
    ) where
        O: OutputPin,
        I: InputPin,
        T: HidTransport,
        D: DelayNs,
    {
        self.state = MacroState::AwaitRelease;

        while matrix.is_pressed(MACRO_DOMAIN, pos, delay).await {
            transport.keep_alive().await;
        }

        send(transport, &KeyboardReport::EMPTY).await;
        self.state = MacroState::Idle;
    }
}

async fn type_string<T: HidTransport>(text: &[u8], transport: &mut T) {
    for &byte in text.iter().take(MAX_MACRO_CHARS).take_while(|&&b| b != 0) {
        let c = char::from(byte);
        send(transport, &KeyboardReport::for_char(c)).await;
        send(transport, &KeyboardReport::EMPTY).await;
        transport.keep_alive().await;
    }
}

async fn press_combo<T: HidTransport, D: DelayNs>(
    codes: &[Keycode],
    transport: &mut T,
    delay: &mut D,
) {
    let mut keys: Vec<Keycode, MAX_KEYS> = Vec::new();
    let mut modifier = 0u8;

    for &code in codes {
        match classify(code) {
            KeyKind::Regular(code) => {
                // Silently capped at MAX_KEYS
                let _ = keys.push(code);
            }
            KeyKind::Modifier(bit) => modifier |= bit,
            KeyKind::Media(_) | KeyKind::None => {}
        }
    }

    let mut keycodes = [0; MAX_KEYS];
    keycodes[..keys.len()].copy_from_slice(&keys);

    send(transport, &KeyboardReport::single(keycodes, modifier)).await;
    delay.delay_ms(DEBOUNCE_MS).await;
    send(transport, &KeyboardReport::EMPTY).await;
}

async fn wait<T: HidTransport, D: DelayNs>(seconds: &[u8], transport: &mut T, delay: &mut D) {
    for &secs in seconds {
        for _ in 0..u32::from(secs) * WAIT_STEPS_PER_SECOND {
            delay.delay_ms(WAIT_STEP_MS).await;
            transport.keep_alive().await;
        }
    }
}

/// Write one keyboard report, waiting for the endpoint first.
async fn send<T: HidTransport>(transport: &mut T, report: &KeyboardReport) {
    transport.wait_ready().await;
    if let Err(e) = transport.write_keyboard(report).await {
        warn!("macro report failed: {}", e);
    }
}
