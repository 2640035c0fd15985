//! Host-side stand-ins for the keypad hardware and the USB transport
#![allow(dead_code)]

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;

use jankpad::config::{KEY_ROWS, MATRIX_COLS, MATRIX_ROWS};
use jankpad::error::Result;
use jankpad::leds::{LedCommand, StatusLed};
use jankpad::matrix::{KeyPosition, Matrix};
use jankpad::report::{KeyboardReport, MediaReport};
use jankpad::transport::HidTransport;

pub type MockMatrix = Matrix<MockRow, MockCol, MATRIX_ROWS, MATRIX_COLS>;

// ===================================================================
// Switch matrix
// ===================================================================

#[derive(Default)]
struct Grid {
    closed: [[bool; MATRIX_COLS]; MATRIX_ROWS],
    driven_low: Option<usize>,
}

/// Simulated switch grid shared by all mock pins
#[derive(Clone, Default)]
pub struct Board(Rc<RefCell<Grid>>);

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, row: usize, col: usize) {
        self.0.borrow_mut().closed[row][col] = true;
    }

    pub fn release(&self, row: usize, col: usize) {
        self.0.borrow_mut().closed[row][col] = false;
    }

    /// Close a switch of the regular key domain
    pub fn press_key(&self, pos: KeyPosition) {
        self.press(pos.row, pos.col);
    }

    pub fn release_key(&self, pos: KeyPosition) {
        self.release(pos.row, pos.col);
    }

    /// Close a switch of the macro key domain
    pub fn press_macro(&self, pos: KeyPosition) {
        self.press(KEY_ROWS + pos.row, pos.col);
    }

    pub fn release_macro(&self, pos: KeyPosition) {
        self.release(KEY_ROWS + pos.row, pos.col);
    }

    /// Row currently strobed low, if any
    pub fn driven_row(&self) -> Option<usize> {
        self.0.borrow().driven_low
    }

    pub fn matrix(&self) -> MockMatrix {
        let rows = core::array::from_fn(|index| MockRow {
            index,
            board: self.clone(),
        });
        let cols = core::array::from_fn(|index| MockCol {
            index,
            board: self.clone(),
        });
        Matrix::new(rows, cols)
    }
}

pub struct MockRow {
    index: usize,
    board: Board,
}

impl ErrorType for MockRow {
    type Error = Infallible;
}

impl OutputPin for MockRow {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.board.0.borrow_mut().driven_low = Some(self.index);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        let mut grid = self.board.0.borrow_mut();
        if grid.driven_low == Some(self.index) {
            grid.driven_low = None;
        }
        Ok(())
    }
}

pub struct MockCol {
    index: usize,
    board: Board,
}

impl ErrorType for MockCol {
    type Error = Infallible;
}

impl InputPin for MockCol {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    /// Pulled low only when the strobed row's switch in this column is closed
    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        let grid = self.board.0.borrow();
        Ok(grid
            .driven_low
            .map(|row| grid.closed[row][self.index])
            .unwrap_or(false))
    }
}

// ===================================================================
// Recording transport, delay and backlight
// ===================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Keyboard(KeyboardReport),
    Media(MediaReport),
    KeepAlive,
    DelayMs(u32),
}

pub type Log = Rc<RefCell<Vec<Record>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct RecordingTransport {
    log: Log,
    pub ready: bool,
    pub keep_alives: usize,
    release: Option<(usize, Board, KeyPosition)>,
}

impl RecordingTransport {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            ready: true,
            keep_alives: 0,
            release: None,
        }
    }

    /// Let go of macro key `pos` once `keep_alives` keep-alive calls have happened.
    pub fn release_macro_after(mut self, keep_alives: usize, board: &Board, pos: KeyPosition) -> Self {
        self.release = Some((keep_alives, board.clone(), pos));
        self
    }
}

impl HidTransport for RecordingTransport {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn write_keyboard(&mut self, report: &KeyboardReport) -> Result<()> {
        self.log.borrow_mut().push(Record::Keyboard(*report));
        Ok(())
    }

    async fn write_media(&mut self, report: &MediaReport) -> Result<()> {
        self.log.borrow_mut().push(Record::Media(*report));
        Ok(())
    }

    async fn keep_alive(&mut self) {
        self.keep_alives += 1;
        self.log.borrow_mut().push(Record::KeepAlive);
        if let Some((after, board, pos)) = &self.release {
            if self.keep_alives == *after {
                board.release_macro(*pos);
            }
        }
    }
}

/// Records millisecond delays; row settling (sub-millisecond) is not logged.
pub struct RecordingDelay {
    log: Log,
}

impl RecordingDelay {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Record::DelayMs(ms));
    }
}

#[derive(Clone, Default)]
pub struct RecordingLed(pub Rc<RefCell<Vec<LedCommand>>>);

impl StatusLed for RecordingLed {
    fn apply(&mut self, command: LedCommand) {
        self.0.borrow_mut().push(command);
    }
}

/// Reports written so far, ignoring keep-alives and delays
pub fn reports(log: &Log) -> Vec<Record> {
    log.borrow()
        .iter()
        .copied()
        .filter(|r| matches!(r, Record::Keyboard(_) | Record::Media(_)))
        .collect()
}
