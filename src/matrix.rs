//! Key matrix scanning
//!
//! Rows and columns are multiplexed GPIO lines: columns are inputs with
//! pull-ups, rows are outputs idling high. Strobing one row low at a time and
//! sampling every column tells which switches in that row are closed.
//!
//! The regular keys and the macro keys live on the same column lines, so one
//! [`Matrix`] owns all the pins and each [`ScanDomain`] picks the rows that
//! belong to it.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;

use crate::config::{KEY_COLS, KEY_ROWS, MACRO_COLS, MACRO_ROWS, ROW_SETTLE_US};

/// Switch position inside a scan domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPosition {
    pub row: usize,
    pub col: usize,
}

impl KeyPosition {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A block of matrix rows scanned as one logical keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDomain {
    /// First physical row of the domain
    pub first_row: usize,
    /// Number of rows
    pub rows: usize,
    /// Number of columns, counted from column 0
    pub cols: usize,
}

/// Regular keys: the numpad rows
pub const KEY_DOMAIN: ScanDomain = ScanDomain {
    first_row: 0,
    rows: KEY_ROWS,
    cols: KEY_COLS,
};

/// Macro keys: the rows after the numpad
pub const MACRO_DOMAIN: ScanDomain = ScanDomain {
    first_row: KEY_ROWS,
    rows: MACRO_ROWS,
    cols: MACRO_COLS,
};

pub struct Matrix<O, I, const ROWS: usize, const COLS: usize> {
    rows: [O; ROWS],
    cols: [I; COLS],
}

impl<O, I, const ROWS: usize, const COLS: usize> Matrix<O, I, ROWS, COLS>
where
    O: OutputPin,
    I: InputPin,
{
    pub fn new(mut rows: [O; ROWS], cols: [I; COLS]) -> Self {
        for row in rows.iter_mut() {
            let _ = row.set_high();
        }
        Self { rows, cols }
    }

    /// Call `on_pressed` for every closed switch of `domain`, in row-major order.
    pub async fn scan<D: DelayNs>(
        &mut self,
        domain: ScanDomain,
        delay: &mut D,
        mut on_pressed: impl FnMut(KeyPosition),
    ) {
        for row in 0..domain.rows {
            let states = self.read_row(domain.first_row + row, delay).await;
            for (col, &pressed) in states.iter().take(domain.cols).enumerate() {
                if pressed {
                    on_pressed(KeyPosition::new(row, col));
                }
            }
        }
    }

    /// First closed switch of `domain` in row-major order.
    ///
    /// Only one position is ever reported; simultaneous presses further along
    /// the scan order are ignored.
    pub async fn first_pressed<D: DelayNs>(
        &mut self,
        domain: ScanDomain,
        delay: &mut D,
    ) -> Option<KeyPosition> {
        for row in 0..domain.rows {
            let states = self.read_row(domain.first_row + row, delay).await;
            if let Some(col) = states.iter().take(domain.cols).position(|&pressed| pressed) {
                return Some(KeyPosition::new(row, col));
            }
        }
        None
    }

    /// Whether the switch at `pos` inside `domain` is currently closed.
    pub async fn is_pressed<D: DelayNs>(
        &mut self,
        domain: ScanDomain,
        pos: KeyPosition,
        delay: &mut D,
    ) -> bool {
        if pos.row >= domain.rows || pos.col >= domain.cols {
            return false;
        }
        let states = self.read_row(domain.first_row + pos.row, delay).await;
        states.get(pos.col).copied().unwrap_or(false)
    }

    async fn read_row<D: DelayNs>(&mut self, row: usize, delay: &mut D) -> [bool; COLS] {
        let mut states = [false; COLS];
        let Some(line) = self.rows.get_mut(row) else {
            return states;
        };

        // Pull current row low
        let _ = line.set_low();

        // Small settling time
        delay.delay_us(ROW_SETTLE_US).await;

        for (state, col) in states.iter_mut().zip(self.cols.iter_mut()) {
            // Read column pin (low = switch closed due to pull-up)
            *state = col.is_low().unwrap_or(false);
        }

        // Return row to high
        let _ = line.set_high();

        states
    }
}
