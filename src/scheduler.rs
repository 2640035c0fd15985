//! Report scheduling
//!
//! Once per polling cycle the scheduler decides whether the keyboard and
//! media reports must go out: a report is sent when it differs from the last
//! one sent, or when the host-configured idle period has run out.

use portable_atomic::{AtomicU16, Ordering};

use crate::config::DEFAULT_IDLE_MS;
use crate::keyscan::KeyscanReport;
use crate::report::{KeyboardReport, MediaReport};
use crate::transport::HidTransport;

/// Host idle period and its countdown, both in milliseconds.
///
/// The countdown is decremented by the 1 ms tick task and read by the
/// polling loop, so both fields are atomics.
pub struct IdleState {
    count_ms: AtomicU16,
    remaining_ms: AtomicU16,
}

impl IdleState {
    pub const fn new(count_ms: u16) -> Self {
        Self {
            count_ms: AtomicU16::new(count_ms),
            remaining_ms: AtomicU16::new(0),
        }
    }

    /// One millisecond has passed. Clamped at zero.
    pub fn tick(&self) {
        let _ = self
            .remaining_ms
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |ms| ms.checked_sub(1));
    }

    pub fn set_idle_ms(&self, ms: u16) {
        self.count_ms.store(ms, Ordering::Release);
    }

    pub fn idle_ms(&self) -> u16 {
        self.count_ms.load(Ordering::Acquire)
    }

    pub fn remaining_ms(&self) -> u16 {
        self.remaining_ms.load(Ordering::Acquire)
    }

    /// SET_IDLE: the period sits in the high byte of wValue, in 4 ms units.
    pub fn set_idle(&self, w_value: u16) {
        self.set_idle_ms((w_value & 0xff00) >> 6);
    }

    /// GET_IDLE: the period in 4 ms units.
    pub fn get_idle(&self) -> u8 {
        (self.idle_ms() >> 2) as u8
    }

    /// An idle period is configured and has run out.
    pub fn elapsed(&self) -> bool {
        self.idle_ms() != 0 && self.remaining_ms() == 0
    }

    /// Restart the countdown from the configured period.
    pub fn rearm(&self) {
        self.remaining_ms.store(self.idle_ms(), Ordering::Release);
    }
}

impl Default for IdleState {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_MS)
    }
}

/// Why a report went out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendReason {
    Changed,
    IdleElapsed,
}

/// Change detection for one report type
#[derive(Debug, Default)]
pub struct ReportChannel<R> {
    previous: R,
}

impl<R: Copy + PartialEq> ReportChannel<R> {
    pub const fn new(initial: R) -> Self {
        Self { previous: initial }
    }

    /// Whether `report` must be sent, and why. A change wins over idle.
    pub fn pending(&self, report: &R, idle_elapsed: bool) -> Option<SendReason> {
        if *report != self.previous {
            Some(SendReason::Changed)
        } else if idle_elapsed {
            Some(SendReason::IdleElapsed)
        } else {
            None
        }
    }

    /// Record `report` as the last one the host received.
    pub fn commit(&mut self, report: R) {
        self.previous = report;
    }

    pub fn previous(&self) -> &R {
        &self.previous
    }
}

/// What one [`Scheduler::dispatch`] call actually transmitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dispatch {
    pub keyboard: Option<SendReason>,
    pub media: Option<SendReason>,
}

pub struct Scheduler<'a> {
    keyboard: ReportChannel<KeyboardReport>,
    media: ReportChannel<MediaReport>,
    idle: &'a IdleState,
}

impl<'a> Scheduler<'a> {
    pub const fn new(idle: &'a IdleState) -> Self {
        Self {
            keyboard: ReportChannel::new(KeyboardReport::EMPTY),
            media: ReportChannel::new(MediaReport::EMPTY),
            idle,
        }
    }

    pub fn idle(&self) -> &IdleState {
        self.idle
    }

    /// Send the keyboard report, then the media report, where needed.
    ///
    /// An update that cannot be written (endpoint not ready or write error)
    /// is dropped; the next cycle recomputes it from the hardware.
    pub async fn dispatch<T: HidTransport>(
        &mut self,
        scan: &KeyscanReport,
        transport: &mut T,
    ) -> Dispatch {
        let idle_elapsed = self.idle.elapsed();
        let mut sent = Dispatch::default();

        let keyboard = KeyboardReport::from(scan);
        if let Some(reason) = self.keyboard.pending(&keyboard, idle_elapsed) {
            if !transport.is_ready() {
                trace!("keyboard report dropped, endpoint not ready");
            } else {
                match transport.write_keyboard(&keyboard).await {
                    Ok(()) => {
                        debug!("keyboard report sent: {}", reason);
                        self.keyboard.commit(keyboard);
                        sent.keyboard = Some(reason);
                    }
                    Err(e) => warn!("keyboard report failed: {}", e),
                }
            }
        }

        let media = MediaReport::from(scan);
        if let Some(reason) = self.media.pending(&media, idle_elapsed) {
            if !transport.is_ready() {
                trace!("media report dropped, endpoint not ready");
            } else {
                match transport.write_media(&media).await {
                    Ok(()) => {
                        debug!("media report sent: {}", reason);
                        self.media.commit(media);
                        sent.media = Some(reason);
                    }
                    Err(e) => warn!("media report failed: {}", e),
                }
            }
        }

        if idle_elapsed && (sent.keyboard.is_some() || sent.media.is_some()) {
            self.idle.rearm();
        }

        sent
    }

    /// Record a keyboard report that was sent outside the polling path.
    pub fn reset_keyboard(&mut self, report: KeyboardReport) {
        self.keyboard.commit(report);
    }

    pub fn previous_keyboard(&self) -> &KeyboardReport {
        self.keyboard.previous()
    }

    pub fn previous_media(&self) -> &MediaReport {
        self.media.previous()
    }
}
