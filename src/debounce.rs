//! Debounced push-button monitor.
//!
//! Mechanical contacts bounce for a few milliseconds on every actuation, and
//! long wires pick up the occasional lone spike. The monitor uses two cheap
//! mechanisms against these:
//!
//! - **Time lockout.** Once a press is accepted, every edge on that channel
//!   within the debounce window is ignored outright. This swallows bounce
//!   trains.
//! - **Verification resample.** A released-to-pressed edge outside the window
//!   is only accepted if a second read of the pin, a few microseconds later,
//!   still says pressed. This rejects a single glitch that lands outside the
//!   window.
//!
//! Only presses are reported. Release edges re-arm press detection but are
//! not delivered downstream.
//!
//! # Example
//!
//! ```
//! use wled_knobs::debounce::{ButtonLevel, ButtonMonitor, EdgeOutcome};
//!
//! let mut button = ButtonMonitor::new();
//! let pressed = || ButtonLevel::Pressed;
//!
//! assert_eq!(button.on_edge(ButtonLevel::Pressed, 0, 50, pressed), EdgeOutcome::Accepted);
//! assert_eq!(button.on_edge(ButtonLevel::Pressed, 5, 50, pressed), EdgeOutcome::LockedOut);
//! assert_eq!(button.on_edge(ButtonLevel::Released, 60, 50, pressed), EdgeOutcome::Released);
//! assert_eq!(button.on_edge(ButtonLevel::Pressed, 65, 50, pressed), EdgeOutcome::Accepted);
//! ```

/// Logical level of a button, independent of pull-up wiring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ButtonLevel {
    /// Contact open.
    #[default]
    Released,
    /// Contact closed.
    Pressed,
}

impl ButtonLevel {
    /// Level of an active-low input (pull-up, switch to ground).
    #[inline]
    pub const fn from_active_low(pin_high: bool) -> Self {
        if pin_high {
            ButtonLevel::Released
        } else {
            ButtonLevel::Pressed
        }
    }

    /// Returns true for [`Pressed`](Self::Pressed).
    #[inline]
    pub const fn is_pressed(self) -> bool {
        matches!(self, ButtonLevel::Pressed)
    }
}

/// What the monitor did with one edge notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Inside the debounce window; state left untouched.
    LockedOut,
    /// Confirmed press; the caller should emit a press event.
    Accepted,
    /// Confirmed press whose event could not be queued.
    ///
    /// Never returned by [`ButtonMonitor`] itself; the pipeline reports it
    /// when the event queue is full.
    Dropped,
    /// Press edge that failed the verification resample.
    Rejected,
    /// Pressed-to-released transition recorded.
    Released,
    /// Level matches what was already recorded.
    Unchanged,
}

/// Per-channel debounce state.
///
/// `Copy`, so it can live in a `critical_section::Mutex<Cell<_>>` and be
/// updated with a get/modify/set inside the interrupt handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ButtonMonitor {
    level: ButtonLevel,
    last_accepted_ms: Option<u64>,
}

impl ButtonMonitor {
    /// A released button that has never been pressed.
    pub const fn new() -> Self {
        Self {
            level: ButtonLevel::Released,
            last_accepted_ms: None,
        }
    }

    /// Processes one edge notification.
    ///
    /// # Arguments
    ///
    /// * `level` - Level read when the edge interrupt fired
    /// * `now_ms` - Current monotonic time
    /// * `window_ms` - Debounce window measured from the last accepted press
    /// * `verify` - Waits briefly and reads the pin again; only called for
    ///   released-to-pressed edges outside the window
    pub fn on_edge(
        &mut self,
        level: ButtonLevel,
        now_ms: u64,
        window_ms: u64,
        verify: impl FnOnce() -> ButtonLevel,
    ) -> EdgeOutcome {
        if self.is_locked_out(now_ms, window_ms) {
            return EdgeOutcome::LockedOut;
        }

        match (self.level, level) {
            (ButtonLevel::Released, ButtonLevel::Pressed) => {
                if verify().is_pressed() {
                    self.level = ButtonLevel::Pressed;
                    self.last_accepted_ms = Some(now_ms);
                    EdgeOutcome::Accepted
                } else {
                    self.level = ButtonLevel::Released;
                    EdgeOutcome::Rejected
                }
            }
            (ButtonLevel::Pressed, ButtonLevel::Released) => {
                self.level = ButtonLevel::Released;
                EdgeOutcome::Released
            }
            _ => EdgeOutcome::Unchanged,
        }
    }

    /// Returns true if an edge at `now_ms` would be ignored.
    #[inline]
    pub fn is_locked_out(&self, now_ms: u64, window_ms: u64) -> bool {
        self.last_accepted_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < window_ms)
    }

    /// Level recorded after the last processed edge.
    #[inline]
    pub const fn level(&self) -> ButtonLevel {
        self.level
    }

    /// Timestamp of the last accepted press, if any.
    #[inline]
    pub const fn last_accepted_ms(&self) -> Option<u64> {
        self.last_accepted_ms
    }
}
