//! Per-channel encoder tick counters shared between interrupt handlers and
//! the main loop.
//!
//! Interrupt handlers add signed ticks; the main loop takes all counters and
//! zeroes them in one step. The take-and-zero happens inside a critical
//! section so a tick that arrives mid-drain is neither lost nor counted twice.

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};
use portable_atomic::{AtomicBool, Ordering};

use crate::channel::{Channel, CHANNEL_COUNT};

/// Ticks drained from the accumulators in one loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EncoderDeltas {
    ticks: [i32; CHANNEL_COUNT],
}

impl EncoderDeltas {
    /// Creates deltas from per-channel tick counts in [`Channel::ALL`] order.
    pub const fn new(ticks: [i32; CHANNEL_COUNT]) -> Self {
        Self { ticks }
    }

    /// Net ticks for one channel.
    #[inline]
    pub const fn get(&self, channel: Channel) -> i32 {
        self.ticks[channel.index()]
    }

    /// Returns true if no channel moved.
    pub fn is_zero(&self) -> bool {
        self.ticks.iter().all(|t| *t == 0)
    }

    /// Returns true if any of the colour channels moved.
    pub fn has_color(&self) -> bool {
        Channel::ALL
            .iter()
            .any(|c| c.is_color() && self.get(*c) != 0)
    }

    /// Iterates `(channel, ticks)` pairs, including zero entries.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, i32)> + '_ {
        Channel::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Raw per-channel counts in [`Channel::ALL`] order.
    pub const fn as_array(&self) -> &[i32; CHANNEL_COUNT] {
        &self.ticks
    }
}

/// Shared encoder counters plus the global activity flag.
pub struct EncoderAccumulators {
    counts: Mutex<Cell<[i32; CHANNEL_COUNT]>>,
    activity: AtomicBool,
}

impl EncoderAccumulators {
    /// All counters at zero, no pending activity.
    pub const fn new() -> Self {
        Self {
            counts: Mutex::new(Cell::new([0; CHANNEL_COUNT])),
            activity: AtomicBool::new(false),
        }
    }

    /// Adds `delta` ticks to one channel. Called from interrupt context.
    ///
    /// Zero deltas are ignored and do not raise the activity flag.
    #[inline]
    pub fn add(&self, cs: CriticalSection<'_>, channel: Channel, delta: i8) {
        if delta == 0 {
            return;
        }
        let cell = self.counts.borrow(cs);
        let mut counts = cell.get();
        let slot = &mut counts[channel.index()];
        *slot = slot.saturating_add(delta as i32);
        cell.set(counts);
        self.activity.store(true, Ordering::Release);
    }

    /// Returns true if ticks arrived since the last drain.
    #[inline]
    pub fn has_activity(&self) -> bool {
        self.activity.load(Ordering::Acquire)
    }

    /// Takes every counter and resets it to zero as one atomic unit.
    ///
    /// Returns `None` without entering the critical section when no tick
    /// has been recorded since the last drain. The critical section only
    /// copies and clears integers.
    pub fn drain(&self) -> Option<EncoderDeltas> {
        if !self.has_activity() {
            return None;
        }
        let ticks = critical_section::with(|cs| {
            self.activity.store(false, Ordering::Relaxed);
            self.counts.borrow(cs).replace([0; CHANNEL_COUNT])
        });
        Some(EncoderDeltas::new(ticks))
    }

    /// Current counters without clearing them (diagnostics only).
    pub fn peek(&self) -> EncoderDeltas {
        EncoderDeltas::new(critical_section::with(|cs| self.counts.borrow(cs).get()))
    }
}

impl Default for EncoderAccumulators {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_without_activity_is_none() {
        let acc = EncoderAccumulators::new();
        assert!(!acc.has_activity());
        assert_eq!(acc.drain(), None);
    }

    #[test]
    fn ticks_accumulate_per_channel() {
        let acc = EncoderAccumulators::new();
        critical_section::with(|cs| {
            acc.add(cs, Channel::Red, 1);
            acc.add(cs, Channel::Red, 1);
            acc.add(cs, Channel::Blue, -1);
        });

        let deltas = acc.drain().unwrap();
        assert_eq!(deltas.get(Channel::Red), 2);
        assert_eq!(deltas.get(Channel::Green), 0);
        assert_eq!(deltas.get(Channel::Blue), -1);
        assert_eq!(deltas.get(Channel::Effect), 0);
    }

    #[test]
    fn drain_clears_counters_and_flag() {
        let acc = EncoderAccumulators::new();
        critical_section::with(|cs| acc.add(cs, Channel::Effect, -1));

        assert!(acc.drain().is_some());
        assert!(!acc.has_activity());
        assert_eq!(acc.drain(), None);
        assert!(acc.peek().is_zero());
    }

    #[test]
    fn zero_delta_is_not_activity() {
        let acc = EncoderAccumulators::new();
        critical_section::with(|cs| acc.add(cs, Channel::Green, 0));
        assert!(!acc.has_activity());
    }

    #[test]
    fn opposite_ticks_cancel_but_still_drain() {
        let acc = EncoderAccumulators::new();
        critical_section::with(|cs| {
            acc.add(cs, Channel::Green, 1);
            acc.add(cs, Channel::Green, -1);
        });
        let deltas = acc.drain().unwrap();
        assert!(deltas.is_zero());
        assert!(!deltas.has_color());
    }

    #[test]
    fn deltas_helpers() {
        let deltas = EncoderDeltas::new([0, 0, 0, 3]);
        assert!(!deltas.has_color());
        assert!(!deltas.is_zero());
        let pairs: alloc::vec::Vec<_> = deltas.iter().collect();
        assert_eq!(pairs[3], (Channel::Effect, 3));
        assert_eq!(deltas.as_array(), &[0, 0, 0, 3]);
    }
}
