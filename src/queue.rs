//! Lock-free ring buffer carrying button events from interrupt handlers to
//! the main loop.
//!
//! The queue follows the classic single-producer/single-consumer layout:
//!
//! - `head` is written only by producers, `tail` only by the consumer;
//! - a slot is fully written before `head` is published past it, and fully
//!   read before `tail` is published past it;
//! - one slot is always left empty so that `head == tail` means empty and
//!   `head + 1 == tail` means full, without a shared counter.
//!
//! A queue of size `N` therefore holds at most `N - 1` events.
//!
//! # Producers and consumer
//!
//! Several interrupt handlers produce into the same queue. They are
//! serialised by requiring a [`CriticalSection`] token for
//! [`push`](EventQueue::push). The consumer side is a single
//! [`EventConsumer`] handle, claimed once with
//! [`consumer`](EventQueue::consumer); popping needs `&mut` on that handle,
//! so two consumers can never race on `tail`.
//!
//! # Example
//!
//! ```
//! use wled_knobs::queue::{ButtonEvent, EventQueue};
//! use wled_knobs::Channel;
//!
//! static QUEUE: EventQueue<4> = EventQueue::new();
//!
//! critical_section::with(|cs| {
//!     assert!(QUEUE.push(cs, ButtonEvent::press(Channel::Red, 10)));
//!     assert!(QUEUE.push(cs, ButtonEvent::press(Channel::Blue, 12)));
//! });
//!
//! let mut consumer = QUEUE.consumer().unwrap();
//! assert_eq!(consumer.pop().map(|e| e.channel), Some(Channel::Red));
//! assert_eq!(consumer.pop().map(|e| e.channel), Some(Channel::Blue));
//! assert_eq!(consumer.pop(), None);
//! ```

use core::cell::UnsafeCell;

use critical_section::CriticalSection;
use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

use crate::channel::Channel;

/// Queue size used by the controller firmware (19 usable slots).
pub const DEFAULT_QUEUE_SIZE: usize = 20;

// ============================================================================
// Event Record
// ============================================================================

/// Kind of button transition carried by an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Transition {
    /// Released to pressed.
    Press,
    /// Pressed to released. Not produced by the current debouncer.
    Release,
}

/// A confirmed button transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonEvent {
    /// Knob whose button changed.
    pub channel: Channel,
    /// Direction of the change.
    pub transition: Transition,
    /// Time the transition was accepted.
    pub timestamp_ms: u64,
}

impl ButtonEvent {
    /// Filler for slots that have never been written.
    const VACANT: ButtonEvent = ButtonEvent::press(Channel::Red, 0);

    /// Creates a press event.
    #[inline]
    pub const fn press(channel: Channel, timestamp_ms: u64) -> Self {
        Self {
            channel,
            transition: Transition::Press,
            timestamp_ms,
        }
    }

    /// Creates a release event.
    #[inline]
    pub const fn release(channel: Channel, timestamp_ms: u64) -> Self {
        Self {
            channel,
            transition: Transition::Release,
            timestamp_ms,
        }
    }

    /// Returns true for press events.
    #[inline]
    pub const fn is_press(&self) -> bool {
        matches!(self.transition, Transition::Press)
    }
}

// ============================================================================
// Counters
// ============================================================================

/// Best-effort queue counters, readable at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QueueCounters {
    /// Calls to `push`.
    pub push_attempts: u32,
    /// Pushes that stored an event.
    pub push_successes: u32,
    /// Pushes refused because the queue was full.
    pub dropped: u32,
    /// Calls to `pop`.
    pub pop_attempts: u32,
    /// Pops that returned an event.
    pub pop_successes: u32,
    /// Channel of the most recently stored event.
    pub last_pushed: Option<Channel>,
    /// Channel of the most recently popped event.
    pub last_popped: Option<Channel>,
}

struct QueueStats {
    push_attempts: AtomicU32,
    push_successes: AtomicU32,
    dropped: AtomicU32,
    pop_attempts: AtomicU32,
    pop_successes: AtomicU32,
    last_pushed: AtomicU8,
    last_popped: AtomicU8,
}

impl QueueStats {
    const fn new() -> Self {
        Self {
            push_attempts: AtomicU32::new(0),
            push_successes: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            pop_attempts: AtomicU32::new(0),
            pop_successes: AtomicU32::new(0),
            last_pushed: AtomicU8::new(0),
            last_popped: AtomicU8::new(0),
        }
    }

    fn snapshot(&self) -> QueueCounters {
        QueueCounters {
            push_attempts: self.push_attempts.load(Ordering::Relaxed),
            push_successes: self.push_successes.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            pop_attempts: self.pop_attempts.load(Ordering::Relaxed),
            pop_successes: self.pop_successes.load(Ordering::Relaxed),
            last_pushed: Channel::try_from(self.last_pushed.load(Ordering::Relaxed)).ok(),
            last_popped: Channel::try_from(self.last_popped.load(Ordering::Relaxed)).ok(),
        }
    }
}

// ============================================================================
// Queue
// ============================================================================

/// Fixed-size SPSC ring buffer of [`ButtonEvent`]s.
///
/// `N` is the number of slots; [`capacity`](Self::capacity) is `N - 1`.
pub struct EventQueue<const N: usize = DEFAULT_QUEUE_SIZE> {
    slots: [UnsafeCell<ButtonEvent>; N],
    head: AtomicUsize,
    tail: AtomicUsize,
    consumer_claimed: AtomicBool,
    stats: QueueStats,
}

// SAFETY: a slot is only written by a producer holding a critical section
// while it lies outside `tail..head`, and only read by the unique consumer
// while it lies inside. The release store on `head` (resp. `tail`) orders the
// payload write (resp. read) before the index change becomes visible.
unsafe impl<const N: usize> Sync for EventQueue<N> {}

impl<const N: usize> EventQueue<N> {
    /// Creates an empty queue. Usable in `static` initialisers.
    pub const fn new() -> Self {
        const { assert!(N >= 2, "EventQueue needs at least two slots") };

        Self {
            slots: [const { UnsafeCell::new(ButtonEvent::VACANT) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            consumer_claimed: AtomicBool::new(false),
            stats: QueueStats::new(),
        }
    }

    /// Appends an event.
    ///
    /// Returns `false` without touching the queue contents if all
    /// [`capacity`](Self::capacity) slots are occupied. Never blocks.
    ///
    /// The critical-section token serialises producers: only one push can be
    /// in flight at a time.
    pub fn push(&self, _cs: CriticalSection<'_>, event: ButtonEvent) -> bool {
        self.stats.push_attempts.fetch_add(1, Ordering::Relaxed);

        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) % N;
        if next == self.tail.load(Ordering::Acquire) {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // SAFETY: `head` is outside the live range, so the consumer will not
        // read this slot until `head` is published below, and the critical
        // section excludes every other producer.
        unsafe { *self.slots[head].get() = event };
        self.head.store(next, Ordering::Release);

        self.stats.push_successes.fetch_add(1, Ordering::Relaxed);
        self.stats
            .last_pushed
            .store(event.channel.id(), Ordering::Relaxed);
        true
    }

    /// Claims the consumer handle.
    ///
    /// Returns `None` while another [`EventConsumer`] for this queue is
    /// alive.
    pub fn consumer(&self) -> Option<EventConsumer<'_, N>> {
        if self.consumer_claimed.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(EventConsumer { queue: self })
        }
    }

    /// Number of queued events.
    ///
    /// Advisory only: a producer may push right after the snapshot is taken.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + N - tail) % N
    }

    /// Returns true if no events are queued (advisory, like [`len`](Self::len)).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of events the queue can hold (`N - 1`).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Snapshot of the push/pop counters.
    pub fn counters(&self) -> QueueCounters {
        self.stats.snapshot()
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Consumer
// ============================================================================

/// The single consumer of an [`EventQueue`].
///
/// Dropping the handle releases the claim so a new one can be taken.
pub struct EventConsumer<'a, const N: usize> {
    queue: &'a EventQueue<N>,
}

impl<'a, const N: usize> EventConsumer<'a, N> {
    /// Removes and returns the oldest event, or `None` if the queue is empty.
    /// Never blocks.
    pub fn pop(&mut self) -> Option<ButtonEvent> {
        let queue = self.queue;
        queue.stats.pop_attempts.fetch_add(1, Ordering::Relaxed);

        let tail = queue.tail.load(Ordering::Relaxed);
        if tail == queue.head.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: `tail != head`, so the slot was published by a producer's
        // release store on `head`, and producers will not write it again
        // until `tail` moves past it below.
        let event = unsafe { *queue.slots[tail].get() };
        queue.tail.store((tail + 1) % N, Ordering::Release);

        queue.stats.pop_successes.fetch_add(1, Ordering::Relaxed);
        queue
            .stats
            .last_popped
            .store(event.channel.id(), Ordering::Relaxed);
        Some(event)
    }

    /// Iterator that pops until the queue is empty.
    pub fn drain(&mut self) -> Drain<'_, 'a, N> {
        Drain { consumer: self }
    }

    /// The queue this handle consumes from.
    pub fn queue(&self) -> &'a EventQueue<N> {
        self.queue
    }
}

impl<const N: usize> Drop for EventConsumer<'_, N> {
    fn drop(&mut self) {
        self.queue.consumer_claimed.store(false, Ordering::Release);
    }
}

/// Draining iterator returned by [`EventConsumer::drain`].
pub struct Drain<'c, 'a, const N: usize> {
    consumer: &'c mut EventConsumer<'a, N>,
}

impl<const N: usize> Iterator for Drain<'_, '_, N> {
    type Item = ButtonEvent;

    fn next(&mut self) -> Option<ButtonEvent> {
        self.consumer.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn push(queue: &EventQueue<4>, event: ButtonEvent) -> bool {
        critical_section::with(|cs| queue.push(cs, event))
    }

    // =========================================================================
    // Basic Operations
    // =========================================================================

    #[test]
    fn new_queue_is_empty() {
        let queue: EventQueue<4> = EventQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.capacity(), 3);
    }

    #[test]
    fn fifo_across_channels() {
        let queue: EventQueue<4> = EventQueue::new();
        assert!(push(&queue, ButtonEvent::press(Channel::Blue, 1)));
        assert!(push(&queue, ButtonEvent::press(Channel::Red, 2)));
        assert!(push(&queue, ButtonEvent::press(Channel::Blue, 3)));

        let mut consumer = queue.consumer().unwrap();
        let popped: Vec<_> = consumer.drain().collect();
        assert_eq!(
            popped,
            [
                ButtonEvent::press(Channel::Blue, 1),
                ButtonEvent::press(Channel::Red, 2),
                ButtonEvent::press(Channel::Blue, 3),
            ]
        );
    }

    #[test]
    fn full_queue_rejects_and_keeps_contents() {
        let queue: EventQueue<4> = EventQueue::new();
        for t in 0..3 {
            assert!(push(&queue, ButtonEvent::press(Channel::Green, t)));
        }
        assert_eq!(queue.len(), 3);

        assert!(!push(&queue, ButtonEvent::press(Channel::Effect, 99)));
        assert_eq!(queue.len(), 3);

        let mut consumer = queue.consumer().unwrap();
        let stamps: Vec<_> = consumer.drain().map(|e| e.timestamp_ms).collect();
        assert_eq!(stamps, [0, 1, 2]);
    }

    #[test]
    fn indices_wrap_around() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut consumer = queue.consumer().unwrap();

        for round in 0..10u64 {
            assert!(push(&queue, ButtonEvent::press(Channel::Red, round * 2)));
            assert!(push(&queue, ButtonEvent::press(Channel::Green, round * 2 + 1)));
            assert_eq!(queue.len(), 2);
            assert_eq!(consumer.pop().unwrap().timestamp_ms, round * 2);
            assert_eq!(consumer.pop().unwrap().timestamp_ms, round * 2 + 1);
            assert!(consumer.pop().is_none());
        }
    }

    #[test]
    fn pop_on_empty_returns_none() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut consumer = queue.consumer().unwrap();
        assert_eq!(consumer.pop(), None);
    }

    // =========================================================================
    // Consumer Claim
    // =========================================================================

    #[test]
    fn only_one_consumer_at_a_time() {
        let queue: EventQueue<4> = EventQueue::new();
        let first = queue.consumer();
        assert!(first.is_some());
        assert!(queue.consumer().is_none());

        drop(first);
        assert!(queue.consumer().is_some());
    }

    // =========================================================================
    // Counters
    // =========================================================================

    #[test]
    fn counters_track_attempts_and_drops() {
        let queue: EventQueue<2> = EventQueue::new();
        critical_section::with(|cs| {
            assert!(queue.push(cs, ButtonEvent::press(Channel::Effect, 0)));
            assert!(!queue.push(cs, ButtonEvent::press(Channel::Red, 1)));
        });

        let mut consumer = queue.consumer().unwrap();
        consumer.pop();
        consumer.pop();

        let counters = queue.counters();
        assert_eq!(counters.push_attempts, 2);
        assert_eq!(counters.push_successes, 1);
        assert_eq!(counters.dropped, 1);
        assert_eq!(counters.pop_attempts, 2);
        assert_eq!(counters.pop_successes, 1);
        assert_eq!(counters.last_pushed, Some(Channel::Effect));
        assert_eq!(counters.last_popped, Some(Channel::Effect));
    }

    #[test]
    fn fresh_counters_report_no_channel() {
        let queue: EventQueue<4> = EventQueue::new();
        assert_eq!(queue.counters(), QueueCounters::default());
    }

    #[test]
    fn release_event_round_trips() {
        let queue: EventQueue<4> = EventQueue::new();
        assert!(push(&queue, ButtonEvent::release(Channel::Green, 7)));
        let mut consumer = queue.consumer().unwrap();
        let event = consumer.pop().unwrap();
        assert!(!event.is_press());
        assert_eq!(event.transition, Transition::Release);
    }
}
