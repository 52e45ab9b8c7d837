//! The interrupt-to-loop input pipeline.
//!
//! [`InputPipeline`] is the one context object shared by the interrupt
//! handlers and the main loop. It owns, per channel, the quadrature decoder
//! state and the button debounce state, plus the encoder accumulators and
//! the button event queue.
//!
//! # Entry points
//!
//! | Context | Method | Effect |
//! |---------|--------|--------|
//! | ISR (encoder A/B edge) | [`on_encoder_edge`](InputPipeline::on_encoder_edge) | decode, update accumulator |
//! | ISR (button edge) | [`on_button_edge`](InputPipeline::on_button_edge) | debounce, push press event |
//! | Main loop | [`drain_encoders`](InputPipeline::drain_encoders) | take-and-zero all tick counters |
//! | Main loop | [`consumer`](InputPipeline::consumer) | pull button events |
//! | Anywhere | [`diagnostics`](InputPipeline::diagnostics) | best-effort counters |
//!
//! The constructor is `const`, so the pipeline lives in a `static` for the
//! whole process lifetime:
//!
//! ```
//! use wled_knobs::{Channel, InputPipeline, PipelineConfig};
//! use wled_knobs::hal::{MockDelay, MockPins};
//! use wled_knobs::debounce::ButtonLevel;
//!
//! static PIPELINE: InputPipeline = InputPipeline::new(PipelineConfig::new());
//!
//! let mut pins = MockPins::new();
//! let mut delay = MockDelay::new();
//!
//! // Interrupt side
//! pins.set_button(Channel::Green, ButtonLevel::Pressed);
//! PIPELINE.on_button_edge(Channel::Green, &mut pins, &mut delay, 1_000);
//!
//! // Main loop side
//! let mut events = PIPELINE.consumer().unwrap();
//! assert_eq!(events.pop().map(|e| e.channel), Some(Channel::Green));
//! ```

use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use portable_atomic::{AtomicU32, Ordering};

use crate::accumulator::{EncoderAccumulators, EncoderDeltas};
use crate::channel::{Channel, CHANNEL_COUNT};
use crate::config::PipelineConfig;
use crate::debounce::{ButtonMonitor, EdgeOutcome};
use crate::quadrature::QuadratureDecoder;
use crate::queue::{ButtonEvent, EventConsumer, EventQueue, QueueCounters, DEFAULT_QUEUE_SIZE};
use crate::traits::InputPins;

/// Snapshot of every pipeline counter.
///
/// Values are read one by one without a lock, so a snapshot taken while
/// interrupts are firing may be slightly inconsistent. Good enough for logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiagnosticsSnapshot {
    /// Queue push/pop counters.
    pub queue: QueueCounters,
    /// Events currently waiting in the queue.
    pub queued: usize,
    /// Edge notifications received (encoder and button).
    pub interrupt_calls: u32,
    /// Button edges that got past the time lockout.
    pub debounce_checks: u32,
}

/// Shared state of the input pipeline.
///
/// `N` is the event queue size; `N - 1` presses can wait for the main loop.
pub struct InputPipeline<const N: usize = DEFAULT_QUEUE_SIZE> {
    config: PipelineConfig,
    decoders: [Mutex<Cell<QuadratureDecoder>>; CHANNEL_COUNT],
    buttons: [Mutex<Cell<ButtonMonitor>>; CHANNEL_COUNT],
    accumulators: EncoderAccumulators,
    queue: EventQueue<N>,
    interrupt_calls: AtomicU32,
    debounce_checks: AtomicU32,
}

impl<const N: usize> InputPipeline<N> {
    /// Creates a pipeline with every channel at rest.
    pub const fn new(config: PipelineConfig) -> Self {
        let decoder = QuadratureDecoder::with_config(config.polarity, config.resolution);
        Self {
            config,
            decoders: [
                Mutex::new(Cell::new(decoder)),
                Mutex::new(Cell::new(decoder)),
                Mutex::new(Cell::new(decoder)),
                Mutex::new(Cell::new(decoder)),
            ],
            buttons: [
                Mutex::new(Cell::new(ButtonMonitor::new())),
                Mutex::new(Cell::new(ButtonMonitor::new())),
                Mutex::new(Cell::new(ButtonMonitor::new())),
                Mutex::new(Cell::new(ButtonMonitor::new())),
            ],
            accumulators: EncoderAccumulators::new(),
            queue: EventQueue::new(),
            interrupt_calls: AtomicU32::new(0),
            debounce_checks: AtomicU32::new(0),
        }
    }

    /// The configuration the pipeline was built with.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // ========================================================================
    // Interrupt side
    // ========================================================================

    /// Handles an edge on pin A or B of `channel`'s encoder.
    ///
    /// Samples both pins, advances the channel's decoder and adds any
    /// resulting tick to the channel's accumulator. Returns the increment
    /// (-1, 0 or +1).
    pub fn on_encoder_edge<P: InputPins>(&self, channel: Channel, pins: &mut P) -> i8 {
        self.interrupt_calls.fetch_add(1, Ordering::Relaxed);
        let sample = pins.read_encoder(channel);

        critical_section::with(|cs| {
            let cell = self.decoders[channel.index()].borrow(cs);
            let mut decoder = cell.get();
            let step = decoder.step(sample);
            cell.set(decoder);
            self.accumulators.add(cs, channel, step);
            step
        })
    }

    /// Handles an edge on `channel`'s button.
    ///
    /// Applies the debounce lockout, verifies press edges with a second read
    /// after [`PipelineConfig::verify_delay_us`], and queues a press event
    /// stamped `now_ms` when the press is confirmed. A full queue turns
    /// [`EdgeOutcome::Accepted`] into [`EdgeOutcome::Dropped`]; the button
    /// state is updated either way.
    pub fn on_button_edge<P, D>(
        &self,
        channel: Channel,
        pins: &mut P,
        delay: &mut D,
        now_ms: u64,
    ) -> EdgeOutcome
    where
        P: InputPins,
        D: DelayNs,
    {
        self.interrupt_calls.fetch_add(1, Ordering::Relaxed);
        let level = pins.read_button(channel);
        let window_ms = self.config.debounce_ms;
        let verify_delay_us = self.config.verify_delay_us;

        critical_section::with(|cs| {
            let cell = self.buttons[channel.index()].borrow(cs);
            let mut monitor = cell.get();

            if !monitor.is_locked_out(now_ms, window_ms) {
                self.debounce_checks.fetch_add(1, Ordering::Relaxed);
            }

            // The resample wait stays under the lock so the monitor cannot
            // change underneath it; it is bounded by `verify_delay_us`.
            let mut outcome = monitor.on_edge(level, now_ms, window_ms, || {
                delay.delay_us(verify_delay_us);
                pins.read_button(channel)
            });
            cell.set(monitor);

            if outcome == EdgeOutcome::Accepted
                && !self.queue.push(cs, ButtonEvent::press(channel, now_ms))
            {
                outcome = EdgeOutcome::Dropped;
            }
            outcome
        })
    }

    // ========================================================================
    // Main loop side
    // ========================================================================

    /// Takes and zeroes every encoder accumulator as one unit.
    ///
    /// Returns `None` if no tick arrived since the last drain.
    pub fn drain_encoders(&self) -> Option<EncoderDeltas> {
        self.accumulators.drain()
    }

    /// Claims the event consumer; `None` if it is already held.
    pub fn consumer(&self) -> Option<EventConsumer<'_, N>> {
        self.queue.consumer()
    }

    /// The button event queue.
    pub fn queue(&self) -> &EventQueue<N> {
        &self.queue
    }

    /// Current 4-bit decoder history for a channel.
    pub fn encoder_history(&self, channel: Channel) -> u8 {
        critical_section::with(|cs| self.decoders[channel.index()].borrow(cs).get().history())
    }

    /// Current debounce state for a channel.
    pub fn button_state(&self, channel: Channel) -> ButtonMonitor {
        critical_section::with(|cs| self.buttons[channel.index()].borrow(cs).get())
    }

    /// Best-effort snapshot of all counters.
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            queue: self.queue.counters(),
            queued: self.queue.len(),
            interrupt_calls: self.interrupt_calls.load(Ordering::Relaxed),
            debounce_checks: self.debounce_checks.load(Ordering::Relaxed),
        }
    }
}
