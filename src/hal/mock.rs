//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and collaborator
//! traits, enabling development and testing on desktop without the board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockPins`] | [`InputPins`] | Settable pin levels, scripted button reads |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockDelay`] | [`DelayNs`] | Records requested busy-waits |
//! | [`MockDisplay`] | [`LightDisplay`] | Tracks render calls |
//! | [`MockLightClient`] | [`LightClient`] | Records updates, injects failures |
//!
//! # Example
//!
//! ```rust
//! use wled_knobs::{Channel, Dispatcher, DispatchConfig, InputPipeline, PipelineConfig};
//! use wled_knobs::debounce::ButtonLevel;
//! use wled_knobs::hal::{MockDelay, MockDisplay, MockLightClient, MockPins};
//! use wled_knobs::state::Rgb;
//!
//! let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
//! let mut pins = MockPins::new();
//! let mut delay = MockDelay::new();
//!
//! pins.set_button(Channel::Blue, ButtonLevel::Pressed);
//! pipeline.on_button_edge(Channel::Blue, &mut pins, &mut delay, 0);
//!
//! let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
//! let mut display = MockDisplay::new();
//! let mut light = MockLightClient::new();
//! dispatcher.poll(0, &mut display, &mut light);
//!
//! assert_eq!(light.colors, [Rgb::new(0, 0, 150)]);
//! ```
//!
//! [`InputPins`]: crate::traits::InputPins
//! [`Clock`]: crate::traits::Clock
//! [`DelayNs`]: embedded_hal::delay::DelayNs
//! [`LightDisplay`]: crate::traits::LightDisplay
//! [`LightClient`]: crate::traits::LightClient

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::channel::{Channel, CHANNEL_COUNT};
use crate::debounce::ButtonLevel;
use crate::quadrature::EncoderSample;
use crate::state::{LightState, Rgb};
use crate::traits::{Clock, InputPins, LightClient, LightDisplay};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock pin bank for all knobs.
///
/// Encoder pins hold whatever was last set. Button reads first consume any
/// scripted levels for that channel, then fall back to the held level, which
/// makes it easy to simulate a glitch that is gone by the verification read.
///
/// # Example
///
/// ```rust
/// use wled_knobs::hal::MockPins;
/// use wled_knobs::traits::InputPins;
/// use wled_knobs::debounce::ButtonLevel;
/// use wled_knobs::Channel;
///
/// let mut pins = MockPins::new();
///
/// // A spike: pressed on the edge read, released on the resample
/// pins.script_button(Channel::Red, &[ButtonLevel::Pressed]);
/// assert_eq!(pins.read_button(Channel::Red), ButtonLevel::Pressed);
/// assert_eq!(pins.read_button(Channel::Red), ButtonLevel::Released);
/// assert_eq!(pins.button_reads(Channel::Red), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockPins {
    encoders: [EncoderSample; CHANNEL_COUNT],
    buttons: [ButtonLevel; CHANNEL_COUNT],
    scripted: [VecDeque<ButtonLevel>; CHANNEL_COUNT],
    button_reads: [usize; CHANNEL_COUNT],
    encoder_reads: [usize; CHANNEL_COUNT],
}

impl MockPins {
    /// All encoders at rest (`00`), all buttons released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level of both encoder pins for a channel.
    pub fn set_encoder(&mut self, channel: Channel, sample: EncoderSample) {
        self.encoders[channel.index()] = sample;
    }

    /// Sets the held button level for a channel.
    pub fn set_button(&mut self, channel: Channel, level: ButtonLevel) {
        self.buttons[channel.index()] = level;
    }

    /// Queues levels returned by the next button reads, ahead of the held level.
    pub fn script_button(&mut self, channel: Channel, levels: &[ButtonLevel]) {
        self.scripted[channel.index()].extend(levels.iter().copied());
    }

    /// Number of button reads made for a channel.
    pub fn button_reads(&self, channel: Channel) -> usize {
        self.button_reads[channel.index()]
    }

    /// Number of encoder reads made for a channel.
    pub fn encoder_reads(&self, channel: Channel) -> usize {
        self.encoder_reads[channel.index()]
    }
}

impl InputPins for MockPins {
    fn read_encoder(&mut self, channel: Channel) -> EncoderSample {
        self.encoder_reads[channel.index()] += 1;
        self.encoders[channel.index()]
    }

    fn read_button(&mut self, channel: Channel) -> ButtonLevel {
        let i = channel.index();
        self.button_reads[i] += 1;
        self.scripted[i].pop_front().unwrap_or(self.buttons[i])
    }
}

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use wled_knobs::hal::MockClock;
/// use wled_knobs::traits::Clock;
///
/// let mut clock = MockClock::new();
/// clock.set(1000);
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self { current_ms: 0 }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

/// Mock delay that returns immediately and records what was requested.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds requested.
    pub total_ns: u64,
    /// Number of `delay_ns` calls.
    pub calls: usize,
}

impl MockDelay {
    /// Creates a delay with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requested delay in whole microseconds.
    pub fn total_us(&self) -> u64 {
        self.total_ns / 1_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
        self.calls += 1;
    }
}

// ============================================================================
// Collaborator Mocks
// ============================================================================

/// Mock display that records what it was asked to show.
///
/// # Example
///
/// ```rust
/// use wled_knobs::hal::MockDisplay;
/// use wled_knobs::state::LightState;
/// use wled_knobs::traits::LightDisplay;
///
/// let mut display = MockDisplay::new();
/// display.render(&LightState::new()).unwrap();
/// assert_eq!(display.render_count, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockDisplay {
    /// The last state that was rendered.
    pub last_state: Option<LightState>,
    /// Number of times render() was called.
    pub render_count: usize,
    /// Last message shown via show_message().
    pub last_message: Option<(String, Option<String>)>,
    /// When true, every call fails.
    pub fail: bool,
}

impl MockDisplay {
    /// Creates a new mock display.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LightDisplay for MockDisplay {
    type Error = ();

    fn render(&mut self, state: &LightState) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.last_state = Some(state.clone());
        self.render_count += 1;
        Ok(())
    }

    fn show_message(&mut self, line1: &str, line2: Option<&str>) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.last_message = Some((line1.into(), line2.map(Into::into)));
        Ok(())
    }
}

/// Mock light controller.
///
/// Successful updates are appended to [`colors`](Self::colors) and
/// [`effects`](Self::effects). Set [`failures`](Self::failures) to make the
/// next N calls fail.
#[derive(Debug, Default)]
pub struct MockLightClient {
    /// Colours accepted, in order.
    pub colors: Vec<Rgb>,
    /// Effect ids accepted, in order.
    pub effects: Vec<u8>,
    /// Calls left that will fail before calls succeed again.
    pub failures: usize,
    /// Every call made, successful or not.
    pub attempts: usize,
}

impl MockLightClient {
    /// Creates a client that accepts every update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client whose next `n` calls fail.
    pub fn failing(n: usize) -> Self {
        Self {
            failures: n,
            ..Self::default()
        }
    }

    fn attempt(&mut self) -> Result<(), ()> {
        self.attempts += 1;
        if self.failures > 0 {
            self.failures -= 1;
            Err(())
        } else {
            Ok(())
        }
    }
}

impl LightClient for MockLightClient {
    type Error = ();

    fn set_color(&mut self, color: Rgb) -> Result<(), ()> {
        self.attempt()?;
        self.colors.push(color);
        Ok(())
    }

    fn set_effect(&mut self, index: u8) -> Result<(), ()> {
        self.attempt()?;
        self.effects.push(index);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // MockPins Tests
    // =========================================================================

    #[test]
    fn mock_pins_default() {
        let mut pins = MockPins::new();
        for channel in Channel::ALL {
            assert_eq!(pins.read_encoder(channel), EncoderSample::default());
            assert_eq!(pins.read_button(channel), ButtonLevel::Released);
        }
    }

    #[test]
    fn mock_pins_channels_are_independent() {
        let mut pins = MockPins::new();
        pins.set_encoder(Channel::Green, EncoderSample::from_code(0b11));
        pins.set_button(Channel::Effect, ButtonLevel::Pressed);

        assert_eq!(pins.read_encoder(Channel::Green).code(), 0b11);
        assert_eq!(pins.read_encoder(Channel::Red).code(), 0b00);
        assert_eq!(pins.read_button(Channel::Effect), ButtonLevel::Pressed);
        assert_eq!(pins.read_button(Channel::Blue), ButtonLevel::Released);
        assert_eq!(pins.encoder_reads(Channel::Green), 1);
    }

    #[test]
    fn mock_pins_script_runs_before_held_level() {
        let mut pins = MockPins::new();
        pins.set_button(Channel::Blue, ButtonLevel::Pressed);
        pins.script_button(Channel::Blue, &[ButtonLevel::Released, ButtonLevel::Released]);

        assert_eq!(pins.read_button(Channel::Blue), ButtonLevel::Released);
        assert_eq!(pins.read_button(Channel::Blue), ButtonLevel::Released);
        assert_eq!(pins.read_button(Channel::Blue), ButtonLevel::Pressed);
    }

    // =========================================================================
    // MockClock / MockDelay Tests
    // =========================================================================

    #[test]
    fn mock_clock_set_and_advance() {
        let mut clock = MockClock::new();
        assert_eq!(clock.now_ms(), 0);
        clock.set(40);
        clock.advance(10);
        assert_eq!(clock.now_ms(), 50);
    }

    #[test]
    fn mock_delay_records_microseconds() {
        let mut delay = MockDelay::new();
        delay.delay_us(10);
        delay.delay_us(5);
        assert_eq!(delay.total_us(), 15);
        assert_eq!(delay.total_ns, 15_000);
    }

    // =========================================================================
    // Collaborator Mock Tests
    // =========================================================================

    #[test]
    fn mock_display_records_render_and_message() {
        let mut display = MockDisplay::new();
        let mut state = LightState::new();
        state.set_color(Rgb::new(1, 2, 3));

        display.render(&state).unwrap();
        display.show_message("WLED", Some("connecting")).unwrap();

        assert_eq!(display.render_count, 1);
        assert_eq!(display.last_state.unwrap().color(), Rgb::new(1, 2, 3));
        assert_eq!(
            display.last_message,
            Some(("WLED".into(), Some("connecting".into())))
        );
    }

    #[test]
    fn mock_display_failure() {
        let mut display = MockDisplay {
            fail: true,
            ..MockDisplay::default()
        };
        assert!(display.render(&LightState::new()).is_err());
        assert_eq!(display.render_count, 0);
    }

    #[test]
    fn mock_light_client_failure_injection() {
        let mut light = MockLightClient::failing(1);
        assert!(light.set_effect(3).is_err());
        assert!(light.set_effect(4).is_ok());
        assert!(light.set_color(Rgb::new(9, 9, 9)).is_ok());

        assert_eq!(light.effects, [4]);
        assert_eq!(light.colors, [Rgb::new(9, 9, 9)]);
        assert_eq!(light.attempts, 3);
    }
}
