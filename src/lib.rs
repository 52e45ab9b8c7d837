//! # wled-knobs
//!
//! Interrupt-driven input handling for a four-knob WLED colour controller.
//!
//! Each knob is a quadrature rotary encoder with a push button. Three knobs
//! steer the red, green and blue components; the fourth cycles through WLED
//! effects. Pressing a colour knob jumps to that colour's preset, pressing
//! the effect knob returns to the solid effect.
//!
//! ## Features
//!
//! - **Table-driven quadrature decoding**: detent or full-edge resolution, configurable polarity
//! - **Button debouncing**: lockout window plus a verification resample after a short busy-wait
//! - **Lock-free event queue**: single-producer/single-consumer ring between interrupts and the loop
//! - **Atomic encoder drain**: all four tick counters read and cleared as one unit
//! - **Throttled forwarding**: display and WLED updates at independent intervals
//!
//! ## Architecture
//!
//! Interrupt handlers feed an [`InputPipeline`]; the main loop polls a
//! [`Dispatcher`] that owns the [`LightState`]:
//!
//! ```text
//!   pin edge ──► on_encoder_edge ──► decoder ──► accumulators ─┐
//!   pin edge ──► on_button_edge ───► debounce ──► event queue ─┤
//!                                                              ▼
//!                     Dispatcher::poll ──► LightState ──► display / WLED
//! ```
//!
//! - `channel` - The four knob channels
//! - `quadrature` - Encoder transition decoding
//! - `debounce` - Button press validation
//! - `queue` - Interrupt-to-loop event queue
//! - `accumulator` - Per-channel tick counters
//! - `pipeline` - Interrupt entry points and loop-side accessors
//! - `state` - Colour, effect and change flags
//! - `bars` - Colour bar graph layout
//! - `dispatcher` - Main-loop consumer
//! - `traits` - Pin, clock, display and light-controller abstractions
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use wled_knobs::{Channel, Dispatcher, DispatchConfig, InputPipeline, PipelineConfig};
//! use wled_knobs::debounce::ButtonLevel;
//! use wled_knobs::hal::{MockDelay, MockDisplay, MockLightClient, MockPins};
//! use wled_knobs::quadrature::EncoderSample;
//!
//! static PIPELINE: InputPipeline = InputPipeline::new(PipelineConfig::new());
//!
//! let mut pins = MockPins::new();
//! let mut delay = MockDelay::new();
//!
//! // One detent clockwise on the red knob
//! for code in [0b01, 0b11, 0b10, 0b00] {
//!     pins.set_encoder(Channel::Red, EncoderSample::from_code(code));
//!     PIPELINE.on_encoder_edge(Channel::Red, &mut pins);
//! }
//!
//! // Press the effect knob
//! pins.set_button(Channel::Effect, ButtonLevel::Pressed);
//! PIPELINE.on_button_edge(Channel::Effect, &mut pins, &mut delay, 0);
//!
//! let mut dispatcher = Dispatcher::new(&PIPELINE, DispatchConfig::default()).unwrap();
//! let mut display = MockDisplay::new();
//! let mut light = MockLightClient::new();
//!
//! let report = dispatcher.poll(0, &mut display, &mut light);
//! assert_eq!(report.ticks.get(Channel::Red), 1);
//! assert_eq!(report.events, 1);
//! assert_eq!(dispatcher.state().color().r, 5);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Per-channel encoder tick accumulators.
pub mod accumulator;
/// Colour bar graph layout for the OLED.
pub mod bars;
/// The four knob channels and their index/id mappings.
pub mod channel;
/// Button debouncing with lockout and verification resample.
pub mod debounce;
/// Main-loop dispatcher that applies input to the light state.
pub mod dispatcher;
/// Error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Interrupt-side entry points and loop-side accessors.
pub mod pipeline;
/// Table-driven quadrature decoding.
pub mod quadrature;
/// Lock-free single-producer/single-consumer event queue.
pub mod queue;
/// Colour, effect and change tracking.
pub mod state;
/// Core traits for pins, time and collaborators.
pub mod traits;

/// Shared configuration system for desktop and ESP32.
pub mod config;

/// WLED and status wire messages (serde-based).
#[cfg(feature = "serde")]
pub mod messages;

// Re-exports for convenience
pub use accumulator::{EncoderAccumulators, EncoderDeltas};
pub use channel::{Channel, CHANNEL_COUNT};
pub use debounce::{ButtonLevel, ButtonMonitor, EdgeOutcome};
pub use dispatcher::{Dispatcher, LightUpdate, PollReport};
pub use error::ChannelError;
pub use pipeline::{DiagnosticsSnapshot, InputPipeline};
pub use quadrature::{EncoderSample, Polarity, QuadratureDecoder, StepResolution};
pub use queue::{
    ButtonEvent, EventConsumer, EventQueue, QueueCounters, Transition, DEFAULT_QUEUE_SIZE,
};
pub use state::{effect_name, LightState, Rgb, EFFECT_COUNT};
pub use traits::{Clock, InputPins, LightClient, LightDisplay};

// Config re-exports
pub use config::{
    Config, DeviceConfig, DispatchConfig, PipelineConfig, StaticIpConfig, WifiConfig, WledConfig,
};

// Message re-exports (for WLED and the status endpoint)
#[cfg(feature = "serde")]
pub use messages::{StatusResponse, WledColorUpdate, WledEffectUpdate};

// Encoder/parser re-exports (serde-json-core based)
#[cfg(feature = "serde-json-core")]
pub use messages::{
    encode_color_update, encode_effect_update, encode_status, parse_color_update,
    parse_effect_update,
};
