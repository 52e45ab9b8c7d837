//! Trait definitions for hardware abstraction and collaborators.
//!
//! This module defines the core abstractions that allow wled-knobs to:
//! - Run on different hardware (ESP32, desktop mock)
//! - Render to different displays
//! - Drive a remote light controller over any transport
//!
//! # Submodules
//!
//! - `hardware`: Pin sampling and clock
//! - `display`: Display rendering trait
//! - `network`: Remote light controller trait
//!
//! # Key Traits
//!
//! - [`InputPins`]: Encoder and button sampling, called from interrupts
//! - [`Clock`]: Time source for `no_std` environments
//! - [`LightDisplay`]: Local rendering of the light state
//! - [`LightClient`]: Colour and effect updates to WLED

pub mod display;
pub mod hardware;
pub mod network;

pub use display::*;
pub use hardware::*;
pub use network::*;
