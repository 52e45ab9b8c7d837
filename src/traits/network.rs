//! Network abstraction for the remote WLED controller.
//!
//! The dispatcher pushes colour and effect changes to a WLED instance over
//! its JSON API:
//!
//! ```text
//! POST /json/state  {"on":true,"bri":255,"seg":[{"col":[[r,g,b]]}]}
//! POST /json/state  {"seg":[{"fx":n}],"on":true}
//! ```
//!
//! Payload encoding lives in [`crate::messages`] (feature `serde`); the
//! transport is up to the implementor.

use crate::state::Rgb;

/// Client for a remote light controller.
///
/// Calls are synchronous and may block on network I/O; they are only ever
/// made from the main loop, never from interrupt context.
///
/// # Example
///
/// ```rust,ignore
/// use wled_knobs::traits::LightClient;
///
/// fn push<L: LightClient>(light: &mut L) {
///     if light.set_effect(2).is_err() {
///         // retried on the next light interval
///     }
/// }
/// ```
pub trait LightClient {
    /// Error type for update operations.
    type Error;

    /// Turns the light on at full brightness with a solid colour.
    fn set_color(&mut self, color: Rgb) -> Result<(), Self::Error>;

    /// Switches the light to effect `index`.
    fn set_effect(&mut self, index: u8) -> Result<(), Self::Error>;
}
