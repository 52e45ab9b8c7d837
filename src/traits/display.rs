//! Display abstraction for showing the current light state.
//!
//! This module defines the [`LightDisplay`] trait for rendering the colour
//! and effect to a local screen (OLED, LCD, or a log line on boards without
//! one).

use crate::state::LightState;

/// Display trait for rendering light state.
///
/// # Example
///
/// ```ignore
/// use wled_knobs::traits::LightDisplay;
/// use wled_knobs::state::LightState;
///
/// struct MyDisplay { /* ... */ }
///
/// impl LightDisplay for MyDisplay {
///     type Error = ();
///
///     fn render(&mut self, state: &LightState) -> Result<(), ()> {
///         // Draw colour bars and the effect name
///         Ok(())
///     }
///     fn show_message(&mut self, line1: &str, line2: Option<&str>) -> Result<(), ()> {
///         Ok(())
///     }
/// }
/// ```
pub trait LightDisplay {
    /// Error type for display operations.
    type Error;

    /// Renders the current colour and effect.
    ///
    /// Called by the dispatcher at most once per display interval, and only
    /// when the colour differs from the last rendered one.
    fn render(&mut self, state: &LightState) -> Result<(), Self::Error>;

    /// Shows a simple message (e.g., for startup or errors).
    ///
    /// # Arguments
    ///
    /// * `line1` - First line of text
    /// * `line2` - Optional second line of text
    fn show_message(&mut self, line1: &str, line2: Option<&str>) -> Result<(), Self::Error>;
}
