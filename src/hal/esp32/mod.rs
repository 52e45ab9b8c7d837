//! ESP32 hardware abstraction layer for the four-knob WLED controller.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 (Xtensa dual core)
//! - **Inputs**: four quadrature encoders, each with a push button
//! - **Output**: WLED controller on the local network, reached over WiFi
//! - **Display**: optional 128x64 SSD1306 OLED on I2C (`display` feature),
//!   otherwise a log-backed stand-in
//!
//! # Interrupt model
//!
//! Every encoder and button pin raises an any-edge interrupt. The handlers
//! live in the binary and forward into a `static`
//! [`InputPipeline`](crate::pipeline::InputPipeline); see [`knobs`] for the
//! pin binding and [`Esp32Clock`] for the ISR-safe time source.
//!
//! # Pin Assignments
//!
//! See the [`pins`] module.

mod clock;
mod display;
pub mod knobs;
#[cfg(feature = "display")]
mod oled;
mod status;
mod wifi;
mod wled;

pub use clock::{uptime_ms, Esp32Clock};
pub use display::LogDisplay;
pub use knobs::{attach_knob_interrupts, channel_from_isr_arg, Esp32Pins, IsrHandler, KNOBS};
#[cfg(feature = "display")]
pub use oled::{Esp32OledDisplay, OledError};
pub use status::{Esp32StatusServer, StatusSnapshot};
pub use wifi::Esp32Wifi;
pub use wled::Esp32WledClient;

/// Pin assignments for the knob board.
///
/// All inputs are pulled up; buttons are active low. GPIO34-36 are
/// input-only pads and need external pull-ups.
pub mod pins {
    // =========================================================================
    // Red knob
    // =========================================================================

    /// Red encoder A
    pub const RED_A: i32 = 36;

    /// Red encoder B
    pub const RED_B: i32 = 34;

    /// Red push button
    pub const RED_BUTTON: i32 = 21;

    // =========================================================================
    // Green knob
    // =========================================================================

    /// Green encoder A
    pub const GREEN_A: i32 = 35;

    /// Green encoder B
    pub const GREEN_B: i32 = 33;

    /// Green push button
    pub const GREEN_BUTTON: i32 = 18;

    // =========================================================================
    // Blue knob
    // =========================================================================

    /// Blue encoder A
    pub const BLUE_A: i32 = 5;

    /// Blue encoder B
    pub const BLUE_B: i32 = 7;

    /// Blue push button
    pub const BLUE_BUTTON: i32 = 9;

    // =========================================================================
    // Effect knob
    // =========================================================================

    /// Effect encoder A
    pub const EFFECT_A: i32 = 4;

    /// Effect encoder B
    pub const EFFECT_B: i32 = 6;

    /// Effect push button
    pub const EFFECT_BUTTON: i32 = 8;

    // =========================================================================
    // OLED
    // =========================================================================

    /// I2C data
    pub const I2C_SDA: i32 = 2;

    /// I2C clock
    pub const I2C_SCL: i32 = 3;

    /// I2C bus speed
    pub const I2C_FREQ_HZ: u32 = 400_000;

    /// SSD1306 bus address
    pub const OLED_I2C_ADDR: u8 = 0x3C;
}
