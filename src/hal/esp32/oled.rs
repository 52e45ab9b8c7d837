//! SSD1306 OLED colour bar display.
//!
//! Draws the three colour components as vertical bars with their values
//! printed above, using the layout in [`crate::bars`].
//!
//! # Wiring
//!
//! - SDA → GPIO2
//! - SCL → GPIO3
//! - VCC → 3.3V
//! - GND → GND

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use esp_idf_hal::i2c::I2cDriver;
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

use super::pins;
use crate::bars::{color_bars, BAR_WIDTH, LABEL_Y};
use crate::state::LightState;
use crate::traits::LightDisplay;

type DisplayDriver<'d> = Ssd1306<
    I2CInterface<I2cDriver<'d>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// 128x64 SSD1306 on the I2C bus.
///
/// # Display Layout
///
/// ```text
/// ┌────────────────────────────┐
/// │ R-150     G-0       B-30   │  values
/// │ ████                       │
/// │ ████                ████   │  bars, 48 px at 255
/// │ ████                ████   │
/// └────────────────────────────┘
/// ```
pub struct Esp32OledDisplay<'d> {
    display: DisplayDriver<'d>,
}

impl<'d> Esp32OledDisplay<'d> {
    /// Initialises the panel at [`pins::OLED_I2C_ADDR`] and blanks it.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel does not answer on the bus.
    pub fn new(i2c: I2cDriver<'d>) -> Result<Self, OledError> {
        let interface = I2CDisplayInterface::new_custom_address(i2c, pins::OLED_I2C_ADDR);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init()?;
        display.clear(BinaryColor::Off)?;
        display.flush()?;

        log::info!("OLED ready at 0x{:02X}", pins::OLED_I2C_ADDR);
        Ok(Self { display })
    }
}

impl LightDisplay for Esp32OledDisplay<'_> {
    type Error = OledError;

    fn render(&mut self, state: &LightState) -> Result<(), OledError> {
        self.display.clear(BinaryColor::Off)?;

        let text_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let fill_style = PrimitiveStyle::with_fill(BinaryColor::On);

        for bar in color_bars(state.color()) {
            if bar.height > 0 {
                Rectangle::new(
                    Point::new(bar.x as i32, bar.top() as i32),
                    Size::new(BAR_WIDTH, bar.height),
                )
                .into_styled(fill_style)
                .draw(&mut self.display)?;
            }

            // "B-255" is the longest label: 5 glyphs
            let mut label: heapless::String<8> = heapless::String::new();
            let _ = write!(label, "{}-{}", bar.label, bar.value);
            Text::with_baseline(
                &label,
                Point::new(bar.x as i32, LABEL_Y as i32),
                text_style,
                Baseline::Top,
            )
            .draw(&mut self.display)?;
        }

        self.display.flush()?;
        Ok(())
    }

    fn show_message(&mut self, line1: &str, line2: Option<&str>) -> Result<(), OledError> {
        self.display.clear(BinaryColor::Off)?;

        let text_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::new(line1, Point::new(4, 24), text_style).draw(&mut self.display)?;
        if let Some(l2) = line2 {
            Text::new(l2, Point::new(4, 40), text_style).draw(&mut self.display)?;
        }

        self.display.flush()?;
        Ok(())
    }
}

/// I2C transfer to the panel failed.
#[derive(Debug, thiserror::Error)]
#[error("OLED bus error: {0:?}")]
pub struct OledError(display_interface::DisplayError);

impl From<display_interface::DisplayError> for OledError {
    fn from(e: display_interface::DisplayError) -> Self {
        OledError(e)
    }
}
