//! Serial-log stand-in for the OLED.
//!
//! Boards built without the `display` feature still get a readable trace of
//! what the knobs are doing. Each render is one `info` line with the colour
//! bars scaled to a fixed width.

use core::convert::Infallible;
use core::fmt::Write;

use crate::bars::scale;
use crate::state::LightState;
use crate::traits::LightDisplay;

/// Width of each colour bar in characters.
const BAR_WIDTH: usize = 16;

/// [`LightDisplay`] that writes to the log.
#[derive(Debug, Default)]
pub struct LogDisplay;

impl LogDisplay {
    /// Creates the display.
    pub fn new() -> Self {
        Self
    }

    fn bar(value: u8) -> heapless::String<BAR_WIDTH> {
        let filled = scale(value, BAR_WIDTH as u32) as usize;
        let mut bar = heapless::String::new();
        for i in 0..BAR_WIDTH {
            let _ = bar.push(if i < filled { '#' } else { '.' });
        }
        bar
    }
}

impl LightDisplay for LogDisplay {
    type Error = Infallible;

    fn render(&mut self, state: &LightState) -> Result<(), Infallible> {
        let color = state.color();
        let mut line: heapless::String<96> = heapless::String::new();
        let _ = write!(
            line,
            "R {} G {} B {} | {}",
            Self::bar(color.r),
            Self::bar(color.g),
            Self::bar(color.b),
            state.effect_name()
        );
        log::info!("{}", line);
        Ok(())
    }

    fn show_message(&mut self, line1: &str, line2: Option<&str>) -> Result<(), Infallible> {
        match line2 {
            Some(line2) => log::info!("{} / {}", line1, line2),
            None => log::info!("{}", line1),
        }
        Ok(())
    }
}
