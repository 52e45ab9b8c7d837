//! Geometry of the colour bar graph shown on the 128x64 OLED.
//!
//! Three vertical bars, one per colour component, standing on a common
//! baseline. Each bar's height is its component scaled to
//! [`MAX_BAR_HEIGHT`]. Kept free of any graphics crate so the layout can be
//! checked on the host.
//!
//! ```text
//!  R-150     G-0       B-30
//!  ████
//!  ████                ████
//!  ████                ████
//! ─────────────────────────── BASE_Y
//! ```
//!
//! # Example
//!
//! ```
//! use wled_knobs::bars::{color_bars, BASE_Y, MAX_BAR_HEIGHT};
//! use wled_knobs::state::Rgb;
//!
//! let [red, green, blue] = color_bars(Rgb::new(255, 0, 51));
//! assert_eq!(red.height, MAX_BAR_HEIGHT);
//! assert_eq!(green.height, 0);
//! assert_eq!(blue.top(), BASE_Y - 9);
//! ```

use crate::state::Rgb;

/// Panel width in pixels.
pub const SCREEN_WIDTH: u32 = 128;

/// Panel height in pixels.
pub const SCREEN_HEIGHT: u32 = 64;

/// Width of one bar in pixels.
pub const BAR_WIDTH: u32 = 20;

/// Horizontal margin on each side of the graph.
pub const MARGIN: u32 = 10;

/// Height of a bar at full intensity.
pub const MAX_BAR_HEIGHT: u32 = 48;

/// Row the bars stand on.
pub const BASE_Y: u32 = 60;

/// Row of the value labels above the bars.
pub const LABEL_Y: u32 = 2;

/// Scales a component onto `0..=full`.
#[inline]
pub const fn scale(value: u8, full: u32) -> u32 {
    value as u32 * full / u8::MAX as u32
}

/// One bar of the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bar {
    /// Component letter used in the value label
    pub label: char,
    /// Component value
    pub value: u8,
    /// Left edge
    pub x: u32,
    /// Filled height, `0..=MAX_BAR_HEIGHT`
    pub height: u32,
}

impl Bar {
    /// Top edge of the filled area.
    #[inline]
    pub const fn top(&self) -> u32 {
        BASE_Y - self.height
    }
}

/// Lays out the red, green and blue bars for `color`, evenly spaced
/// between the margins.
pub fn color_bars(color: Rgb) -> [Bar; 3] {
    let spacing = (SCREEN_WIDTH - 2 * MARGIN - 3 * BAR_WIDTH) / 2;
    let components = [('R', color.r), ('G', color.g), ('B', color.b)];

    core::array::from_fn(|i| {
        let (label, value) = components[i];
        Bar {
            label,
            value,
            x: MARGIN + i as u32 * (BAR_WIDTH + spacing),
            height: scale(value, MAX_BAR_HEIGHT),
        }
    })
}
