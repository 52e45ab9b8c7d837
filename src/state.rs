//! Light state owned by the main loop.
//!
//! [`LightState`] holds what the knobs control: an RGB colour and an index
//! into the WLED effect catalogue. Every mutation keeps the values in range
//! (colour components clamp to `0..=255`, effect deltas wrap around the
//! catalogue) and raises a change flag that the dispatcher uses to decide
//! what to forward to the remote controller.
//!
//! # Example
//!
//! ```rust
//! use wled_knobs::state::{LightState, Rgb};
//!
//! let mut state = LightState::new();
//! state.adjust_color(300, -10, 5);
//! assert_eq!(state.color(), Rgb::new(255, 0, 5));
//! assert!(state.color_changed());
//!
//! state.adjust_effect(-1);
//! assert_eq!(state.effect_name(), "Plasma");
//! ```

use crate::channel::Channel;

/// Number of effects in the catalogue.
pub const EFFECT_COUNT: u8 = 10;

/// Display names of the effects, indexed by WLED effect id.
pub const EFFECT_NAMES: [&str; EFFECT_COUNT as usize] = [
    "Solid",
    "Android",
    "Rainbow",
    "Chase",
    "Colorloop",
    "Dancing",
    "Fire",
    "Glitter",
    "Ocean",
    "Plasma",
];

/// Name of an effect, or `"Unknown"` for ids outside the catalogue.
pub fn effect_name(index: u8) -> &'static str {
    EFFECT_NAMES.get(index as usize).copied().unwrap_or("Unknown")
}

// ============================================================================
// Colour
// ============================================================================

/// An 8-bit RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Rgb {
    /// All components off.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Creates a colour from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Creates a colour from wide components, clamping each to `0..=255`.
    pub fn clamped(r: i32, g: i32, b: i32) -> Self {
        Self {
            r: clamp_component(r),
            g: clamp_component(g),
            b: clamp_component(b),
        }
    }

    /// Components as an array, in wire order.
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

fn clamp_component(value: i32) -> u8 {
    value.clamp(0, u8::MAX as i32) as u8
}

/// Colour a button press on `channel` jumps to, if that channel has one.
///
/// Each colour channel selects its pure component at a comfortable
/// brightness; the effect channel has no preset.
pub const fn preset_for(channel: Channel) -> Option<Rgb> {
    match channel {
        Channel::Red => Some(Rgb::new(150, 0, 0)),
        Channel::Green => Some(Rgb::new(0, 150, 0)),
        Channel::Blue => Some(Rgb::new(0, 0, 150)),
        Channel::Effect => None,
    }
}

// ============================================================================
// Light State
// ============================================================================

/// Current colour and effect plus pending-change flags.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LightState {
    color: Rgb,
    effect: u8,
    color_changed: bool,
    effect_changed: bool,
}

impl LightState {
    /// Black, effect 0, nothing pending.
    pub const fn new() -> Self {
        Self {
            color: Rgb::BLACK,
            effect: 0,
            color_changed: false,
            effect_changed: false,
        }
    }

    /// Current colour.
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Current effect index (`0..EFFECT_COUNT`).
    pub const fn effect(&self) -> u8 {
        self.effect
    }

    /// Display name of the current effect.
    pub fn effect_name(&self) -> &'static str {
        effect_name(self.effect)
    }

    /// Sets the colour and raises the colour flag.
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
        self.color_changed = true;
    }

    /// Adds signed deltas to each component, clamping to `0..=255`.
    ///
    /// The colour flag is only raised if a component actually moved, so
    /// turning a knob further against its limit does not trigger an update.
    pub fn adjust_color(&mut self, dr: i32, dg: i32, db: i32) {
        let next = Rgb::clamped(
            self.color.r as i32 + dr,
            self.color.g as i32 + dg,
            self.color.b as i32 + db,
        );
        if next != self.color {
            self.color = next;
            self.color_changed = true;
        }
    }

    /// Jumps to the preset colour for `channel`. Returns false for channels
    /// without a preset.
    pub fn apply_preset(&mut self, channel: Channel) -> bool {
        match preset_for(channel) {
            Some(color) => {
                self.set_color(color);
                true
            }
            None => false,
        }
    }

    /// Selects an effect, clamping to the last catalogue entry.
    pub fn set_effect(&mut self, index: u8) {
        self.effect = index.min(EFFECT_COUNT - 1);
        self.effect_changed = true;
    }

    /// Moves through the catalogue by `delta`, wrapping at both ends.
    pub fn adjust_effect(&mut self, delta: i32) {
        if delta == 0 {
            return;
        }
        let next = (self.effect as i32 + delta).rem_euclid(EFFECT_COUNT as i32);
        self.effect = next as u8;
        self.effect_changed = true;
    }

    /// Back to effect 0 (Solid).
    pub fn reset_effect(&mut self) {
        self.set_effect(0);
    }

    /// Returns true if the colour changed since the flag was last cleared.
    pub const fn color_changed(&self) -> bool {
        self.color_changed
    }

    /// Returns true if the effect changed since the flag was last cleared.
    pub const fn effect_changed(&self) -> bool {
        self.effect_changed
    }

    /// Clears the colour flag.
    pub fn clear_color_changed(&mut self) {
        self.color_changed = false;
    }

    /// Clears the effect flag.
    pub fn clear_effect_changed(&mut self) {
        self.effect_changed = false;
    }
}
