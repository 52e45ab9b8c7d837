//! JSON message types for the WLED API and the local status endpoint.
//!
//! These types are `no_std` compatible and are encoded with
//! `serde-json-core` into caller-provided buffers, so no allocation happens
//! in the main loop.
//!
//! # Wire Formats
//!
//! ```text
//! colour update  {"on":true,"bri":255,"seg":[{"col":[[r,g,b]]}]}
//! effect update  {"seg":[{"fx":n}],"on":true}
//! status body    {"red":r,"green":g,"blue":b,"effect":"Name","effect_index":n}
//! ```
//!
//! # Example
//!
//! ```
//! use wled_knobs::messages::{StatusResponse, WledColorUpdate};
//! use wled_knobs::state::{LightState, Rgb};
//!
//! let update = WledColorUpdate::new(Rgb::new(0, 150, 0));
//! assert_eq!(update.seg[0].col[0], [0, 150, 0]);
//!
//! let status = StatusResponse::from_state(&LightState::new());
//! assert_eq!(status.effect, "Solid");
//! ```

use serde::{Deserialize, Serialize};

use crate::state::{LightState, Rgb};

/// Buffer size that fits every message in this module.
pub const MAX_MESSAGE_LEN: usize = 128;

// ============================================================================
// WLED Requests
// ============================================================================

/// Segment carrying a single solid colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSegment {
    /// Colour slots; WLED's first slot is the primary colour.
    pub col: [[u8; 3]; 1],
}

/// Turns the light on at full brightness with a solid colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WledColorUpdate {
    /// Power state
    pub on: bool,
    /// Master brightness
    pub bri: u8,
    /// Segment 0 settings
    pub seg: [ColorSegment; 1],
}

impl WledColorUpdate {
    /// Update for `color` at brightness 255.
    pub fn new(color: Rgb) -> Self {
        Self {
            on: true,
            bri: u8::MAX,
            seg: [ColorSegment {
                col: [color.to_array()],
            }],
        }
    }

    /// The colour this update carries.
    pub fn color(&self) -> Rgb {
        let [r, g, b] = self.seg[0].col[0];
        Rgb::new(r, g, b)
    }
}

/// Segment carrying an effect id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSegment {
    /// WLED effect id
    pub fx: u8,
}

/// Switches segment 0 to an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WledEffectUpdate {
    /// Segment 0 settings
    pub seg: [EffectSegment; 1],
    /// Power state
    pub on: bool,
}

impl WledEffectUpdate {
    /// Update selecting effect `index`.
    pub fn new(index: u8) -> Self {
        Self {
            seg: [EffectSegment { fx: index }],
            on: true,
        }
    }

    /// The effect id this update carries.
    pub fn effect(&self) -> u8 {
        self.seg[0].fx
    }
}

// ============================================================================
// Status Response
// ============================================================================

/// Body of the local `/api/status` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    /// Red component
    pub red: u8,
    /// Green component
    pub green: u8,
    /// Blue component
    pub blue: u8,
    /// Effect display name
    pub effect: &'static str,
    /// Effect id
    pub effect_index: u8,
}

impl StatusResponse {
    /// Snapshot of the light state.
    pub fn from_state(state: &LightState) -> Self {
        let color = state.color();
        Self {
            red: color.r,
            green: color.g,
            blue: color.b,
            effect: state.effect_name(),
            effect_index: state.effect(),
        }
    }
}

impl From<&LightState> for StatusResponse {
    fn from(state: &LightState) -> Self {
        Self::from_state(state)
    }
}

// ============================================================================
// Encoding (using serde-json-core for no_std compatibility)
// ============================================================================

#[cfg(feature = "serde-json-core")]
fn encode<'b, T: Serialize>(value: &T, buf: &'b mut [u8]) -> Option<&'b str> {
    let len = serde_json_core::to_slice(value, buf).ok()?;
    core::str::from_utf8(&buf[..len]).ok()
}

/// Encode a WLED colour update into `buf`.
///
/// Returns `None` if the buffer is too small.
///
/// # Example
///
/// ```
/// use wled_knobs::messages::encode_color_update;
/// use wled_knobs::state::Rgb;
///
/// let mut buf = [0u8; 64];
/// let json = encode_color_update(Rgb::new(150, 0, 0), &mut buf).unwrap();
/// assert_eq!(json, r#"{"on":true,"bri":255,"seg":[{"col":[[150,0,0]]}]}"#);
/// ```
#[cfg(feature = "serde-json-core")]
pub fn encode_color_update(color: Rgb, buf: &mut [u8]) -> Option<&str> {
    encode(&WledColorUpdate::new(color), buf)
}

/// Encode a WLED effect update into `buf`.
///
/// Returns `None` if the buffer is too small.
#[cfg(feature = "serde-json-core")]
pub fn encode_effect_update(index: u8, buf: &mut [u8]) -> Option<&str> {
    encode(&WledEffectUpdate::new(index), buf)
}

/// Encode the status body for `state` into `buf`.
///
/// Returns `None` if the buffer is too small.
#[cfg(feature = "serde-json-core")]
pub fn encode_status<'b>(state: &LightState, buf: &'b mut [u8]) -> Option<&'b str> {
    encode(&StatusResponse::from_state(state), buf)
}

/// Parse a WLED colour update from JSON bytes.
#[cfg(feature = "serde-json-core")]
pub fn parse_color_update(json: &[u8]) -> Option<WledColorUpdate> {
    serde_json_core::from_slice(json).ok().map(|(req, _)| req)
}

/// Parse a WLED effect update from JSON bytes.
#[cfg(feature = "serde-json-core")]
pub fn parse_effect_update(json: &[u8]) -> Option<WledEffectUpdate> {
    serde_json_core::from_slice(json).ok().map(|(req, _)| req)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_update_fields() {
        let update = WledColorUpdate::new(Rgb::new(1, 2, 3));
        assert!(update.on);
        assert_eq!(update.bri, 255);
        assert_eq!(update.seg[0].col[0], [1, 2, 3]);
        assert_eq!(update.color(), Rgb::new(1, 2, 3));
    }

    #[test]
    fn effect_update_fields() {
        let update = WledEffectUpdate::new(7);
        assert!(update.on);
        assert_eq!(update.effect(), 7);
    }

    #[test]
    fn status_from_state() {
        let mut state = LightState::new();
        state.set_color(Rgb::new(10, 20, 30));
        state.set_effect(6);

        let status = StatusResponse::from(&state);
        assert_eq!(status.red, 10);
        assert_eq!(status.green, 20);
        assert_eq!(status.blue, 30);
        assert_eq!(status.effect, "Fire");
        assert_eq!(status.effect_index, 6);
    }

    #[cfg(feature = "serde-json-core")]
    mod json {
        use super::*;

        #[test]
        fn color_payload_exact() {
            let mut buf = [0u8; MAX_MESSAGE_LEN];
            assert_eq!(
                encode_color_update(Rgb::new(255, 128, 0), &mut buf),
                Some(r#"{"on":true,"bri":255,"seg":[{"col":[[255,128,0]]}]}"#)
            );
        }

        #[test]
        fn effect_payload_exact() {
            let mut buf = [0u8; MAX_MESSAGE_LEN];
            assert_eq!(
                encode_effect_update(9, &mut buf),
                Some(r#"{"seg":[{"fx":9}],"on":true}"#)
            );
        }

        #[test]
        fn status_payload_exact() {
            let mut state = LightState::new();
            state.apply_preset(crate::Channel::Blue);
            state.adjust_effect(2);

            let mut buf = [0u8; MAX_MESSAGE_LEN];
            assert_eq!(
                encode_status(&state, &mut buf),
                Some(r#"{"red":0,"green":0,"blue":150,"effect":"Rainbow","effect_index":2}"#)
            );
        }

        #[test]
        fn status_body_outlives_the_state() {
            let mut buf = [0u8; MAX_MESSAGE_LEN];
            let json = {
                let state = LightState::new();
                encode_status(&state, &mut buf)
            };
            assert_eq!(
                json,
                Some(r#"{"red":0,"green":0,"blue":0,"effect":"Solid","effect_index":0}"#)
            );
        }

        #[test]
        fn short_buffer_is_none() {
            let mut buf = [0u8; 8];
            assert_eq!(encode_color_update(Rgb::BLACK, &mut buf), None);
        }

        #[test]
        fn parse_what_we_send() {
            let mut buf = [0u8; MAX_MESSAGE_LEN];
            let json = encode_color_update(Rgb::new(4, 5, 6), &mut buf).unwrap();
            let parsed = parse_color_update(json.as_bytes()).unwrap();
            assert_eq!(parsed.color(), Rgb::new(4, 5, 6));

            let parsed = parse_effect_update(br#"{"seg":[{"fx":5}],"on":true}"#).unwrap();
            assert_eq!(parsed.effect(), 5);
        }
    }
}
