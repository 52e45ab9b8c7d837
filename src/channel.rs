//! Logical input channels.
//!
//! The controller has four knobs, each a rotary encoder with a push button.
//! A [`Channel`] names one of them and is used both for the encoder and for
//! the button on the same knob.
//!
//! Raw integers never travel past the boundary: interrupt registration and
//! wire formats convert through [`Channel::try_from`] or
//! [`Channel::from_index`], and everything inside the crate indexes its
//! per-channel arrays with [`Channel::index`].
//!
//! # Example
//!
//! ```
//! use wled_knobs::{Channel, ChannelError};
//!
//! assert_eq!(Channel::try_from(2), Ok(Channel::Green));
//! assert_eq!(Channel::try_from(0), Err(ChannelError::UnknownId(0)));
//!
//! for (i, channel) in Channel::ALL.iter().enumerate() {
//!     assert_eq!(channel.index(), i);
//! }
//! ```

use crate::error::ChannelError;

/// Number of input channels.
pub const CHANNEL_COUNT: usize = 4;

/// One knob on the controller.
///
/// The first three steer the red, green and blue components of the light;
/// the fourth cycles through the effect catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Channel {
    /// Red component knob.
    Red,
    /// Green component knob.
    Green,
    /// Blue component knob.
    Blue,
    /// Effect selection knob.
    Effect,
}

impl Channel {
    /// All channels in array order.
    pub const ALL: [Channel; CHANNEL_COUNT] =
        [Channel::Red, Channel::Green, Channel::Blue, Channel::Effect];

    /// Array position of this channel (`0..CHANNEL_COUNT`).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Effect => 3,
        }
    }

    /// 1-based identifier used in diagnostics and on the wire.
    ///
    /// Zero is reserved for "no channel".
    #[inline]
    pub const fn id(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Inverse of [`index`](Self::index).
    pub const fn from_index(index: usize) -> Result<Self, ChannelError> {
        match index {
            0 => Ok(Channel::Red),
            1 => Ok(Channel::Green),
            2 => Ok(Channel::Blue),
            3 => Ok(Channel::Effect),
            _ => Err(ChannelError::IndexOutOfRange(index)),
        }
    }

    /// Returns the channel name as a lowercase string.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
            Channel::Effect => "effect",
        }
    }

    /// Returns true for the three colour channels.
    #[inline]
    pub const fn is_color(self) -> bool {
        !matches!(self, Channel::Effect)
    }
}

impl TryFrom<u8> for Channel {
    type Error = ChannelError;

    /// Converts a 1-based [`id`](Channel::id).
    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1..=4 => Channel::from_index(id as usize - 1).map_err(|_| ChannelError::UnknownId(id)),
            _ => Err(ChannelError::UnknownId(id)),
        }
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> u8 {
        channel.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_mapping_is_total_and_ordered() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
            assert_eq!(Channel::from_index(i), Ok(*channel));
        }
    }

    #[test]
    fn from_index_rejects_out_of_range() {
        assert_eq!(
            Channel::from_index(CHANNEL_COUNT),
            Err(ChannelError::IndexOutOfRange(CHANNEL_COUNT))
        );
        assert_eq!(
            Channel::from_index(usize::MAX),
            Err(ChannelError::IndexOutOfRange(usize::MAX))
        );
    }

    #[test]
    fn ids_are_one_based() {
        assert_eq!(Channel::Red.id(), 1);
        assert_eq!(Channel::Green.id(), 2);
        assert_eq!(Channel::Blue.id(), 3);
        assert_eq!(Channel::Effect.id(), 4);
        assert_eq!(u8::from(Channel::Blue), 3);
    }

    #[test]
    fn try_from_round_trips_ids() {
        for channel in Channel::ALL {
            assert_eq!(Channel::try_from(channel.id()), Ok(channel));
        }
    }

    #[test]
    fn try_from_rejects_zero_and_large_ids() {
        assert_eq!(Channel::try_from(0), Err(ChannelError::UnknownId(0)));
        assert_eq!(Channel::try_from(5), Err(ChannelError::UnknownId(5)));
        assert_eq!(Channel::try_from(255), Err(ChannelError::UnknownId(255)));
    }

    #[test]
    fn color_channels() {
        assert!(Channel::Red.is_color());
        assert!(Channel::Green.is_color());
        assert!(Channel::Blue.is_color());
        assert!(!Channel::Effect.is_color());
    }

    #[test]
    fn names() {
        assert_eq!(Channel::Red.as_str(), "red");
        assert_eq!(Channel::Effect.as_str(), "effect");
    }
}
