//! Hardware abstraction traits for knob sampling and timekeeping.
//!
//! This module defines the interfaces the input pipeline needs from the
//! board, so it can run against the ESP32 GPIO driver or a desktop mock.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`InputPins`] | Sample encoder and button pins of a channel |
//! | [`Clock`] | Monotonic millisecond time source |
//!
//! The verification busy-wait uses [`embedded_hal::delay::DelayNs`]
//! directly rather than a trait of our own.
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For ESP32 hardware, use the
//! implementations from `hal::esp32` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use wled_knobs::traits::InputPins;
//! use wled_knobs::hal::MockPins;
//! use wled_knobs::quadrature::EncoderSample;
//! use wled_knobs::Channel;
//!
//! let mut pins = MockPins::new();
//! pins.set_encoder(Channel::Blue, EncoderSample::from_code(0b10));
//! assert_eq!(pins.read_encoder(Channel::Blue).code(), 0b10);
//! ```

use crate::channel::Channel;
use crate::debounce::ButtonLevel;
use crate::quadrature::EncoderSample;

/// Pin sampling for every knob on the board.
///
/// Called from interrupt handlers, so implementations must not block,
/// allocate or log.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use wled_knobs::traits::InputPins;
///
/// struct Board { /* GPIO handles */ }
///
/// impl InputPins for Board {
///     fn read_encoder(&mut self, channel: Channel) -> EncoderSample {
///         let (a, b) = PINS[channel.index()];
///         EncoderSample::new(gpio_read(a), gpio_read(b))
///     }
///
///     fn read_button(&mut self, channel: Channel) -> ButtonLevel {
///         ButtonLevel::from_active_low(gpio_read(BUTTONS[channel.index()]))
///     }
/// }
/// ```
pub trait InputPins {
    /// Reads pins A and B of the channel's encoder.
    fn read_encoder(&mut self, channel: Channel) -> EncoderSample;

    /// Reads the channel's button.
    fn read_button(&mut self, channel: Channel) -> ButtonLevel;
}

impl<T: InputPins + ?Sized> InputPins for &mut T {
    fn read_encoder(&mut self, channel: Channel) -> EncoderSample {
        (**self).read_encoder(channel)
    }

    fn read_button(&mut self, channel: Channel) -> ButtonLevel {
        (**self).read_button(channel)
    }
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for debounce windows and
/// dispatcher throttles. On desktop, this can wrap `std::time::Instant`.
/// On embedded, use a hardware timer.
///
/// # Example
///
/// ```rust
/// use wled_knobs::traits::Clock;
/// use wled_knobs::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPins {
        code: u8,
        pressed: bool,
    }

    impl InputPins for FixedPins {
        fn read_encoder(&mut self, _channel: Channel) -> EncoderSample {
            EncoderSample::from_code(self.code)
        }

        fn read_button(&mut self, _channel: Channel) -> ButtonLevel {
            ButtonLevel::from_active_low(!self.pressed)
        }
    }

    fn sample_through<P: InputPins>(mut pins: P) -> (u8, ButtonLevel) {
        (
            pins.read_encoder(Channel::Red).code(),
            pins.read_button(Channel::Red),
        )
    }

    #[test]
    fn mutable_reference_forwards() {
        let mut pins = FixedPins {
            code: 0b11,
            pressed: true,
        };
        assert_eq!(sample_through(&mut pins), (0b11, ButtonLevel::Pressed));

        pins.pressed = false;
        assert_eq!(sample_through(&mut pins).1, ButtonLevel::Released);
    }
}
