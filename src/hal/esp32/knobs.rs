//! GPIO bindings for the four encoder/button knobs.
//!
//! Pins are read with raw `gpio_get_level` calls so that sampling works from
//! inside an interrupt handler without owning a `PinDriver`. Interrupts are
//! registered through the ESP-IDF per-pin ISR service; the handlers receive
//! the channel's 1-based id as their argument.
//!
//! # Wiring
//!
//! Encoders and buttons are wired to ground with pull-ups, so a closed
//! button reads low. Internal pull-ups are enabled where the pad has one;
//! the input-only pads need external resistors.
//!
//! # Example
//!
//! ```ignore
//! use wled_knobs::hal::esp32::{attach_knob_interrupts, Esp32Pins};
//!
//! unsafe extern "C" fn on_encoder(arg: *mut core::ffi::c_void) { /* ... */ }
//! unsafe extern "C" fn on_button(arg: *mut core::ffi::c_void) { /* ... */ }
//!
//! attach_knob_interrupts(on_encoder, on_button)?;
//! ```

use core::ffi::c_void;

use esp_idf_hal::sys::{
    esp, gpio_get_level, gpio_install_isr_service, gpio_int_type_t_GPIO_INTR_ANYEDGE,
    gpio_intr_enable, gpio_isr_handler_add, gpio_mode_t_GPIO_MODE_INPUT,
    gpio_pull_mode_t_GPIO_PULLUP_ONLY, gpio_set_direction, gpio_set_intr_type,
    gpio_set_pull_mode, EspError, ESP_ERR_INVALID_STATE,
};

use super::pins;
use crate::channel::{Channel, CHANNEL_COUNT};
use crate::debounce::ButtonLevel;
use crate::quadrature::EncoderSample;
use crate::traits::InputPins;

/// GPIO numbers of one knob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KnobPins {
    /// Encoder pin A
    pub a: i32,
    /// Encoder pin B
    pub b: i32,
    /// Push button (active low)
    pub button: i32,
}

/// Board wiring in [`Channel::ALL`] order.
pub const KNOBS: [KnobPins; CHANNEL_COUNT] = [
    KnobPins {
        a: pins::RED_A,
        b: pins::RED_B,
        button: pins::RED_BUTTON,
    },
    KnobPins {
        a: pins::GREEN_A,
        b: pins::GREEN_B,
        button: pins::GREEN_BUTTON,
    },
    KnobPins {
        a: pins::BLUE_A,
        b: pins::BLUE_B,
        button: pins::BLUE_BUTTON,
    },
    KnobPins {
        a: pins::EFFECT_A,
        b: pins::EFFECT_B,
        button: pins::EFFECT_BUTTON,
    },
];

/// Interrupt handler signature used by the ESP-IDF ISR service.
pub type IsrHandler = unsafe extern "C" fn(*mut c_void);

/// Stateless pin reader over [`KNOBS`]. Safe to construct inside an ISR.
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Pins;

impl Esp32Pins {
    #[inline]
    fn level(gpio: i32) -> bool {
        // Reading an input register has no side effects.
        unsafe { gpio_get_level(gpio) != 0 }
    }
}

impl InputPins for Esp32Pins {
    #[inline]
    fn read_encoder(&mut self, channel: Channel) -> EncoderSample {
        let knob = KNOBS[channel.index()];
        EncoderSample::new(Self::level(knob.a), Self::level(knob.b))
    }

    #[inline]
    fn read_button(&mut self, channel: Channel) -> ButtonLevel {
        ButtonLevel::from_active_low(Self::level(KNOBS[channel.index()].button))
    }
}

/// Recovers the channel passed as ISR argument by [`attach_knob_interrupts`].
#[inline]
pub fn channel_from_isr_arg(arg: *mut c_void) -> Option<Channel> {
    Channel::try_from(arg as usize as u8).ok()
}

fn configure_input(gpio: i32, handler: IsrHandler, channel: Channel) -> Result<(), EspError> {
    unsafe {
        esp!(gpio_set_direction(gpio, gpio_mode_t_GPIO_MODE_INPUT))?;
        // Input-only pads (GPIO34-39) have no internal pull resistors.
        if let Err(e) = esp!(gpio_set_pull_mode(gpio, gpio_pull_mode_t_GPIO_PULLUP_ONLY)) {
            log::warn!("GPIO{}: no internal pull-up ({}), needs an external one", gpio, e);
        }
        esp!(gpio_set_intr_type(gpio, gpio_int_type_t_GPIO_INTR_ANYEDGE))?;
        esp!(gpio_isr_handler_add(
            gpio,
            Some(handler),
            channel.id() as usize as *mut c_void
        ))?;
        esp!(gpio_intr_enable(gpio))?;
    }
    Ok(())
}

/// Configures every knob pin as a pulled-up input and attaches `encoder`
/// to both encoder pins and `button` to the button pin of each channel.
///
/// # Errors
///
/// Returns the first ESP-IDF error encountered. An ISR service that is
/// already installed is not an error.
pub fn attach_knob_interrupts(encoder: IsrHandler, button: IsrHandler) -> Result<(), EspError> {
    let installed = unsafe { gpio_install_isr_service(0) };
    if installed != ESP_ERR_INVALID_STATE as i32 {
        esp!(installed)?;
    }

    for channel in Channel::ALL {
        let knob = KNOBS[channel.index()];
        configure_input(knob.a, encoder, channel)?;
        configure_input(knob.b, encoder, channel)?;
        configure_input(knob.button, button, channel)?;
    }
    Ok(())
}
