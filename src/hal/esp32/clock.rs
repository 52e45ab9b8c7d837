//! ESP32 clock implementation using the ESP-IDF timer.

use crate::traits::Clock;

/// Milliseconds since boot, callable from interrupt context.
#[inline]
pub fn uptime_ms() -> u64 {
    // esp_timer_get_time is ISR-safe and returns microseconds since boot
    let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
    (micros / 1000) as u64
}

/// ESP32 clock using the hardware timer.
///
/// # Example
///
/// ```ignore
/// use wled_knobs::hal::esp32::Esp32Clock;
/// use wled_knobs::traits::Clock;
///
/// let clock = Esp32Clock::new();
/// let start = clock.now_ms();
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        uptime_ms()
    }
}
