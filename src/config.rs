//! Controller configuration for host builds and the ESP32 board.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! [`PipelineConfig`] is special: its builders are `const fn`, so a pipeline
//! living in a `static` can be configured at compile time.
//!
//! # Example
//!
//! ```rust
//! use wled_knobs::config::{Config, DispatchConfig, PipelineConfig, WledConfig};
//!
//! // Use defaults
//! let config = Config::default();
//!
//! // Or customize
//! let config = Config::default()
//!     .with_wled(WledConfig::default().with_host("192.168.1.50"))
//!     .with_dispatch(DispatchConfig::default().with_color_step(10));
//!
//! // Compile-time pipeline settings
//! const PIPELINE: PipelineConfig = PipelineConfig::new().with_debounce_ms(30);
//! ```

use core::net::Ipv4Addr;

use heapless::String as HString;

use crate::quadrature::{Polarity, StepResolution};

/// Maximum length for short config strings (hostnames, credentials)
pub const MAX_SHORT_STRING: usize = 64;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating at a UTF-8 boundary if too long
pub fn short_string(s: &str) -> ShortString {
    let mut end = s.len().min(MAX_SHORT_STRING);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut hs = ShortString::new();
    let _ = hs.push_str(&s[..end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete controller configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Interrupt-side input settings
    pub pipeline: PipelineConfig,
    /// Main loop timing
    pub dispatch: DispatchConfig,
    /// Remote WLED controller
    pub wled: WledConfig,
    /// WiFi connection configuration
    pub wifi: WifiConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set pipeline configuration
    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Set dispatch configuration
    pub fn with_dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Set WLED configuration
    pub fn with_wled(mut self, wled: WledConfig) -> Self {
        self.wled = wled;
        self
    }

    /// Set WiFi configuration
    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Pipeline Config
// ============================================================================

/// Input pipeline settings, fixed for the life of the pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// Button lockout after an accepted press, in milliseconds
    pub debounce_ms: u64,
    /// Wait before the verification resample, in microseconds
    pub verify_delay_us: u32,
    /// Encoder wiring convention
    pub polarity: Polarity,
    /// Encoder ticks per detent
    pub resolution: StepResolution,
}

impl PipelineConfig {
    /// Default debounce window
    pub const DEFAULT_DEBOUNCE_MS: u64 = 50;
    /// Default verification delay
    pub const DEFAULT_VERIFY_DELAY_US: u32 = 10;

    /// Default settings (50 ms lockout, 10 µs verify, one tick per detent)
    pub const fn new() -> Self {
        Self {
            debounce_ms: Self::DEFAULT_DEBOUNCE_MS,
            verify_delay_us: Self::DEFAULT_VERIFY_DELAY_US,
            polarity: Polarity::Normal,
            resolution: StepResolution::PerDetent,
        }
    }

    /// Set the debounce window
    pub const fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the verification delay
    pub const fn with_verify_delay_us(mut self, us: u32) -> Self {
        self.verify_delay_us = us;
        self
    }

    /// Set the encoder polarity
    pub const fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Set the encoder resolution
    pub const fn with_resolution(mut self, resolution: StepResolution) -> Self {
        self.resolution = resolution;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Dispatch Config
// ============================================================================

/// Main loop forwarding intervals
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchConfig {
    /// Minimum time between display refreshes (milliseconds)
    pub display_interval_ms: u64,
    /// Minimum time between WLED updates (milliseconds)
    pub light_interval_ms: u64,
    /// Time between diagnostics log lines (milliseconds)
    pub diagnostics_interval_ms: u64,
    /// Colour change per encoder tick
    pub color_step: i32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            display_interval_ms: 33,
            light_interval_ms: 150,
            diagnostics_interval_ms: 5000,
            color_step: 5,
        }
    }
}

impl DispatchConfig {
    /// Set the display refresh interval
    pub fn with_display_interval_ms(mut self, ms: u64) -> Self {
        self.display_interval_ms = ms;
        self
    }

    /// Set the WLED update interval
    pub fn with_light_interval_ms(mut self, ms: u64) -> Self {
        self.light_interval_ms = ms;
        self
    }

    /// Set the diagnostics interval
    pub fn with_diagnostics_interval_ms(mut self, ms: u64) -> Self {
        self.diagnostics_interval_ms = ms;
        self
    }

    /// Set the colour step per tick
    pub fn with_color_step(mut self, step: i32) -> Self {
        self.color_step = step;
        self
    }
}

// ============================================================================
// WLED Config
// ============================================================================

/// Remote WLED controller address
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WledConfig {
    /// Controller hostname or IP
    pub host: ShortString,
    /// HTTP port
    pub port: u16,
    /// Whether updates are sent at all
    pub enabled: bool,
}

impl Default for WledConfig {
    fn default() -> Self {
        Self {
            host: short_string("wled.local"),
            port: 80,
            enabled: true,
        }
    }
}

impl WledConfig {
    /// Path of the WLED JSON state endpoint
    pub const STATE_PATH: &'static str = "/json/state";

    /// Set the controller host
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = short_string(host);
        self
    }

    /// Set the controller port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable WLED updates
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Full URL of the JSON state endpoint
    pub fn state_url(&self) -> HString<128> {
        use core::fmt::Write;
        let mut url = HString::new();
        let _ = if self.port == 80 {
            write!(url, "http://{}{}", self.host, Self::STATE_PATH)
        } else {
            write!(url, "http://{}:{}{}", self.host, self.port, Self::STATE_PATH)
        };
        url
    }
}

// ============================================================================
// WiFi Config
// ============================================================================

/// WiFi connection configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiConfig {
    /// WiFi network SSID
    pub ssid: ShortString,
    /// WiFi password
    pub password: ShortString,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u32,
    /// Whether WiFi is enabled
    pub enabled: bool,
    /// Fixed address settings; DHCP when `None`
    pub static_ip: Option<StaticIpConfig>,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: ShortString::new(),
            password: ShortString::new(),
            connect_timeout_ms: 20_000,
            enabled: true,
            static_ip: None,
        }
    }
}

impl WifiConfig {
    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout_ms(mut self, ms: u32) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    /// Enable or disable WiFi
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Use a fixed address instead of DHCP
    pub fn with_static_ip(mut self, static_ip: StaticIpConfig) -> Self {
        self.static_ip = Some(static_ip);
        self
    }

    /// Check if WiFi credentials are configured
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

/// Fixed station address, stored as octets so the config stays `no_std`
/// and serde friendly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticIpConfig {
    /// Station address
    pub ip: [u8; 4],
    /// Default gateway
    pub gateway: [u8; 4],
    /// Subnet mask
    pub netmask: [u8; 4],
}

impl StaticIpConfig {
    /// Address settings from octets
    pub const fn new(ip: [u8; 4], gateway: [u8; 4], netmask: [u8; 4]) -> Self {
        Self {
            ip,
            gateway,
            netmask,
        }
    }

    /// Parses dotted-quad strings. Returns `None` if any of them is malformed.
    ///
    /// ```
    /// use wled_knobs::config::StaticIpConfig;
    ///
    /// let net = StaticIpConfig::parse("192.168.1.60", "192.168.1.1", "255.255.255.0").unwrap();
    /// assert_eq!(net.prefix_len(), Some(24));
    /// assert!(StaticIpConfig::parse("192.168.1", "192.168.1.1", "255.255.255.0").is_none());
    /// ```
    pub fn parse(ip: &str, gateway: &str, netmask: &str) -> Option<Self> {
        let octets = |s: &str| s.parse::<Ipv4Addr>().ok().map(|a| a.octets());
        Some(Self::new(octets(ip)?, octets(gateway)?, octets(netmask)?))
    }

    /// Station address
    pub fn ip_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.ip)
    }

    /// Gateway address
    pub fn gateway_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.gateway)
    }

    /// Netmask as a prefix length, or `None` if its one bits are not
    /// contiguous.
    pub fn prefix_len(&self) -> Option<u8> {
        let mask = u32::from_be_bytes(self.netmask);
        let ones = mask.leading_ones();
        // Anything left after shifting out the leading ones is a hole
        if mask.checked_shl(ones).unwrap_or(0) == 0 {
            Some(ones as u8)
        } else {
            None
        }
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name, shown on the splash screen
    pub name: ShortString,
    /// Port of the local status endpoint
    pub status_port: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("wled-knobs"),
            status_port: 80,
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the status endpoint port
    pub fn with_status_port(mut self, port: u16) -> Self {
        self.status_port = port;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
