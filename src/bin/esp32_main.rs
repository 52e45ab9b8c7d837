//! ESP32 four-knob WLED controller.
//!
//! Knob interrupts feed a `static` [`InputPipeline`]; the main loop polls a
//! [`Dispatcher`] that turns ticks and presses into colour and effect
//! updates, posts them to WLED and mirrors the state on the status endpoint.
//!
//! # Build
//!
//! ```bash
//! WIFI_SSID=... WIFI_PASSWORD=... WLED_HOST=192.168.1.50 \
//!     cargo build --release --no-default-features --features esp32
//!
//! # With the OLED
//! cargo build --release --no-default-features --features display
//!
//! # Fixed address instead of DHCP
//! WIFI_STATIC_IP=192.168.1.60 WIFI_GATEWAY=192.168.1.1 WIFI_NETMASK=255.255.255.0 ...
//! ```

use core::ffi::c_void;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use esp_idf_hal::delay::Ets;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use wled_knobs::hal::esp32::{
    attach_knob_interrupts, channel_from_isr_arg, uptime_ms, Esp32Clock, Esp32Pins,
    Esp32StatusServer, Esp32Wifi, Esp32WledClient,
};
use wled_knobs::traits::{Clock, LightDisplay};
use wled_knobs::{
    Config, Dispatcher, InputPipeline, LightState, PipelineConfig, StaticIpConfig, WifiConfig,
    WledConfig,
};

/// Main loop sleep between polls.
const LOOP_INTERVAL_MS: u64 = 5;

static PIPELINE: InputPipeline = InputPipeline::new(PipelineConfig::new());

unsafe extern "C" fn on_encoder_edge(arg: *mut c_void) {
    if let Some(channel) = channel_from_isr_arg(arg) {
        PIPELINE.on_encoder_edge(channel, &mut Esp32Pins);
    }
}

unsafe extern "C" fn on_button_edge(arg: *mut c_void) {
    if let Some(channel) = channel_from_isr_arg(arg) {
        PIPELINE.on_button_edge(channel, &mut Esp32Pins, &mut Ets, uptime_ms());
    }
}

fn main() -> anyhow::Result<()> {
    esp_idf_hal::sys::link_patches();
    EspLogger::initialize_default();

    // =========================================================================
    // Configuration
    // =========================================================================
    let mut wifi_config = WifiConfig::default()
        .with_ssid(option_env!("WIFI_SSID").unwrap_or(""))
        .with_password(option_env!("WIFI_PASSWORD").unwrap_or(""));
    if let (Some(ip), Some(gateway), Some(netmask)) = (
        option_env!("WIFI_STATIC_IP"),
        option_env!("WIFI_GATEWAY"),
        option_env!("WIFI_NETMASK"),
    ) {
        let static_ip = StaticIpConfig::parse(ip, gateway, netmask)
            .ok_or_else(|| anyhow::anyhow!("malformed WIFI_STATIC_IP/WIFI_GATEWAY/WIFI_NETMASK"))?;
        wifi_config = wifi_config.with_static_ip(static_ip);
    }

    let config = Config::default()
        .with_pipeline(*PIPELINE.config())
        .with_wifi(wifi_config)
        .with_wled(WledConfig::default().with_host(option_env!("WLED_HOST").unwrap_or("wled.local")));

    log::info!("{} starting", config.device.name);

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Display (SSD1306 on GPIO2/3 with the `display` feature)
    // =========================================================================
    #[cfg(feature = "display")]
    let mut display = {
        use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
        use esp_idf_hal::units::Hertz;
        use wled_knobs::hal::esp32::{pins, Esp32OledDisplay};

        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio2, // SDA
            peripherals.pins.gpio3, // SCL
            &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
        )?;
        Esp32OledDisplay::new(i2c).map_err(|e| anyhow::anyhow!("display init failed: {}", e))?
    };

    #[cfg(not(feature = "display"))]
    let mut display = wled_knobs::hal::esp32::LogDisplay::new();

    let _ = display.show_message(config.device.name.as_str(), Some("Starting..."));

    // =========================================================================
    // Knobs
    // =========================================================================
    attach_knob_interrupts(on_encoder_edge, on_button_edge)?;
    log::info!("knob interrupts attached");

    // =========================================================================
    // WiFi
    // =========================================================================
    let wifi = if config.wifi.enabled && config.wifi.is_configured() {
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;
        let _ = display.show_message("WiFi", Some("Connecting..."));
        Some(Esp32Wifi::new(
            peripherals.modem,
            sysloop,
            Some(nvs),
            &config.wifi,
        )?)
    } else {
        log::warn!("WiFi not configured (set WIFI_SSID/WIFI_PASSWORD), WLED updates disabled");
        None
    };

    let wled_config = config.wled.clone().with_enabled(wifi.is_some());
    let mut wled = Esp32WledClient::new(&wled_config)?;
    log::info!("WLED endpoint {}", wled.url());

    let snapshot = Arc::new(Mutex::new(LightState::new()));
    let _status = if wifi.is_some() {
        Some(Esp32StatusServer::new(
            config.device.status_port,
            snapshot.clone(),
        )?)
    } else {
        None
    };

    // =========================================================================
    // Main loop
    // =========================================================================
    let clock = Esp32Clock::new();
    let mut dispatcher = Dispatcher::new(&PIPELINE, config.dispatch)
        .ok_or_else(|| anyhow::anyhow!("event consumer already claimed"))?;

    loop {
        let report = dispatcher.poll(clock.now_ms(), &mut display, &mut wled);

        if report.events > 0 || !report.ticks.is_zero() {
            if let Ok(mut shared) = snapshot.lock() {
                *shared = dispatcher.state().clone();
            }
        }

        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}
