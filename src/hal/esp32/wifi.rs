//! WiFi station connection for reaching the WLED controller.
//!
//! # Example
//!
//! ```ignore
//! use wled_knobs::hal::esp32::Esp32Wifi;
//! use wled_knobs::config::{StaticIpConfig, WifiConfig};
//!
//! let config = WifiConfig::default()
//!     .with_ssid("MyNetwork")
//!     .with_password("secret123");
//!
//! let wifi = Esp32Wifi::new(modem, sysloop, nvs, &config)?;
//! log::info!("IP: {:?}", wifi.ip_addr());
//!
//! // Fixed address instead of DHCP
//! let config = config.with_static_ip(StaticIpConfig::new(
//!     [192, 168, 1, 60],
//!     [192, 168, 1, 1],
//!     [255, 255, 255, 0],
//! ));
//! ```

use std::net::Ipv4Addr;
use std::thread;
use std::time::{Duration, Instant};

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::ipv4::{
    self, ClientConfiguration as IpClientConfiguration, ClientSettings, Mask, Subnet,
};
use esp_idf_svc::netif::{EspNetif, NetifConfiguration, NetifStack};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi, WifiDriver};

use crate::config::{StaticIpConfig, WifiConfig};

/// Delay between connection attempts.
const RETRY_DELAY_MS: u64 = 500;

/// Station-mode WiFi connection, held for the lifetime of the struct.
pub struct Esp32Wifi<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
}

impl<'a> Esp32Wifi<'a> {
    /// Connects to the configured access point and waits for the interface
    /// to come up, either through DHCP or with [`WifiConfig::static_ip`].
    ///
    /// Connection attempts are retried until
    /// [`WifiConfig::connect_timeout_ms`] elapses.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to start, the static netmask is
    /// not contiguous, the timeout expires, or the interface never comes up.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &WifiConfig,
    ) -> anyhow::Result<Self> {
        let esp_wifi = match &config.static_ip {
            None => EspWifi::new(modem, sysloop.clone(), nvs)?,
            Some(static_ip) => {
                let driver = WifiDriver::new(modem, sysloop.clone(), nvs)?;
                EspWifi::wrap_all(
                    driver,
                    static_sta_netif(static_ip)?,
                    EspNetif::new(NetifStack::Ap)?,
                )?
            }
        };
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        let mut ssid: heapless::String<32> = heapless::String::new();
        let _ = ssid.push_str(config.ssid.as_str());
        let mut password: heapless::String<64> = heapless::String::new();
        let _ = password.push_str(config.password.as_str());

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid,
            password,
            ..Default::default()
        }))?;
        wifi.start()?;

        log::info!("WiFi: connecting to '{}'", config.ssid);
        let deadline = Instant::now() + Duration::from_millis(config.connect_timeout_ms as u64);
        loop {
            match wifi.connect() {
                Ok(()) => break,
                Err(e) if Instant::now() < deadline => {
                    log::warn!("WiFi: connect failed ({:?}), retrying", e);
                    thread::sleep(Duration::from_millis(RETRY_DELAY_MS));
                }
                Err(e) => {
                    anyhow::bail!(
                        "WiFi: no connection after {} ms: {:?}",
                        config.connect_timeout_ms,
                        e
                    )
                }
            }
        }

        wifi.wait_netif_up()?;
        if let Ok(ip_info) = wifi.wifi().sta_netif().get_ip_info() {
            log::info!("WiFi: connected, IP {}", ip_info.ip);
        }

        Ok(Self { wifi })
    }

    /// Current IP address, if connected.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
    }

    /// Whether the station is associated.
    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}

/// Station interface with DHCP replaced by a fixed address.
fn static_sta_netif(static_ip: &StaticIpConfig) -> anyhow::Result<EspNetif> {
    let Some(prefix) = static_ip.prefix_len() else {
        anyhow::bail!("WiFi: netmask {:?} is not contiguous", static_ip.netmask);
    };
    log::info!(
        "WiFi: static IP {}/{} via {}",
        static_ip.ip_addr(),
        prefix,
        static_ip.gateway_addr()
    );

    let settings = ClientSettings {
        ip: static_ip.ip_addr(),
        subnet: Subnet {
            gateway: static_ip.gateway_addr(),
            mask: Mask(prefix),
        },
        dns: None,
        secondary_dns: None,
    };
    let netif = EspNetif::new_with_conf(&NetifConfiguration {
        ip_configuration: Some(ipv4::Configuration::Client(IpClientConfiguration::Fixed(
            settings,
        ))),
        ..NetifConfiguration::wifi_default_client()
    })?;
    Ok(netif)
}
