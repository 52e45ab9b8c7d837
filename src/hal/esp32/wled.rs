//! HTTP client for a WLED controller's JSON API.
//!
//! Each update is a blocking `POST /json/state` with a body from
//! [`crate::messages`]. The dispatcher only calls this from the main loop.
//!
//! # Example
//!
//! ```ignore
//! use wled_knobs::config::WledConfig;
//! use wled_knobs::hal::esp32::Esp32WledClient;
//! use wled_knobs::traits::LightClient;
//!
//! let mut wled = Esp32WledClient::new(&WledConfig::default().with_host("192.168.1.50"))?;
//! wled.set_effect(2)?;
//! ```

use core::fmt::Write as _;

use embedded_svc::http::client::Client as HttpClient;
use embedded_svc::io::Write;
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};

use crate::config::WledConfig;
use crate::messages::{encode_color_update, encode_effect_update, MAX_MESSAGE_LEN};
use crate::state::Rgb;
use crate::traits::LightClient;

/// Blocking WLED client.
pub struct Esp32WledClient {
    client: HttpClient<EspHttpConnection>,
    url: heapless::String<128>,
    enabled: bool,
}

impl Esp32WledClient {
    /// Creates a client for the controller described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP connection cannot be created.
    pub fn new(config: &WledConfig) -> anyhow::Result<Self> {
        let conn = EspHttpConnection::new(&HttpConfiguration::default())?;
        Ok(Self {
            client: HttpClient::wrap(conn),
            url: config.state_url(),
            enabled: config.enabled,
        })
    }

    /// Endpoint this client posts to.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    fn post(&mut self, body: &str) -> anyhow::Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut len: heapless::String<8> = heapless::String::new();
        let _ = write!(len, "{}", body.len());
        let headers = [
            ("Content-Type", "application/json"),
            ("Content-Length", len.as_str()),
        ];

        let mut request = self.client.post(self.url.as_str(), &headers)?;
        request.write_all(body.as_bytes())?;
        request.flush()?;
        let response = request.submit()?;

        let status = response.status();
        if !(200..300).contains(&status) {
            anyhow::bail!("WLED returned HTTP {}", status);
        }
        log::debug!("WLED <- {}", body);
        Ok(())
    }
}

impl LightClient for Esp32WledClient {
    type Error = anyhow::Error;

    fn set_color(&mut self, color: Rgb) -> anyhow::Result<()> {
        let mut buf = [0u8; MAX_MESSAGE_LEN];
        let body = encode_color_update(color, &mut buf)
            .ok_or_else(|| anyhow::anyhow!("colour payload does not fit"))?;
        self.post(body)
    }

    fn set_effect(&mut self, index: u8) -> anyhow::Result<()> {
        let mut buf = [0u8; MAX_MESSAGE_LEN];
        let body = encode_effect_update(index, &mut buf)
            .ok_or_else(|| anyhow::anyhow!("effect payload does not fit"))?;
        self.post(body)
    }
}
