//! Local HTTP status endpoint.
//!
//! Serves `GET /api/status` with the current colour and effect, so the knob
//! box can be checked without looking at the light.
//!
//! ```text
//! {"red":150,"green":0,"blue":0,"effect":"Solid","effect_index":0}
//! ```
//!
//! The main loop publishes a copy of the light state into the shared
//! [`StatusSnapshot`] after each poll; handlers only read it.

use std::sync::{Arc, Mutex};

use esp_idf_hal::io::Write;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::EspIOError;

use crate::messages::{encode_status, MAX_MESSAGE_LEN};
use crate::state::LightState;

/// Light state shared between the main loop and the HTTP handlers.
pub type StatusSnapshot = Arc<Mutex<LightState>>;

/// Running status server. Dropping it stops the server.
pub struct Esp32StatusServer {
    _server: EspHttpServer<'static>,
}

impl Esp32StatusServer {
    /// Starts the server on `port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP server fails to start.
    pub fn new(port: u16, snapshot: StatusSnapshot) -> anyhow::Result<Self> {
        let mut server = EspHttpServer::new(&Configuration {
            http_port: port,
            ..Default::default()
        })?;

        server.fn_handler("/api/status", Method::Get, move |req| {
            let state = match snapshot.lock() {
                Ok(guard) => guard.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            };

            let mut buf = [0u8; MAX_MESSAGE_LEN];
            match encode_status(&state, &mut buf) {
                Some(json) => {
                    let mut resp =
                        req.into_response(200, None, &[("Content-Type", "application/json")])?;
                    resp.write_all(json.as_bytes())?;
                }
                None => {
                    let mut resp = req.into_status_response(500)?;
                    resp.write_all(b"{\"error\":\"encode failed\"}")?;
                }
            }
            Ok::<_, EspIOError>(())
        })?;

        log::info!("status endpoint on port {}", port);
        Ok(Self { _server: server })
    }
}
