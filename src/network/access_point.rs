use std::net::IpAddr;

use async_trait::async_trait;

use super::NetworkLink;
use crate::error::ControllerError;

/// Access-point mode: the controller is the gateway of its own network
///
/// Association is handled by the host's AP daemon; this link only checks
/// the passphrase is usable and reports the gateway address.
pub struct AccessPointLink {
    ssid: String,
    password: String,
    address: IpAddr,
}

impl AccessPointLink {
    pub fn new(ssid: String, password: String, address: IpAddr) -> Self {
        Self {
            ssid,
            password,
            address,
        }
    }
}

#[async_trait]
impl NetworkLink for AccessPointLink {
    async fn bring_up(&self) -> Result<IpAddr, ControllerError> {
        // WPA2 passphrase length
        if !(8..=63).contains(&self.password.len()) {
            return Err(ControllerError::Network(format!(
                "access point passphrase must be 8-63 characters, got {}",
                self.password.len()
            )));
        }

        tracing::info!("Access point '{}' active at {}", self.ssid, self.address);
        Ok(self.address)
    }

    fn mode(&self) -> &'static str {
        "access-point"
    }
}
