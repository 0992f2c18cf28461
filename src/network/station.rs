use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time::{Instant, sleep};

use super::NetworkLink;
use crate::error::ControllerError;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

// Only used to pick the outbound interface; nothing is sent
const PROBE_TARGET: &str = "192.0.2.1:80";

/// Station mode: the host is already associated with a network
///
/// Waits for a routable local address up to `connect_timeout`; if none
/// shows up the server still starts and the page reports `0.0.0.0`.
pub struct StationLink {
    ssid: String,
    connect_timeout: Duration,
}

impl StationLink {
    pub fn new(ssid: String, connect_timeout: Duration) -> Self {
        Self {
            ssid,
            connect_timeout,
        }
    }
}

/// Address of the interface the default route leaves through
async fn outbound_address() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await.ok()?;
    socket.connect(PROBE_TARGET).await.ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified() && !ip.is_loopback()).then_some(ip)
}

#[async_trait]
impl NetworkLink for StationLink {
    async fn bring_up(&self) -> Result<IpAddr, ControllerError> {
        tracing::info!("Waiting for network '{}'...", self.ssid);

        let deadline = Instant::now() + self.connect_timeout;
        loop {
            if let Some(ip) = outbound_address().await {
                return Ok(ip);
            }
            if Instant::now() >= deadline {
                break;
            }
            sleep(POLL_INTERVAL).await;
        }

        tracing::warn!(
            "No routable address after {:?}, continuing on 0.0.0.0",
            self.connect_timeout
        );
        Ok(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }

    fn mode(&self) -> &'static str {
        "station"
    }
}
