pub mod access_point;
pub mod station;

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ControllerError;

/// Default address of the controller when it hosts its own network
pub const DEFAULT_AP_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 4, 1));

/// How long station mode waits for a routable address
pub const STATION_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Trait for bringing up link-level connectivity before the server starts
#[async_trait]
pub trait NetworkLink: Send + Sync {
    /// Establish connectivity and return the address clients should use
    async fn bring_up(&self) -> Result<IpAddr, ControllerError>;

    /// Mode name for logging
    fn mode(&self) -> &'static str;
}

/// Configuration for creating the network link
#[derive(Debug, Clone)]
pub enum NetworkConfig {
    /// Join an existing network
    Station {
        ssid: String,
        connect_timeout: Duration,
    },
    /// Host a network for clients to join
    AccessPoint {
        ssid: String,
        password: String,
        address: IpAddr,
    },
}

impl NetworkConfig {
    pub fn create_link(&self) -> Box<dyn NetworkLink> {
        match self {
            NetworkConfig::Station {
                ssid,
                connect_timeout,
            } => Box::new(station::StationLink::new(ssid.clone(), *connect_timeout)),
            NetworkConfig::AccessPoint {
                ssid,
                password,
                address,
            } => Box::new(access_point::AccessPointLink::new(
                ssid.clone(),
                password.clone(),
                *address,
            )),
        }
    }
}
