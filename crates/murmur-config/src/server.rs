use std::net::SocketAddr;

use serde::Deserialize;

use crate::health::HealthConfig;

/// Port used when neither the config file nor `PORT` names one
pub const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
}

impl ServerConfig {
    /// Address to bind, falling back to all interfaces on [`DEFAULT_PORT`]
    pub fn effective_listen_address(&self) -> SocketAddr {
        self.listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }
}
