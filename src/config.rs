use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to (`BRIBERY_ADDR`).
    pub addr: SocketAddr,
    /// Interval between timer ticks (`BRIBERY_TICK_MS`).
    pub tick_interval: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let addr = std::env::var("BRIBERY_ADDR")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    tracing::warn!("invalid BRIBERY_ADDR '{raw}', using default");
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));

        let tick_interval = std::env::var("BRIBERY_TICK_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(1));

        Self {
            addr,
            tick_interval,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            tick_interval: Duration::from_secs(1),
        }
    }
}
