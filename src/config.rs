use crate::SessionConfig;
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8080/ws";

pub struct Config {
    pub server_url: String,
    pub player_name: Option<String>,
    pub reconnect_attempts: u32,
    pub reconnect_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            server_url: env::var("SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
            player_name: env::var("PLAYER_NAME").ok(),
            reconnect_attempts: env::var("RECONNECT_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            reconnect_delay: env::var("RECONNECT_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_secs(2)),
        }
    }

    pub fn session(&self) -> Result<SessionConfig, url::ParseError> {
        Ok(SessionConfig {
            server_url: Url::parse(&self.server_url)?,
            reconnect_attempts: self.reconnect_attempts,
            reconnect_delay: self.reconnect_delay,
        })
    }
}
