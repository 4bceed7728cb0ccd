use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::Observer;

pub const DEFAULT_CONFIG_PATH: &str = "skywatch.toml";
pub const N2YO_KEY_ENV: &str = "SKYWATCH_N2YO_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub observer: ObserverConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ObserverConfig {
    pub latitude: f64,  // Used when geolocation is off or fails
    pub longitude: f64,
    pub altitude: f64,  // Metres
    pub geolocate_ip: Option<String>, // Resolve the default observer from this IP at start-up
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    pub user_agent: String,
    pub opensky_url: String,
    pub opensky_timeout_secs: u64,
    pub n2yo_url: String,
    pub n2yo_timeout_secs: u64,
    pub n2yo_api_key: Option<String>,
    pub solar_system_url: String,
    pub solar_system_timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub flights_ttl_secs: u64,
    pub satellites_ttl_secs: u64,
    pub solar_system_ttl_secs: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_name: String,
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            latitude: 37.7749,
            longitude: -122.4194,
            altitude: 0.0,
            geolocate_ip: None,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("skywatch/{}", env!("CARGO_PKG_VERSION")),
            opensky_url: "https://opensky-network.org/api/states/all".to_string(),
            opensky_timeout_secs: 8,
            n2yo_url: "https://api.n2yo.com/rest/v1/satellite".to_string(),
            n2yo_timeout_secs: 10,
            n2yo_api_key: None,
            solar_system_url: "https://api.le-systeme-solaire.net/rest/bodies".to_string(),
            solar_system_timeout_secs: 20,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            flights_ttl_secs: 30,
            satellites_ttl_secs: 60,
            solar_system_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            file_name: "skywatch.log".to_string(),
            level: "info".to_string(),
        }
    }
}

impl ObserverConfig {
    pub fn observer(&self) -> Observer {
        Observer {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
        }
    }
}

impl UpstreamConfig {
    pub fn opensky_timeout(&self) -> Duration {
        Duration::from_secs(self.opensky_timeout_secs)
    }

    pub fn n2yo_timeout(&self) -> Duration {
        Duration::from_secs(self.n2yo_timeout_secs)
    }

    pub fn solar_system_timeout(&self) -> Duration {
        Duration::from_secs(self.solar_system_timeout_secs)
    }
}

impl CacheConfig {
    pub fn flights_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.flights_ttl_secs as i64)
    }

    pub fn satellites_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.satellites_ttl_secs as i64)
    }

    pub fn solar_system_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.solar_system_ttl_secs as i64)
    }
}

/// What [`Config::load`] found on disk. Logged by the caller once a
/// subscriber is installed.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Read,
    Invalid(String),
    WroteDefaults,
    DefaultsNotWritten(String),
}

impl LoadOutcome {
    pub fn log(&self, path: &Path) {
        match self {
            LoadOutcome::Read => info!("Loaded configuration from {}.", path.display()),
            LoadOutcome::Invalid(e) => {
                warn!("Failed to parse {}: {}. Using defaults.", path.display(), e)
            }
            LoadOutcome::WroteDefaults => {
                info!("Loaded default configuration and wrote it to {}.", path.display())
            }
            LoadOutcome::DefaultsNotWritten(e) => {
                warn!("Could not write default {} to disk: {}", path.display(), e)
            }
        }
    }
}

impl Config {
    /// Loads the config file at `path`.
    /// If it doesn't exist, writes the defaults there for the user to edit.
    pub fn load(path: impl AsRef<Path>) -> (Self, LoadOutcome) {
        let path = path.as_ref();

        let (mut config, outcome) = match fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => (config, LoadOutcome::Read),
                Err(e) => (Config::default(), LoadOutcome::Invalid(e.to_string())),
            },
            Err(_) => {
                let config = Config::default();
                let outcome = match toml::to_string_pretty(&config) {
                    Ok(toml_string) => match fs::write(path, toml_string) {
                        Ok(()) => LoadOutcome::WroteDefaults,
                        Err(e) => LoadOutcome::DefaultsNotWritten(e.to_string()),
                    },
                    Err(e) => LoadOutcome::DefaultsNotWritten(e.to_string()),
                };
                (config, outcome)
            }
        };

        config.apply_env(|name| std::env::var(name).ok());
        (config, outcome)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Environment overrides. Keeps secrets out of the config file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(N2YO_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.upstream.n2yo_api_key = Some(key.trim().to_string());
        }
    }
}
