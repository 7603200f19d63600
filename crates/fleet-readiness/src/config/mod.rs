mod simulation;

pub use simulation::SimulationConfig;

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub simulation: SimulationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mut simulation = SimulationConfig::default();
        if let Some(fleet_size) = env_number::<usize>("FLEET_SIZE")? {
            simulation.fleet_size = fleet_size;
        }
        if let Some(nights) = env_number::<u32>("FLEET_NIGHTS")? {
            simulation.nights = nights;
        }
        if let Some(seed) = env_number::<u64>("FLEET_SEED")? {
            simulation.seed = Some(seed);
        }
        simulation.validate()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            simulation,
        })
    }
}

fn env_number<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name }),
        Err(_) => Ok(None),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidNumber {
        name: &'static str,
    },
    InvalidProbability {
        name: &'static str,
        value: f64,
    },
    InvalidDistribution {
        name: &'static str,
        reason: &'static str,
    },
    InvalidRange {
        name: &'static str,
    },
    EmptyFleet,
    NoNights,
    NoDepots,
    NightWindowOutOfRange {
        nights: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{name} must be a non-negative integer")
            }
            ConfigError::InvalidProbability { name, value } => {
                write!(f, "{name} must be a probability in [0, 1] (got {value})")
            }
            ConfigError::InvalidDistribution { name, reason } => {
                write!(f, "invalid distribution for {name}: {reason}")
            }
            ConfigError::InvalidRange { name } => {
                write!(f, "{name} range is empty or inverted")
            }
            ConfigError::EmptyFleet => write!(f, "fleet size must be at least one vehicle"),
            ConfigError::NoNights => write!(f, "simulation must cover at least one night"),
            ConfigError::NoDepots => {
                write!(f, "at least one depot must be configured and none may be blank")
            }
            ConfigError::NightWindowOutOfRange { nights } => {
                write!(f, "a window of {nights} nights falls outside the supported calendar")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "FLEET_SIZE",
            "FLEET_NIGHTS",
            "FLEET_SEED",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.simulation.fleet_size, 25);
        assert_eq!(config.simulation.nights, 30);
        assert_eq!(config.simulation.seed, None);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn fleet_overrides_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("FLEET_SIZE", "12");
        env::set_var("FLEET_NIGHTS", "3");
        env::set_var("FLEET_SEED", "99");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.simulation.fleet_size, 12);
        assert_eq!(config.simulation.nights, 3);
        assert_eq!(config.simulation.seed, Some(99));
        reset_env();
    }

    #[test]
    fn rejects_empty_fleet_and_garbage_numbers() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("FLEET_SIZE", "0");
        assert!(matches!(AppConfig::load(), Err(ConfigError::EmptyFleet)));

        env::set_var("FLEET_SIZE", "many");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber { name: "FLEET_SIZE" })
        ));
        reset_env();
    }
}
