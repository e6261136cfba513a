use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::outfits::scoring::ScoringConfig;
use crate::workflows::outfits::service::{
    SessionConfig, DEFAULT_DONATION_URL, DEFAULT_MINIMUM_ITEMS_PER_CATEGORY,
};

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
    pub outfits: OutfitConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            outfits: OutfitConfig::from_env()?,
        })
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

/// Outfit engine tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct OutfitConfig {
    pub rejection_threshold: u32,
    pub minimum_items_per_category: usize,
    pub random_seed: Option<u64>,
    pub streetwear_dark_boost: f64,
    pub donation_url: String,
    pub wardrobe_path: Option<PathBuf>,
}

impl Default for OutfitConfig {
    fn default() -> Self {
        let scoring = ScoringConfig::default();
        let session = SessionConfig::default();
        Self {
            rejection_threshold: session.rejection_threshold,
            minimum_items_per_category: DEFAULT_MINIMUM_ITEMS_PER_CATEGORY,
            random_seed: scoring.random_seed,
            streetwear_dark_boost: scoring.streetwear_dark_boost,
            donation_url: DEFAULT_DONATION_URL.to_string(),
            wardrobe_path: None,
        }
    }
}

impl OutfitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let rejection_threshold = match optional_var("OUTFIT_REJECTION_THRESHOLD") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|threshold| *threshold >= 1)
                .ok_or(ConfigError::InvalidThreshold)?,
            None => defaults.rejection_threshold,
        };

        let minimum_items_per_category = match optional_var("OUTFIT_MIN_ITEMS_PER_CATEGORY") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|minimum| *minimum >= 1)
                .ok_or(ConfigError::InvalidMinimum)?,
            None => defaults.minimum_items_per_category,
        };

        let random_seed = match optional_var("OUTFIT_RANDOM_SEED") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| ConfigError::InvalidSeed)?),
            None => defaults.random_seed,
        };

        let streetwear_dark_boost = match optional_var("OUTFIT_STREETWEAR_DARK_BOOST") {
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|boost| boost.is_finite() && *boost >= 1.0)
                .ok_or(ConfigError::InvalidBoost)?,
            None => defaults.streetwear_dark_boost,
        };

        let donation_url =
            optional_var("OUTFIT_DONATION_URL").unwrap_or(defaults.donation_url);
        let wardrobe_path = optional_var("OUTFIT_WARDROBE_PATH").map(PathBuf::from);

        Ok(Self {
            rejection_threshold,
            minimum_items_per_category,
            random_seed,
            streetwear_dark_boost,
            donation_url,
            wardrobe_path,
        })
    }

    pub fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            streetwear_dark_boost: self.streetwear_dark_boost,
            random_seed: self.random_seed,
            ..ScoringConfig::default()
        }
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            rejection_threshold: self.rejection_threshold,
            minimum_items_per_category: self.minimum_items_per_category,
            donation_url: self.donation_url.clone(),
        }
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold,
    InvalidMinimum,
    InvalidSeed,
    InvalidBoost,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold => {
                write!(f, "OUTFIT_REJECTION_THRESHOLD must be a whole number of at least 1")
            }
            ConfigError::InvalidMinimum => {
                write!(f, "OUTFIT_MIN_ITEMS_PER_CATEGORY must be a whole number of at least 1")
            }
            ConfigError::InvalidSeed => write!(f, "OUTFIT_RANDOM_SEED must be a valid u64"),
            ConfigError::InvalidBoost => {
                write!(f, "OUTFIT_STREETWEAR_DARK_BOOST must be a finite number of at least 1.0")
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
