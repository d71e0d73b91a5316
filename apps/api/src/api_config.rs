use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use url::Url;
use yardline_core::AppError;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_API_HOST: &str = "127.0.0.1";
const DEFAULT_API_PORT: u16 = 3001;
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Postgrest {
        url: Url,
        api_key: String,
        timeout_secs: u64,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub backend: BackendConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let frontend_url = optional(&lookup, "FRONTEND_URL")
            .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_owned());
        let api_host =
            optional(&lookup, "API_HOST").unwrap_or_else(|| DEFAULT_API_HOST.to_owned());
        let api_port = optional(&lookup, "API_PORT")
            .map(|value| {
                value
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))
            })
            .transpose()?
            .unwrap_or(DEFAULT_API_PORT);
        let cookie_secure = optional(&lookup, "SESSION_COOKIE_SECURE")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));

        let backend = match optional(&lookup, "BACKEND_MODE")
            .unwrap_or_else(|| "postgrest".to_owned())
            .as_str()
        {
            "memory" => BackendConfig::Memory,
            "postgrest" => {
                let raw_url = required(&lookup, "BACKEND_URL")?;
                let url = Url::parse(&raw_url)
                    .map_err(|error| AppError::Validation(format!("invalid BACKEND_URL: {error}")))?;
                let timeout_secs = optional(&lookup, "BACKEND_TIMEOUT_SECS")
                    .map(|value| parse_positive_secs("BACKEND_TIMEOUT_SECS", &value))
                    .transpose()?
                    .unwrap_or(DEFAULT_BACKEND_TIMEOUT_SECS);

                BackendConfig::Postgrest {
                    url,
                    api_key: required(&lookup, "BACKEND_API_KEY")?,
                    timeout_secs,
                }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "BACKEND_MODE must be either 'postgrest' or 'memory', got '{other}'"
                )));
            }
        };

        Ok(Self {
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            backend,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn required<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn parse_positive_secs(name: &str, value: &str) -> Result<u64, AppError> {
    match value.parse::<u64>() {
        Ok(0) => Err(AppError::Validation(format!("{name} must be greater than zero"))),
        Ok(secs) => Ok(secs),
        Err(error) => Err(AppError::Validation(format!("invalid {name}: {error}"))),
    }
}
