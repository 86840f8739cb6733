use std::fmt::Display;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// 64 MiB: several images and documents in one article form.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Runtime settings for the HTTP server, read once at startup.
///
/// | Env Var                | Default                    |
/// |------------------------|----------------------------|
/// | `HOST`                 | `0.0.0.0`                  |
/// | `PORT`                 | `3000`                     |
/// | `CORS_ORIGINS`         | `http://localhost:5173`    |
/// | `REQUEST_TIMEOUT_SECS` | `30`                       |
/// | `STORAGE_ROOT`         | `storage`                  |
/// | `MAX_UPLOAD_BYTES`     | `67108864`                 |
///
/// JWT settings come from [`JwtConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
    /// Root directory of the local asset store.
    pub storage_root: PathBuf,
    /// Body limit for every request, multipart uploads included.
    pub max_upload_bytes: usize,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// # Panics
    ///
    /// Panics on a value that does not parse; bad configuration stops startup.
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout: Duration::from_secs(env_or("REQUEST_TIMEOUT_SECS", 30)),
            storage_root: env_or("STORAGE_ROOT", PathBuf::from("storage")),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            jwt: JwtConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Parse `key` from the environment, or fall back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}
