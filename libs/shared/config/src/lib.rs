use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_TOKEN_FILE: &str = ".clinic-portal/access_token";
pub const DEFAULT_BOOKING_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_CONFIRMATION_DISMISS_SECS: u64 = 3;
pub const DEFAULT_SIGN_IN_REDIRECT_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub bind_addr: String,
    pub token_file: PathBuf,
    pub booking_window_days: i64,
    pub confirmation_dismiss_secs: u64,
    pub sign_in_redirect_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            booking_window_days: DEFAULT_BOOKING_WINDOW_DAYS,
            confirmation_dismiss_secs: DEFAULT_CONFIRMATION_DISMISS_SECS,
            sign_in_redirect_delay_ms: DEFAULT_SIGN_IN_REDIRECT_DELAY_MS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            backend_url: env::var("CLINIC_BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| {
                    warn!("CLINIC_BACKEND_URL not set, using default");
                    DEFAULT_BACKEND_URL.to_string()
                }),
            bind_addr: env::var("PORTAL_BIND_ADDR")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_BIND_ADDR not set, using default");
                    DEFAULT_BIND_ADDR.to_string()
                }),
            token_file: env::var("PORTAL_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    warn!("PORTAL_TOKEN_FILE not set, using default");
                    PathBuf::from(DEFAULT_TOKEN_FILE)
                }),
            booking_window_days: parse_or("BOOKING_WINDOW_DAYS", DEFAULT_BOOKING_WINDOW_DAYS),
            confirmation_dismiss_secs: parse_or(
                "CONFIRMATION_DISMISS_SECS",
                DEFAULT_CONFIRMATION_DISMISS_SECS,
            ),
            sign_in_redirect_delay_ms: parse_or(
                "SIGN_IN_REDIRECT_DELAY_MS",
                DEFAULT_SIGN_IN_REDIRECT_DELAY_MS,
            ),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - check environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_url.is_empty()
            && !self.bind_addr.is_empty()
            && self.booking_window_days > 0
    }

    pub fn confirmation_dismiss(&self) -> Duration {
        Duration::from_secs(self.confirmation_dismiss_secs)
    }

    pub fn sign_in_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.sign_in_redirect_delay_ms)
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_configured() {
        let config = AppConfig::default();

        assert!(config.is_configured());
        assert_eq!(config.booking_window_days, 30);
        assert_eq!(config.confirmation_dismiss(), Duration::from_secs(3));
        assert_eq!(config.sign_in_redirect_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn test_zero_window_is_not_configured() {
        let config = AppConfig {
            booking_window_days: 0,
            ..AppConfig::default()
        };

        assert!(!config.is_configured());
    }
}
