use serde::Deserialize;
use service_core::error::AppError;

use crate::identity::relay::DEFAULT_RELAY_PATH;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub identity: IdentitySettings,
    #[serde(default)]
    pub preview: PreviewSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SessionSettings {
    /// Mark the session cookie `Secure`. Set to true in production with HTTPS.
    #[serde(default)]
    pub secure_cookie: bool,
    #[serde(default = "default_inactivity_hours")]
    pub inactivity_hours: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            secure_cookie: false,
            inactivity_hours: default_inactivity_hours(),
        }
    }
}

fn default_inactivity_hours() -> i64 {
    24
}

#[derive(Deserialize, Clone, Debug)]
pub struct IdentitySettings {
    /// Path of the credential persistence endpoint non-primary sign-ins are
    /// redirected to. Must be an absolute path without a query string.
    #[serde(default = "default_relay_path")]
    pub relay_path: String,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            relay_path: default_relay_path(),
        }
    }
}

fn default_relay_path() -> String {
    DEFAULT_RELAY_PATH.to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct PreviewSettings {
    /// Upper bound for a single link preview fetch, connect to last byte.
    #[serde(default = "default_preview_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Pages larger than this are not parsed and get a bare preview.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_preview_timeout_ms(),
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl PreviewSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

fn default_preview_timeout_ms() -> u64 {
    5_000
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_user_agent() -> String {
    concat!("crosspost-web/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector, e.g. http://tempo:4317. Span export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_service_name() -> String {
    "crosspost-web".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    fn validate(self) -> Result<Self, AppError> {
        let relay_path = &self.identity.relay_path;
        if !relay_path.starts_with('/') || relay_path.contains('?') {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "identity.relay_path must be an absolute path without a query string, got '{}'",
                relay_path
            )));
        }
        if crate::startup::FIXED_ROUTES.iter().any(|route| route == relay_path) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "identity.relay_path '{}' clashes with a built-in route",
                relay_path
            )));
        }
        if self.session.inactivity_hours <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "session.inactivity_hours must be greater than zero, got {}",
                self.session.inactivity_hours
            )));
        }
        if self.preview.timeout_ms == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "preview.timeout_ms must be greater than zero"
            )));
        }
        Ok(self)
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to determine the current directory: {}", e)))?;

    // Check if we're already in the crosspost-web directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("crosspost-web") {
        base_path.join("config")
    } else {
        base_path.join("crosspost-web").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()?.validate()
}
