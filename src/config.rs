use crate::error::ConfigError;
use crate::locale::Locale;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound for the engine's command channel capacity
pub const MAX_COMMAND_BUFFER: usize = 65_536;

/// Settings for the HTTP analysis backend
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// API key sent with every request (None = every analysis degrades)
    pub api_key: Option<String>,

    /// Base URL of the generative-language REST API
    pub base_url: String,

    /// Model used for all operations
    pub model: String,

    /// Timeout for a single backend request
    pub request_timeout: Duration,

    /// Sampling temperature for validation requests
    pub validation_temperature: f32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            request_timeout: Duration::from_secs(60),
            validation_temperature: 0.1, // low temperature for precise validation
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    /// Address the control API listens on
    pub http_bind_addr: SocketAddr,

    /// Locale a fresh studio starts with
    pub default_locale: Locale,

    /// Capacity of the engine's command channel
    pub command_buffer: usize,

    /// Analysis backend settings
    pub gateway: GatewayConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            http_bind_addr: SocketAddr::from(([127, 0, 0, 1], 8053)),
            default_locale: Locale::default(),
            command_buffer: 64,
            gateway: GatewayConfig::default(),
        }
    }
}

impl StudioConfig {
    /// Create a StudioConfig from defaults overridden by environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the optional TOML file, then environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path).map_err(|e| {
                ConfigError::ParseError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            config.apply_toml_str(&content)?;
        }

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply partial overrides from TOML text. Keys that are absent keep
    /// their current values.
    ///
    /// ```toml
    /// http_bind_addr = "0.0.0.0:8053"
    /// locale = "ru"
    ///
    /// [gateway]
    /// model = "gemini-2.5-flash"
    /// timeout_secs = 30
    /// ```
    pub fn apply_toml_str(&mut self, content: &str) -> Result<(), ConfigError> {
        let value: toml::Value = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Invalid TOML: {}", e)))?;
        self.apply_toml(&value)
    }

    pub fn apply_toml(&mut self, value: &toml::Value) -> Result<(), ConfigError> {
        if let Some(addr) = value.get("http_bind_addr") {
            let addr = toml_str(addr, "http_bind_addr")?;
            self.http_bind_addr = addr
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddress(addr.to_string()))?;
        }

        if let Some(locale) = value.get("locale") {
            self.default_locale = toml_str(locale, "locale")?.parse()?;
        }

        if let Some(buffer) = value.get("command_buffer") {
            // Out-of-range values saturate and are rejected by validate()
            self.command_buffer =
                usize::try_from(toml_int(buffer, "command_buffer")?).unwrap_or(usize::MAX);
        }

        if let Some(gateway) = value.get("gateway") {
            if let Some(api_key) = gateway.get("api_key") {
                let api_key = toml_str(api_key, "gateway.api_key")?;
                self.gateway.api_key = (!api_key.is_empty()).then(|| api_key.to_string());
            }
            if let Some(base_url) = gateway.get("base_url") {
                self.gateway.base_url = toml_str(base_url, "gateway.base_url")?.to_string();
            }
            if let Some(model) = gateway.get("model") {
                self.gateway.model = toml_str(model, "gateway.model")?.to_string();
            }
            if let Some(timeout) = gateway.get("timeout_secs") {
                self.gateway.request_timeout =
                    Duration::from_secs(toml_int(timeout, "gateway.timeout_secs")? as u64);
            }
            if let Some(temperature) = gateway.get("validation_temperature") {
                self.gateway.validation_temperature = match temperature {
                    toml::Value::Float(f) => *f as f32,
                    toml::Value::Integer(i) => *i as f32,
                    _ => {
                        return Err(ConfigError::InvalidTemperature(temperature.to_string()));
                    }
                };
            }
        }

        debug!("Applied TOML configuration overrides");
        Ok(())
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(bind_addr) = std::env::var("BINDLAB_HTTP_BIND_ADDR") {
            self.http_bind_addr = bind_addr
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddress(bind_addr))?;
        }

        if let Ok(locale) = std::env::var("BINDLAB_LOCALE") {
            self.default_locale = locale.parse()?;
        }

        if let Ok(buffer) = std::env::var("BINDLAB_COMMAND_BUFFER") {
            self.command_buffer = buffer.parse::<usize>().map_err(|_| {
                ConfigError::ParseError(format!("Invalid command buffer: {}", buffer))
            })?;
        }

        // First match wins
        for key in ["BINDLAB_API_KEY", "GEMINI_API_KEY", "API_KEY"] {
            if let Ok(api_key) = std::env::var(key) {
                if !api_key.is_empty() {
                    self.gateway.api_key = Some(api_key);
                    break;
                }
            }
        }

        if let Ok(base_url) = std::env::var("BINDLAB_GATEWAY_URL") {
            self.gateway.base_url = base_url;
        }

        if let Ok(model) = std::env::var("BINDLAB_MODEL") {
            self.gateway.model = model;
        }

        if let Ok(timeout_str) = std::env::var("BINDLAB_GATEWAY_TIMEOUT") {
            let timeout_secs = timeout_str
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(timeout_str.clone()))?;
            self.gateway.request_timeout = Duration::from_secs(timeout_secs);
        }

        if let Ok(temperature) = std::env::var("BINDLAB_VALIDATION_TEMPERATURE") {
            self.gateway.validation_temperature = temperature
                .parse::<f32>()
                .map_err(|_| ConfigError::InvalidTemperature(temperature))?;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if self.gateway.request_timeout.as_secs() > 600 {
            return Err(ConfigError::InvalidTimeout(
                "Timeout too large (max 600 seconds)".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.gateway.validation_temperature) {
            return Err(ConfigError::InvalidTemperature(format!(
                "{} (expected 0.0 to 2.0)",
                self.gateway.validation_temperature
            )));
        }

        if self.gateway.model.trim().is_empty() {
            return Err(ConfigError::ParseError("Model must not be empty".to_string()));
        }

        if !self.gateway.base_url.starts_with("http://")
            && !self.gateway.base_url.starts_with("https://")
        {
            return Err(ConfigError::ParseError(format!(
                "Gateway URL must be http(s): {}",
                self.gateway.base_url
            )));
        }

        if self.command_buffer == 0 {
            return Err(ConfigError::ParseError(
                "Command buffer must be greater than 0".to_string(),
            ));
        }

        if self.command_buffer > MAX_COMMAND_BUFFER {
            return Err(ConfigError::ParseError(format!(
                "Command buffer too large (max {} commands)",
                MAX_COMMAND_BUFFER
            )));
        }

        Ok(())
    }
}

fn toml_str<'a>(value: &'a toml::Value, key: &str) -> Result<&'a str, ConfigError> {
    value
        .as_str()
        .ok_or_else(|| ConfigError::ParseError(format!("{} must be a string", key)))
}

fn toml_int(value: &toml::Value, key: &str) -> Result<i64, ConfigError> {
    value
        .as_integer()
        .filter(|i| *i >= 0)
        .ok_or_else(|| ConfigError::ParseError(format!("{} must be a non-negative integer", key)))
}
