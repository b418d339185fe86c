//! Layered configuration for the Rendora gateway.
//!
//! Loading is handled by the `config` crate: a base file (`config.toml`,
//! `config.yaml` or `config.json`, searched in the current directory and
//! then `/etc/rendora/`), an optional explicit `--config <path>` override,
//! then `RENDORA_`-prefixed environment variables with `__` as the nesting
//! separator (e.g. `RENDORA_HEADLESS__TIMEOUT=20`). Defaults mirror the
//! original project's `viper.SetDefault` table.

mod cache;
mod filters;
mod headless;
mod listen;
mod server;
mod target;

pub use cache::{CacheBackendKind, CacheConfig, RedisConfig};
pub use filters::FilterConfig;
pub use headless::{HeadlessConfig, HeadlessMode, PoolConfig};
pub use listen::ListenConfig;
pub use server::{AuthConfig, ServerConfig};
pub use target::TargetConfig;

use rendora_types::RendoraError;
use serde::{Deserialize, Serialize};

/// Root configuration object, deserialized in one shot by the `config` crate
/// and then checked with [`RendoraConfig::validate`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RendoraConfig {
    pub debug: bool,
    pub listen: ListenConfig,
    pub target: TargetConfig,
    pub backend: BackendConfig,
    pub headless: HeadlessConfig,
    pub cache: CacheConfig,
    pub output: OutputConfig,
    pub filters: FilterConfig,
    pub server: ServerConfig,
}

impl Default for RendoraConfig {
    fn default() -> Self {
        Self {
            debug: false,
            listen: ListenConfig {
                address: "0.0.0.0".to_string(),
                port: 3001,
            },
            target: TargetConfig::default(),
            backend: BackendConfig::default(),
            headless: HeadlessConfig::default(),
            cache: CacheConfig::default(),
            output: OutputConfig::default(),
            filters: FilterConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Either a reverse-proxy origin or a static file root; exactly one should
/// be set (spec.md §4.5's `ProxyPassThrough` / `StaticPassThrough` choice).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub static_root: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub minify: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { minify: false }
    }
}

impl RendoraConfig {
    /// Loads configuration from (in ascending priority): `config.{toml,yaml,json}`
    /// in the current directory, the same under `/etc/rendora/`, an explicit
    /// `--config` path if given, then `RENDORA_`-prefixed environment
    /// variables. Built-in defaults are supplied first so every field is
    /// always present even with no files or overrides at all.
    pub fn load(explicit_path: Option<&str>) -> Result<Self, RendoraError> {
        let defaults = RendoraConfig::default();
        let defaults_json = serde_json::to_value(&defaults)
            .map_err(|e| RendoraError::ConfigError(format!("encoding defaults: {e}")))?;

        let mut builder = config::Config::builder().add_source(
            config::File::from_str(&defaults_json.to_string(), config::FileFormat::Json),
        );

        builder = builder
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name("/etc/rendora/config").required(false));

        if let Some(path) = explicit_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("RENDORA")
                .separator("__")
                .try_parsing(true),
        );

        let raw = builder
            .build()
            .map_err(|e| RendoraError::ConfigError(e.to_string()))?;

        let cfg: RendoraConfig = raw
            .try_deserialize()
            .map_err(|e| RendoraError::ConfigError(e.to_string()))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Range and presence checks mirroring the original's `govalidator`
    /// struct tags (`valid:"range(5|30)"` and friends).
    pub fn validate(&self) -> Result<(), RendoraError> {
        if self.listen.port == 0 {
            return Err(RendoraError::ConfigError(
                "listen.port must be in 1..=65535".into(),
            ));
        }
        self.target.validate()?;
        self.headless.validate()?;
        self.cache.validate()?;
        if self.server.enable {
            self.server.validate()?;
        }
        if self.backend.url.is_none() && self.backend.static_root.is_none() {
            return Err(RendoraError::ConfigError(
                "one of backend.url or backend.static_root is required".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_serde() {
        let cfg = RendoraConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: RendoraConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.listen.port, back.listen.port);
        assert_eq!(cfg.headless.timeout_secs, back.headless.timeout_secs);
    }

    #[test]
    fn defaults_fail_validation_without_a_backend() {
        let cfg = RendoraConfig::default();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn valid_config_with_static_root_passes() {
        let mut cfg = RendoraConfig::default();
        cfg.target.url = "http://origin.example".to_string();
        cfg.backend.static_root = Some("/var/www".to_string());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn defaults_fail_validation_without_a_target_url() {
        let mut cfg = RendoraConfig::default();
        cfg.backend.static_root = Some("/var/www".to_string());
        assert!(cfg.validate().is_err());
    }
}
