//! `server.*` configuration — the optional admin listener (spec.md §4.5, §6).

use rendora_types::RendoraError;
use serde::{Deserialize, Serialize};

use crate::ListenConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enable: bool,
    pub name: String,
    pub value: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enable: false,
            name: "X-Auth-Rendora".to_string(),
            value: String::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enable: bool,
    pub auth: AuthConfig,
    pub listen: ListenConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enable: false,
            auth: AuthConfig::default(),
            listen: ListenConfig {
                address: "0.0.0.0".to_string(),
                port: 9242,
            },
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), RendoraError> {
        if self.listen.port == 0 {
            return Err(RendoraError::ConfigError(
                "server.listen.port must be in 1..=65535".into(),
            ));
        }
        if self.auth.enable && self.auth.value.is_empty() {
            return Err(RendoraError::ConfigError(
                "server.auth.enable requires a non-empty server.auth.value".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_enabled_without_value_is_rejected() {
        let mut cfg = ServerConfig::default();
        cfg.auth.enable = true;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn auth_enabled_with_value_passes() {
        let mut cfg = ServerConfig::default();
        cfg.auth.enable = true;
        cfg.auth.value = "secret".to_string();
        assert!(cfg.validate().is_ok());
    }
}
