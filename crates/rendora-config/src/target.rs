//! `target.*` configuration — spec.md §6. The origin the headless browser
//! navigates, composed with the request URI before every render. Distinct
//! from `backend.url`, the reverse-proxy destination used for pass-through.

use rendora_types::RendoraError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub url: String,
}

impl TargetConfig {
    pub fn validate(&self) -> Result<(), RendoraError> {
        if self.url.trim().is_empty() {
            return Err(RendoraError::ConfigError("target.url is required".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_url_is_rejected() {
        assert!(TargetConfig::default().validate().is_err());
    }

    #[test]
    fn non_empty_url_passes() {
        let cfg = TargetConfig {
            url: "http://origin.example".to_string(),
        };
        assert!(cfg.validate().is_ok());
    }
}
