use serde::{Deserialize, Serialize};

/// Address/port pair shared by the public and admin listeners.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}
