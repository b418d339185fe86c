//! `FilterPolicy` — spec.md §3 and §4.1.
//!
//! A read-only snapshot loaded once at process start. The decision function
//! that consumes it lives in `rendora-engine::filter` so this crate stays
//! free of behavior, only shape.

use serde::{Deserialize, Serialize};

/// Whether a filter stage renders everyone by default (exceptions opt out)
/// or renders no-one by default (exceptions opt in).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListPolicy {
    Whitelist,
    Blacklist,
}

/// User-Agent stage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserAgentFilter {
    pub default: ListPolicy,
    /// Case-insensitive substrings checked against the lower-cased UA.
    #[serde(default)]
    pub keyword_exceptions: Vec<String>,
    /// Case-sensitive exact UA strings.
    #[serde(default)]
    pub exact_exceptions: Vec<String>,
}

impl Default for UserAgentFilter {
    fn default() -> Self {
        Self {
            default: ListPolicy::Blacklist,
            keyword_exceptions: Vec::new(),
            exact_exceptions: Vec::new(),
        }
    }
}

/// Path stage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathFilter {
    pub default: ListPolicy,
    #[serde(default)]
    pub exact_exceptions: Vec<String>,
    #[serde(default)]
    pub prefix_exceptions: Vec<String>,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self {
            default: ListPolicy::Whitelist,
            exact_exceptions: Vec::new(),
            prefix_exceptions: Vec::new(),
        }
    }
}

/// Full request classifier configuration, read-only after process start.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FilterPolicy {
    pub user_agent: UserAgentFilter,
    pub paths: PathFilter,
}
