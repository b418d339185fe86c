//! Error taxonomy shared by every Rendora crate.
//!
//! Mirrors spec.md §7: one variant per failure mode the render pipeline can
//! produce, each carrying enough context to log and to pick an HTTP status
//! without the caller re-deriving it.

use thiserror::Error;

/// Result alias used throughout the render pipeline.
pub type Result<T> = std::result::Result<T, RendoraError>;

#[derive(Error, Debug)]
pub enum RendoraError {
    /// Malformed admin request body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Admin auth header mismatch.
    #[error("wrong authentication key")]
    Unauthorized,

    /// Cannot reach the DevTools endpoint, or pool acquisition failed.
    #[error("browser unavailable: {0}")]
    BrowserUnavailable(String),

    /// Render deadline elapsed before serialization completed.
    #[error("render timed out after {0}ms")]
    RenderTimeout(u64),

    /// Unexpected CDP-level failure mid-render; the owning session must be
    /// discarded rather than reused.
    #[error("CDP protocol error: {0}")]
    CdpProtocolError(String),

    /// Soft error: minification failed, caller should fall through to the
    /// unminified content.
    #[error("minify error: {0}")]
    MinifyError(String),

    /// Soft error: cache backend failed. Reads degrade to a miss, writes
    /// are dropped; the response itself is never affected.
    #[error("cache error: {0}")]
    CacheError(String),

    /// Startup-time configuration failure. Fatal.
    #[error("config error: {0}")]
    ConfigError(String),
}

impl RendoraError {
    /// True for the two error kinds the engine treats as "log and
    /// continue" rather than "abort the request".
    pub fn is_soft(&self) -> bool {
        matches!(self, RendoraError::MinifyError(_) | RendoraError::CacheError(_))
    }
}
