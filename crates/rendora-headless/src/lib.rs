//! CDP session management for the Rendora headless driver — spec.md §4.3.
//!
//! Owns the websocket connection(s) to a remote headless Chrome instance and
//! the per-render protocol that turns a URI into a [`rendora_types::RenderedPage`].

mod driver;
mod pool;
mod session;
mod uri;

pub use driver::{HeadlessDriver, RECURSION_GUARD_HEADER, RECURSION_GUARD_VALUE};
pub use pool::BrowserPool;
pub use session::BrowserSession;
pub use uri::normalize_uri;
