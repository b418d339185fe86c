//! HTTP front for the Rendora SSR gateway — spec.md §4.5.
//!
//! Exposed as a library too (rather than only a `main.rs`) so integration
//! tests can build a `Router` directly with `axum::Router::oneshot`, the
//! same shape `riptide-api`'s own test suite uses.

pub mod dto;
pub mod errors;
pub mod passthrough;
pub mod routes;
pub mod state;
