//! `filters.*` configuration — deserializes directly into
//! [`rendora_types::FilterPolicy`], spec.md §3/§4.1.

pub use rendora_types::FilterPolicy as FilterConfig;
