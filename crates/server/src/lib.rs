//! HTTP and WebSocket surface for hsorter statistics.

pub mod api;
pub mod metrics;
pub mod recompute;
pub mod state;
