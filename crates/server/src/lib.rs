//! HTTP request layer for the rota schedule/task service.
//!
//! Exposed as a library so integration tests can drive the router directly.

pub mod api;
pub mod cli;
pub mod router;
pub mod startup;
pub mod state;
