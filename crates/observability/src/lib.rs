//! Process-wide tracing/logging setup.
//!
//! The binary picks a [`LogFormat`] from its configuration and calls
//! [`init_with`] once at startup.

pub mod tracing;

pub use tracing::{LogFormat, init_with};
