//! Process-level helpers
//!
//! Signal handling used by the server's graceful shutdown.

pub mod signals;

pub use signals::shutdown_signal;
