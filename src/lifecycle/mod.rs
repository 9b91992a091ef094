//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Per request (shutdown.rs):
//!     routed response emitted → Terminate (exit process | end request)
//!
//! Long-running host (signals.rs → shutdown.rs):
//!     Ctrl-C → Shutdown::trigger → server stops accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Termination is a capability passed in by the host, never hard-wired
//! - Shutdown is a broadcast so every task can observe it

pub mod shutdown;
pub mod signals;

pub use shutdown::{EndRequest, ExitProcess, Shutdown, Terminate};
