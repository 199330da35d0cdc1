//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build registry → Bind listener → Serve
//!
//! Shutdown (shutdown.rs + signals.rs):
//!     SIGINT → broadcast → HTTP server drains, transport supervisors
//!     fail outstanding requests and exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
