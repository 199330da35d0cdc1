//! Raw TCP request/response transport.
//!
//! Several backend services speak a plain line protocol instead of the
//! standard RPC transport: newline-delimited UTF-8 JSON frames over a
//! persistent TCP connection, with replies correlated to requests by id.
//! This module hides that protocol behind a single async call.
//!
//! # Data Flow
//! ```text
//! send(payload)
//!     → frame.rs (wrap in {id, payload}, encode one line)
//!     → client.rs (queue to the connection task, register pending waiter)
//!     → socket write (whole frames, single writer)
//!
//! socket read
//!     → frame.rs (accumulate bytes, split complete lines)
//!     → client.rs (match reply id against pending set, resolve waiter)
//! ```
//!
//! # Design Decisions
//! - One supervisor task per backend owns the socket; callers never touch it
//! - Replies are matched by correlation id only; no ordering is assumed
//! - A dropped connection fails every outstanding request immediately
//! - Reconnection uses capped exponential backoff with jitter

pub mod backoff;
pub mod client;
pub mod error;
pub mod frame;

pub use client::{ConnectionState, TcpClient};
pub use error::TransportError;
pub use frame::{FrameDecoder, RequestFrame, ResponseFrame, WireError};
