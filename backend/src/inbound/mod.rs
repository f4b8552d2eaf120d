//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! Callables and dispatcher triggers both arrive over HTTP and live under
//! [`http`].

pub mod http;
