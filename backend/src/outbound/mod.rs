//! Outbound adapters implementing domain ports.
//!
//! - **memory**: in-process document store and event ledger
//! - **identity**: static bearer token table
//! - **health_score**: random stand-in plant health scores
//!
//! Adapters translate between domain types and their backing
//! representation. They contain no business logic.

pub mod health_score;
pub mod identity;
pub mod memory;
