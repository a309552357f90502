//! Core types and trait definitions for the resepti warehouse ETL.
//!
//! This crate is deliberately free of database and runtime dependencies.
//! Source and warehouse backends implement the traits in [`store`]; the
//! orchestration crate depends on those traits, never on a backend.

pub mod resolve;
pub mod source;
pub mod status;
pub mod store;
pub mod warehouse;
