//! Warehouse ETL for resepti.
//!
//! Rebuilds the star-schema warehouse from the transactional source store in
//! two barrier-separated phases: dimensions first, then the facts that
//! reference them. Works against any [`SourceStore`] / [`WarehouseStore`]
//! pair.
//!
//! [`SourceStore`]: resepti_core::store::SourceStore
//! [`WarehouseStore`]: resepti_core::store::WarehouseStore

pub mod config;
pub mod dimensions;
pub mod error;
pub mod facts;
pub mod phase;
pub mod pipeline;

pub use config::EtlConfig;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineConfig};
