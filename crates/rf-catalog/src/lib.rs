//! # rf-catalog
//!
//! The fingerprint-keyed asset catalog.
//!
//! - [`AssetCatalog`] -- scans an asset directory, probes each file, recovers
//!   earlier normalization results from the persisted [`IndexFile`], and
//!   normalizes videos and GIFs concurrently.
//! - [`WorkerPool`] -- the fixed-size thread pool behind batch normalization.
//! - [`fingerprint`] -- size plus modification time, used to detect changed
//!   sources.

pub mod catalog;
pub mod entry;
pub mod fingerprint;
pub mod index;
pub mod pool;

pub use catalog::{AssetCatalog, CatalogLayout, NormalizeReport, NormalizeTarget};
pub use entry::MediaAssetEntry;
pub use fingerprint::fingerprint;
pub use index::IndexFile;
pub use pool::WorkerPool;
