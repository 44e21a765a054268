//! Cluster structure of the LAD voter lattice.
//!
//! Labels same-opinion domains with Hoshen-Kopelman union-find, classifies
//! how far they extend across the torus, and traces the outer hull of the
//! non-spanning ones.
//!
//! # Modules
//!
//! - [`hoshen_kopelman`] -- [`ClusterScratch`] labeling pass and the
//!   largest/second-largest [`ClusterSummary`].
//! - [`percolation`] -- Row/column spanning test.
//! - [`hull`] -- Left-hand-rule boundary walk with area and perimeter.
//! - [`domains`] -- [`DomainCatalog`] of every cluster plus histograms
//!   split by zealot flag.
//! - [`error`] -- [`ClusterError`].

pub mod domains;
pub mod error;
pub mod hoshen_kopelman;
pub mod hull;
pub mod percolation;

pub use domains::{DomainCatalog, DomainHistograms, HistogramRow};
pub use error::ClusterError;
pub use hoshen_kopelman::{ClusterRef, ClusterScratch, ClusterSummary, Connectivity};
pub use hull::{Heading, HullGeometry, HullWalker, area_delta, next_heading};
pub use percolation::percolation_class;
