//! Output generation for a finished run.
//!
//! # Submodules
//!
//! - [`json`]: writes the [`AnalysisRun`](crate::models::AnalysisRun) document to disk
//! - [`summary`]: renders the human-readable sample printed to stdout

pub mod json;
pub mod summary;
