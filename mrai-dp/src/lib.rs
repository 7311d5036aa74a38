//! mrai-dp - album rating dataset builder
//!
//! Turns a chart scrape (artist, album, date, rating, genres) and per-track
//! catalog audio descriptors into fixed-width per-album feature vectors with
//! a discretized rating target.
//!
//! **Layers:**
//! - [`matching`]: name canonicalization and fuzzy album identity resolution
//! - [`features`]: rating classes, descriptor cleaning, track reshaping,
//!   genre mapping
//! - [`preprocessing`] / [`selection`] / [`assembly`]: per-stage transforms
//! - [`io`]: header-validated CSV and JSON tables
//! - [`workflow`]: stage orchestration over a data directory

pub mod assembly;
pub mod features;
pub mod io;
pub mod matching;
pub mod models;
pub mod preprocessing;
pub mod selection;
pub mod workflow;

pub use workflow::{DataPaths, PipelineOrchestrator, Stage, StageSummary};

/// Build identification captured by `build.rs`
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
}

pub const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    git_hash: env!("GIT_HASH"),
    build_timestamp: env!("BUILD_TIMESTAMP"),
    build_profile: env!("BUILD_PROFILE"),
};
