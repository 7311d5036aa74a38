//! Dataset build orchestrator
//!
//! # Stages
//! PROCESS-RYM → RESOLVE → PROCESS-SPOTIFY → SELECT-RYM → SELECT-SPOTIFY → FINALIZE
//!
//! Each stage reads the tables written by earlier stages from the data
//! directory ([`DataPaths`]) and writes its own; nothing is shared in
//! memory between stages. Each stage is handled by a `phase_*` method:
//!
//! - **PROCESS-RYM**: clean the chart scrape
//! - **RESOLVE**: match chart albums against cached catalog searches
//! - **PROCESS-SPOTIFY**: clean track features, identities and matches
//! - **SELECT-RYM** / **SELECT-SPOTIFY**: encode per-source features
//! - **FINALIZE**: assemble every configured layout
//!
//! RESOLVE needs search responses fetched out of band, so [`Stage::RUN_ORDER`]
//! skips it.

use std::fmt;

use tracing::info;

use mrai_common::config::TomlConfig;
use mrai_common::Result;

use crate::features::{read_genre_table, GenreMapper};

mod paths;
mod phase_finalize;
mod phase_resolve;
mod phase_rym;
mod phase_selection;
mod phase_spotify;

pub use paths::DataPaths;

/// One pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ProcessRym,
    Resolve,
    ProcessSpotify,
    SelectRym,
    SelectSpotify,
    Finalize,
}

impl Stage {
    /// Stages run by a full offline build
    pub const RUN_ORDER: [Stage; 5] = [
        Stage::ProcessRym,
        Stage::ProcessSpotify,
        Stage::SelectRym,
        Stage::SelectSpotify,
        Stage::Finalize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::ProcessRym => "process-rym",
            Stage::Resolve => "resolve",
            Stage::ProcessSpotify => "process-spotify",
            Stage::SelectRym => "select-rym",
            Stage::SelectSpotify => "select-spotify",
            Stage::Finalize => "finalize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row counts of one completed stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: Stage,
    pub rows_in: usize,
    pub rows_out: usize,
}

impl StageSummary {
    pub fn new(stage: Stage, rows_in: usize, rows_out: usize) -> Self {
        Self {
            stage,
            rows_in,
            rows_out,
        }
    }
}

impl fmt::Display for StageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} rows in, {} rows out", self.stage, self.rows_in, self.rows_out)
    }
}

/// Runs pipeline stages against one data directory
pub struct PipelineOrchestrator {
    config: TomlConfig,
    paths: DataPaths,
    genre_mapper: Option<GenreMapper>,
}

impl PipelineOrchestrator {
    /// Build from a validated configuration; loads the genre table if one is
    /// configured
    pub fn new(config: TomlConfig) -> Result<Self> {
        let paths = DataPaths::new(&config.data_dir);
        let genre_mapper = match &config.genre_map {
            Some(path) => {
                let path = paths.resolve(path);
                let mut mapper = GenreMapper::from_json_file(&path)?;
                info!(path = %path.display(), entries = mapper.len(), "Loaded genre table");

                if let Some(pre) = &config.genre_pre_aliases {
                    let pre = paths.resolve(pre);
                    let table = read_genre_table(&pre)?;
                    info!(path = %pre.display(), entries = table.len(), "Loaded pre-alias table");
                    mapper = mapper.with_pre_aliases(table);
                }
                if let Some(post) = &config.genre_post_aliases {
                    let post = paths.resolve(post);
                    let table = read_genre_table(&post)?;
                    info!(path = %post.display(), entries = table.len(), "Loaded post-alias table");
                    mapper = mapper.with_post_aliases(table);
                }
                Some(mapper)
            }
            None => None,
        };

        Ok(Self {
            config,
            paths,
            genre_mapper,
        })
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn config(&self) -> &TomlConfig {
        &self.config
    }

    /// Run a single stage
    pub fn run_stage(&self, stage: Stage) -> Result<StageSummary> {
        info!(stage = %stage, data_dir = %self.paths.root().display(), "Stage starting");
        let summary = match stage {
            Stage::ProcessRym => self.phase_process_rym()?,
            Stage::Resolve => self.phase_resolve()?,
            Stage::ProcessSpotify => self.phase_process_spotify()?,
            Stage::SelectRym => self.phase_select_rym()?,
            Stage::SelectSpotify => self.phase_select_spotify()?,
            Stage::Finalize => self.phase_finalize()?,
        };
        info!(
            stage = %stage,
            rows_in = summary.rows_in,
            rows_out = summary.rows_out,
            "Stage complete"
        );
        Ok(summary)
    }

    /// Run every stage of [`Stage::RUN_ORDER`], stopping at the first failure
    pub fn run_all(&self) -> Result<Vec<StageSummary>> {
        Stage::RUN_ORDER
            .iter()
            .map(|stage| self.run_stage(*stage))
            .collect()
    }
}
