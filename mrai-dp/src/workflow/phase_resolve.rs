//! RESOLVE: match processed chart albums against catalog search responses

use mrai_common::columns::{RYM_COLS, SPOTIFY_SEARCH_COLS};
use mrai_common::Result;

use super::{PipelineOrchestrator, Stage, StageSummary};
use crate::io::{read_rows, write_rows, HeaderCheck};
use crate::matching::{resolve_identities, AlbumSearch, FuzzyMatcher, JsonSearchCache};
use crate::models::{AlbumRecord, RymProcessedRow};

impl PipelineOrchestrator {
    /// RESOLVE against the cached search responses in the data directory
    pub(super) fn phase_resolve(&self) -> Result<StageSummary> {
        let cache = JsonSearchCache::from_json_file(&self.paths.search_cache())?;
        tracing::info!(queries = cache.len(), "Loaded search cache");
        self.resolve_with(&cache)
    }

    /// RESOLVE against any search source
    pub fn resolve_with(&self, source: &dyn AlbumSearch) -> Result<StageSummary> {
        let processed: Vec<RymProcessedRow> = read_rows(
            &self.paths.processed_rym(),
            "processed chart table",
            HeaderCheck::Exact(&RYM_COLS),
        )?;
        let records: Vec<AlbumRecord> = processed.into_iter().map(AlbumRecord::from).collect();

        let rows = resolve_identities(&records, source, &FuzzyMatcher::new())?;
        write_rows(&self.paths.raw_search(), &SPOTIFY_SEARCH_COLS, &rows)?;

        Ok(StageSummary::new(Stage::Resolve, records.len(), rows.len()))
    }
}
