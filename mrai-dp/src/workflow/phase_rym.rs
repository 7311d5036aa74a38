//! PROCESS-RYM: clean the raw chart scrape

use mrai_common::columns::RYM_COLS;
use mrai_common::Result;

use super::{PipelineOrchestrator, Stage, StageSummary};
use crate::io::{read_rows, write_rows, HeaderCheck};
use crate::models::{RymProcessedRow, RymRawRow};
use crate::preprocessing::process_rym;

impl PipelineOrchestrator {
    pub(super) fn phase_process_rym(&self) -> Result<StageSummary> {
        let raw: Vec<RymRawRow> = read_rows(
            &self.paths.raw_rym(),
            "raw chart scrape",
            HeaderCheck::Exact(&RYM_COLS),
        )?;

        let (records, stats) = process_rym(raw, self.config.thresholds.min_rating_count);
        let rows: Vec<RymProcessedRow> = records.iter().map(RymProcessedRow::from).collect();
        write_rows(&self.paths.processed_rym(), &RYM_COLS, &rows)?;

        Ok(StageSummary::new(Stage::ProcessRym, stats.input, stats.output))
    }
}
