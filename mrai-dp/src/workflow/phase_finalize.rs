//! FINALIZE: assemble one dataset per configured layout

use mrai_common::columns::selected_track_cols;
use mrai_common::Result;

use super::{PipelineOrchestrator, Stage, StageSummary};
use crate::assembly::DatasetAssembler;
use crate::io::{read_rows, read_rym_features, write_dataset, HeaderCheck};
use crate::models::{SelectedTrackRow, TrackFeatureVector};

impl PipelineOrchestrator {
    pub(super) fn phase_finalize(&self) -> Result<StageSummary> {
        let rym = read_rym_features(&self.paths.rym_features())?;
        let track_cols = selected_track_cols();
        let selected: Vec<SelectedTrackRow> = read_rows(
            &self.paths.spotify_features(),
            "selected track table",
            HeaderCheck::Exact(&track_cols),
        )?;
        let tracks: Vec<TrackFeatureVector> =
            selected.into_iter().map(TrackFeatureVector::from).collect();

        let assembler = DatasetAssembler::new(self.config.thresholds.album_track_count);
        let mut rows_out = 0;
        for layout in &self.config.features.layouts {
            let dataset = assembler.assemble(*layout, &rym, &tracks)?;
            let dir = self.paths.final_dir(*layout);
            write_dataset(&dir, &dataset)?;
            tracing::info!(
                layout = layout.dir_name(),
                rows = dataset.rows.len(),
                width = dataset.width(),
                dir = %dir.display(),
                "Wrote final dataset"
            );
            rows_out = rows_out.max(dataset.rows.len());
        }

        Ok(StageSummary::new(Stage::Finalize, rym.rows.len(), rows_out))
    }
}
