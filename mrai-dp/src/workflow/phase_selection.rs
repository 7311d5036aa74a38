//! SELECT-RYM and SELECT-SPOTIFY: per-source feature encoding

use mrai_common::columns::{
    processed_search_cols, processed_track_cols, selected_track_cols, RYM_COLS,
};
use mrai_common::Result;

use super::{PipelineOrchestrator, Stage, StageSummary};
use crate::features::{AudioFeatureNormalizer, TrackSetReshaper};
use crate::io::{read_rows, write_rows, write_rym_features, HeaderCheck};
use crate::models::{
    AlbumRecord, ProcessedSearchRow, ProcessedTrackRow, RymProcessedRow, SelectedTrackRow,
};
use crate::selection::{select_rym_features, select_spotify_features};

impl PipelineOrchestrator {
    pub(super) fn phase_select_rym(&self) -> Result<StageSummary> {
        let processed: Vec<RymProcessedRow> = read_rows(
            &self.paths.processed_rym(),
            "processed chart table",
            HeaderCheck::Exact(&RYM_COLS),
        )?;
        let search_cols = processed_search_cols();
        let searches: Vec<ProcessedSearchRow> = read_rows(
            &self.paths.processed_search(),
            "processed search table",
            HeaderCheck::Exact(&search_cols),
        )?;

        let records: Vec<AlbumRecord> = processed.into_iter().map(AlbumRecord::from).collect();
        let table = select_rym_features(&records, &searches, self.genre_mapper.as_ref());
        write_rym_features(&self.paths.rym_features(), &table)?;

        Ok(StageSummary::new(
            Stage::SelectRym,
            records.len(),
            table.rows.len(),
        ))
    }

    pub(super) fn phase_select_spotify(&self) -> Result<StageSummary> {
        let track_cols = processed_track_cols();
        let tracks: Vec<ProcessedTrackRow> = read_rows(
            &self.paths.processed_tracks(),
            "processed track table",
            HeaderCheck::Exact(&track_cols),
        )?;

        let reshaper = TrackSetReshaper::from_config(&self.config.thresholds, &self.config.features);
        let vectors = select_spotify_features(&tracks, &AudioFeatureNormalizer::new(), &reshaper);
        let padded = vectors.iter().filter(|v| v.padded).count();
        tracing::debug!(padded, "Padding rows added");

        let rows: Vec<SelectedTrackRow> = vectors.iter().map(SelectedTrackRow::from).collect();
        write_rows(&self.paths.spotify_features(), &selected_track_cols(), &rows)?;

        Ok(StageSummary::new(Stage::SelectSpotify, tracks.len(), rows.len()))
    }
}
