//! PROCESS-SPOTIFY: clean catalog track features, identities and matches

use mrai_common::columns::{
    processed_search_cols, processed_track_cols, track_features_cols, SPOTIFY_SEARCH_COLS,
    SPOTIFY_TRACKS_IDS_COLS,
};
use mrai_common::Result;

use super::{PipelineOrchestrator, Stage, StageSummary};
use crate::io::{read_rows, write_rows, HeaderCheck};
use crate::models::{RawTrackFeatures, SearchMatchRow, TrackFeaturesRow, TrackIdentity};
use crate::preprocessing::SpotifyProcessor;

impl PipelineOrchestrator {
    pub(super) fn phase_process_spotify(&self) -> Result<StageSummary> {
        let feature_cols = track_features_cols();
        let raw_rows: Vec<TrackFeaturesRow> = read_rows(
            &self.paths.raw_track_features(),
            "track features",
            HeaderCheck::Present(&feature_cols),
        )?;
        let identities: Vec<TrackIdentity> = read_rows(
            &self.paths.raw_track_ids(),
            "track identities",
            HeaderCheck::Present(&SPOTIFY_TRACKS_IDS_COLS),
        )?;
        let searches: Vec<SearchMatchRow> = read_rows(
            &self.paths.raw_search(),
            "search matches",
            HeaderCheck::Exact(&SPOTIFY_SEARCH_COLS),
        )?;

        let rows_in = raw_rows.len();
        let features: Vec<RawTrackFeatures> =
            raw_rows.into_iter().filter_map(TrackFeaturesRow::into_raw).collect();
        if features.len() < rows_in {
            tracing::debug!(
                incomplete = rows_in - features.len(),
                "Dropped track rows with missing descriptors"
            );
        }

        let output = SpotifyProcessor::new(&self.config.thresholds).process(
            features,
            identities,
            searches,
        );

        write_rows(
            &self.paths.processed_tracks(),
            &processed_track_cols(),
            &output.tracks,
        )?;
        write_rows(
            &self.paths.processed_search(),
            &processed_search_cols(),
            &output.searches,
        )?;

        Ok(StageSummary::new(
            Stage::ProcessSpotify,
            rows_in,
            output.tracks.len(),
        ))
    }
}
