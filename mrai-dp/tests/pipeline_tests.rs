//! End-to-end stage tests over a temporary data directory
//!
//! Covers:
//! - Full offline build: chart scrape + cached searches + track tables → final layouts
//! - Custom search sources through the `AlbumSearch` seam
//! - Genre table and alias table resolution relative to the data directory
//! - Schema failures before any transform runs

use std::fs;
use std::path::Path;

use mrai_common::config::{AssemblyLayout, ThresholdsConfig, TomlConfig};
use mrai_common::Error;
use mrai_dp::io::{read_json, read_rym_features, DATASET_FILE, FEATURE_NAMES_FILE};
use mrai_dp::matching::AlbumSearch;
use mrai_dp::models::SearchCandidate;
use mrai_dp::{PipelineOrchestrator, Stage};
use tempfile::TempDir;

const FEATURE_HEADER: &str = "song_id,danceability,energy,key,loudness,mode,speechiness,\
acousticness,instrumentalness,liveness,valence,tempo,duration_ms,time_signature,analysis_url";

fn feature_line(song_id: &str, danceability: f64, speechiness: f64) -> String {
    format!(
        "{},{},0.6,5,-8,1,{},0.2,0,0.1,0.4,120,240000,4,https://example.invalid/{}",
        song_id, danceability, speechiness, song_id
    )
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn seed_raw_tables(root: &Path) {
    write(
        root,
        "raw/rym/rym_charts.csv",
        "artist,album,date,rating,rating_number,genres\n\
         Radiohead,OK Computer,16 June 1997,3.45,\"70,000\",Alternative Rock\n\
         Pink Floyd,The Wall,30 November 1979,3.9,\"41,234\",\"Progressive Rock, Art Rock\"\n\
         Nobody,Nothing,1990,2.0,10,Pop\n\
         Someone,,1990,3.0,100,Rock\n",
    );

    write(
        root,
        "raw/spotify/search_cache.json",
        r#"[
            {"artist": "Pink Floyd", "album": "The Wall",
             "candidates": [
                {"external_id": "wall-live", "artist_names": ["Roger Waters"], "album_name": "The Wall Live"},
                {"external_id": "wall", "artist_names": ["Pink Floyd"], "album_name": "The Wall (Remastered)"}
             ]},
            {"artist": "Radiohead", "album": "OK Computer",
             "candidates": [
                {"external_id": "okc", "artist_names": ["Radiohead"], "album_name": "OK Computer"}
             ]}
        ]"#,
    );

    let features = [
        FEATURE_HEADER.to_string(),
        feature_line("w2", 0.52, 0.05),
        feature_line("w1", 0.51, 0.05),
        feature_line("w3", 0.53, 0.05),
        feature_line("o1", 0.61, 0.05),
        feature_line("o2", 0.62, 0.05),
        // Speechiness above the spoken-word cutoff
        feature_line("o3", 0.63, 0.9),
        feature_line("orphan", 0.7, 0.05),
    ];
    write(root, "raw/spotify/tracks_feature.csv", &(features.join("\n") + "\n"));

    write(
        root,
        "raw/spotify/track_ids.csv",
        "album_id,song_id,song_name,song_number,song_artists_number\n\
         wall,w1,In the Flesh?,1,1\n\
         wall,w2,The Thin Ice,2,1\n\
         wall,w3,Another Brick in the Wall,3,1\n\
         okc,o1,Airbag,1,1\n\
         okc,o2,Paranoid Android,2,1\n\
         okc,o3,Fitter Happier,3,1\n",
    );
}

fn config(root: &Path) -> TomlConfig {
    TomlConfig {
        data_dir: root.to_path_buf(),
        thresholds: ThresholdsConfig {
            min_rating_count: 50,
            min_precision_match: 3,
            min_album_tracks: 2,
            album_track_count: 4,
        },
        ..TomlConfig::default()
    }
}

fn read_final(root: &Path, layout: AssemblyLayout) -> (Vec<String>, Vec<(String, Vec<f64>, u8)>) {
    let dir = root.join("final").join(layout.dir_name());
    let names: Vec<String> = read_json(&dir.join(FEATURE_NAMES_FILE)).unwrap();

    let mut reader = csv::Reader::from_path(dir.join(DATASET_FILE)).unwrap();
    let rows = reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            let features: Vec<f64> = serde_json::from_str(&record[1]).unwrap();
            (record[0].to_string(), features, record[2].parse().unwrap())
        })
        .collect();
    (names, rows)
}

#[test]
fn offline_build_produces_every_layout() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    seed_raw_tables(root);

    let orchestrator = PipelineOrchestrator::new(config(root)).unwrap();
    let rym = orchestrator.run_stage(Stage::ProcessRym).unwrap();
    assert_eq!((rym.rows_in, rym.rows_out), (4, 2));

    let resolve = orchestrator.run_stage(Stage::Resolve).unwrap();
    assert_eq!(resolve.rows_out, 2);

    let summaries = orchestrator.run_all().unwrap();
    let stages: Vec<Stage> = summaries.iter().map(|s| s.stage).collect();
    assert_eq!(stages, Stage::RUN_ORDER.to_vec());

    // Chart features: sorted by release date, raw tags lower-cased
    let chart = read_rym_features(&orchestrator.paths().rym_features()).unwrap();
    assert_eq!(
        chart.columns,
        vec!["decade", "alternative rock", "art rock", "progressive rock"]
    );
    assert_eq!(chart.rows.len(), 2);
    assert_eq!(chart.rows[0].album_id, "wall");
    assert_eq!(chart.rows[0].features, vec![0.3333, 0.0, 1.0, 1.0]);
    assert_eq!(chart.rows[0].target, 5);
    assert_eq!(chart.rows[1].album_id, "okc");
    assert_eq!(chart.rows[1].features, vec![0.5, 1.0, 0.0, 0.0]);
    assert_eq!(chart.rows[1].target, 3);

    // Flatten: 4 tracks per album, repeat padding cycles the real tracks
    let (names, rows) = read_final(root, AssemblyLayout::Flatten);
    assert_eq!(names.len(), 4 * 13 + 4);
    assert_eq!(names[0], "danceability0");
    assert_eq!(names[13], "danceability1");
    assert_eq!(names[52], "decade");
    assert_eq!(rows.len(), 2);
    let (album_id, features, target) = &rows[0];
    assert_eq!(album_id, "wall");
    assert_eq!(*target, 5);
    assert_eq!(features.len(), names.len());
    assert_eq!(features[0], 0.51);
    assert_eq!(features[13], 0.52);
    assert_eq!(features[26], 0.53);
    assert_eq!(features[39], 0.51);
    assert_eq!(&features[52..], &[0.3333, 0.0, 1.0, 1.0]);

    let (_, okc, _) = &rows[1];
    assert_eq!(okc[0], 0.61);
    assert_eq!(okc[13], 0.62);
    assert_eq!(okc[26], 0.61);
    assert_eq!(okc[39], 0.62);

    // Aggregate: mean/min/max/std blocks
    let (names, rows) = read_final(root, AssemblyLayout::Aggregate);
    assert_eq!(names[0], "danceability_mean");
    assert_eq!(rows.len(), 2);
    let okc = &rows[1].1;
    assert!((okc[0] - 0.615).abs() < 1e-9);
    assert_eq!(okc[13], 0.61);
    assert_eq!(okc[26], 0.62);

    // Single: lowest-numbered track only
    let (names, rows) = read_final(root, AssemblyLayout::Single);
    assert_eq!(names.len(), 13 + 4);
    assert_eq!(rows[0].1[0], 0.51);
    assert_eq!(rows[1].1[0], 0.61);
}

#[test]
fn processed_search_carries_track_counts() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    seed_raw_tables(root);

    let orchestrator = PipelineOrchestrator::new(config(root)).unwrap();
    orchestrator.run_stage(Stage::ProcessRym).unwrap();
    orchestrator.run_stage(Stage::Resolve).unwrap();
    orchestrator.run_stage(Stage::ProcessSpotify).unwrap();

    let mut reader = csv::Reader::from_path(orchestrator.paths().processed_search()).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header.last().map(String::as_str), Some("num_features"));

    let mut counts: Vec<(String, String, String)> = reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[2].to_string(), r[6].to_string(), r[7].to_string())
        })
        .collect();
    counts.sort();
    assert_eq!(
        counts,
        vec![
            ("okc".to_string(), "3".to_string(), "2".to_string()),
            ("wall".to_string(), "3".to_string(), "3".to_string()),
        ]
    );
}

struct FixedSearch;

impl AlbumSearch for FixedSearch {
    fn search(&self, artist: &str, album: &str) -> mrai_common::Result<Vec<SearchCandidate>> {
        if artist == "Pink Floyd" {
            Ok(vec![SearchCandidate::new(
                "wall",
                vec![artist.to_string()],
                album,
            )])
        } else {
            Ok(Vec::new())
        }
    }
}

#[test]
fn resolve_accepts_any_search_source() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    seed_raw_tables(root);

    let orchestrator = PipelineOrchestrator::new(config(root)).unwrap();
    orchestrator.run_stage(Stage::ProcessRym).unwrap();
    let summary = orchestrator.resolve_with(&FixedSearch).unwrap();
    assert_eq!(summary.stage, Stage::Resolve);
    assert_eq!(summary.rows_out, 2);

    let mut reader = csv::Reader::from_path(orchestrator.paths().raw_search()).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    // Unmatched albums keep a row with no id and score 0
    let okc = rows.iter().find(|r| &r[1] == "Radiohead").unwrap();
    assert_eq!(&okc[2], "");
    assert_eq!(&okc[5], "0");
    let wall = rows.iter().find(|r| &r[1] == "Pink Floyd").unwrap();
    assert_eq!(&wall[2], "wall");
    assert_eq!(&wall[5], "4");
}

#[test]
fn genre_table_resolves_under_data_dir() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    seed_raw_tables(root);
    write(
        root,
        "genre_map.json",
        r#"{
            "Progressive Rock": ["rock"],
            "art rock": ["rock"],
            "alternative rock": ["alternative", "rock"]
        }"#,
    );

    let mut config = config(root);
    config.genre_map = Some("genre_map.json".into());
    let orchestrator = PipelineOrchestrator::new(config).unwrap();
    orchestrator.run_stage(Stage::ProcessRym).unwrap();
    orchestrator.run_stage(Stage::Resolve).unwrap();
    orchestrator.run_stage(Stage::ProcessSpotify).unwrap();
    orchestrator.run_stage(Stage::SelectRym).unwrap();

    let chart = read_rym_features(&orchestrator.paths().rym_features()).unwrap();
    assert_eq!(chart.columns, vec!["decade", "alternative", "rock"]);
    assert_eq!(chart.rows[0].features, vec![0.3333, 0.0, 1.0]);
    assert_eq!(chart.rows[1].features, vec![0.5, 1.0, 1.0]);
}

#[test]
fn alias_tables_wrap_genre_table() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    seed_raw_tables(root);
    write(
        root,
        "genres/genre_map.json",
        r#"{
            "progressive rock": ["rock"],
            "art rock": ["rock"],
            "alternative rock": ["alternative", "rock"]
        }"#,
    );
    write(
        root,
        "genres/pre_aliases.json",
        r#"{"Alternative Rock": ["alternative rock", "art rock"]}"#,
    );
    write(
        root,
        "genres/post_aliases.json",
        r#"{"rock": ["rock"], "alternative": ["indie"]}"#,
    );

    let mut config = config(root);
    config.genre_map = Some("genres/genre_map.json".into());
    config.genre_pre_aliases = Some("genres/pre_aliases.json".into());
    config.genre_post_aliases = Some("genres/post_aliases.json".into());
    let orchestrator = PipelineOrchestrator::new(config).unwrap();
    orchestrator.run_stage(Stage::ProcessRym).unwrap();
    orchestrator.run_stage(Stage::Resolve).unwrap();
    orchestrator.run_stage(Stage::ProcessSpotify).unwrap();
    orchestrator.run_stage(Stage::SelectRym).unwrap();

    let chart = read_rym_features(&orchestrator.paths().rym_features()).unwrap();
    assert_eq!(chart.columns, vec!["decade", "indie", "rock"]);
    assert_eq!(chart.rows[0].features, vec![0.3333, 0.0, 1.0]);
    assert_eq!(chart.rows[1].features, vec![0.5, 1.0, 1.0]);
}

#[test]
fn missing_genre_table_is_config_error() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path());
    config.genre_map = Some("absent.json".into());

    let result = PipelineOrchestrator::new(config);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn reordered_chart_header_fails_with_schema_error() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "raw/rym/rym_charts.csv",
        "album,artist,date,rating,rating_number,genres\nThe Wall,Pink Floyd,1979,3.9,100,Rock\n",
    );

    let orchestrator = PipelineOrchestrator::new(config(root)).unwrap();
    let result = orchestrator.run_stage(Stage::ProcessRym);
    assert!(matches!(result, Err(Error::Schema(_))));
    assert!(!orchestrator.paths().processed_rym().exists());
}

#[test]
fn track_table_missing_descriptor_column_fails() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    seed_raw_tables(root);
    write(
        root,
        "raw/spotify/tracks_feature.csv",
        "song_id,danceability,energy\nw1,0.5,0.6\n",
    );

    let orchestrator = PipelineOrchestrator::new(config(root)).unwrap();
    orchestrator.run_stage(Stage::ProcessRym).unwrap();
    orchestrator.run_stage(Stage::Resolve).unwrap();
    let result = orchestrator.run_stage(Stage::ProcessSpotify);
    assert!(matches!(result, Err(Error::Schema(_))));
}
