//! Tabular artifacts exchanged between stages

pub mod tables;

pub use tables::{
    read_json, read_rows, read_rym_features, write_dataset, write_json, write_rows,
    write_rym_features, HeaderCheck, DATASET_FILE, FEATURE_NAMES_FILE,
};
