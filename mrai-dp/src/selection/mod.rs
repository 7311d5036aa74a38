//! Feature selection: per-source encoding ahead of dataset assembly

pub mod rym_selection;
pub mod spotify_selection;

pub use rym_selection::{decade_class, select_rym_features};
pub use spotify_selection::select_spotify_features;
