//! Stage-level cleaning of the scraped and fetched tables

pub mod rym_processor;
pub mod spotify_processor;

pub use rym_processor::{parse_rating_count, process_rym, RymStats};
pub use spotify_processor::{SpotifyOutput, SpotifyProcessor};
