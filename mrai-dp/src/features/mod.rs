//! Feature encoding components
//!
//! Pure value transforms over in-memory batches; no I/O except loading the
//! genre table.

pub mod audio_normalizer;
pub mod genre_mapper;
pub mod rating_discretizer;
pub mod track_reshaper;

pub use audio_normalizer::{AudioFeatureNormalizer, CleaningStats};
pub use genre_mapper::{read_genre_table, GenreMapError, GenreMapper, GenreTable, UNKNOWN_GENRE};
pub use rating_discretizer::{discretize, BREAKPOINTS, CLASS_COUNT};
pub use track_reshaper::TrackSetReshaper;
