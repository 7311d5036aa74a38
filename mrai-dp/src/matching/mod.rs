//! Album identity resolution across the chart and the catalog
//!
//! **Modules:**
//! - `canonicalizer`: name canonicalization, equality and containment
//! - `fuzzy_matcher`: four-predicate candidate scoring and selection
//! - `search_source`: search seam, offline cache, batch resolution

pub mod canonicalizer;
pub mod fuzzy_matcher;
pub mod search_source;

pub use canonicalizer::{canonicalize, names_contain, names_equal, NameRole};
pub use fuzzy_matcher::{FuzzyMatcher, MatchScore, MAX_PRECISION};
pub use search_source::{resolve_identities, AlbumSearch, CachedSearch, JsonSearchCache};
