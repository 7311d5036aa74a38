//! Scraped genre tags → controlled genre vocabulary
//!
//! The mapping table is read-only and injected at construction. Lookup keys
//! are trimmed and lower-cased. A tag with no entry maps to
//! [`UNKNOWN_GENRE`], which is dropped whenever a concrete genre is also
//! present (checked after every stage and after the union of all tags).
//!
//! Optional alias tables run before (`pre`) and after (`post`) the general
//! table, for compound names such as `"post-punk revival"` that should be
//! split or specialized.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Sentinel for tags without a mapping
pub const UNKNOWN_GENRE: &str = "unknown";

/// Raw (lower-case) tag → canonical genres
pub type GenreTable = HashMap<String, BTreeSet<String>>;

#[derive(Debug, Error)]
pub enum GenreMapError {
    #[error("Failed to read genre table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse genre table {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<GenreMapError> for mrai_common::Error {
    fn from(err: GenreMapError) -> Self {
        mrai_common::Error::Config(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenreMapper {
    mapping: GenreTable,
    pre_aliases: Option<GenreTable>,
    post_aliases: Option<GenreTable>,
}

impl GenreMapper {
    pub fn from_mapping(mapping: GenreTable) -> Self {
        Self {
            mapping: normalize_keys(mapping),
            pre_aliases: None,
            post_aliases: None,
        }
    }

    /// Load the general table from a JSON object of `tag -> [genre, ...]`
    pub fn from_json_file(path: &Path) -> Result<Self, GenreMapError> {
        Ok(Self::from_mapping(read_genre_table(path)?))
    }

    pub fn with_pre_aliases(mut self, aliases: GenreTable) -> Self {
        self.pre_aliases = Some(normalize_keys(aliases));
        self
    }

    pub fn with_post_aliases(mut self, aliases: GenreTable) -> Self {
        self.post_aliases = Some(normalize_keys(aliases));
        self
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Canonical genres of one raw tag
    pub fn map_single(&self, tag: &str) -> BTreeSet<String> {
        let key = normalize_key(tag);

        let mut genres = match &self.pre_aliases {
            Some(pre) => pre
                .get(&key)
                .cloned()
                .unwrap_or_else(|| BTreeSet::from([key.clone()])),
            None => BTreeSet::from([key.clone()]),
        };
        collapse_unknown(&mut genres);

        genres = lookup_all(&self.mapping, &genres);
        collapse_unknown(&mut genres);

        if let Some(post) = &self.post_aliases {
            genres = lookup_all(post, &genres);
            collapse_unknown(&mut genres);
        }

        if genres.contains(UNKNOWN_GENRE) {
            debug!(tag = %key, "Unmapped genre tag");
        }
        genres
    }

    /// Union of the canonical genres of every tag
    ///
    /// An empty input yields an empty set.
    pub fn map_many<S: AsRef<str>>(&self, tags: &[S]) -> BTreeSet<String> {
        let mut genres: BTreeSet<String> = tags
            .iter()
            .flat_map(|tag| self.map_single(tag.as_ref()))
            .collect();
        collapse_unknown(&mut genres);
        genres
    }
}

fn normalize_key(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Keys differing only in case or padding merge into one entry
fn normalize_keys(table: GenreTable) -> GenreTable {
    let mut normalized = GenreTable::with_capacity(table.len());
    for (tag, genres) in table {
        normalized
            .entry(normalize_key(&tag))
            .or_default()
            .extend(genres);
    }
    normalized
}

/// Read a JSON object of `tag -> [genre, ...]`
pub fn read_genre_table(path: &Path) -> Result<GenreTable, GenreMapError> {
    let content = std::fs::read_to_string(path).map_err(|source| GenreMapError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| GenreMapError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn lookup_all(table: &GenreTable, genres: &BTreeSet<String>) -> BTreeSet<String> {
    genres
        .iter()
        .flat_map(|genre| match table.get(genre) {
            Some(mapped) => mapped.iter().cloned().collect::<Vec<_>>(),
            None => vec![UNKNOWN_GENRE.to_string()],
        })
        .collect()
}

/// Drop the sentinel when anything else is present
fn collapse_unknown(genres: &mut BTreeSet<String>) {
    if genres.len() > 1 {
        genres.remove(UNKNOWN_GENRE);
    }
}
