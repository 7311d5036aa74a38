//! Text canonicalization for artist and album names
//!
//! Names arrive from two independent sources (the rating chart and the
//! catalog search API) with different punctuation, transliteration and
//! edition annotations. Both sides are reduced to a canonical form that is
//! compared for equality or containment.
//!
//! # Steps (in order)
//! 1. Albums: remove parenthesized / bracketed annotations
//!    (`"(Remastered)"`, `"[Deluxe]"`), innermost groups first; a name
//!    that is nothing but annotations is kept whole
//! 2. Extract bracketed alternate names (`[` or `〈`) per `" / "` segment
//! 3. Transliterate to ASCII
//! 4. Lower-case
//! 5. Strip whitespace and punctuation; artists also drop the words
//!    `the` / `and`, albums drop the substrings `the` / `and`
//!
//! The canonical form of a canonical form is itself.

use any_ascii::any_ascii;
use once_cell::sync::Lazy;
use regex::Regex;

/// Innermost parenthesized group
static PAREN_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^()]*\)").expect("valid paren regex"));

/// Innermost square-bracketed group
static BRACKET_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\[\]]*\]").expect("valid bracket regex"));

/// Alternate name written inside `[...]` or `〈...〉`
static ALTERNATE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\[〈](.+)[〉\]]").expect("valid alternate-name regex"));

/// Leading articles / conjunctions in artist names, as whole words
static ARTIST_STOPWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:the|and)\s+").expect("valid stopword regex"));

/// Substrings dropped from album names once whitespace is gone
const ALBUM_STOPWORDS: [&str; 2] = ["the", "and"];

/// Punctuation removed from both roles
const PUNCTUATION: [char; 21] = [
    '&', ',', '-', '+', '~', ';', '"', '\'', '>', '<', '`', '!', '(', ')', '[', ']', '{', '}',
    '.', ':', '?',
];

/// Which kind of name is being canonicalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRole {
    Artist,
    Album,
}

/// Reduce a free-text name to its canonical comparison form
pub fn canonicalize(name: &str, role: NameRole) -> String {
    let stripped = match role {
        NameRole::Album => match strip_annotations(name) {
            bare if bare.is_empty() => name.trim().to_string(),
            bare => bare,
        },
        NameRole::Artist => name.trim().to_string(),
    };
    let alternates = extract_alternate_names(&stripped);
    let lowered = any_ascii(&alternates).to_lowercase();

    match role {
        NameRole::Artist => strip_artist_noise(&lowered),
        NameRole::Album => strip_album_noise(&lowered),
    }
}

/// Canonical forms of `a` and `b` are identical
pub fn names_equal(a: &str, b: &str, role: NameRole) -> bool {
    canonicalize(a, role) == canonicalize(b, role)
}

/// One canonical form is a substring of the other
///
/// Symmetric. An empty canonical form never contains or is contained, so
/// names made only of punctuation or stopwords cannot match everything.
pub fn names_contain(a: &str, b: &str, role: NameRole) -> bool {
    canonical_contains(&canonicalize(a, role), &canonicalize(b, role))
}

/// Containment test on forms that are already canonical
pub fn canonical_contains(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}

/// Remove `(...)` and `[...]` groups, repeating until nested groups are gone
fn strip_annotations(name: &str) -> String {
    let mut current = name.to_string();
    loop {
        let without_parens = PAREN_GROUP.replace_all(&current, "");
        let next = BRACKET_GROUP.replace_all(&without_parens, "").into_owned();
        if next == current {
            return next.trim().to_string();
        }
        current = next;
    }
}

/// Replace each `" / "` segment holding a bracketed alternate by that alternate
///
/// `"[name 1] / 〈name_2〉 / name3"` → `"name 1 / name_2 / name3"`,
/// `"some name [name 1]"` → `"name 1"`.
fn extract_alternate_names(name: &str) -> String {
    let has_bracket = |s: &str| s.contains(|c: char| c == '[' || c == '〈');
    if !has_bracket(name) {
        return name.to_string();
    }

    name.split(" / ")
        .map(|segment| {
            if has_bracket(segment) {
                ALTERNATE_NAME
                    .captures(segment)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().trim())
                    .unwrap_or_else(|| segment.trim())
            } else {
                segment.trim()
            }
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

fn strip_artist_noise(lowered: &str) -> String {
    let without_words = ARTIST_STOPWORDS.replace_all(lowered, "");
    strip_chars(&without_words)
}

fn strip_album_noise(lowered: &str) -> String {
    let mut current = strip_chars(lowered);
    loop {
        let mut next = current.clone();
        for word in ALBUM_STOPWORDS {
            next = next.replace(word, "");
        }
        if next == current {
            return next;
        }
        current = next;
    }
}

fn strip_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !PUNCTUATION.contains(c))
        .collect()
}
