//! Song model and the tag list codec.

/// Separator used when serializing a tag list into the single text column.
pub const TAG_SEPARATOR: &str = ", ";

/// A catalog entry. Rows are append-only: once recorded a song is never
/// updated or deleted, and its id is never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub filepath: String,
    pub tags: Vec<String>,
}

impl Song {
    pub fn tags_joined(&self) -> String {
        join_tags(&self.tags)
    }
}

/// Filter for catalog queries. All supplied predicates are ANDed:
/// `author` matches by exact equality, each tag by case-sensitive substring
/// containment against the serialized tag string.
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    pub author: Option<String>,
    pub tags: Vec<String>,
}

impl SongFilter {
    pub fn is_empty(&self) -> bool {
        self.author.is_none() && self.tags.is_empty()
    }
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(TAG_SEPARATOR)
}

/// Inverse of [`join_tags`] for lists of trimmed labels. An empty stored
/// string decodes to an empty list.
pub fn split_tags(serialized: &str) -> Vec<String> {
    if serialized.is_empty() {
        return Vec::new();
    }
    serialized
        .split(',')
        .map(|tag| tag.trim().to_string())
        .collect()
}
