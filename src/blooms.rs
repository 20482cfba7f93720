use std::str::FromStr;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, EnumIter, EnumString, EnumCount, Display, PartialEq, Eq, Hash)]
pub enum BloomLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

/// Rank given to tags outside the taxonomy; sorts after every known level.
pub const UNKNOWN_RANK: usize = BloomLevel::COUNT;

impl BloomLevel {
    pub fn rank(self) -> usize {
        self as usize
    }
}

pub fn rank(tag: &str) -> usize {
    BloomLevel::from_str(tag)
        .map(BloomLevel::rank)
        .unwrap_or(UNKNOWN_RANK)
}

/// Joins `tags` in taxonomy order with `/`. Unknown tags keep their relative
/// order at the end.
pub fn normalize<S: AsRef<str>>(tags: &[S]) -> String {
    let mut sorted: Vec<&str> = tags.iter().map(AsRef::as_ref).collect();
    sorted.sort_by_key(|t| rank(t));
    sorted.join("/")
}

/// Re-normalizes an already joined signature.
pub fn normalize_signature(signature: &str) -> String {
    normalize(&split_signature(signature))
}

pub fn split_signature(signature: &str) -> Vec<&str> {
    if signature.is_empty() {
        return Vec::new();
    }
    signature.split('/').collect()
}

pub fn rank_vector(signature: &str) -> Vec<usize> {
    split_signature(signature).into_iter().map(rank).collect()
}

/// Splits a backend bloom-group key such as `"Remember / Apply"` into tags.
pub fn parse_group_key(key: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for part in key.split('/') {
        let tag = part.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

pub fn canonical_order() -> Vec<String> {
    BloomLevel::iter().map(|b| b.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_ranks() {
        assert_eq!(rank("Remember"), 0);
        assert_eq!(rank("Create"), 5);
        assert_eq!(rank("Unclassified"), UNKNOWN_RANK);
        assert_eq!(rank("apply"), UNKNOWN_RANK);
        assert_eq!(canonical_order().len(), 6);
    }

    #[test]
    fn test_normalize_sorts_by_rank() {
        assert_eq!(normalize(&["Create", "Remember", "Apply"]), "Remember/Apply/Create");
        assert_eq!(normalize(&["Mystery", "Analyze"]), "Analyze/Mystery");
        assert_eq!(normalize::<&str>(&[]), "");
    }

    #[test]
    fn test_parse_group_key() {
        assert_eq!(parse_group_key("Remember / Apply"), vec!["Remember", "Apply"]);
        assert_eq!(parse_group_key("Apply//Apply/ "), vec!["Apply"]);
        assert!(parse_group_key("").is_empty());
    }
}
