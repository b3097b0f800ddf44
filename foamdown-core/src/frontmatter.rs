//! Frontmatter parsing from markdown files.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Frontmatter metadata a note may carry
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Frontmatter {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub tags: TagList,
}

/// `tags:` accepts a YAML list or a comma/space separated string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TagList {
    Many(Vec<String>),
    One(String),
}

impl Default for TagList {
    fn default() -> Self {
        TagList::Many(Vec::new())
    }
}

impl TagList {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            TagList::Many(tags) => tags
                .iter()
                .map(|t| t.trim().trim_start_matches('#').to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            TagList::One(raw) => raw
                .split(|c: char| c == ',' || c.is_whitespace())
                .map(|t| t.trim().trim_start_matches('#').to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n(?:---|\.\.\.)[ \t]*(?:\r?\n|\z)").unwrap()
    })
}

/// Parse frontmatter from markdown content
///
/// Returns the frontmatter (if a block is present) and the byte offset where
/// the body starts.
///
/// # Example
///
/// ```
/// use foamdown_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: My Note\ntags: [rust]\n---\n# Hello World\n";
///
/// let (fm, offset) = parse_frontmatter(content).unwrap();
/// let fm = fm.unwrap();
/// assert_eq!(fm.title.as_deref(), Some("My Note"));
/// assert_eq!(fm.tags.to_vec(), vec!["rust"]);
/// assert!(content[offset..].starts_with("# Hello World"));
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Option<Frontmatter>, usize), FrontmatterError> {
    let Some(captures) = frontmatter_regex().captures(content) else {
        return Ok((None, 0));
    };

    let whole = captures.get(0).map(|m| m.end()).unwrap_or(0);
    let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or_default();

    if yaml.trim().is_empty() {
        return Ok((Some(Frontmatter::default()), whole));
    }

    let frontmatter: Frontmatter = serde_yaml::from_str(yaml)?;
    Ok((Some(frontmatter), whole))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_frontmatter() {
        let content = r#"---
title: Test Note
tags:
  - rust
  - programming
---

# Hello World

This is the content."#;

        let (fm, offset) = parse_frontmatter(content).unwrap();
        let fm = fm.unwrap();
        assert_eq!(fm.title.as_deref(), Some("Test Note"));
        assert_eq!(fm.tags.to_vec(), vec!["rust", "programming"]);
        assert!(content[offset..].contains("# Hello World"));
    }

    #[test]
    fn test_parse_string_tags() {
        let content = "---\ntags: \"#alpha, beta gamma\"\n---\nBody";
        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.unwrap().tags.to_vec(), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_parse_no_frontmatter() {
        let content = "# Just Content\n\nNo frontmatter here.";
        let (fm, offset) = parse_frontmatter(content).unwrap();
        assert!(fm.is_none());
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_frontmatter_at_end_of_file() {
        let content = "---\ntitle: Only Meta\n---";
        let (fm, offset) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.unwrap().title.as_deref(), Some("Only Meta"));
        assert_eq!(offset, content.len());
    }

    #[test]
    fn test_missing_title_is_allowed() {
        let content = "---\ntags: [a]\n---\n\nContent.";
        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.unwrap().title, None);
    }

    #[test]
    fn test_invalid_yaml() {
        let content = r#"---
title: Test
invalid yaml: [unclosed
---

Content."#;

        assert!(parse_frontmatter(content).is_err());
    }
}
