//! Heading-delimited sections of a note.

use crate::models::{Resource, Section};

/// A heading as seen by the parser: level, label and the byte offset where
/// its line starts.
#[derive(Debug, Clone)]
pub(crate) struct HeadingMark {
    pub level: u8,
    pub label: String,
    pub start: usize,
}

/// Turn headings into sections.
///
/// A section runs from its heading to the next heading whose level is less
/// than or equal to its own, or to the end of the content.
pub(crate) fn build_sections(headings: &[HeadingMark], content_len: usize) -> Vec<Section> {
    headings
        .iter()
        .enumerate()
        .map(|(i, heading)| {
            let end = headings[i + 1..]
                .iter()
                .find(|next| next.level <= heading.level)
                .map(|next| next.start)
                .unwrap_or(content_len);

            Section {
                level: heading.level,
                label: heading.label.clone(),
                range: heading.start..end,
            }
        })
        .collect()
}

/// Extract the text of one section of a resource.
///
/// Matching is exact and case-sensitive on the trimmed heading label; the
/// first heading with that label wins. Returns `None` when no heading matches.
pub fn extract_section<'r>(resource: &'r Resource, label: &str) -> Option<&'r str> {
    let section = resource.section(label)?;
    resource.content.get(section.range.clone())
}
