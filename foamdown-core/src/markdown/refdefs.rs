//! Removal of link reference definitions shadowed by wikilinks.
//!
//! Editors that mirror wikilinks as `[note-a]: note-a.md "Note A"` definitions
//! make pulldown-cmark turn the inner `[note-a]` of `[[note-a]]` into a plain
//! markdown link. Definitions are resolved while parsing, so they have to be
//! dropped from the source text before the parser runs.

use super::wikilinks::{tokenize, Segment};
use super::{Phase, RenderContext, Stage};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static DEFINITION_REGEX: OnceLock<Regex> = OnceLock::new();

fn definition_regex() -> &'static Regex {
    DEFINITION_REGEX.get_or_init(|| Regex::new(r"^ {0,3}\[([^\[\]]+)\]:[ \t]*\S").unwrap())
}

fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Labels a definition may carry to shadow one of the document's wikilinks.
/// References inside fenced code are not links and consume nothing.
fn consumed_labels(source: &str) -> HashSet<String> {
    let mut prose = String::with_capacity(source.len());
    let mut fences = FenceTracker::default();
    for line in source.split_inclusive('\n') {
        if fences.is_code(line.trim_end_matches(['\n', '\r'])) {
            prose.push('\n');
        } else {
            prose.push_str(line);
        }
    }

    let mut labels = HashSet::new();
    for segment in tokenize(&prose) {
        if let Segment::Reference {
            inner, reference, ..
        } = segment
        {
            labels.insert(normalize_label(inner));
            labels.insert(normalize_label(&reference.target));
            labels.insert(normalize_label(&reference.identifier()));
        }
    }
    labels.retain(|l| !l.is_empty());
    labels
}

fn fence_marker(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = rest.len() - rest.trim_start_matches(marker).len();
    (run >= 3).then(|| &rest[..run])
}

/// Line-by-line tracking of fenced code blocks
#[derive(Default)]
struct FenceTracker {
    open: Option<String>,
}

impl FenceTracker {
    /// Feed the next line (without its terminator); true when it belongs to a
    /// fenced block, fence lines included.
    fn is_code(&mut self, content: &str) -> bool {
        match &self.open {
            Some(fence) => {
                if fence_marker(content).is_some_and(|m| m.starts_with(fence.as_str())) {
                    self.open = None;
                }
                true
            }
            None => match fence_marker(content) {
                Some(marker) => {
                    self.open = Some(marker.to_string());
                    true
                }
                None => false,
            },
        }
    }
}

/// Drop definition lines whose label matches a wikilink in `source`.
///
/// Only lines that start a block count as definitions: the first line, a line
/// after a blank line, or a line after another definition. Fenced code is
/// skipped. Every other line is kept byte for byte.
pub fn strip_consumed_definitions(source: &str) -> String {
    let labels = consumed_labels(source);
    if labels.is_empty() {
        return source.to_string();
    }

    let mut output = String::with_capacity(source.len());
    let mut fences = FenceTracker::default();
    let mut block_start = true;

    for line in source.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);

        if fences.is_code(content) {
            // A closing fence ends its block
            block_start = fences.open.is_none();
            output.push_str(line);
            continue;
        }

        if content.trim().is_empty() {
            block_start = true;
            output.push_str(line);
            continue;
        }

        let definition = if block_start {
            definition_regex().captures(content)
        } else {
            None
        };

        match definition {
            Some(captures) => {
                let label = normalize_label(&captures[1]);
                if labels.contains(&label) {
                    tracing::debug!("Dropping reference definition [{}]", label);
                } else {
                    output.push_str(line);
                }
                // A run of definitions forms one block
                block_start = true;
            }
            None => {
                block_start = false;
                output.push_str(line);
            }
        }
    }

    output
}

/// Source stage wrapping [`strip_consumed_definitions`]
pub struct ReferenceDefinitionStage;

impl ReferenceDefinitionStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReferenceDefinitionStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ReferenceDefinitionStage {
    fn name(&self) -> &'static str {
        "reference-definitions"
    }

    fn phase(&self) -> Phase {
        Phase::Source
    }

    fn rewrite_source(&self, source: String, _ctx: &mut RenderContext<'_>) -> String {
        if !source.contains("]:") {
            return source;
        }
        strip_consumed_definitions(&source)
    }
}
