//! Wikilink transformation for `[[target]]`, `[[target#Section]]` and
//! `[[target|text]]` syntax.

use super::{html_escape, rewrite_text, text_event, Phase, RenderContext, Stage};
use crate::models::{Resource, WikiReference};
use crate::slug::slugify;
use pulldown_cmark::{CowStr, Event};

/// A piece of scanned text: plain text or one well-formed reference
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    Text(&'a str),
    Reference {
        /// Exact source text, `![[...]]` or `[[...]]`
        raw: &'a str,
        /// Text between the brackets
        inner: &'a str,
        reference: WikiReference,
    },
}

/// Split text into plain runs and wiki references.
///
/// Only well-formed references match: `[[`, a non-blank body without
/// brackets, then `]]`. A `!` right before `[[` makes the reference an embed.
/// Anything else stays in the plain text untouched.
///
/// # Examples
///
/// ```
/// use foamdown_core::markdown::wikilinks::{tokenize, Segment};
///
/// let segments = tokenize("see [[note-a]] and [[]]");
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[2], Segment::Text(" and [[]]"));
/// ```
pub fn tokenize(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut run_start = 0;
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find("[[") {
        let open = cursor + found;
        let body_start = open + 2;

        let close = text[body_start..]
            .find(|c: char| c == '[' || c == ']')
            .map(|idx| body_start + idx)
            .filter(|&idx| text[idx..].starts_with("]]"));

        let Some(close) = close else {
            cursor = open + 1;
            continue;
        };

        let inner = &text[body_start..close];
        if inner.trim().is_empty() {
            cursor = open + 1;
            continue;
        }

        let is_embed = open > run_start && text.as_bytes()[open - 1] == b'!';
        let start = if is_embed { open - 1 } else { open };
        let end = close + 2;

        if start > run_start {
            segments.push(Segment::Text(&text[run_start..start]));
        }
        segments.push(Segment::Reference {
            raw: &text[start..end],
            inner,
            reference: WikiReference::parse(inner, is_embed),
        });

        run_start = end;
        cursor = end;
    }

    if run_start < text.len() {
        segments.push(Segment::Text(&text[run_start..]));
    }

    segments
}

/// Render a reference as an anchor.
///
/// A resolved note, image or attachment becomes a `foam-note-link`; a missing
/// or placeholder target becomes a `foam-placeholder-link`. The visible text is
/// the alias when present, otherwise the identifier as written.
pub fn render_link(reference: &WikiReference, resolution: Option<&Resource>) -> String {
    let label = reference
        .alias
        .clone()
        .unwrap_or_else(|| reference.identifier());

    match resolution {
        Some(resource) if !resource.is_placeholder() => {
            let mut href = resource.uri.path.clone();
            if let Some(section) = &reference.section {
                href.push('#');
                href.push_str(&slugify(section));
            }
            let href = html_escape(&href);
            format!(
                "<a class='foam-note-link' title='{}' href='{}' data-href='{}'>{}</a>",
                html_escape(&resource.title),
                href,
                href,
                html_escape(&label)
            )
        }
        _ => format!(
            "<a class='foam-placeholder-link' title=\"Link to non-existing resource\" href=\"javascript:void(0);\">{}</a>",
            html_escape(&label)
        ),
    }
}

/// Stage resolving `[[...]]` links against the workspace
pub struct WikilinkStage;

impl WikilinkStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WikilinkStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for WikilinkStage {
    fn name(&self) -> &'static str {
        "wikilinks"
    }

    fn phase(&self) -> Phase {
        Phase::Inline
    }

    fn priority(&self) -> i32 {
        20
    }

    fn rewrite_events(
        &self,
        events: Vec<Event<'static>>,
        ctx: &mut RenderContext<'_>,
    ) -> Vec<Event<'static>> {
        rewrite_text(events, |text, out| {
            if !text.contains("[[") {
                out.push(text_event(text));
                return;
            }

            for segment in tokenize(text) {
                match segment {
                    Segment::Reference { reference, .. } if !reference.is_embed => {
                        let resolution = ctx
                            .workspace
                            .find_from(&reference.target, ctx.base.as_ref());
                        tracing::debug!(
                            "Wikilink [[{}]] -> {}",
                            reference.identifier(),
                            resolution
                                .map(|r| r.uri.to_string())
                                .unwrap_or_else(|| "not found".to_string())
                        );
                        out.push(Event::InlineHtml(CowStr::from(render_link(
                            &reference, resolution,
                        ))));
                    }
                    Segment::Reference { raw, .. } | Segment::Text(raw) => {
                        out.push(text_event(raw));
                    }
                }
            }
        })
    }
}
