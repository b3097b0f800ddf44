//! Tag transformation for `#tag` tokens.

use super::wikilinks::{tokenize, Segment};
use super::{html_escape, rewrite_text, text_event, Phase, RenderContext, Stage};
use pulldown_cmark::{CowStr, Event};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"#[\w-]+").unwrap())
}

/// Find `#tag` tokens in plain text.
///
/// A tag is `#` followed by word characters or hyphens, and must not be
/// preceded by a word character (so `a#b` and URL fragments glued to a word
/// are left alone). Yields the byte range of the whole token and the tag name
/// without the `#`.
pub fn find_tags(text: &str) -> impl Iterator<Item = (Range<usize>, &str)> + '_ {
    tag_regex().find_iter(text).filter_map(move |m| {
        let preceded_by_word = text[..m.start()]
            .chars()
            .next_back()
            .map(|c| c.is_alphanumeric() || c == '_')
            .unwrap_or(false);
        if preceded_by_word {
            None
        } else {
            Some((m.range(), &text[m.start() + 1..m.end()]))
        }
    })
}

/// Wraps tags in `<span class='foam-tag'>`
pub struct TagStage;

impl TagStage {
    pub fn new() -> Self {
        Self
    }

    /// Wrap tags in plain runs; wiki references left as literal text by
    /// earlier stages pass through unchanged.
    fn wrap_text(text: &str, out: &mut Vec<Event<'static>>) {
        if !text.contains("[[") {
            Self::wrap_tags(text, out);
            return;
        }
        for segment in tokenize(text) {
            match segment {
                Segment::Text(plain) => Self::wrap_tags(plain, out),
                Segment::Reference { raw, .. } => out.push(text_event(raw)),
            }
        }
    }

    fn wrap_tags(text: &str, out: &mut Vec<Event<'static>>) {
        let mut last = 0;
        for (range, tag) in find_tags(text) {
            if range.start > last {
                out.push(text_event(&text[last..range.start]));
            }
            let html = format!("<span class='foam-tag'>#{}</span>", html_escape(tag));
            out.push(Event::InlineHtml(CowStr::from(html)));
            last = range.end;
        }
        if last < text.len() {
            out.push(text_event(&text[last..]));
        }
    }
}

impl Default for TagStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for TagStage {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn phase(&self) -> Phase {
        Phase::Inline
    }

    fn priority(&self) -> i32 {
        30
    }

    fn rewrite_events(
        &self,
        events: Vec<Event<'static>>,
        _ctx: &mut RenderContext<'_>,
    ) -> Vec<Event<'static>> {
        rewrite_text(events, |text, out| Self::wrap_text(text, out))
    }
}
