//! Transclusion of `![[target]]` and `![[target#Section]]` embeds.

use super::wikilinks::{render_link, tokenize, Segment};
use super::{html_escape, rewrite_text, text_event, EmbedMode, Phase, RenderContext, Stage};
use crate::models::{ResourceKind, WikiReference};
use crate::sections::extract_section;
use pulldown_cmark::{CowStr, Event};

/// Render one embed reference.
///
/// `raw` is the exact source text of the embed; it is emitted unchanged when
/// the target or the requested section cannot be found. A target already on
/// the inclusion stack yields a cycle warning instead of recursing.
pub fn render_embed(
    reference: &WikiReference,
    raw: &str,
    ctx: &mut RenderContext<'_>,
) -> Event<'static> {
    let workspace = ctx.workspace;
    let resolution = workspace
        .find_from(&reference.target, ctx.base.as_ref())
        .filter(|r| !r.is_placeholder());

    let Some(resource) = resolution else {
        tracing::debug!("Embed ![[{}]] not found", reference.identifier());
        return text_event(raw);
    };

    match resource.kind {
        ResourceKind::Image => {
            return inline_html(format!(
                "<div class=\"embed-container-image\"><img src='{}' alt='{}'></div>",
                html_escape(&resource.uri.path),
                html_escape(&resource.title)
            ));
        }
        ResourceKind::Attachment => {
            return inline_html(format!(
                "<div class=\"embed-container-attachment\">{}<br/>Embed for attachments is not supported</div>",
                render_link(reference, Some(resource))
            ));
        }
        ResourceKind::Note | ResourceKind::Placeholder => {}
    }

    if ctx.stack.contains(&resource.uri) {
        tracing::warn!(
            "Cyclic embed of {} via ![[{}]] (chain: {})",
            resource.uri,
            reference.identifier(),
            ctx.stack.describe()
        );
        return inline_html(format!(
            "<div class=\"foam-cyclic-link-warning\">Cyclic link detected for wikilink: {}</div>",
            html_escape(&reference.identifier())
        ));
    }

    let content = match &reference.section {
        Some(label) => match extract_section(resource, label) {
            Some(text) => text,
            None => {
                tracing::debug!("Section '{}' not found in {}", label, resource.uri);
                return text_event(raw);
            }
        },
        None => resource.content.as_str(),
    };

    tracing::debug!("Embedding {} (depth {})", resource.uri, ctx.stack.len() + 1);
    ctx.stack.push(resource.uri.clone());
    let previous_base = ctx.base.replace(resource.uri.clone());
    let pipeline = ctx.pipeline;
    let fragment = pipeline.render_fragment(content, ctx);
    ctx.base = previous_base;
    ctx.stack.pop();

    match ctx.embed_mode {
        EmbedMode::Flat => inline_html(fragment),
        EmbedMode::Container => inline_html(format!(
            "<div class=\"embed-container-note\">{fragment}</div>"
        )),
    }
}

fn inline_html(html: String) -> Event<'static> {
    Event::InlineHtml(CowStr::from(html))
}

/// Expands embeds by rendering the target through the same pipeline
pub struct EmbedStage;

impl EmbedStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmbedStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for EmbedStage {
    fn name(&self) -> &'static str {
        "embeds"
    }

    fn phase(&self) -> Phase {
        Phase::Inline
    }

    fn priority(&self) -> i32 {
        10
    }

    fn rewrite_events(
        &self,
        events: Vec<Event<'static>>,
        ctx: &mut RenderContext<'_>,
    ) -> Vec<Event<'static>> {
        rewrite_text(events, |text, out| {
            if !text.contains("![[") {
                out.push(text_event(text));
                return;
            }

            for segment in tokenize(text) {
                match segment {
                    Segment::Reference { raw, reference, .. } if reference.is_embed => {
                        out.push(render_embed(&reference, raw, ctx));
                    }
                    Segment::Reference { raw, .. } | Segment::Text(raw) => {
                        out.push(text_event(raw));
                    }
                }
            }
        })
    }
}
