//! Markdown rendering pipeline with wikilink, embed and tag extensions.
//!
//! A render pass runs in three phases. Source stages rewrite the raw text,
//! pulldown-cmark parses it into events, inline stages rewrite the event
//! stream, and output stages post-process the serialized HTML. Embeds re-enter
//! the same pipeline for the embedded note, carrying the inclusion stack in the
//! per-call [`RenderContext`].

pub mod embeds;
pub mod refdefs;
pub mod tags;
pub mod wikilinks;

#[cfg(test)]
mod test_integration;

use crate::config::PreviewConfig;
use crate::models::{ResourceKind, Uri};
use crate::workspace::Workspace;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

pub use embeds::EmbedStage;
pub use refdefs::ReferenceDefinitionStage;
pub use tags::TagStage;
pub use wikilinks::WikilinkStage;

/// When a stage runs within a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Raw markdown text, before parsing
    Source,
    /// Parsed event stream
    Inline,
    /// Serialized HTML
    Output,
}

/// A pluggable pipeline stage.
///
/// Each hook defaults to passing its input through unchanged, so a stage only
/// implements the hook matching its [`Phase`].
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn phase(&self) -> Phase;

    /// Lower runs first within a phase
    fn priority(&self) -> i32 {
        0
    }

    fn rewrite_source(&self, source: String, _ctx: &mut RenderContext<'_>) -> String {
        source
    }

    fn rewrite_events(
        &self,
        events: Vec<Event<'static>>,
        _ctx: &mut RenderContext<'_>,
    ) -> Vec<Event<'static>> {
        events
    }

    fn rewrite_output(&self, html: String, _ctx: &mut RenderContext<'_>) -> String {
        html
    }
}

/// How an embedded note is wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedMode {
    /// Fragment is inserted as is, nested in the host paragraph
    Flat,
    /// Fragment is wrapped in `<div class="embed-container-note">`
    #[default]
    Container,
}

impl From<&PreviewConfig> for EmbedMode {
    fn from(preview: &PreviewConfig) -> Self {
        if preview.embed_note_in_container {
            EmbedMode::Container
        } else {
            EmbedMode::Flat
        }
    }
}

/// URIs of the resources currently being embedded, outermost first
#[derive(Debug, Clone, Default)]
pub struct InclusionStack {
    uris: Vec<Uri>,
}

impl InclusionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, uri: &Uri) -> bool {
        self.uris.contains(uri)
    }

    /// Push a URI; returns `false` (and leaves the stack untouched) if it is
    /// already present.
    pub fn push(&mut self, uri: Uri) -> bool {
        if self.contains(&uri) {
            return false;
        }
        self.uris.push(uri);
        true
    }

    pub fn pop(&mut self) -> Option<Uri> {
        self.uris.pop()
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uri> {
        self.uris.iter()
    }

    /// The chain as `a -> b -> c`, for diagnostics
    pub fn describe(&self) -> String {
        self.iter()
            .map(|uri| uri.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// State scoped to one top-level render call
pub struct RenderContext<'a> {
    pub workspace: &'a Workspace,
    pub pipeline: &'a MarkdownPipeline,
    pub embed_mode: EmbedMode,
    pub stack: InclusionStack,
    /// Resource whose text is being rendered, for relative links
    pub base: Option<Uri>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        pipeline: &'a MarkdownPipeline,
        workspace: &'a Workspace,
        embed_mode: EmbedMode,
    ) -> Self {
        Self {
            workspace,
            pipeline,
            embed_mode,
            stack: InclusionStack::new(),
            base: None,
        }
    }
}

/// Ordered, statically composed set of stages
pub struct MarkdownPipeline {
    stages: Vec<Box<dyn Stage>>,
}

/// Builder for a [`MarkdownPipeline`]
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineBuilder {
    /// A builder with no stages at all
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn with_stage<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn build(mut self) -> MarkdownPipeline {
        // Stable sort keeps registration order for equal keys
        self.stages.sort_by_key(|s| (s.phase(), s.priority()));
        MarkdownPipeline {
            stages: self.stages,
        }
    }
}

impl MarkdownPipeline {
    /// Pipeline with the default stages
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Builder preloaded with the default stages
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::empty()
            .with_stage(ReferenceDefinitionStage::new())
            .with_stage(EmbedStage::new())
            .with_stage(WikilinkStage::new())
            .with_stage(TagStage::new())
    }

    /// Parser options shared by rendering and document parsing
    pub fn parser_options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        options
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Render a host document.
    ///
    /// The document itself is not on the inclusion stack, so a note that
    /// embeds itself renders one level deep before the cycle warning.
    pub fn render(
        &self,
        markdown: &str,
        workspace: &Workspace,
        preview: &PreviewConfig,
    ) -> String {
        let mut ctx = RenderContext::new(self, workspace, EmbedMode::from(preview));
        self.render_fragment(markdown, &mut ctx)
    }

    /// Render a note of the workspace by URI.
    ///
    /// Returns `None` when the URI is unknown or does not name a note.
    pub fn render_resource(
        &self,
        uri: &Uri,
        workspace: &Workspace,
        preview: &PreviewConfig,
    ) -> Option<String> {
        let resource = workspace.get(uri)?;
        if resource.kind != ResourceKind::Note {
            return None;
        }

        let mut ctx = RenderContext::new(self, workspace, EmbedMode::from(preview));
        ctx.base = Some(uri.clone());
        ctx.stack.push(uri.clone());
        let html = self.render_fragment(&resource.content, &mut ctx);
        ctx.stack.pop();
        Some(html)
    }

    /// Run every stage over `text` within an existing render call
    pub(crate) fn render_fragment(&self, text: &str, ctx: &mut RenderContext<'_>) -> String {
        let mut source = text.to_string();
        for stage in self.stages_in(Phase::Source) {
            source = stage.rewrite_source(source, ctx);
        }

        let mut events: Vec<Event<'static>> = Parser::new_ext(&source, Self::parser_options())
            .map(Event::into_static)
            .collect();
        for stage in self.stages_in(Phase::Inline) {
            events = stage.rewrite_events(events, ctx);
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        for stage in self.stages_in(Phase::Output) {
            html_output = stage.rewrite_output(html_output, ctx);
        }
        html_output
    }

    fn stages_in(&self, phase: Phase) -> impl Iterator<Item = &dyn Stage> {
        self.stages
            .iter()
            .filter(move |s| s.phase() == phase)
            .map(|s| s.as_ref())
    }
}

impl Default for MarkdownPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite runs of plain text.
///
/// Consecutive text events are merged first, so a `[[link]]` the parser split
/// into several events is seen whole. Text inside code blocks, metadata
/// blocks, links and images is passed through untouched.
pub(crate) fn rewrite_text<F>(events: Vec<Event<'static>>, mut rewrite: F) -> Vec<Event<'static>>
where
    F: FnMut(&str, &mut Vec<Event<'static>>),
{
    let mut out = Vec::with_capacity(events.len());
    let mut pending = String::new();
    let mut opaque_depth = 0usize;

    for event in events {
        if let Event::Text(text) = &event {
            if opaque_depth == 0 {
                pending.push_str(text);
                continue;
            }
        }

        if !pending.is_empty() {
            rewrite(&std::mem::take(&mut pending), &mut out);
        }

        match &event {
            Event::Start(
                Tag::CodeBlock(_) | Tag::MetadataBlock(_) | Tag::Link { .. } | Tag::Image { .. },
            ) => opaque_depth += 1,
            Event::End(
                TagEnd::CodeBlock | TagEnd::MetadataBlock(_) | TagEnd::Link | TagEnd::Image,
            ) => opaque_depth = opaque_depth.saturating_sub(1),
            _ => {}
        }
        out.push(event);
    }

    if !pending.is_empty() {
        rewrite(&pending, &mut out);
    }

    out
}

fn text_event(text: &str) -> Event<'static> {
    Event::Text(CowStr::from(text.to_string()))
}

pub(crate) fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
