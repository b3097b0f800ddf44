//! Integration tests for markdown processing

use super::*;
use crate::models::Resource;
use crate::parser::parse_resource;

const NOTE_E: &str = "# Section 1\nThis is the first section of note E\n\n# Section 2 \nThis is the second section of note E\n\n# Section 3\nThis is the third section of note E\n";

fn workspace_of(notes: &[(&str, &str)]) -> Workspace {
    let mut workspace = Workspace::new();
    for (path, content) in notes {
        workspace.set(parse_resource(Uri::file(path), content));
    }
    workspace.refresh_placeholders();
    workspace
}

fn flat() -> PreviewConfig {
    PreviewConfig {
        embed_note_in_container: false,
    }
}

fn container() -> PreviewConfig {
    PreviewConfig {
        embed_note_in_container: true,
    }
}

#[test]
fn test_found_link() {
    let workspace = workspace_of(&[("/path/to/note-a.md", "# My note title\n")]);
    let html = MarkdownPipeline::new().render("[[note-a]]", &workspace, &container());
    assert_eq!(
        html,
        "<p><a class='foam-note-link' title='My note title' href='/path/to/note-a.md' data-href='/path/to/note-a.md'>note-a</a></p>\n"
    );
}

#[test]
fn test_placeholder_link() {
    let workspace = workspace_of(&[("/note-a.md", "[[random-text]]")]);
    assert!(workspace.find("random-text").unwrap().is_placeholder());

    let html = MarkdownPipeline::new().render("[[random-text]]", &workspace, &container());
    assert_eq!(
        html,
        "<p><a class='foam-placeholder-link' title=\"Link to non-existing resource\" href=\"javascript:void(0);\">random-text</a></p>\n"
    );
}

#[test]
fn test_link_with_alias_and_section() {
    let workspace = workspace_of(&[("/note-e.md", NOTE_E)]);
    let html = MarkdownPipeline::new().render(
        "Read [[note-e#Section 2|the second part]].",
        &workspace,
        &container(),
    );
    assert_eq!(
        html,
        "<p>Read <a class='foam-note-link' title='Section 1' href='/note-e.md#section-2' data-href='/note-e.md#section-2'>the second part</a>.</p>\n"
    );
}

#[test]
fn test_reference_definition_does_not_hijack_link() {
    let workspace = workspace_of(&[("/path/to/note-a.md", "# My note title\n")]);
    let pipeline = MarkdownPipeline::new();
    let plain = pipeline.render("[[note-a]]", &workspace, &container());

    for definition in [
        "[note-a]: <note-a.md> \"My note title\"",
        "[Note-A]: note-a.md",
    ] {
        let markdown = format!("[[note-a]]\n\n{definition}\n");
        assert_eq!(pipeline.render(&markdown, &workspace, &container()), plain);
    }
}

#[test]
fn test_definition_directly_after_link_stays_paragraph_text() {
    let workspace = workspace_of(&[("/path/to/note-a.md", "# My note title\n")]);
    let html = MarkdownPipeline::new().render(
        "[[note-a]]\n[note-a]: <note-a.md> \"Note A\"",
        &workspace,
        &container(),
    );
    assert_eq!(
        html,
        "<p><a class='foam-note-link' title='My note title' href='/path/to/note-a.md' data-href='/path/to/note-a.md'>note-a</a>\n[note-a]: &lt;note-a.md&gt; \"Note A\"</p>\n"
    );
}

#[test]
fn test_wikilink_in_code_keeps_definition() {
    let html = MarkdownPipeline::new().render(
        "Use [docs] here.\n\n```\n[[docs]]\n```\n\n[docs]: https://example.com\n",
        &Workspace::new(),
        &container(),
    );
    assert!(html.contains("<p>Use <a href=\"https://example.com\">docs</a> here.</p>"));
    assert!(html.contains("[[docs]]"));
}

#[test]
fn test_unresolved_embed_literal_is_not_tagged() {
    let html = MarkdownPipeline::new().render(
        "x ![[#Intro]] and ![[ghost #x]] #real",
        &Workspace::new(),
        &container(),
    );
    assert_eq!(
        html,
        "<p>x ![[#Intro]] and ![[ghost #x]] <span class='foam-tag'>#real</span></p>\n"
    );
}

#[test]
fn test_unrelated_definition_still_works() {
    let workspace = workspace_of(&[("/path/to/note-a.md", "# My note title\n")]);
    let html = MarkdownPipeline::new().render(
        "[[note-a]] and [docs]\n\n[docs]: https://example.com\n",
        &workspace,
        &container(),
    );
    assert!(html.contains("foam-note-link"));
    assert!(html.contains("<a href=\"https://example.com\">docs</a>"));
}

#[test]
fn test_tags() {
    let workspace = Workspace::new();
    let html = MarkdownPipeline::new().render("Lorem #ipsum dolor", &workspace, &container());
    insta::assert_snapshot!(html.trim_end(), @"<p>Lorem <span class='foam-tag'>#ipsum</span> dolor</p>");
}

#[test]
fn test_tags_next_to_links() {
    let workspace = workspace_of(&[("/note-a.md", "# A")]);
    let html = MarkdownPipeline::new().render("[[note-a]] #todo", &workspace, &container());
    assert!(html.contains("</a> <span class='foam-tag'>#todo</span>"));
}

#[test]
fn test_flat_embed() {
    let workspace = workspace_of(&[("/path/to/note-a.md", "This is the text of note A")]);
    let html = MarkdownPipeline::new().render(
        "This is the root node.\n\n![[note-a]]",
        &workspace,
        &flat(),
    );
    assert_eq!(
        html,
        "<p>This is the root node.</p>\n<p><p>This is the text of note A</p>\n</p>\n"
    );
}

#[test]
fn test_container_embed() {
    let workspace = workspace_of(&[("/path/to/note-a.md", "This is the text of note A")]);
    let html = MarkdownPipeline::new().render(
        "This is the root node.\n\n![[note-a]]",
        &workspace,
        &container(),
    );
    assert_eq!(
        html,
        "<p>This is the root node.</p>\n<p><div class=\"embed-container-note\"><p>This is the text of note A</p>\n</div></p>\n"
    );
}

#[test]
fn test_section_embed() {
    let workspace = workspace_of(&[("/note-e.md", NOTE_E)]);
    let html = MarkdownPipeline::new().render(
        "This is the root node.\n\n![[note-e#Section 2]]",
        &workspace,
        &flat(),
    );
    assert_eq!(
        html,
        "<p>This is the root node.</p>\n<p><h1>Section 2</h1>\n<p>This is the second section of note E</p>\n</p>\n"
    );
}

#[test]
fn test_quoted_section_embed_keeps_blockquote() {
    let workspace = workspace_of(&[("/q.md", "intro\n\n> # Quoted\n> body\n")]);
    let html = MarkdownPipeline::new().render("![[q#Quoted]]", &workspace, &flat());
    assert!(html.starts_with("<p><blockquote>\n<h1>Quoted</h1>\n<p>body</p>\n</blockquote>"));
}

#[test]
fn test_unresolved_embeds_stay_literal() {
    let workspace = workspace_of(&[("/note-e.md", NOTE_E), ("/host.md", "![[ghost]]")]);
    let pipeline = MarkdownPipeline::new();

    // Placeholder target
    assert_eq!(
        pipeline.render("![[ghost]]", &workspace, &container()),
        "<p>![[ghost]]</p>\n"
    );
    // Never mentioned anywhere
    assert_eq!(
        pipeline.render("![[does-not-exist]]", &workspace, &container()),
        "<p>![[does-not-exist]]</p>\n"
    );
    // Missing section
    assert_eq!(
        pipeline.render("![[note-e#Section 9]]", &workspace, &container()),
        "<p>![[note-e#Section 9]]</p>\n"
    );
}

#[test]
fn test_cycle_between_two_notes() {
    let note_a = "# Note A\nThis is the text of note A which includes ![[note-b]]";
    let note_b = "# Note B\nThis is the text of note B which includes ![[note-a]]";
    let workspace = workspace_of(&[("/note-a.md", note_a), ("/note-b.md", note_b)]);

    let html = MarkdownPipeline::new().render(note_b, &workspace, &flat());
    assert_eq!(
        html,
        "<h1>Note B</h1>\n<p>This is the text of note B which includes <h1>Note A</h1>\n<p>This is the text of note A which includes <h1>Note B</h1>\n<p>This is the text of note B which includes <div class=\"foam-cyclic-link-warning\">Cyclic link detected for wikilink: note-a</div></p>\n</p>\n</p>\n"
    );
}

#[test]
fn test_cycle_from_resource_render() {
    let note_a = "# Note A\nThis is the text of note A which includes ![[note-b]]";
    let note_b = "# Note B\nThis is the text of note B which includes ![[note-a]]";
    let workspace = workspace_of(&[("/note-a.md", note_a), ("/note-b.md", note_b)]);

    let html = MarkdownPipeline::new()
        .render_resource(&Uri::file("/note-b.md"), &workspace, &flat())
        .unwrap();
    assert_eq!(
        html,
        "<h1>Note B</h1>\n<p>This is the text of note B which includes <h1>Note A</h1>\n<p>This is the text of note A which includes <div class=\"foam-cyclic-link-warning\">Cyclic link detected for wikilink: note-b</div></p>\n</p>\n"
    );
}

#[test]
fn test_self_embed() {
    let workspace = workspace_of(&[("/self.md", "Self: ![[self]]")]);
    let pipeline = MarkdownPipeline::new();

    let html = pipeline
        .render_resource(&Uri::file("/self.md"), &workspace, &flat())
        .unwrap();
    assert_eq!(
        html,
        "<p>Self: <div class=\"foam-cyclic-link-warning\">Cyclic link detected for wikilink: self</div></p>\n"
    );

    // As a host document the note expands once before the warning
    let html = pipeline.render("Self: ![[self]]", &workspace, &flat());
    assert_eq!(html.matches("Self: ").count(), 2);
    assert_eq!(html.matches("foam-cyclic-link-warning").count(), 1);
}

#[test]
fn test_three_note_cycle() {
    let workspace = workspace_of(&[
        ("/a.md", "A ![[b]]"),
        ("/b.md", "B ![[c]]"),
        ("/c.md", "C ![[a]]"),
    ]);
    let html = MarkdownPipeline::new()
        .render_resource(&Uri::file("/a.md"), &workspace, &container())
        .unwrap();

    assert_eq!(html.matches("foam-cyclic-link-warning").count(), 1);
    assert!(html.contains("Cyclic link detected for wikilink: a</div>"));
    assert_eq!(html.matches("embed-container-note").count(), 2);
}

#[test]
fn test_embedding_same_note_twice_is_not_a_cycle() {
    let workspace = workspace_of(&[("/leaf.md", "leaf")]);
    let html = MarkdownPipeline::new().render("![[leaf]] ![[leaf]]", &workspace, &flat());
    assert_eq!(html.matches("<p>leaf</p>").count(), 2);
    assert!(!html.contains("foam-cyclic-link-warning"));
}

#[test]
fn test_embedded_links_resolve_from_embedded_note() {
    let workspace = workspace_of(&[
        ("/docs/x.md", "See [[./y]]"),
        ("/docs/y.md", "# Docs Y"),
        ("/y.md", "# Root Y"),
    ]);
    let html = MarkdownPipeline::new().render("![[x]]", &workspace, &flat());
    assert!(html.contains("title='Docs Y' href='/docs/y.md'"));
}

#[test]
fn test_embedded_section_is_fully_rendered() {
    let workspace = workspace_of(&[
        ("/topic.md", "# Intro\nskip\n# Body\nLinks [[other]] and #idea\n"),
        ("/other.md", "# Other"),
    ]);
    let html = MarkdownPipeline::new().render("![[topic#Body]]", &workspace, &container());
    assert!(html.contains("<h1>Body</h1>"));
    assert!(!html.contains("skip"));
    assert!(html.contains("title='Other' href='/other.md'"));
    assert!(html.contains("<span class='foam-tag'>#idea</span>"));
}

#[test]
fn test_image_embed_in_document() {
    let mut workspace = Workspace::new();
    workspace.set(Resource::file(Uri::file("/img/cat.jpg")));
    let html = MarkdownPipeline::new().render("![[cat.jpg]]", &workspace, &container());
    assert_eq!(
        html,
        "<p><div class=\"embed-container-image\"><img src='/img/cat.jpg' alt='cat.jpg'></div></p>\n"
    );
}

#[test]
fn test_render_resource_unknown_or_binary() {
    let mut workspace = workspace_of(&[("/n.md", "text")]);
    workspace.set(Resource::file(Uri::file("/img/cat.jpg")));
    let pipeline = MarkdownPipeline::new();

    assert!(pipeline
        .render_resource(&Uri::file("/missing.md"), &workspace, &flat())
        .is_none());
    assert!(pipeline
        .render_resource(&Uri::file("/img/cat.jpg"), &workspace, &flat())
        .is_none());
    assert_eq!(
        pipeline
            .render_resource(&Uri::file("/n.md"), &workspace, &flat())
            .as_deref(),
        Some("<p>text</p>\n")
    );
}

#[test]
fn test_concurrent_renders_share_workspace() {
    let note_a = "# Note A\nThis is the text of note A which includes ![[note-b]]";
    let note_b = "# Note B\nThis is the text of note B which includes ![[note-a]]";
    let workspace = workspace_of(&[("/note-a.md", note_a), ("/note-b.md", note_b)]);
    let pipeline = MarkdownPipeline::new();
    let expected = pipeline.render(note_b, &workspace, &flat());

    let (pipeline, workspace) = (&pipeline, &workspace);
    let results: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || pipeline.render(note_b, workspace, &flat())))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|html| html == &expected));
}

struct Footer;

impl Stage for Footer {
    fn name(&self) -> &'static str {
        "footer"
    }

    fn phase(&self) -> Phase {
        Phase::Output
    }

    fn rewrite_output(&self, html: String, ctx: &mut RenderContext<'_>) -> String {
        // Only the top-level document gets a footer
        if ctx.stack.is_empty() {
            format!("{html}<footer/>")
        } else {
            html
        }
    }
}

#[test]
fn test_custom_output_stage() {
    let workspace = workspace_of(&[("/leaf.md", "leaf")]);
    let pipeline = MarkdownPipeline::builder().with_stage(Footer).build();
    let html = pipeline.render("![[leaf]]", &workspace, &flat());
    assert_eq!(html, "<p><p>leaf</p>\n</p>\n<footer/>");
}
