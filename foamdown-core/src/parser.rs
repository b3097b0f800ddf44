//! Document parser: raw note text into a [`Resource`].

use crate::frontmatter::parse_frontmatter;
use crate::markdown::refdefs::strip_consumed_definitions;
use crate::markdown::tags::find_tags;
use crate::markdown::wikilinks::{tokenize, Segment};
use crate::markdown::MarkdownPipeline;
use crate::models::{Resource, ResourceKind, Uri, WikiReference};
use crate::sections::{build_sections, HeadingMark};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Parse a note's text into a resource with its sections, tags and links.
///
/// Invalid frontmatter is logged and ignored; parsing itself never fails.
pub fn parse_resource(uri: Uri, content: &str) -> Resource {
    let frontmatter = match parse_frontmatter(content) {
        Ok((fm, _)) => fm,
        Err(err) => {
            tracing::warn!("Ignoring frontmatter of {}: {}", uri, err);
            None
        }
    };

    let scan = scan_document(content);
    let headings = scan.headings;
    let mut links = scan.links;
    let mut inline_tags = scan.tags;

    // Shadowing definitions turn `[[x]]` into markdown links; rescan
    // without them so those references are still collected.
    if content.contains("]:") {
        let stripped = strip_consumed_definitions(content);
        if stripped != content {
            let rescan = scan_document(&stripped);
            links = rescan.links;
            inline_tags = rescan.tags;
        }
    }

    let mut tags: Vec<String> = frontmatter
        .as_ref()
        .map(|fm| fm.tags.to_vec())
        .unwrap_or_default();
    tags.append(&mut inline_tags);

    let mut seen = std::collections::HashSet::new();
    tags.retain(|t| seen.insert(t.clone()));

    let title = frontmatter
        .and_then(|fm| fm.title)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            headings
                .iter()
                .find(|h| h.level == 1 && !h.label.is_empty())
                .map(|h| h.label.clone())
        })
        .unwrap_or_else(|| uri.stem().to_string());

    Resource {
        sections: build_sections(&headings, content.len()),
        uri,
        kind: ResourceKind::Note,
        title,
        content: content.to_string(),
        tags,
        links,
    }
}

#[derive(Default)]
struct DocumentScan {
    headings: Vec<HeadingMark>,
    links: Vec<WikiReference>,
    tags: Vec<String>,
}

fn scan_document(content: &str) -> DocumentScan {
    let parser = Parser::new_ext(content, MarkdownPipeline::parser_options());

    let mut scan = DocumentScan::default();
    let mut current_heading: Option<HeadingMark> = None;
    let mut pending_text = String::new();
    let mut in_code_block = false;

    for (event, range) in parser.into_offset_iter() {
        match &event {
            Event::Text(text) => {
                if let Some(heading) = current_heading.as_mut() {
                    heading.label.push_str(text);
                }
                if !in_code_block {
                    pending_text.push_str(text);
                }
                continue;
            }
            Event::Code(code) => {
                if let Some(heading) = current_heading.as_mut() {
                    heading.label.push_str(code);
                }
            }
            _ => {}
        }

        scan_text(&pending_text, &mut scan.links, &mut scan.tags);
        pending_text.clear();

        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current_heading = Some(HeadingMark {
                    level: level as u8,
                    label: String::new(),
                    // Include container markers (`> `, `- `) before the heading
                    start: line_start(content, range.start),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(mut heading) = current_heading.take() {
                    heading.label = heading.label.trim().to_string();
                    scan.headings.push(heading);
                }
            }
            Event::Start(Tag::CodeBlock(_)) | Event::Start(Tag::MetadataBlock(_)) => {
                in_code_block = true
            }
            Event::End(TagEnd::CodeBlock) | Event::End(TagEnd::MetadataBlock(_)) => {
                in_code_block = false
            }
            _ => {}
        }
    }
    scan_text(&pending_text, &mut scan.links, &mut scan.tags);

    scan
}

fn line_start(content: &str, offset: usize) -> usize {
    content[..offset].rfind('\n').map_or(0, |idx| idx + 1)
}

fn scan_text(text: &str, links: &mut Vec<WikiReference>, tags: &mut Vec<String>) {
    if text.is_empty() {
        return;
    }
    for segment in tokenize(text) {
        match segment {
            Segment::Reference { reference, .. } => links.push(reference),
            Segment::Text(plain) => {
                tags.extend(find_tags(plain).map(|(_, tag)| tag.to_string()));
            }
        }
    }
}
