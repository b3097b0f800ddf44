//! Render a single note to HTML.

use crate::loader::load_workspace;
use anyhow::{bail, Context, Result};
use foamdown_core::{MarkdownPipeline, ResourceKind};
use std::path::Path;

/// Render the note an identifier resolves to.
///
/// `container` overrides `preview.embed_note_in_container` when set.
pub fn render_note(
    config_path: Option<&Path>,
    identifier: &str,
    container: Option<bool>,
) -> Result<()> {
    let (mut config, workspace) = load_workspace(config_path)?;
    if let Some(container) = container {
        config.preview.embed_note_in_container = container;
    }

    let resource = workspace
        .find(identifier)
        .filter(|r| !r.is_placeholder())
        .with_context(|| format!("Note '{}' not found", identifier))?;
    if resource.kind != ResourceKind::Note {
        bail!(
            "'{}' resolves to {} ({}), which is not a note",
            identifier,
            resource.uri,
            resource.kind.as_str()
        );
    }

    let pipeline = MarkdownPipeline::new();
    let html = pipeline
        .render_resource(&resource.uri, &workspace, &config.preview)
        .with_context(|| format!("Failed to render {}", resource.uri))?;
    print!("{html}");

    Ok(())
}
