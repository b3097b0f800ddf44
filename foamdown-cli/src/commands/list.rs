//! List the resources of the workspace.

use crate::loader::load_workspace;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ResourceEntry<'a> {
    uri: String,
    kind: &'static str,
    title: &'a str,
    tags: &'a [String],
    links: usize,
}

pub fn list_resources(config_path: Option<&Path>, json: bool) -> Result<()> {
    let (_config, workspace) = load_workspace(config_path)?;

    let entries: Vec<ResourceEntry> = workspace
        .resources()
        .map(|r| ResourceEntry {
            uri: r.uri.to_string(),
            kind: r.kind.as_str(),
            title: &r.title,
            tags: &r.tags,
            links: r.links.len(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!("{}\t{}\t{}", entry.uri, entry.kind, entry.title);
    }
    Ok(())
}
