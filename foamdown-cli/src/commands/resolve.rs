//! Resolve an identifier the way a wikilink would.

use crate::loader::load_workspace;
use anyhow::{Context, Result};
use foamdown_core::Resource;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Resolution<'a> {
    identifier: &'a str,
    uri: String,
    kind: &'static str,
    title: &'a str,
    /// Other resources matching the identifier, best first
    alternatives: Vec<String>,
}

pub fn resolve_identifier(
    config_path: Option<&Path>,
    identifier: &str,
    json: bool,
) -> Result<()> {
    let (_config, workspace) = load_workspace(config_path)?;

    let matches: Vec<&Resource> = workspace.list_by_identifier(identifier);
    let best = matches
        .first()
        .copied()
        .with_context(|| format!("'{}' does not resolve to any resource", identifier))?;

    if json {
        let payload = Resolution {
            identifier,
            uri: best.uri.to_string(),
            kind: best.kind.as_str(),
            title: &best.title,
            alternatives: matches[1..].iter().map(|r| r.uri.to_string()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", best.uri);
        for other in &matches[1..] {
            tracing::info!("Also matches {}", other.uri);
        }
    }

    Ok(())
}
