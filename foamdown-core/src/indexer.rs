//! Workspace indexing: discovers files under a root and feeds the workspace.

use crate::config::Config;
use crate::models::{Resource, ResourceKind, Uri};
use crate::parser::parse_resource;
use crate::vfs::{FileSystem, PhysicalFileSystem};
use crate::workspace::Workspace;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} is outside the workspace root {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Counts from one indexing run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub notes: usize,
    pub images: usize,
    pub attachments: usize,
    pub placeholders: usize,
    pub ignored: usize,
    pub failed: usize,
}

/// Loads every file below a root directory into a [`Workspace`]
pub struct Indexer {
    root: PathBuf,
    ignore_patterns: Vec<Regex>,
    fs: Box<dyn FileSystem>,
}

impl Indexer {
    pub fn new<F: FileSystem + 'static>(root: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            root: root.into(),
            ignore_patterns: Vec::new(),
            fs: Box::new(fs),
        }
    }

    /// Indexer over the physical file system, rooted and filtered per config
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.root_dir(), PhysicalFileSystem)
            .with_ignore_patterns(&config.workspace.ignore_patterns)
    }

    /// Skip files whose root-relative path matches any of these regexes.
    /// Invalid patterns are logged and dropped.
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore_patterns = compile_ignore_patterns(patterns);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Workspace URI for a file below the root
    pub fn uri_for(&self, path: &Path) -> Result<Uri, IndexError> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| IndexError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })?;
        Ok(Uri::file(&relative.to_string_lossy()))
    }

    /// Index every file below the root, then rebuild placeholders
    pub fn index(&self, workspace: &mut Workspace) -> Result<IndexStats, IndexError> {
        let files = self.fs.list_files(&self.root)?;
        tracing::info!("Found {} files under {}", files.len(), self.root.display());

        let mut stats = IndexStats::default();
        for path in &files {
            let uri = self.uri_for(path)?;
            let relative = uri.path.trim_start_matches('/');
            if should_ignore(relative, &self.ignore_patterns) {
                tracing::debug!("Ignoring {} due to ignore_patterns", relative);
                stats.ignored += 1;
                continue;
            }

            match self.index_file(workspace, path) {
                Ok(ResourceKind::Note) => stats.notes += 1,
                Ok(ResourceKind::Image) => stats.images += 1,
                Ok(ResourceKind::Attachment) => stats.attachments += 1,
                Ok(ResourceKind::Placeholder) => {}
                Err(e) => {
                    tracing::error!("Failed to index {:?}: {}", path, e);
                    stats.failed += 1;
                }
            }
        }

        stats.placeholders = workspace.refresh_placeholders();
        tracing::info!(
            "Indexed {} notes, {} images, {} attachments ({} placeholders)",
            stats.notes,
            stats.images,
            stats.attachments,
            stats.placeholders
        );
        Ok(stats)
    }

    /// Read one file and store it in the workspace, returning its kind.
    ///
    /// Placeholders are not refreshed; call
    /// [`Workspace::refresh_placeholders`] after a batch of updates.
    pub fn index_file(
        &self,
        workspace: &mut Workspace,
        path: &Path,
    ) -> Result<ResourceKind, IndexError> {
        let uri = self.uri_for(path)?;
        let resource = match ResourceKind::from_extension(uri.extension().as_deref()) {
            ResourceKind::Note => {
                let content = self.fs.read_to_string(path)?;
                parse_resource(uri, &content)
            }
            _ => Resource::file(uri),
        };

        let kind = resource.kind;
        tracing::debug!("Indexed {} as {}", resource.uri, kind.as_str());
        workspace.set(resource);
        Ok(kind)
    }
}

fn compile_ignore_patterns(patterns: &[String]) -> Vec<Regex> {
    let mut compiled = Vec::new();
    for pat in patterns {
        match Regex::new(pat) {
            Ok(re) => compiled.push(re),
            Err(err) => tracing::warn!("Invalid ignore pattern '{}': {}", pat, err),
        }
    }
    compiled
}

fn should_ignore(path: &str, ignores: &[Regex]) -> bool {
    ignores.iter().any(|re| re.is_match(path))
}
