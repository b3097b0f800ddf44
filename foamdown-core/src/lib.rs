//! # foamdown-core
//!
//! Wikilink resolution and transclusion for a workspace of markdown notes.
//!
//! This crate provides the resource index, the identifier resolver, section
//! extraction and a pulldown-cmark rendering pipeline that turns `[[links]]`,
//! `![[embeds]]` and `#tags` into class-annotated HTML.

pub mod config;
pub mod frontmatter;
pub mod indexer;
pub mod markdown;
pub mod models;
pub mod parser;
pub mod sections;
pub mod slug;
pub mod vfs;
pub mod workspace;

pub use config::{Config, PreviewConfig, WorkspaceConfig};
pub use indexer::{IndexStats, Indexer};
pub use markdown::{EmbedMode, MarkdownPipeline, Phase, RenderContext, Stage};
pub use models::{Resource, ResourceKind, Scheme, Section, Uri, WikiReference};
pub use parser::parse_resource;
pub use sections::extract_section;
pub use slug::slugify;
pub use vfs::{FileSystem, MemoryFileSystem, PhysicalFileSystem};
pub use workspace::Workspace;
