//! Content model structs for resources, sections and wiki references.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Where a resource lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    File,
    Placeholder,
}

/// Canonical location of a resource.
///
/// File URIs carry a workspace-relative path with a leading slash
/// (`/path/to/note-a.md`). Placeholder URIs carry the raw identifier of a
/// dangling reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Uri {
    pub scheme: Scheme,
    pub path: String,
}

impl Uri {
    pub fn file(path: &str) -> Self {
        let normalized = path.replace('\\', "/");
        let path = if normalized.starts_with('/') {
            normalized
        } else {
            format!("/{normalized}")
        };
        Self {
            scheme: Scheme::File,
            path,
        }
    }

    pub fn placeholder(identifier: &str) -> Self {
        Self {
            scheme: Scheme::Placeholder,
            path: identifier.trim().to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.scheme == Scheme::Placeholder
    }

    /// Last path segment, e.g. `note-a.md`
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File name without its extension, e.g. `note-a`
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }

    /// Lower-cased extension without the dot
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(name[idx + 1..].to_lowercase()),
        }
    }

    /// Directory part of the path, always ending with a slash
    pub fn dir(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..=idx],
            None => "/",
        }
    }

    /// Path used for case-insensitive suffix matching (`/a/b.md`)
    pub(crate) fn match_path(&self) -> String {
        let lower = self.path.to_lowercase();
        if lower.starts_with('/') {
            lower
        } else {
            format!("/{lower}")
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            Scheme::File => write!(f, "{}", self.path),
            Scheme::Placeholder => write!(f, "placeholder:{}", self.path),
        }
    }
}

/// Type of resource content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Note,
    Image,
    Attachment,
    Placeholder,
}

impl ResourceKind {
    /// Classify a file by its extension
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext.map(|e| e.to_lowercase()).as_deref() {
            Some("md") | Some("markdown") => ResourceKind::Note,
            Some("png") | Some("jpg") | Some("jpeg") | Some("gif") | Some("svg")
            | Some("webp") => ResourceKind::Image,
            _ => ResourceKind::Attachment,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Note => "note",
            ResourceKind::Image => "image",
            ResourceKind::Attachment => "attachment",
            ResourceKind::Placeholder => "placeholder",
        }
    }
}

/// A heading-delimited range of a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub level: u8,
    pub label: String,
    /// Byte range within the note content, heading line included
    pub range: Range<usize>,
}

/// An addressable unit of content in the workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub uri: Uri,
    pub kind: ResourceKind,
    pub title: String,
    /// Raw text (empty for placeholders, images and attachments)
    pub content: String,
    pub sections: Vec<Section>,
    pub tags: Vec<String>,
    /// Outgoing wiki references in document order
    pub links: Vec<WikiReference>,
}

impl Resource {
    /// A resource that only exists as the target of a dangling reference
    pub fn placeholder(identifier: &str) -> Self {
        let uri = Uri::placeholder(identifier);
        Self {
            title: uri.path.clone(),
            uri,
            kind: ResourceKind::Placeholder,
            content: String::new(),
            sections: Vec::new(),
            tags: Vec::new(),
            links: Vec::new(),
        }
    }

    /// A binary file that is addressable but never parsed
    pub fn file(uri: Uri) -> Self {
        let kind = ResourceKind::from_extension(uri.extension().as_deref());
        Self {
            title: uri.file_name().to_string(),
            uri,
            kind,
            content: String::new(),
            sections: Vec::new(),
            tags: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == ResourceKind::Placeholder
    }

    /// Find a section by its exact heading label
    pub fn section(&self, label: &str) -> Option<&Section> {
        let label = label.trim();
        self.sections.iter().find(|s| s.label == label)
    }
}

/// A parsed `[[target#section|alias]]` or `![[...]]` occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiReference {
    pub is_embed: bool,
    pub target: String,
    pub section: Option<String>,
    pub alias: Option<String>,
}

impl WikiReference {
    /// Parse the text between the brackets
    ///
    /// # Examples
    ///
    /// ```
    /// use foamdown_core::WikiReference;
    ///
    /// let r = WikiReference::parse("note-e#Section 2|see here", true);
    /// assert_eq!(r.target, "note-e");
    /// assert_eq!(r.section.as_deref(), Some("Section 2"));
    /// assert_eq!(r.alias.as_deref(), Some("see here"));
    /// assert_eq!(r.identifier(), "note-e#Section 2");
    /// ```
    pub fn parse(inner: &str, is_embed: bool) -> Self {
        let (target, alias) = match inner.split_once('|') {
            Some((target, alias)) => (target, Some(alias.trim())),
            None => (inner, None),
        };

        let (target, section) = match target.split_once('#') {
            Some((base, section)) => (base.trim(), Some(section.trim())),
            None => (target.trim(), None),
        };

        Self {
            is_embed,
            target: target.to_string(),
            section: section.filter(|s| !s.is_empty()).map(str::to_string),
            alias: alias.filter(|a| !a.is_empty()).map(str::to_string),
        }
    }

    /// Target plus `#section`, without the alias
    pub fn identifier(&self) -> String {
        match &self.section {
            Some(section) => format!("{}#{}", self.target, section),
            None => self.target.clone(),
        }
    }
}
