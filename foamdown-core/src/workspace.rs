//! Resource index and identifier resolution.

use crate::models::{Resource, Uri};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Registry of every resource known to a session.
///
/// Resources are keyed by URI. A secondary index maps the lower-cased file
/// stem and file name to the URIs carrying them, so identifier lookups only
/// inspect plausible candidates.
#[derive(Debug, Default)]
pub struct Workspace {
    resources: BTreeMap<Uri, Resource>,
    keys: HashMap<String, BTreeSet<Uri>>,
}

fn lookup_keys(uri: &Uri) -> [String; 2] {
    [uri.stem().to_lowercase(), uri.file_name().to_lowercase()]
}

/// Join a `./` or `../` identifier onto a directory, collapsing dot segments
fn join_relative(dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a resource, returning the previous one for that URI
    pub fn set(&mut self, resource: Resource) -> Option<Resource> {
        let uri = resource.uri.clone();
        for key in lookup_keys(&uri) {
            self.keys.entry(key).or_default().insert(uri.clone());
        }
        self.resources.insert(uri, resource)
    }

    pub fn delete(&mut self, uri: &Uri) -> Option<Resource> {
        let removed = self.resources.remove(uri)?;
        for key in lookup_keys(uri) {
            if let Some(uris) = self.keys.get_mut(&key) {
                uris.remove(uri);
                if uris.is_empty() {
                    self.keys.remove(&key);
                }
            }
        }
        Some(removed)
    }

    pub fn get(&self, uri: &Uri) -> Option<&Resource> {
        self.resources.get(uri)
    }

    /// All resources in URI order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resolve an identifier without a base resource
    pub fn find(&self, identifier: &str) -> Option<&Resource> {
        self.find_from(identifier, None)
    }

    /// Resolve an identifier as written inside `base`.
    ///
    /// A `#section` suffix is ignored. Returns the best candidate of
    /// [`Workspace::list_by_identifier`], or `None` when nothing matches.
    pub fn find_from(&self, identifier: &str, base: Option<&Uri>) -> Option<&Resource> {
        self.candidates(identifier, base).into_iter().next()
    }

    /// Every resource matching an identifier, best match first.
    ///
    /// Matching is case-insensitive and the `.md` extension is optional.
    /// Ordering puts real resources before placeholders, then shorter paths
    /// first, then lexicographic path order.
    ///
    /// # Examples
    ///
    /// ```
    /// use foamdown_core::{parse_resource, Uri, Workspace};
    ///
    /// let mut workspace = Workspace::new();
    /// workspace.set(parse_resource(Uri::file("/a/deep/note.md"), "deep"));
    /// workspace.set(parse_resource(Uri::file("/b/note.md"), "shallow"));
    ///
    /// let found = workspace.list_by_identifier("Note");
    /// assert_eq!(found[0].uri.path, "/b/note.md");
    /// assert_eq!(workspace.find("deep/note").unwrap().uri.path, "/a/deep/note.md");
    /// ```
    pub fn list_by_identifier(&self, identifier: &str) -> Vec<&Resource> {
        self.candidates(identifier, None)
    }

    fn candidates(&self, identifier: &str, base: Option<&Uri>) -> Vec<&Resource> {
        let target = identifier.split('#').next().unwrap_or_default().trim();
        if target.is_empty() {
            // `[[#Section]]` points back at the document itself
            return base.and_then(|uri| self.get(uri)).into_iter().collect();
        }

        let wanted = target.replace('\\', "/").to_lowercase();
        let (exact, wanted) = if wanted.starts_with("./") || wanted.starts_with("../") {
            let dir = base.filter(|b| !b.is_placeholder()).map(|b| b.dir()).unwrap_or("/");
            (true, join_relative(&dir.to_lowercase(), &wanted))
        } else if wanted.starts_with('/') {
            (true, wanted)
        } else {
            (false, format!("/{wanted}"))
        };

        let Some(last) = wanted.rsplit('/').next().filter(|s| !s.is_empty()) else {
            return Vec::new();
        };
        let Some(uris) = self.keys.get(last) else {
            return Vec::new();
        };

        let with_ext = format!("{wanted}.md");
        let mut found: Vec<&Resource> = uris
            .iter()
            .filter(|uri| {
                let path = uri.match_path();
                if exact {
                    path == wanted || path == with_ext
                } else {
                    path.ends_with(&wanted) || path.ends_with(&with_ext)
                }
            })
            .filter_map(|uri| self.resources.get(uri))
            .collect();

        found.sort_by(|a, b| {
            (a.is_placeholder(), a.uri.path.chars().count(), &a.uri.path).cmp(&(
                b.is_placeholder(),
                b.uri.path.chars().count(),
                &b.uri.path,
            ))
        });
        found
    }

    /// Replace all placeholders with one per currently dangling link target.
    ///
    /// Targets are deduplicated case-insensitively; the first spelling seen
    /// in URI order wins. Returns the number of placeholders created.
    pub fn refresh_placeholders(&mut self) -> usize {
        let stale: Vec<Uri> = self
            .resources
            .keys()
            .filter(|uri| uri.is_placeholder())
            .cloned()
            .collect();
        for uri in &stale {
            self.delete(uri);
        }

        let mut dangling: BTreeMap<String, String> = BTreeMap::new();
        for resource in self.resources.values() {
            for link in &resource.links {
                if link.target.is_empty() {
                    continue;
                }
                if self.find_from(&link.target, Some(&resource.uri)).is_none() {
                    dangling
                        .entry(link.target.to_lowercase())
                        .or_insert_with(|| link.target.clone());
                }
            }
        }

        let created = dangling.len();
        for target in dangling.into_values() {
            tracing::debug!("Placeholder for dangling link [[{}]]", target);
            self.set(Resource::placeholder(&target));
        }
        created
    }
}
