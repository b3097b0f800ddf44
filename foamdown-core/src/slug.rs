//! Heading slugs for link fragments.

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static SPACES: OnceLock<Regex> = OnceLock::new();

fn spaces_regex() -> &'static Regex {
    SPACES.get_or_init(|| Regex::new(r"\s").unwrap())
}

/// Convert a heading label to the fragment used in `href`s
///
/// Rules (GitHub-style anchors, as markdown previews generate them):
/// - Lowercase
/// - Drop punctuation and symbols, keep letters, digits, `-` and `_`
/// - Every whitespace character becomes a hyphen (runs are not collapsed)
///
/// # Examples
///
/// ```
/// use foamdown_core::slugify;
///
/// assert_eq!(slugify("Section 2"), "section-2");
/// assert_eq!(slugify("Rust & Safety"), "rust--safety");
/// assert_eq!(slugify("What's new?"), "whats-new");
/// ```
pub fn slugify(input: &str) -> String {
    let lowercased = input.trim().to_lowercase();

    let cleaned = lowercased
        .graphemes(true)
        .filter(|g| {
            g.chars()
                .next()
                .map(|c| c.is_alphanumeric() || c.is_whitespace() || c == '-' || c == '_')
                .unwrap_or(false)
        })
        .collect::<String>();

    spaces_regex().replace_all(&cleaned, "-").into_owned()
}
