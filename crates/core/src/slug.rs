use std::collections::HashSet;

/// Fallback identifier for headings whose text yields an empty slug.
pub const FALLBACK_HEADING_ID: &str = "heading";

/// Slugify the given text.
///
/// This is the one routine behind heading ids (enrichment and outline) and
/// post slugs:
/// 1. Lowercase
/// 2. Runs of whitespace, underscores and hyphens become a single hyphen
/// 3. Every other character outside `[a-z0-9]` is dropped
/// 4. No leading or trailing hyphens
///
/// # Examples
///
/// ```
/// use blogmark_core::slug::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("  snake_case  and--dashes "), "snake-case-and-dashes");
/// assert_eq!(slugify("Q&A: what's new?"), "qa-whats-new");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.to_lowercase().chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_hyphen = !slug.is_empty();
        } else if ch.is_ascii_alphanumeric() {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(ch);
        }
        // All other characters (punctuation, symbols, non-ASCII letters) are silently dropped
    }

    slug
}

/// Derives the candidate id for a heading, falling back to `"heading"`.
pub fn heading_id(text: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        FALLBACK_HEADING_ID.to_string()
    } else {
        slug
    }
}

/// Hands out document-unique heading ids.
///
/// The first claim of a candidate keeps it bare; later claims get the first
/// unused suffix counting from `-2`.
#[derive(Debug, Default)]
pub struct Slugger {
    used: HashSet<String>,
}

impl Slugger {
    /// Creates a new slugger.
    pub fn new() -> Self {
        Self {
            used: HashSet::new(),
        }
    }

    /// Derives an id from heading text and claims it.
    pub fn next_id(&mut self, text: &str) -> String {
        let candidate = heading_id(text);
        self.claim(&candidate)
    }

    /// Claims `candidate`, suffixing it when it was already handed out.
    pub fn claim(&mut self, candidate: &str) -> String {
        let mut id = candidate.to_string();
        let mut counter = 2usize;
        while self.used.contains(&id) {
            id = format!("{}-{}", candidate, counter);
            counter += 1;
        }
        self.used.insert(id.clone());
        id
    }

    /// Marks an id as taken without deriving anything.
    pub fn reserve(&mut self, id: &str) {
        self.used.insert(id.to_string());
    }

    /// Returns true if `id` has been handed out or reserved.
    pub fn is_used(&self, id: &str) -> bool {
        self.used.contains(id)
    }
}
