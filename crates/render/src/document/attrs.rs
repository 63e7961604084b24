//! Closed attribute vocabulary for document elements.

use std::fmt;

/// `data-*` attributes the pipeline reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataAttr {
    /// `data-cast-id`
    CastId,
    /// `data-theme`
    Theme,
    /// `data-speed`
    Speed,
    /// `data-auto-play`
    AutoPlay,
    /// `data-loop`
    Loop,
    /// `data-cols`
    Cols,
    /// `data-rows`
    Rows,
    /// `data-mermaid`
    Mermaid,
    /// `data-next-image`
    NextImage,
    /// `data-src`
    Src,
    /// `data-cloudinary`
    Cloudinary,
    /// `data-error`
    Error,
    /// `data-footnote-ref`
    FootnoteRef,
    /// `data-footnote-backref`
    FootnoteBackref,
    /// `data-footnotes`
    Footnotes,
}

impl DataAttr {
    /// Wire name including the `data-` prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            DataAttr::CastId => "data-cast-id",
            DataAttr::Theme => "data-theme",
            DataAttr::Speed => "data-speed",
            DataAttr::AutoPlay => "data-auto-play",
            DataAttr::Loop => "data-loop",
            DataAttr::Cols => "data-cols",
            DataAttr::Rows => "data-rows",
            DataAttr::Mermaid => "data-mermaid",
            DataAttr::NextImage => "data-next-image",
            DataAttr::Src => "data-src",
            DataAttr::Cloudinary => "data-cloudinary",
            DataAttr::Error => "data-error",
            DataAttr::FootnoteRef => "data-footnote-ref",
            DataAttr::FootnoteBackref => "data-footnote-backref",
            DataAttr::Footnotes => "data-footnotes",
        }
    }
}

/// Attribute names. Anything outside the known set goes through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrKey {
    /// `id`
    Id,
    /// `class`
    Class,
    /// `href`
    Href,
    /// `src`
    Src,
    /// `alt`
    Alt,
    /// `title`
    Title,
    /// `loading`
    Loading,
    /// `width`
    Width,
    /// `height`
    Height,
    /// `align`
    Align,
    /// `start`
    Start,
    /// `type`
    Type,
    /// `disabled`
    Disabled,
    /// `checked`
    Checked,
    /// A `data-*` attribute.
    Data(DataAttr),
    /// Any other attribute, by its lowercase name.
    Other(String),
}

impl AttrKey {
    /// Wire name of the attribute.
    pub fn as_str(&self) -> &str {
        match self {
            AttrKey::Id => "id",
            AttrKey::Class => "class",
            AttrKey::Href => "href",
            AttrKey::Src => "src",
            AttrKey::Alt => "alt",
            AttrKey::Title => "title",
            AttrKey::Loading => "loading",
            AttrKey::Width => "width",
            AttrKey::Height => "height",
            AttrKey::Align => "align",
            AttrKey::Start => "start",
            AttrKey::Type => "type",
            AttrKey::Disabled => "disabled",
            AttrKey::Checked => "checked",
            AttrKey::Data(data) => data.as_str(),
            AttrKey::Other(name) => name,
        }
    }

    /// Boolean attributes serialize as a bare name.
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            AttrKey::Disabled
                | AttrKey::Checked
                | AttrKey::Data(DataAttr::FootnoteRef)
                | AttrKey::Data(DataAttr::FootnoteBackref)
                | AttrKey::Data(DataAttr::Footnotes)
        )
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered attribute list. Insertion order is serialization order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(AttrKey, String)>,
}

impl Attributes {
    /// Creates an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `key`, if set.
    pub fn get(&self, key: &AttrKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `key` is set.
    pub fn contains(&self, key: &AttrKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Sets `key`, keeping its position when it already exists.
    pub fn set(&mut self, key: AttrKey, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`Attributes::set`].
    pub fn with(mut self, key: AttrKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Removes `key` and returns its previous value.
    pub fn remove(&mut self, key: &AttrKey) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&AttrKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get(&AttrKey::Class)
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    /// Returns true if the `class` attribute lists `name`.
    pub fn has_class(&self, name: &str) -> bool {
        self.classes().any(|class| class == name)
    }

    /// Appends `name` to the `class` attribute.
    pub fn add_class(&mut self, name: &str) {
        if self.has_class(name) {
            return;
        }
        let joined = match self.get(&AttrKey::Class) {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, name),
            _ => name.to_string(),
        };
        self.set(AttrKey::Class, joined);
    }
}

impl FromIterator<(AttrKey, String)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (AttrKey, String)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (key, value) in iter {
            attrs.set(key, value);
        }
        attrs
    }
}
