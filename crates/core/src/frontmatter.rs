use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Metadata block that precedes a post body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Post title.
    pub title: String,
    /// Publication date, ISO-8601 (`YYYY-MM-DD`) by convention.
    pub date: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// One-paragraph summary used in listings.
    pub summary: String,
}

/// Result returned after extracting frontmatter from a Markdown document.
#[derive(Debug)]
pub struct FrontmatterExtraction {
    /// Parsed frontmatter as a JSON value.
    pub value: JsonValue,
    /// Byte offset inside the original document where Markdown content begins.
    pub body_start: usize,
}

impl FrontmatterExtraction {
    fn empty() -> Self {
        Self {
            value: JsonValue::Object(Default::default()),
            body_start: 0,
        }
    }

    /// Deserializes the raw value into a typed [`FrontMatter`].
    pub fn front_matter(&self) -> Result<FrontMatter, FrontmatterError> {
        serde_json::from_value(self.value.clone())
            .map_err(|err| FrontmatterError::Parse(err.to_string()))
    }
}

/// A document split into typed metadata and markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDocument<'a> {
    /// Typed front-matter (defaults when the document has none).
    pub meta: FrontMatter,
    /// Markdown body following the front-matter block.
    pub body: &'a str,
}

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Extracts YAML frontmatter from an input document.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    match find_yaml_block(input)? {
        Some((block, body_start)) => {
            let value = parse_yaml_block(&block)?;
            Ok(FrontmatterExtraction { value, body_start })
        }
        None => Ok(FrontmatterExtraction::empty()),
    }
}

/// Splits a raw document into typed front-matter and its body.
pub fn split_document(input: &str) -> Result<SplitDocument<'_>, FrontmatterError> {
    let extraction = extract_frontmatter(input)?;
    let meta = extraction.front_matter()?;
    Ok(SplitDocument {
        meta,
        body: &input[extraction.body_start..],
    })
}

fn parse_yaml_block(block: &str) -> Result<JsonValue, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(JsonValue::Object(Default::default()));
    }

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match json_value {
        JsonValue::Null => Ok(JsonValue::Object(Default::default())),
        JsonValue::Object(map) => Ok(JsonValue::Object(
            map.into_iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key, coerce_scalars(value)))
                .collect(),
        )),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

// Numeric and boolean scalars (e.g. `title: 1984`, `tags: [2024]`) become strings
// so typed deserialization into `String` fields still succeeds.
fn coerce_scalars(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Number(number) => JsonValue::String(number.to_string()),
        JsonValue::Bool(flag) => JsonValue::String(flag.to_string()),
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(coerce_scalars).collect()),
        other => other,
    }
}

fn find_yaml_block(input: &str) -> Result<Option<(String, usize)>, FrontmatterError> {
    let (without_bom, bom_len) = strip_bom(input);
    let mut cursor = 0usize;

    loop {
        match next_line(without_bom, cursor) {
            Some((line, next_cursor)) => {
                if line.trim().is_empty() {
                    cursor = next_cursor;
                    continue;
                }

                if !is_yaml_fence(line) {
                    return Ok(None);
                }

                let block_start = next_cursor;
                let mut scan_cursor = next_cursor;

                loop {
                    match next_line(without_bom, scan_cursor) {
                        Some((block_line, next_line_cursor)) => {
                            if is_yaml_fence(block_line) {
                                let raw_block = &without_bom[block_start..scan_cursor];
                                let trimmed = raw_block.trim_end_matches(['\r', '\n']);
                                let body_index = bom_len + next_line_cursor;
                                return Ok(Some((trimmed.to_string(), body_index)));
                            }
                            scan_cursor = next_line_cursor;
                        }
                        None => return Err(FrontmatterError::Unterminated),
                    }
                }
            }
            None => return Ok(None),
        }
    }
}

fn strip_bom(input: &str) -> (&str, usize) {
    if let Some(stripped) = input.strip_prefix('\u{feff}') {
        (stripped, '\u{feff}'.len_utf8())
    } else {
        (input, 0)
    }
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        let line = &input[start..line_end];
        Some((line, line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}
