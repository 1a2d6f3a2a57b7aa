//! `{{IPA}}` template parsing.
//!
//! A page body may carry several pronunciation templates, for example
//!
//! ```text
//! * {{IPA|en|/ˈwɪʃ.iˌwɒʃ.i/|a=UK}}
//! * {{IPA|en|/ˈwɪʃ.iˌwɑ.ʃi/|/ˈwɪʃ.iˌwɔ.ʃi/|a=US}}
//! * {{IPA|is|/heiː/}}
//! ```
//!
//! [`find_templates`] walks the buffer and hands each occurrence to
//! [`parse_template`]. Anything that doesn't look like a usable template
//! comes back empty and is dropped.

use serde::{Deserialize, Serialize};

/// Opening delimiter of any template.
pub const TEMPLATE_OPEN: &str = "{{";
/// Closing delimiter of any template.
pub const TEMPLATE_CLOSE: &str = "}}";

const IPA_TAG: &str = "IPA";
/// Where the locator starts slicing.
const IPA_OPENER: &str = "{{IPA";
/// What the parser requires; rejects `{{IPAchar|...}}` and friends.
const IPA_PREFIX: &str = "{{IPA|";

const DISAMBIGUATION_GUARD: &str = "disambiguation";
/// A section heading inside a slice means it ran past its template.
const HEADING_GUARD: &str = "==";

/// One page's worth of pronunciations, serialized as one output line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronunciation {
    pub word: String,
    #[serde(default)]
    pub ipa: Vec<IpaTemplate>,
}

/// A single parsed `{{IPA|lang|/.../|...}}` occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpaTemplate {
    #[serde(rename = "lang", default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(default)]
    pub pronunciations: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant: String,
}

impl Pronunciation {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ipa: Vec::new(),
        }
    }
}

impl IpaTemplate {
    /// A template without transcriptions carries nothing worth emitting.
    pub fn is_empty(&self) -> bool {
        self.pronunciations.is_empty()
    }
}

/// Parse one template slice, normally `{{IPA|...}}` but possibly a
/// truncated tail without the closing braces.
pub fn parse_template(text: &str) -> IpaTemplate {
    let mut template = IpaTemplate::default();

    if !text.starts_with(IPA_PREFIX) {
        return template;
    }
    if text.contains(DISAMBIGUATION_GUARD) || text.contains(HEADING_GUARD) {
        return template;
    }

    let inner = text.strip_prefix(TEMPLATE_OPEN).unwrap_or(text);
    let inner = inner.strip_suffix(TEMPLATE_CLOSE).unwrap_or(inner);

    for (i, field) in inner.split('|').enumerate() {
        match i {
            0 => {
                if field != IPA_TAG {
                    return template;
                }
            }
            1 => template.language = field.to_string(),
            // Qualifiers like a=US; only the last one is kept
            _ if field.contains('=') => template.variant = field.to_string(),
            _ if field == "/" => {}
            _ if !(field.starts_with('/') && field.ends_with('/')) => {}
            _ => template.pronunciations.push(field.to_string()),
        }
    }

    template
}

/// Locate every `{{IPA` occurrence in `text`, in order, keeping the ones
/// that parse to at least one transcription.
pub fn find_templates(text: &str) -> Vec<IpaTemplate> {
    let mut templates = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(IPA_OPENER) {
        let open = cursor + offset;
        match text[open..].find(TEMPLATE_CLOSE) {
            Some(len) => {
                let close = open + len + TEMPLATE_CLOSE.len();
                push_non_empty(&mut templates, parse_template(&text[open..close]));
                cursor = close;
            }
            None => {
                // Truncated: nothing can follow an unterminated tail
                push_non_empty(&mut templates, parse_template(&text[open..]));
                break;
            }
        }
    }

    templates
}

/// Attach the templates found in `text` to `entry`.
pub fn find_ipa(text: &str, mut entry: Pronunciation) -> Pronunciation {
    entry.ipa.extend(find_templates(text));
    entry
}

fn push_non_empty(templates: &mut Vec<IpaTemplate>, template: IpaTemplate) {
    if !template.is_empty() {
        templates.push(template);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
