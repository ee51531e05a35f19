//! The closed set of inline marks and how each one is represented.
//!
//! Every mark has a canonical wrapper element, a set of tags that count as
//! "already marked" when found around text, and possibly a parameter the
//! caller must resolve before toggling (a link URL, a heading level). The
//! core never asks the user for these.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

use crate::error::{InlineError, Result};
use crate::tree::ElementData;

/// A named inline formatting annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Link,
    Heading,
}

impl Mark {
    pub const ALL: [Mark; 7] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Strike,
        Mark::Code,
        Mark::Link,
        Mark::Heading,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Strike => "strike",
            Mark::Code => "code",
            Mark::Link => "link",
            Mark::Heading => "heading",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }

    /// Static definition of this mark.
    pub fn spec(self) -> &'static MarkSpec {
        &SPECS[self as usize]
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caller-resolved parameters for marks that need them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkParams {
    pub url: Option<SmolStr>,
    pub level: Option<u8>,
}

impl MarkParams {
    pub fn url(url: impl Into<SmolStr>) -> Self {
        Self {
            url: Some(url.into()),
            level: None,
        }
    }

    pub fn level(level: u8) -> Self {
        Self {
            url: None,
            level: Some(level),
        }
    }
}

/// The element a mark wraps text in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapperDescriptor {
    pub tag: SmolStr,
    pub attrs: Vec<(SmolStr, SmolStr)>,
}

impl WrapperDescriptor {
    fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    /// Opening tag as markup, for buffer substrates.
    pub fn open_markup(&self) -> String {
        let mut out = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            out.push_str(&format!(
                " {}=\"{}\"",
                name,
                html_escape::encode_double_quoted_attribute(value)
            ));
        }
        out.push('>');
        out
    }

    /// Closing tag as markup.
    pub fn close_markup(&self) -> String {
        format!("</{}>", self.tag)
    }

    /// Element data for tree substrates.
    pub fn to_element(&self) -> ElementData {
        self.attrs
            .iter()
            .fold(ElementData::new(self.tag.clone()), |el, (k, v)| {
                el.with_attr(k.clone(), v.clone())
            })
    }
}

/// Static definition of a mark.
#[derive(Debug)]
pub struct MarkSpec {
    mark: Mark,
    tags: &'static [&'static str],
    param: Option<&'static str>,
    block: bool,
}

static SPECS: [MarkSpec; 7] = [
    MarkSpec {
        mark: Mark::Bold,
        tags: &["b", "strong"],
        param: None,
        block: false,
    },
    MarkSpec {
        mark: Mark::Italic,
        tags: &["i", "em"],
        param: None,
        block: false,
    },
    MarkSpec {
        mark: Mark::Underline,
        tags: &["u"],
        param: None,
        block: false,
    },
    MarkSpec {
        mark: Mark::Strike,
        tags: &["s", "strike", "del"],
        param: None,
        block: false,
    },
    MarkSpec {
        mark: Mark::Code,
        tags: &["code"],
        param: None,
        block: false,
    },
    MarkSpec {
        mark: Mark::Link,
        tags: &["a"],
        param: Some("url"),
        block: false,
    },
    MarkSpec {
        mark: Mark::Heading,
        tags: &["h1", "h2", "h3", "h4", "h5", "h6"],
        param: Some("level"),
        block: true,
    },
];

impl MarkSpec {
    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// Tags recognised as this mark. The first is the canonical one, except
    /// for headings where the level picks the tag.
    pub fn tags(&self) -> &'static [&'static str] {
        self.tags
    }

    pub fn requires_param(&self) -> bool {
        self.param.is_some()
    }

    /// Whether the wrapper is block-level.
    pub fn is_block(&self) -> bool {
        self.block
    }

    pub fn matches_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// True if any of the enclosing wrapper tags is this mark.
    pub fn matches<'a>(&self, wrap_tags: impl IntoIterator<Item = &'a str>) -> bool {
        wrap_tags.into_iter().any(|tag| self.matches_tag(tag))
    }

    /// Canonical wrapper for this mark with the given parameters.
    pub fn wrap(&self, params: Option<&MarkParams>) -> Result<WrapperDescriptor> {
        match self.mark {
            Mark::Link => {
                let url = params
                    .and_then(|p| p.url.as_ref())
                    .ok_or(InlineError::MissingParameter {
                        mark: self.mark,
                        param: "url",
                    })?;
                let url = url.trim();
                if url.is_empty() {
                    return Err(InlineError::InvalidParameter {
                        mark: self.mark,
                        param: "url",
                        reason: "url is blank".into(),
                    });
                }
                let mut wrapper = WrapperDescriptor::new("a");
                wrapper.attrs.push(("href".into(), url.into()));
                Ok(wrapper)
            }
            Mark::Heading => {
                let level = params
                    .and_then(|p| p.level)
                    .ok_or(InlineError::MissingParameter {
                        mark: self.mark,
                        param: "level",
                    })?;
                if !(1..=6).contains(&level) {
                    return Err(InlineError::InvalidParameter {
                        mark: self.mark,
                        param: "level",
                        reason: format_smolstr!("level {} is not in 1..=6", level),
                    });
                }
                Ok(WrapperDescriptor::new(format_smolstr!("h{}", level)))
            }
            _ => Ok(WrapperDescriptor::new(self.tags[0])),
        }
    }
}

/// The marks enabled for a toolbar, with lookup by mark or tag.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkRegistry {
    enabled: Vec<Mark>,
}

impl Default for MarkRegistry {
    fn default() -> Self {
        Self::new(Mark::ALL)
    }
}

impl MarkRegistry {
    pub fn new(enabled: impl IntoIterator<Item = Mark>) -> Self {
        let mut enabled: Vec<Mark> = enabled.into_iter().collect();
        enabled.sort();
        enabled.dedup();
        Self { enabled }
    }

    pub fn enabled(&self) -> &[Mark] {
        &self.enabled
    }

    pub fn is_enabled(&self, mark: Mark) -> bool {
        self.enabled.contains(&mark)
    }

    /// Definition of an enabled mark.
    pub fn spec(&self, mark: Mark) -> Result<&'static MarkSpec> {
        if self.is_enabled(mark) {
            Ok(mark.spec())
        } else {
            Err(InlineError::MarkDisabled(mark))
        }
    }

    /// The enabled mark an element tag represents, if any.
    pub fn mark_for_tag(&self, tag: &str) -> Option<Mark> {
        self.enabled
            .iter()
            .copied()
            .find(|m| m.spec().matches_tag(tag))
    }
}
