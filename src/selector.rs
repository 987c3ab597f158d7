//! A small CSS selector subset: compound selectors (`tag`, `.class`, `#id`)
//! joined by the descendant combinator. Enough to probe article containers
//! such as `article.md-text .content` without pulling in a full engine.

use crate::dom::{self, Handle};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported character {found:?} in selector {selector:?}")]
    Unsupported { selector: String, found: char },
    #[error("missing name after {marker:?} in selector {selector:?}")]
    MissingName { selector: String, marker: char },
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn matches(&self, node: &Handle) -> bool {
        let Some(tag) = dom::tag_name(node) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if dom::get_attr(node, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|class| dom::has_class(node, class))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let compounds = source
            .split_whitespace()
            .map(|part| Self::parse_compound(source, part))
            .collect::<Result<Vec<_>, _>>()?;

        if compounds.is_empty() {
            return Err(SelectorError::Empty);
        }

        Ok(Self {
            source: source.trim().to_string(),
            compounds,
        })
    }

    fn parse_compound(source: &str, part: &str) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut chars = part.chars().peekable();

        let tag: String = std::iter::from_fn(|| chars.next_if(|c| is_name_char(*c))).collect();
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
        } else {
            // `*` places no constraint on the tag
            let _ = chars.next_if_eq(&'*');
        }

        while let Some(marker) = chars.next() {
            if marker != '.' && marker != '#' {
                return Err(SelectorError::Unsupported {
                    selector: source.to_string(),
                    found: marker,
                });
            }
            let name: String =
                std::iter::from_fn(|| chars.next_if(|c| is_name_char(*c))).collect();
            if name.is_empty() {
                return Err(SelectorError::MissingName {
                    selector: source.to_string(),
                    marker,
                });
            }
            if marker == '.' {
                compound.classes.push(name);
            } else {
                compound.id = Some(name);
            }
        }

        Ok(compound)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when `node` matches the last compound and its ancestors satisfy the rest in order.
    pub fn matches(&self, node: &Handle) -> bool {
        let Some((last, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }

        let mut remaining = ancestors.iter().rev().peekable();
        let mut current = dom::parent(node);
        while let Some(compound) = remaining.peek() {
            let Some(ancestor) = current else {
                return false;
            };
            if compound.matches(&ancestor) {
                remaining.next();
            }
            current = dom::parent(&ancestor);
        }
        true
    }
}
