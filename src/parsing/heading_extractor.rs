use crate::dom::{self, Handle};
use crate::selector::Selector;
use crate::slug::IdAllocator;
use log::debug;

/// Tags collected from the article container.
pub const STANDARD_HEADING_TAGS: [&str; 3] = ["h1", "h2", "h3"];
/// Tags the scroll tracker watches across the whole page.
pub const ALL_HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

const FALLBACK_LEVEL: u8 = 2;
const MAX_HEADING_CHARS: usize = 50;
const MIN_HEADING_CHARS: usize = 3;

/// Markers of code fences and front matter that leak into rendered text.
const DENYLIST: [&str; 7] = [
    "```", "---", "title:", "date:", "tags:", "cover:", "banner:",
];

#[derive(Debug, Clone)]
pub struct HeadingEntry {
    pub id: String,
    pub level: u8,
    pub text: String,
    pub element: Handle,
}

/// Where the headings of an article came from.
#[derive(Debug, Clone)]
pub enum HeadingSource {
    /// Real `h1`..`h3` elements.
    Standard(Vec<Handle>),
    /// Short stand-alone paragraphs promoted to headings.
    TextBlocks(Vec<Handle>),
}

impl HeadingSource {
    /// Resolves the source once: standard headings when present, text blocks otherwise.
    pub fn discover(container: &Handle) -> Self {
        let standard = dom::find_by_tags(container, &STANDARD_HEADING_TAGS);
        if !standard.is_empty() {
            return HeadingSource::Standard(standard);
        }
        HeadingSource::TextBlocks(Self::collect_text_blocks(container))
    }

    fn collect_text_blocks(container: &Handle) -> Vec<Handle> {
        dom::descendants(container)
            .into_iter()
            .filter_map(|node| {
                let text = dom::text_of(&node)?;
                let text = text.trim();
                if !is_heading_like(text) {
                    return None;
                }
                let parent = dom::parent(&node)?;
                if !(dom::is_element(&parent, "p") || dom::is_element(&parent, "div")) {
                    return None;
                }
                let parent_text = dom::text_content(&parent);
                let parent_text = parent_text.trim();
                (parent_text == text && parent_text.chars().count() < MAX_HEADING_CHARS)
                    .then_some(parent)
            })
            .collect()
    }

    pub fn elements(&self) -> &[Handle] {
        match self {
            HeadingSource::Standard(elements) => elements,
            HeadingSource::TextBlocks(elements) => elements,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, HeadingSource::TextBlocks(_))
    }

    fn level_of(&self, element: &Handle) -> u8 {
        match self {
            HeadingSource::Standard(_) => heading_level(element).unwrap_or(FALLBACK_LEVEL),
            HeadingSource::TextBlocks(_) => FALLBACK_LEVEL,
        }
    }
}

/// Level of an `h1`..`h6` element.
pub fn heading_level(element: &Handle) -> Option<u8> {
    let tag = dom::tag_name(element)?;
    let mut chars = tag.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('h' | 'H'), Some(digit @ '1'..='6'), None) => digit.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Heuristic for text that reads like a heading: short, starts with a letter
/// or ideograph, and carries no markdown/front-matter residue.
pub fn is_heading_like(trimmed: &str) -> bool {
    let length = trimmed.chars().count();
    if length <= MIN_HEADING_CHARS || length >= MAX_HEADING_CHARS {
        return false;
    }
    let starts_well = trimmed
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || is_cjk_ideograph(c));
    starts_well && !DENYLIST.iter().any(|marker| trimmed.contains(marker))
}

/// Every `id` already present in the document.
pub fn existing_ids(document: &Handle) -> IdAllocator {
    IdAllocator::with_taken(
        dom::descendant_elements(document)
            .iter()
            .filter_map(|node| dom::get_attr(node, "id"))
            .filter(|id| !id.is_empty()),
    )
}

/// Gives every element without an id one derived from its text, keeping existing ids.
pub fn ensure_ids(elements: &[Handle], ids: &mut IdAllocator) -> Vec<String> {
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| match dom::get_attr(element, "id") {
            Some(id) if !id.is_empty() => id,
            _ => {
                let id = ids.allocate(&dom::text_content(element), index);
                dom::set_attr(element, "id", &id);
                id
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub enum Extraction {
    /// No selector matched; nothing on the page should change.
    NoContainer,
    /// A container exists but holds nothing heading-like.
    NoHeadings,
    Headings {
        entries: Vec<HeadingEntry>,
        fallback: bool,
    },
}

impl Extraction {
    pub fn entries(&self) -> &[HeadingEntry] {
        match self {
            Extraction::Headings { entries, .. } => entries,
            _ => &[],
        }
    }
}

pub struct HeadingExtractor {
    selectors: Vec<Selector>,
}

impl HeadingExtractor {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    /// First selector (in priority order) that matches anything wins.
    pub fn find_container(&self, document: &Handle) -> Option<Handle> {
        self.selectors.iter().find_map(|selector| {
            let found = dom::query_selector(document, selector);
            if found.is_some() {
                debug!("Article container matched by {:?}", selector.as_str());
            }
            found
        })
    }

    pub fn extract(&self, document: &Handle) -> Extraction {
        let Some(container) = self.find_container(document) else {
            debug!("No article container found, skipping TOC");
            return Extraction::NoContainer;
        };

        let source = HeadingSource::discover(&container);
        if source.elements().is_empty() {
            debug!("Article container has no headings");
            return Extraction::NoHeadings;
        }

        let mut ids = existing_ids(document);
        let assigned = ensure_ids(source.elements(), &mut ids);
        let entries: Vec<HeadingEntry> = source
            .elements()
            .iter()
            .zip(assigned)
            .map(|(element, id)| HeadingEntry {
                id,
                level: source.level_of(element),
                text: dom::text_content(element).trim().to_string(),
                element: element.clone(),
            })
            .collect();

        debug!(
            "Extracted {} headings ({})",
            entries.len(),
            if source.is_fallback() { "text blocks" } else { "standard" }
        );

        Extraction::Headings {
            entries,
            fallback: source.is_fallback(),
        }
    }
}
