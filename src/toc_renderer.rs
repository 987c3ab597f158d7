use crate::dom::{self, Handle};
use crate::parsing::heading_extractor::HeadingEntry;
use log::debug;

pub const TOC_LIST_CLASS: &str = "toc-list";
pub const TOC_LINK_CLASS: &str = "toc-link";

/// One row of the rendered table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocItem {
    pub level: u8,
    pub label: String,
    pub target_id: String,
}

impl TocItem {
    pub fn class_name(&self) -> String {
        format!("toc-item toc-level-{}", self.level)
    }

    pub fn href(&self) -> String {
        format!("#{}", self.target_id)
    }
}

impl From<&HeadingEntry> for TocItem {
    fn from(entry: &HeadingEntry) -> Self {
        Self {
            level: entry.level,
            label: entry.text.clone(),
            target_id: entry.id.clone(),
        }
    }
}

/// Writes TOC items into the page's `.toc-list` element.
#[derive(Debug, Default)]
pub struct TocRenderer {
    items: Vec<TocItem>,
}

impl TocRenderer {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn items(&self) -> &[TocItem] {
        &self.items
    }

    pub fn find_list(document: &Handle) -> Option<Handle> {
        dom::find_by_class(document, TOC_LIST_CLASS)
    }

    /// Empties the list element. Returns it, or `None` when the page has no list.
    pub fn clear(&mut self, document: &Handle) -> Option<Handle> {
        self.items.clear();
        let list = Self::find_list(document)?;
        dom::clear_children(&list);
        Some(list)
    }

    /// Replaces any previous output with one `li > a.toc-link` per entry.
    pub fn render(&mut self, list: &Handle, entries: &[HeadingEntry]) {
        dom::clear_children(list);
        self.items = entries.iter().map(TocItem::from).collect();

        for item in &self.items {
            let li = dom::create_element("li", &[("class", item.class_name().as_str())]);
            let link = dom::create_element(
                "a",
                &[("href", item.href().as_str()), ("class", TOC_LINK_CLASS)],
            );
            dom::append_child(&link, dom::create_text(&item.label));
            dom::append_child(&li, link);
            dom::append_child(list, li);
        }

        debug!("Rendered {} TOC items", self.items.len());
    }
}
