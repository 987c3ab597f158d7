pub mod fake_pages;

use crate::dom::{self, Handle};
use crate::preferences::{KeyValueStore, MemoryStore};
use crate::scroll_tracker::{Rect, ScrollBehavior, ScrollBlock, Viewport};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// How a `StaticViewport` names an element: its id, else its href, else its first class.
pub fn element_key(element: &Handle) -> Option<String> {
    dom::get_attr(element, "id")
        .filter(|id| !id.is_empty())
        .or_else(|| dom::get_attr(element, "href"))
        .or_else(|| {
            dom::get_attr(element, "class")
                .and_then(|classes| classes.split_whitespace().next().map(str::to_string))
        })
}

/// A scripted layout: fixed rects and offsets per element key, recording scroll requests.
#[derive(Debug, Default)]
pub struct StaticViewport {
    rects: HashMap<String, Rect>,
    offsets: HashMap<String, f64>,
    scrolls: Vec<(f64, ScrollBehavior)>,
    revealed: Vec<String>,
}

impl StaticViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rect(mut self, key: &str, top: f64, bottom: f64) -> Self {
        self.set_rect(key, top, bottom);
        self
    }

    pub fn with_offset(mut self, key: &str, offset_top: f64) -> Self {
        self.offsets.insert(key.to_string(), offset_top);
        self
    }

    pub fn set_rect(&mut self, key: &str, top: f64, bottom: f64) {
        self.rects.insert(key.to_string(), Rect::new(top, bottom));
    }

    pub fn clear_rects(&mut self) {
        self.rects.clear();
    }

    pub fn scrolls(&self) -> &[(f64, ScrollBehavior)] {
        &self.scrolls
    }

    /// Keys of elements that were scrolled into view.
    pub fn revealed(&self) -> &[String] {
        &self.revealed
    }
}

impl Viewport for StaticViewport {
    fn bounding_rect(&self, element: &Handle) -> Option<Rect> {
        self.rects.get(&element_key(element)?).copied()
    }

    fn offset_top(&self, element: &Handle) -> Option<f64> {
        self.offsets.get(&element_key(element)?).copied()
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scrolls.push((top, behavior));
    }

    fn scroll_into_view(&mut self, element: &Handle, _block: ScrollBlock, _behavior: ScrollBehavior) {
        self.revealed.push(element_key(element).unwrap_or_default());
    }
}

/// A memory store that stays inspectable after being handed to a controller.
#[derive(Debug, Default, Clone)]
pub struct SharedStore {
    inner: Rc<RefCell<MemoryStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryStore::new().with_value(key, value))),
        }
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.inner.borrow_mut().set(key, value)
    }
}

/// A store whose writes always fail, like storage in a private browsing window.
#[derive(Debug, Default)]
pub struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage is read-only, cannot write {key}")
    }
}
