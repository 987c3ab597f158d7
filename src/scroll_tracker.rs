use crate::config::TocConfig;
use crate::dom::{self, Handle};
use crate::parsing::heading_extractor::{ALL_HEADING_TAGS, ensure_ids, existing_ids};
use crate::preferences::{COLLAPSED_CLASS, TOC_CONTENT_CLASS};
use crate::toc_renderer::TOC_LINK_CLASS;
use log::debug;

pub const ACTIVE_CLASS: &str = "active";

/// Element box relative to the viewport, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// True when `self` sticks out above or below `outer`.
    pub fn overflows(&self, outer: &Rect) -> bool {
        self.top < outer.top || self.bottom > outer.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

/// Layout and scrolling services of the page host.
pub trait Viewport {
    /// Box of `element` relative to the viewport, or `None` when it is not laid out.
    fn bounding_rect(&self, element: &Handle) -> Option<Rect>;
    /// Distance of `element` from the top of the document.
    fn offset_top(&self, element: &Handle) -> Option<f64>;
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);
    fn scroll_into_view(&mut self, element: &Handle, block: ScrollBlock, behavior: ScrollBehavior);
}

/// A viewport without layout, used when processing pages offline.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessViewport;

impl Viewport for HeadlessViewport {
    fn bounding_rect(&self, _element: &Handle) -> Option<Rect> {
        None
    }

    fn offset_top(&self, _element: &Handle) -> Option<f64> {
        None
    }

    fn scroll_to(&mut self, _top: f64, _behavior: ScrollBehavior) {}

    fn scroll_into_view(&mut self, _element: &Handle, _block: ScrollBlock, _behavior: ScrollBehavior) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkClick {
    /// The window was asked to scroll to this document offset.
    Scrolled(f64),
    /// The link points nowhere scrollable; navigation is still suppressed.
    NoTarget,
}

/// Picks the heading that has most recently crossed `threshold`.
///
/// Only headings whose top is at or above the threshold qualify; among those
/// the one closest to the viewport top wins, earlier headings winning ties.
pub fn select_active<'a, V: Viewport + ?Sized>(
    headings: &'a [Handle],
    viewport: &V,
    threshold: f64,
) -> Option<&'a Handle> {
    let mut best: Option<(&Handle, f64)> = None;
    for heading in headings {
        let Some(rect) = viewport.bounding_rect(heading) else {
            continue;
        };
        if rect.top > threshold {
            continue;
        }
        let distance = rect.top.abs();
        if best.is_none_or(|(_, min)| distance < min) {
            best = Some((heading, distance));
        }
    }
    best.map(|(heading, _)| heading)
}

/// Highlights the TOC link of the section currently being read.
#[derive(Debug)]
pub struct ScrollTracker {
    links: Vec<Handle>,
    headings: Vec<Handle>,
    threshold: f64,
    header_offset: f64,
    active_id: Option<String>,
}

impl ScrollTracker {
    /// Snapshots links and page headings. `None` when either set is empty.
    pub fn attach(document: &Handle, config: &TocConfig) -> Option<Self> {
        let links = dom::find_all_by_class(document, TOC_LINK_CLASS);
        let headings = dom::find_by_tags(document, &ALL_HEADING_TAGS);
        if links.is_empty() || headings.is_empty() {
            debug!(
                "Scroll tracking not started ({} links, {} headings)",
                links.len(),
                headings.len()
            );
            return None;
        }

        let mut ids = existing_ids(document);
        ensure_ids(&headings, &mut ids);

        Some(Self {
            links,
            headings,
            threshold: config.active_threshold_px,
            header_offset: config.header_offset_px,
            active_id: None,
        })
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn headings(&self) -> &[Handle] {
        &self.headings
    }

    fn link_for(&self, id: &str) -> Option<&Handle> {
        let href = format!("#{id}");
        self.links
            .iter()
            .find(|link| dom::get_attr(link, "href").as_deref() == Some(href.as_str()))
    }

    /// Re-evaluates the active heading and moves the highlight to its link.
    pub fn update<V: Viewport + ?Sized>(&mut self, document: &Handle, viewport: &mut V) {
        let active = select_active(&self.headings, &*viewport, self.threshold)
            .and_then(|heading| dom::get_attr(heading, "id"));

        for link in &self.links {
            dom::remove_class(link, ACTIVE_CLASS);
        }

        self.active_id = None;
        let Some(id) = active else {
            return;
        };
        let Some(link) = self.link_for(&id).cloned() else {
            debug!("Active heading {id:?} has no TOC link");
            return;
        };

        dom::add_class(&link, ACTIVE_CLASS);
        self.active_id = Some(id);
        Self::reveal_link(document, &link, viewport);
    }

    /// Keeps the highlighted link visible inside an expanded panel.
    fn reveal_link<V: Viewport + ?Sized>(document: &Handle, link: &Handle, viewport: &mut V) {
        let Some(content) = dom::find_by_class(document, TOC_CONTENT_CLASS) else {
            return;
        };
        if dom::has_class(&content, COLLAPSED_CLASS) {
            return;
        }
        let (Some(link_rect), Some(content_rect)) =
            (viewport.bounding_rect(link), viewport.bounding_rect(&content))
        else {
            return;
        };
        if link_rect.overflows(&content_rect) {
            viewport.scroll_into_view(link, ScrollBlock::Center, ScrollBehavior::Smooth);
        }
    }

    /// Smoothly scrolls to the heading `href` points at, leaving room for the fixed header.
    pub fn handle_click<V: Viewport + ?Sized>(
        &self,
        document: &Handle,
        href: &str,
        viewport: &mut V,
    ) -> LinkClick {
        let id = href.strip_prefix('#').unwrap_or(href);
        let Some(top) = dom::find_by_id(document, id).and_then(|target| viewport.offset_top(&target))
        else {
            return LinkClick::NoTarget;
        };

        let position = top - self.header_offset;
        viewport.scroll_to(position, ScrollBehavior::Smooth);
        LinkClick::Scrolled(position)
    }
}
