use crate::config::TocConfig;
use crate::dom::{self, Handle};
use crate::inputs::Throttle;
use crate::parsing::heading_extractor::{Extraction, HeadingEntry, HeadingExtractor};
use crate::preferences::{CollapseControls, KeyValueStore, PreferenceStore, UiPreference};
use crate::scroll_tracker::{LinkClick, ScrollTracker, Viewport};
use crate::toc_renderer::{TocItem, TocRenderer};
use log::{debug, info};
use std::time::Instant;

pub const TOC_PANEL_ID: &str = "article-toc";

/// The page-scoped owner of the table of contents.
///
/// A host creates one controller per loaded page and forwards page events
/// to it:
///
/// - [`on_ready`](Self::on_ready) once the document is parsed,
/// - [`on_scroll`](Self::on_scroll) for every scroll event,
/// - [`tick`](Self::tick) whenever it can run deferred work (the trailing
///   scroll evaluation fires from here),
/// - [`on_link_click`](Self::on_link_click) and [`toggle`](Self::toggle)
///   for user input on the panel.
///
/// # Usage
///
/// ```rust,no_run
/// use article_toc::config::TocConfig;
/// use article_toc::controller::TocController;
/// use article_toc::dom::parse_html;
/// use article_toc::preferences::MemoryStore;
/// use article_toc::scroll_tracker::HeadlessViewport;
/// # fn main() -> anyhow::Result<()> {
/// let page = parse_html("<article><h2>Intro</h2></article><ul class=\"toc-list\"></ul>");
/// let mut toc = TocController::new(
///     page.document.clone(),
///     TocConfig::default(),
///     Box::new(MemoryStore::new()),
/// )?;
/// toc.on_ready(&mut HeadlessViewport);
/// assert_eq!(toc.items().len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct TocController {
    document: Handle,
    config: TocConfig,
    extractor: HeadingExtractor,
    renderer: TocRenderer,
    preferences: PreferenceStore,
    tracker: Option<ScrollTracker>,
    throttle: Throttle,
    entries: Vec<HeadingEntry>,
}

impl TocController {
    /// Fails only when a configured container selector cannot be parsed.
    pub fn new(
        document: Handle,
        config: TocConfig,
        store: Box<dyn KeyValueStore>,
    ) -> anyhow::Result<Self> {
        let extractor = HeadingExtractor::new(config.selectors()?);
        let preferences = PreferenceStore::new(store, config.storage_key.clone());
        let throttle = Throttle::new(config.throttle_window());

        Ok(Self {
            document,
            config,
            extractor,
            renderer: TocRenderer::new(),
            preferences,
            tracker: None,
            throttle,
            entries: Vec::new(),
        })
    }

    pub fn document(&self) -> &Handle {
        &self.document
    }

    pub fn entries(&self) -> &[HeadingEntry] {
        &self.entries
    }

    pub fn items(&self) -> &[TocItem] {
        self.renderer.items()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.tracker.as_ref().and_then(ScrollTracker::active_id)
    }

    pub fn is_tracking(&self) -> bool {
        self.tracker.is_some()
    }

    /// Page-ready sequence: build the list, restore the panel state, start tracking.
    pub fn on_ready<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        self.generate_toc();
        self.restore_state();
        self.init_scroll(viewport);
        info!(
            "TOC ready with {} items{}",
            self.items().len(),
            if self.is_tracking() { ", tracking scroll" } else { "" }
        );
    }

    /// Rebuilds the list from the article. Safe to call again at any time.
    pub fn generate_toc(&mut self) {
        self.entries.clear();
        let Some(list) = self.renderer.clear(&self.document) else {
            debug!("No TOC list element on the page");
            return;
        };

        match self.extractor.extract(&self.document) {
            Extraction::NoContainer => {}
            Extraction::NoHeadings => self.hide_panel(),
            Extraction::Headings { entries, .. } => {
                self.renderer.render(&list, &entries);
                self.entries = entries;
            }
        }

        if self.tracker.is_some() {
            // links were replaced, the old snapshot points at detached nodes
            self.tracker = ScrollTracker::attach(&self.document, &self.config);
        }
    }

    fn hide_panel(&self) {
        match dom::find_by_id(&self.document, TOC_PANEL_ID) {
            Some(panel) => {
                dom::set_style_property(&panel, "display", "none");
                debug!("No headings found, TOC panel hidden");
            }
            None => debug!("No headings found and no TOC panel to hide"),
        }
    }

    pub fn is_panel_hidden(&self) -> bool {
        dom::find_by_id(&self.document, TOC_PANEL_ID)
            .and_then(|panel| dom::style_property(&panel, "display"))
            .is_some_and(|display| display == "none")
    }

    pub fn restore_state(&self) -> UiPreference {
        self.preferences.restore(&self.document)
    }

    /// Collapses or expands the panel and remembers the choice.
    pub fn toggle(&mut self) {
        if let Some(preference) = self.preferences.toggle(&self.document) {
            debug!("TOC collapsed: {}", preference.collapsed);
        }
    }

    pub fn is_collapsed(&self) -> bool {
        CollapseControls::find(&self.document)
            .is_some_and(|controls| controls.is_collapsed())
    }

    fn init_scroll<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        self.throttle.cancel();
        self.tracker = ScrollTracker::attach(&self.document, &self.config);
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.update(&self.document, viewport);
        }
    }

    /// Records a scroll event; the evaluation runs from `tick` once the page settles.
    pub fn on_scroll(&mut self, now: Instant) {
        if self.tracker.is_some() {
            self.throttle.trigger(now);
        }
    }

    /// Runs the pending scroll evaluation if its window has elapsed. Returns whether it ran.
    pub fn tick<V: Viewport + ?Sized>(&mut self, now: Instant, viewport: &mut V) -> bool {
        if !self.throttle.poll(now) {
            return false;
        }
        match self.tracker.as_mut() {
            Some(tracker) => {
                tracker.update(&self.document, viewport);
                true
            }
            None => false,
        }
    }

    /// When the pending scroll evaluation is due, for hosts that sleep between events.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    /// Handles a click on a TOC link. Default navigation is always suppressed;
    /// `None` means tracking never started and the click was not handled.
    pub fn on_link_click<V: Viewport + ?Sized>(
        &self,
        href: &str,
        viewport: &mut V,
    ) -> Option<LinkClick> {
        let tracker = self.tracker.as_ref()?;
        Some(tracker.handle_click(&self.document, href, viewport))
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        dom::serialize_node(&self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::preferences::MemoryStore;
    use crate::scroll_tracker::HeadlessViewport;
    use crate::test_utils::fake_pages::{article_page, page_with_container};
    use crate::test_utils::{ReadOnlyStore, StaticViewport};
    use std::time::Duration;

    fn controller(html: &str) -> TocController {
        let dom = parse_html(html);
        TocController::new(dom.document, TocConfig::default(), Box::new(MemoryStore::new()))
            .unwrap()
    }

    #[test]
    fn test_ready_builds_list_and_tracks() {
        let mut toc = controller(&article_page("<h2>Intro</h2><p>...</p><h2>Details</h2>"));
        toc.on_ready(&mut HeadlessViewport);

        let items: Vec<(String, String)> = toc
            .items()
            .iter()
            .map(|item| (item.class_name(), item.target_id.clone()))
            .collect();
        assert_eq!(
            items,
            vec![
                ("toc-item toc-level-2".to_string(), "intro".to_string()),
                ("toc-item toc-level-2".to_string(), "details".to_string()),
            ]
        );
        assert!(toc.is_tracking());
        assert!(!toc.is_panel_hidden());
        assert_eq!(toc.active_id(), None);
    }

    #[test]
    fn test_empty_article_hides_panel() {
        let mut toc = controller(&article_page("<p>ok</p>"));
        toc.on_ready(&mut HeadlessViewport);

        assert!(toc.items().is_empty());
        assert!(toc.is_panel_hidden());
        let list = TocRenderer::find_list(toc.document()).unwrap();
        assert!(list.children.borrow().is_empty());
    }

    #[test]
    fn test_missing_container_leaves_panel_visible() {
        let mut toc = controller(&page_with_container("<section><h2>Intro</h2></section>"));
        toc.on_ready(&mut HeadlessViewport);

        assert!(toc.items().is_empty());
        assert!(!toc.is_panel_hidden());
        assert!(!toc.is_tracking());
    }

    #[test]
    fn test_missing_list_does_not_block_restore() {
        let dom = parse_html(
            r#"<article><h2>Intro</h2></article>
               <button class="toc-toggle"></button><div class="toc-content"></div>"#,
        );
        let store = MemoryStore::new().with_value("toc-collapsed", "true");
        let mut toc =
            TocController::new(dom.document, TocConfig::default(), Box::new(store)).unwrap();

        toc.on_ready(&mut HeadlessViewport);

        assert!(toc.items().is_empty());
        assert!(toc.is_collapsed());
    }

    #[test]
    fn test_scroll_is_trailing_edge_throttled() {
        let mut toc = controller(&article_page("<h2>Intro</h2><h2>Details</h2>"));
        let mut viewport = StaticViewport::new();
        toc.on_ready(&mut viewport);

        let start = Instant::now();
        viewport.set_rect("intro", -200.0, -170.0);
        viewport.set_rect("details", 20.0, 50.0);

        toc.on_scroll(start);
        toc.on_scroll(start + Duration::from_millis(60));
        assert!(!toc.tick(start + Duration::from_millis(120), &mut viewport));
        assert_eq!(toc.active_id(), None);

        assert_eq!(toc.next_deadline(), Some(start + Duration::from_millis(160)));
        assert!(toc.tick(start + Duration::from_millis(160), &mut viewport));
        assert_eq!(toc.active_id(), Some("details"));
        assert!(!toc.tick(start + Duration::from_millis(400), &mut viewport));
    }

    #[test]
    fn test_regenerate_reattaches_tracker() {
        let mut toc = controller(&article_page("<h2>Intro</h2>"));
        let mut viewport = StaticViewport::new().with_rect("intro", 0.0, 30.0);
        toc.on_ready(&mut viewport);
        assert_eq!(toc.active_id(), Some("intro"));

        toc.generate_toc();
        let start = Instant::now();
        toc.on_scroll(start);
        assert!(toc.tick(start + Duration::from_millis(100), &mut viewport));

        let link = dom::find_by_class(toc.document(), "toc-link").unwrap();
        assert!(dom::has_class(&link, "active"));
    }

    #[test]
    fn test_toggle_survives_failed_write() {
        let dom = parse_html(&article_page("<h2>Intro</h2>"));
        let mut toc =
            TocController::new(dom.document, TocConfig::default(), Box::new(ReadOnlyStore))
                .unwrap();
        toc.on_ready(&mut HeadlessViewport);

        toc.toggle();
        assert!(toc.is_collapsed());
    }

    #[test]
    fn test_bad_selector_config() {
        let dom = parse_html("<article></article>");
        let config = TocConfig {
            content_selectors: vec!["main > article".to_string()],
            ..TocConfig::default()
        };
        assert!(TocController::new(dom.document, config, Box::new(MemoryStore::new())).is_err());
    }
}
