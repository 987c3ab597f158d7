use article_toc::config::TocConfig;
use article_toc::controller::TocController;
use article_toc::dom::{self, parse_html};
use article_toc::preferences::MemoryStore;
use article_toc::scroll_tracker::HeadlessViewport;
use article_toc::test_utils::fake_pages::{article_page, page_with_container, plain_paragraph_page};
use std::collections::HashSet;

fn ready(html: &str) -> TocController {
    let page = parse_html(html);
    let mut toc =
        TocController::new(page.document, TocConfig::default(), Box::new(MemoryStore::new()))
            .unwrap();
    toc.on_ready(&mut HeadlessViewport);
    toc
}

fn rendered_links(toc: &TocController) -> Vec<(String, String, String)> {
    dom::find_all_by_class(toc.document(), "toc-link")
        .iter()
        .map(|link| {
            let li = dom::parent(link).unwrap();
            (
                dom::get_attr(&li, "class").unwrap(),
                dom::get_attr(link, "href").unwrap(),
                dom::text_content(link),
            )
        })
        .collect()
}

#[test]
fn intro_and_details_scenario() {
    let toc = ready(&article_page("<h2>Intro</h2><p>...</p><h2>Details</h2>"));

    assert_eq!(
        rendered_links(&toc),
        vec![
            (
                "toc-item toc-level-2".to_string(),
                "#intro".to_string(),
                "Intro".to_string()
            ),
            (
                "toc-item toc-level-2".to_string(),
                "#details".to_string(),
                "Details".to_string()
            ),
        ]
    );
}

#[test]
fn one_unique_entry_per_heading_in_order() {
    let toc = ready(&article_page(
        r#"<h1>Overview</h1>
           <h2>Setup</h2><p>text</p>
           <h3>Setup</h3>
           <h2 id="kept-id">Configuration</h2>
           <h3>???</h3>
           <h2>配置 文件</h2>"#,
    ));

    let ids: Vec<&str> = toc.entries().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["overview", "setup", "heading-2", "kept-id", "heading-4", "配置-文件"]
    );
    let levels: Vec<u8> = toc.entries().iter().map(|e| e.level).collect();
    assert_eq!(levels, vec![1, 2, 3, 2, 3, 2]);

    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());

    for item in toc.items() {
        let matches = dom::descendant_elements(toc.document())
            .iter()
            .filter(|el| dom::get_attr(el, "id").as_deref() == Some(item.target_id.as_str()))
            .count();
        assert_eq!(matches, 1, "target {} must resolve once", item.target_id);
    }
}

#[test]
fn site_header_heading_is_not_listed() {
    let toc = ready(&article_page("<h2>Only</h2>"));
    let labels: Vec<&str> = toc.items().iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["Only"]);
}

#[test]
fn fallback_entries_render_at_level_two() {
    let toc = ready(&plain_paragraph_page());

    assert_eq!(
        rendered_links(&toc),
        vec![
            (
                "toc-item toc-level-2".to_string(),
                "#background".to_string(),
                "Background".to_string()
            ),
            (
                "toc-item toc-level-2".to_string(),
                "#实现细节".to_string(),
                "实现细节".to_string()
            ),
            (
                "toc-item toc-level-2".to_string(),
                "#results-so-far".to_string(),
                "Results so far".to_string()
            ),
        ]
    );
    let promoted = dom::find_by_id(toc.document(), "background").unwrap();
    assert!(dom::is_element(&promoted, "p"));
}

#[test]
fn no_headings_hides_panel() {
    let toc = ready(&article_page("<p>ok</p><p>1234 numbers first</p>"));

    assert!(toc.is_panel_hidden());
    assert!(toc.items().is_empty());
    let list = dom::find_by_class(toc.document(), "toc-list").unwrap();
    assert!(list.children.borrow().is_empty());

    let html = toc.to_html().unwrap();
    assert!(html.contains(r#"style="display: none;""#), "{html}");
}

#[test]
fn alternate_container_selectors() {
    for container in [
        r#"<article class="content"><h2>Found</h2></article>"#,
        r#"<div class="article-content"><h2>Found</h2></div>"#,
        r#"<div class="post-content"><h2>Found</h2></div>"#,
        r#"<div class="entry-content"><h2>Found</h2></div>"#,
        r#"<article><h2>Found</h2></article>"#,
    ] {
        let toc = ready(&page_with_container(container));
        assert_eq!(toc.items().len(), 1, "container {container}");
    }
}

#[test]
fn regenerating_is_idempotent() {
    let mut toc = ready(&article_page("<h2>Intro</h2><h2>Details</h2>"));
    let before = toc.to_html().unwrap();

    toc.generate_toc();
    toc.generate_toc();

    assert_eq!(toc.items().len(), 2);
    assert_eq!(toc.to_html().unwrap(), before);
}

#[test]
fn custom_selectors_from_config() {
    let page = parse_html(r#"<main class="docs"><h2>Custom</h2></main><ul class="toc-list"></ul>"#);
    let config = TocConfig {
        content_selectors: vec!["main.docs".to_string()],
        ..TocConfig::default()
    };
    let mut toc = TocController::new(page.document, config, Box::new(MemoryStore::new())).unwrap();
    toc.on_ready(&mut HeadlessViewport);

    assert_eq!(toc.items()[0].target_id, "custom");
}
