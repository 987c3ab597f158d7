//! HTML fixtures shaped like the blog theme's article pages.

/// The TOC panel markup the theme places next to an article.
pub const TOC_PANEL: &str = r#"<aside id="article-toc" class="article-toc">
  <div class="toc-header"><span>Contents</span><button class="toc-toggle"></button></div>
  <div class="toc-content"><ul class="toc-list"></ul></div>
</aside>"#;

/// A full page with the TOC panel and `article_body` inside `article.md-text .content`.
pub fn article_page(article_body: &str) -> String {
    page_with_container(&format!(
        r#"<article class="md-text"><div class="content">{article_body}</div></article>"#
    ))
}

/// A full page with the TOC panel and an arbitrary content container.
pub fn page_with_container(container: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>Post</title></head>
<body>
<header class="site-header"><h1 class="site-title">My Blog</h1></header>
<main>{container}</main>
{TOC_PANEL}
</body></html>"#
    )
}

/// Page whose article uses bold paragraphs instead of heading tags.
pub fn plain_paragraph_page() -> String {
    article_page(
        r#"<p>Background</p>
<p>We started this project after noticing how long builds had become over the last year.</p>
<p>实现细节</p>
<p>The details are mostly about caching and incremental compilation in the CI pipeline.</p>
<div>Results so far</div>"#,
    )
}
