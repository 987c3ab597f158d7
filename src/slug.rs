use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Runs of anything that is not an ASCII word character or a CJK ideograph.
static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\x{4e00}-\x{9fa5}]+").unwrap());

/// Derives an anchor id from heading text.
///
/// Returns an empty string when nothing usable survives; callers fall back
/// to a positional id in that case.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

pub fn fallback_id(index: usize) -> String {
    format!("heading-{index}")
}

/// Hands out heading ids that stay unique within one document.
#[derive(Debug, Default)]
pub struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    pub fn with_taken<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            taken: ids.into_iter().collect(),
        }
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    /// Slug of `text`, or `heading-<index>` when the slug is empty or already used.
    pub fn allocate(&mut self, text: &str, index: usize) -> String {
        let slug = slugify(text);
        let id = if !slug.is_empty() && !self.taken.contains(&slug) {
            slug
        } else {
            let base = fallback_id(index);
            let mut candidate = base.clone();
            let mut suffix = 1;
            while self.taken.contains(&candidate) {
                candidate = format!("{base}-{suffix}");
                suffix += 1;
            }
            candidate
        };
        self.taken.insert(id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_ascii() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("  What's new in v2.0?  "), "what-s-new-in-v2-0");
        assert_eq!(slugify("snake_case_stays"), "snake_case_stays");
    }

    #[test]
    fn test_slugify_keeps_cjk_ideographs() {
        assert_eq!(slugify("第一章 简介"), "第一章-简介");
        assert_eq!(slugify("Rust 入门!"), "rust-入门");
    }

    #[test]
    fn test_slugify_empty_when_nothing_usable() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("Ñandú"), "and");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn test_slugify_is_deterministic() {
        let text = "Deploying to Production";
        assert_eq!(slugify(text), slugify(text));
        assert_eq!(slugify(&slugify(text)), slugify(text));
    }

    #[test]
    fn test_allocator_resolves_collisions() {
        let mut ids = IdAllocator::with_taken(vec!["heading-2".to_string()]);

        assert_eq!(ids.allocate("Intro", 0), "intro");
        assert_eq!(ids.allocate("Intro", 1), "heading-1");
        assert_eq!(ids.allocate("???", 2), "heading-2-1");
        assert!(ids.is_taken("intro"));
    }
}
