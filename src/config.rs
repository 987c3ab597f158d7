use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONTENT_SELECTORS: [&str; 6] = [
    "article.md-text .content",
    "article.content",
    ".article-content",
    ".post-content",
    ".entry-content",
    "article",
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TocConfig {
    /// Article container candidates, probed in order.
    pub content_selectors: Vec<String>,
    /// Headings at or above this distance from the viewport top count as passed.
    pub active_threshold_px: f64,
    /// Space reserved for a fixed page header when jumping to a heading.
    pub header_offset_px: f64,
    pub throttle_ms: u64,
    pub storage_key: String,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            content_selectors: DEFAULT_CONTENT_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            active_threshold_px: 100.0,
            header_offset_px: 60.0,
            throttle_ms: 100,
            storage_key: "toc-collapsed".to_string(),
        }
    }
}

impl TocConfig {
    pub fn load_or_default(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load config from {path}: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(file_path);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str::<Self>(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;
        config.selectors()?;
        Ok(config)
    }

    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn selectors(&self) -> anyhow::Result<Vec<Selector>> {
        self.content_selectors
            .iter()
            .map(|s| Selector::parse(s).map_err(anyhow::Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TocConfig::default();
        assert_eq!(config.content_selectors.len(), 6);
        assert_eq!(config.content_selectors[0], "article.md-text .content");
        assert_eq!(config.content_selectors[5], "article");
        assert_eq!(config.active_threshold_px, 100.0);
        assert_eq!(config.header_offset_px, 60.0);
        assert_eq!(config.throttle_window(), Duration::from_millis(100));
        assert_eq!(config.storage_key, "toc-collapsed");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"header_offset_px": 80, "storage_key": "blog-toc"}}"#).unwrap();

        let config = TocConfig::load_from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.header_offset_px, 80.0);
        assert_eq!(config.storage_key, "blog-toc");
        assert_eq!(config.throttle_ms, 100);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let config = TocConfig::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config, TocConfig::default());
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"content_selectors": ["main > article"]}}"#).unwrap();

        let path = file.path().to_str().unwrap().to_string();
        assert!(TocConfig::load_from_file(&path).is_err());
        assert_eq!(TocConfig::load_or_default(Some(&path)), TocConfig::default());
    }
}
