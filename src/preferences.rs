use crate::dom::{self, Handle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const TOC_CONTENT_CLASS: &str = "toc-content";
pub const TOC_TOGGLE_CLASS: &str = "toc-toggle";
pub const COLLAPSED_CLASS: &str = "collapsed";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse store file {path}: {source}")]
    Malformed {
        path: String,
        source: serde_json::Error,
    },
    #[error("failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable string storage, the host's equivalent of `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A flat JSON object on disk. Every write is saved immediately.
#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonFileStore {
    values: BTreeMap<String, String>,

    #[serde(skip)]
    file_path: Option<String>,
}

impl JsonFileStore {
    pub fn ephemeral() -> Self {
        Self {
            values: BTreeMap::new(),
            file_path: None,
        }
    }

    pub fn with_file(file_path: &str) -> Self {
        Self {
            values: BTreeMap::new(),
            file_path: Some(file_path.to_string()),
        }
    }

    pub fn load_or_ephemeral(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load TOC state from {path}: {e}");
                Self::with_file(path)
            }),
            None => Self::ephemeral(),
        }
    }

    pub fn load_from_file(file_path: &str) -> Result<Self, StoreError> {
        let path = Path::new(file_path);
        if !path.exists() {
            return Ok(Self::with_file(file_path));
        }

        let content = fs::read_to_string(path)?;
        let mut store =
            serde_json::from_str::<Self>(&content).map_err(|source| StoreError::Malformed {
                path: file_path.to_string(),
                source,
            })?;
        store.file_path = Some(file_path.to_string());
        Ok(store)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        match &self.file_path {
            Some(path) => {
                let content = serde_json::to_string_pretty(self)?;
                fs::write(path, content)?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiPreference {
    pub collapsed: bool,
}

impl UiPreference {
    /// Only the exact string `"true"` means collapsed.
    pub fn from_stored(value: Option<&str>) -> Self {
        Self {
            collapsed: value == Some("true"),
        }
    }

    pub fn as_stored(&self) -> &'static str {
        if self.collapsed { "true" } else { "false" }
    }
}

/// The panel body and its toggle button, which collapse together.
#[derive(Debug, Clone)]
pub struct CollapseControls {
    content: Handle,
    toggle: Handle,
}

impl CollapseControls {
    pub fn find(document: &Handle) -> Option<Self> {
        Some(Self {
            content: dom::find_by_class(document, TOC_CONTENT_CLASS)?,
            toggle: dom::find_by_class(document, TOC_TOGGLE_CLASS)?,
        })
    }

    pub fn is_collapsed(&self) -> bool {
        dom::has_class(&self.content, COLLAPSED_CLASS)
    }

    /// Flips both elements; the panel body decides the resulting state.
    pub fn toggle(&self) -> UiPreference {
        dom::toggle_class(&self.content, COLLAPSED_CLASS);
        dom::toggle_class(&self.toggle, COLLAPSED_CLASS);
        UiPreference {
            collapsed: self.is_collapsed(),
        }
    }

    pub fn collapse(&self) {
        dom::add_class(&self.content, COLLAPSED_CLASS);
        dom::add_class(&self.toggle, COLLAPSED_CLASS);
    }
}

/// Collapsed/expanded preference of the TOC panel.
pub struct PreferenceStore {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl PreferenceStore {
    pub fn new(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn stored(&self) -> UiPreference {
        UiPreference::from_stored(self.store.get(&self.key).as_deref())
    }

    pub fn raw_value(&self) -> Option<String> {
        self.store.get(&self.key)
    }

    /// Applies a stored collapsed state to the page. Expanded needs no change.
    pub fn restore(&self, document: &Handle) -> UiPreference {
        let preference = self.stored();
        if preference.collapsed {
            match CollapseControls::find(document) {
                Some(controls) => controls.collapse(),
                None => log::debug!("Collapse controls missing, preference not applied"),
            }
        }
        preference
    }

    /// Flips the panel and persists the new state. `None` when the controls are missing.
    pub fn toggle(&mut self, document: &Handle) -> Option<UiPreference> {
        let Some(controls) = CollapseControls::find(document) else {
            log::debug!("Collapse controls missing, toggle ignored");
            return None;
        };

        let preference = controls.toggle();
        if let Err(e) = self.store.set(&self.key, preference.as_stored()) {
            log::error!("Failed to save TOC preference: {e}");
        }
        Some(preference)
    }
}
