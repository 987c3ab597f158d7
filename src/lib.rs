pub mod config;
pub mod controller;
pub mod dom;
pub mod inputs;
pub mod panic_handler;
pub mod parsing;
pub mod preferences;
pub mod scroll_tracker;
pub mod selector;
pub mod slug;
pub mod toc_renderer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use controller::TocController;
