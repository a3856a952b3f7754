pub mod api;
pub mod config;
pub mod controller;
pub mod forms;
pub mod paste;
pub mod recipients;
pub mod render;
pub mod runtime;
pub mod session;
pub mod templates;

pub use api::{ApiError, HttpPasteService, PasteService, UploadProgress};
pub use controller::{InitialView, ListedPaste, PasteEditor, SaveOutcome, View, ViewMode};
pub use paste::{ContentSource, DisplayMode, Draft, PostId, SaveKind};
