use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DISPLAY_MODES: [&str; 3] = ["Markdown", "Plain Code", "Plain Text"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Markdown,
    PlainCode,
    PlainText,
}

impl DisplayMode {
    pub fn index(self) -> u8 {
        match self {
            DisplayMode::Markdown => 0,
            DisplayMode::PlainCode => 1,
            DisplayMode::PlainText => 2,
        }
    }

    pub fn from_index(index: u8) -> Self {
        match index {
            1 => DisplayMode::PlainCode,
            2 => DisplayMode::PlainText,
            // Anything we don't know about renders as markdown
            _ => DisplayMode::Markdown,
        }
    }

    pub fn label(self) -> &'static str {
        DISPLAY_MODES[self.index() as usize]
    }
}

impl From<String> for DisplayMode {
    fn from(mode: String) -> Self {
        let mode = mode.trim();
        if let Ok(index) = mode.parse::<u8>() {
            return DisplayMode::from_index(index);
        }

        match mode.to_lowercase().replace(['_', '-'], " ").as_str() {
            "plain code" => DisplayMode::PlainCode,
            "plain text" => DisplayMode::PlainText,
            _ => DisplayMode::Markdown,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Server-assigned paste identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PostId(String);

impl PostId {
    /// Builds an id from a raw server response, `None` when the body is blank.
    pub fn parse(response: &str) -> Option<Self> {
        let id = response.trim();
        if id.is_empty() {
            None
        } else {
            Some(PostId(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the paste body lives while it is being edited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentSource {
    /// Plain text field owned by the controller.
    Inline(String),
    /// Buffer written to disk by an external editor, read on demand.
    External(PathBuf),
}

impl Default for ContentSource {
    fn default() -> Self {
        ContentSource::Inline(String::new())
    }
}

impl ContentSource {
    pub async fn read(&self) -> std::io::Result<String> {
        match self {
            ContentSource::Inline(text) => Ok(text.clone()),
            ContentSource::External(path) => tokio::fs::read_to_string(path).await,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveKind {
    Save,
    Autosave,
    SaveAndPost,
}

impl SaveKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            SaveKind::Autosave => "autosave",
            SaveKind::Save | SaveKind::SaveAndPost => "save",
        }
    }

    pub fn is_autosave(self) -> bool {
        self == SaveKind::Autosave
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    EmptyContent,
    EmptyTitle,
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::EmptyContent => "Enter some content to the post",
            ValidationError::EmptyTitle => "Specify a title",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Draft {
    pub title: String,
    pub content: ContentSource,
    pub display_mode: DisplayMode,
    pub irc_channel: Option<String>,
    pub receiver: Option<String>,
    pub sender: Option<String>,
    pub privmsg: bool,
}

impl Draft {
    pub fn new(title: &str, content: &str) -> Self {
        Draft {
            title: title.to_string(),
            content: ContentSource::Inline(content.to_string()),
            ..Draft::default()
        }
    }

    /// Content is checked before the title, so an empty draft reports the content first.
    pub fn validate(&self, content: &str) -> Result<(), ValidationError> {
        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }
}
