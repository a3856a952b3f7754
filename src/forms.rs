use crate::paste::{Draft, SaveKind};
use serde::Serialize;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SaveForm {
    pub title: String,
    pub content: String,
    pub display_mode: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irc_channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_privmsg: Option<String>,
}

impl SaveForm {
    pub fn new(draft: &Draft, content: String, kind: SaveKind) -> Self {
        // Only save-and-post carries the channel
        let irc_channel = match kind {
            SaveKind::SaveAndPost => draft.irc_channel.clone(),
            _ => None,
        };

        SaveForm {
            title: draft.title.clone(),
            content,
            display_mode: draft.display_mode.index(),
            irc_channel,
            post_receiver: non_empty(&draft.receiver),
            post_sender: non_empty(&draft.sender),
            post_privmsg: draft.privmsg.then(|| "true".to_string()),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
