//! File-share link handling
//!
//! Two pieces: the rewrite applied to every text segment the model returns,
//! and [`CallHook`], the extension point for rules that react to specific
//! tool calls. [`DriveShareLink`] is the one shipped rule.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{scalar_text, Message, ToolCall, ToolExecutionResult};

static SHARE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https://drive\.google\.com/\S+").expect("share link pattern is valid"));

/// Render a URL as a clickable annotation
pub fn clickable(url: &str) -> String {
    format!("[Click to view file]({})", url)
}

/// Rewrite the first Drive link found in `text` into a clickable annotation
///
/// Every occurrence of that exact URL is rewritten; the rest of the text is
/// kept verbatim.
pub fn rewrite_share_link(text: &str) -> String {
    match SHARE_LINK.find(text) {
        Some(found) => {
            let url = found.as_str();
            text.replace(url, &clickable(url))
        }
        None => text.to_string(),
    }
}

/// What a hook adds to the turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookOutput {
    /// Lines appended to the response list
    pub responses: Vec<String>,
    /// Messages appended to the conversation before the tool result
    pub messages: Vec<Message>,
}

impl HookOutput {
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty() && self.messages.is_empty()
    }
}

/// Rule run after every dispatched tool call
pub trait CallHook: Send + Sync {
    fn name(&self) -> &str;

    fn after_call(&self, call: &ToolCall, result: &ToolExecutionResult) -> HookOutput;
}

/// Synthesizes a shareable link for `drive_share` calls
///
/// Runs whenever the call carries a `fileId`, whatever the provider
/// returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriveShareLink;

impl DriveShareLink {
    pub const TOOL: &'static str = "drive_share";

    pub fn link_for(file_id: &str) -> String {
        format!(
            "https://drive.google.com/file/d/{}/view?usp=sharing",
            file_id
        )
    }
}

impl CallHook for DriveShareLink {
    fn name(&self) -> &str {
        "drive_share_link"
    }

    fn after_call(&self, call: &ToolCall, _result: &ToolExecutionResult) -> HookOutput {
        if call.name != Self::TOOL {
            return HookOutput::default();
        }
        let Some(file_id) = call.get_arg("fileId") else {
            return HookOutput::default();
        };

        let link = Self::link_for(&scalar_text(file_id));
        HookOutput {
            responses: vec![clickable(&link)],
            messages: vec![Message::assistant(link)],
        }
    }
}
