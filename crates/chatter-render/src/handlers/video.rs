use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::map_text_runs;
use crate::config::VideoConfig;
use crate::error::HandlerError;
use crate::handler::TextHandler;
use crate::message::Message;
use crate::record::{Node, TransformationRecord};

/// Class of the appended player elements.
pub const VIDEO_EMBED_CLASS: &str = "video-embed";

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Watch, short-link, embed and shorts URLs. Query separators appear as
/// `&amp;` in escaped text.
static VIDEO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:[^\s<#]*?&amp;)?v=|embed/|shorts/)|youtu\.be/)([a-z0-9_-]{11})",
    )
    .expect("video regex pattern is valid")
});

/// Appends a player for every distinct video linked in the text.
///
/// Every URL form of a video yields the same element, and a video linked
/// twice in one message gets one player.
#[derive(Debug, Clone)]
pub struct VideoEmbedHandler {
    width: u32,
    height: u32,
}

impl VideoEmbedHandler {
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }

    /// Returns the video IDs linked in `text`, first occurrence first.
    pub fn video_ids(&self, text: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut ids = Vec::new();
        map_text_runs(text, true, |run| {
            for caps in VIDEO_RE.captures_iter(run) {
                let Some(id) = caps.get(1) else { continue };
                let longer = run[id.end()..]
                    .chars()
                    .next()
                    .map_or(false, is_id_char);
                if !longer && seen.insert(id.as_str().to_string()) {
                    ids.push(id.as_str().to_string());
                }
            }
            run.to_string()
        });
        ids
    }

    /// Builds the player element for a video.
    pub fn player(&self, id: &str) -> Node {
        Node::new("iframe")
            .attr("class", VIDEO_EMBED_CLASS)
            .attr("width", self.width.to_string())
            .attr("height", self.height.to_string())
            .attr("src", format!("{}{}", EMBED_BASE, id))
            .attr("frameborder", "0")
            .flag("allowfullscreen")
    }
}

impl Default for VideoEmbedHandler {
    fn default() -> Self {
        Self::new(&VideoConfig::default())
    }
}

impl TextHandler for VideoEmbedHandler {
    fn transform(
        &self,
        record: TransformationRecord,
        _message: &dyn Message,
    ) -> Result<TransformationRecord, HandlerError> {
        let ids = self.video_ids(&record.text);
        tracing::trace!(videos = ids.len(), "embedding videos");
        Ok(ids
            .iter()
            .fold(record, |record, id| record.push_after(self.player(id))))
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
