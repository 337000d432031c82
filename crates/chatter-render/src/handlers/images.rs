use super::{find_web_urls, map_text_runs};
use crate::config::ImageConfig;
use crate::error::HandlerError;
use crate::escape::unescape_html;
use crate::handler::TextHandler;
use crate::message::Message;
use crate::record::{Node, TransformationRecord};

/// Class of the appended image elements.
pub const EMBEDDED_IMAGE_CLASS: &str = "embedded-image";

/// Appends an image element for every bare image URL in the text.
///
/// A URL counts as an image when its path, before any query or fragment,
/// ends in one of the configured extensions. Images are appended in the
/// order their URLs appear, once per occurrence.
#[derive(Debug, Clone)]
pub struct ImageEmbedHandler {
    /// Lowercased, without the dot.
    extensions: Vec<String>,
    strip_urls: bool,
}

impl ImageEmbedHandler {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            strip_urls: config.strip_urls,
        }
    }

    /// Returns `true` if `url` points at a file with an image extension.
    pub fn is_image_url(&self, url: &str) -> bool {
        let address = url.split(&['?', '#'][..]).next().unwrap_or(url);
        let address = address
            .find("://")
            .map_or(address, |scheme| &address[scheme + 3..]);
        // The host never names a file.
        let Some((_, path)) = address.split_once('/') else {
            return false;
        };
        let Some((_, extension)) = path.rsplit_once('.') else {
            return false;
        };
        !extension.contains('/')
            && self
                .extensions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
    }

    /// Collects image elements for `text` and returns them with the text to
    /// keep.
    fn embed(&self, text: &str) -> (String, Vec<Node>) {
        let mut nodes = Vec::new();
        let kept = map_text_runs(text, true, |run| {
            let mut output = String::with_capacity(run.len());
            let mut copied = 0;
            for (start, end) in find_web_urls(run) {
                let url = &run[start..end];
                if !self.is_image_url(url) {
                    continue;
                }
                nodes.push(
                    Node::new("img")
                        .attr("class", EMBEDDED_IMAGE_CLASS)
                        .attr("src", unescape_html(url)),
                );
                if self.strip_urls {
                    output.push_str(&run[copied..start]);
                    copied = end;
                }
            }
            output.push_str(&run[copied..]);
            output
        });
        (kept, nodes)
    }
}

impl Default for ImageEmbedHandler {
    fn default() -> Self {
        Self::new(&ImageConfig::default())
    }
}

impl TextHandler for ImageEmbedHandler {
    fn transform(
        &self,
        record: TransformationRecord,
        _message: &dyn Message,
    ) -> Result<TransformationRecord, HandlerError> {
        let (text, nodes) = self.embed(&record.text);
        tracing::trace!(images = nodes.len(), "embedding images");
        Ok(nodes
            .into_iter()
            .fold(record.with_text(text), |record, node| record.push_after(node)))
    }
}
