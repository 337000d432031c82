//! Emoticon and shortcode replacement.
//!
//! Codes are matched in their escaped form, since the pipeline escapes the
//! body before any handler runs: `<3` is looked for as `&lt;3`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::map_text_runs_after;
use crate::config::EmojiConfig;
use crate::error::HandlerError;
use crate::escape::escape_html;
use crate::handler::TextHandler;
use crate::message::Message;
use crate::record::{Node, TransformationRecord};

/// Class of every emoji image.
pub const EMOJI_CLASS: &str = "emoji";

/// Extra class given to emoji images in a message made only of emoji.
pub const EMOJI_LINE_CLASS: &str = "emoji-line";

/// Emoticons and their codepoints. They only match standing alone.
const EMOTICONS: &[(&str, &str)] = &[
    (":)", "1f642"),
    (":-)", "1f642"),
    (":D", "1f603"),
    (":-D", "1f603"),
    (";)", "1f609"),
    (";-)", "1f609"),
    (":P", "1f61b"),
    (":-P", "1f61b"),
    (":p", "1f61b"),
    (":-p", "1f61b"),
    (":(", "1f61e"),
    (":-(", "1f61e"),
    (":'(", "1f622"),
    (":O", "1f62e"),
    (":-O", "1f62e"),
    (":o", "1f62e"),
    ("<3", "2764"),
    ("</3", "1f494"),
    (":|", "1f610"),
    (":-/", "1f615"),
    ("B-)", "1f60e"),
];

/// Shortcode names and their codepoints. `:name:` matches anywhere.
const SHORTCODES: &[(&str, &str)] = &[
    ("smile", "1f604"),
    ("smiley", "1f603"),
    ("grin", "1f601"),
    ("joy", "1f602"),
    ("wink", "1f609"),
    ("blush", "1f60a"),
    ("heart_eyes", "1f60d"),
    ("kissing_heart", "1f618"),
    ("stuck_out_tongue", "1f61b"),
    ("sunglasses", "1f60e"),
    ("thinking", "1f914"),
    ("neutral_face", "1f610"),
    ("confused", "1f615"),
    ("disappointed", "1f61e"),
    ("cry", "1f622"),
    ("sob", "1f62d"),
    ("open_mouth", "1f62e"),
    ("angry", "1f620"),
    ("rage", "1f621"),
    ("heart", "2764"),
    ("broken_heart", "1f494"),
    ("thumbsup", "1f44d"),
    ("+1", "1f44d"),
    ("thumbsdown", "1f44e"),
    ("-1", "1f44e"),
    ("clap", "1f44f"),
    ("wave", "1f44b"),
    ("ok_hand", "1f44c"),
    ("pray", "1f64f"),
    ("muscle", "1f4aa"),
    ("eyes", "1f440"),
    ("fire", "1f525"),
    ("tada", "1f389"),
    ("rocket", "1f680"),
    ("star", "2b50"),
    ("sparkles", "2728"),
    ("zap", "26a1"),
    ("sunny", "2600"),
    ("coffee", "2615"),
    ("beer", "1f37a"),
    ("pizza", "1f355"),
    ("cake", "1f370"),
    ("100", "1f4af"),
    ("warning", "26a0"),
    ("white_check_mark", "2705"),
    ("x", "274c"),
    ("question", "2753"),
];

/// Characters that may follow a standalone emoticon.
const EMOTICON_TRAILERS: &[char] = &['.', ',', '!', '?', ';', ':'];

struct Emoji {
    /// The code as typed, used for `alt`.
    code: String,
    codepoint: &'static str,
    emoticon: bool,
}

struct EmojiTable {
    pattern: Regex,
    /// Keyed by escaped code.
    entries: HashMap<String, Emoji>,
}

static TABLE: Lazy<EmojiTable> = Lazy::new(|| {
    let emoticons = EMOTICONS
        .iter()
        .map(|&(code, codepoint)| (code.to_string(), codepoint, true));
    let shortcodes = SHORTCODES
        .iter()
        .map(|&(name, codepoint)| (format!(":{}:", name), codepoint, false));

    let mut entries = HashMap::new();
    for (code, codepoint, emoticon) in emoticons.chain(shortcodes) {
        entries.insert(
            escape_html(&code),
            Emoji {
                code,
                codepoint,
                emoticon,
            },
        );
    }

    // Alternation is leftmost-first, so longer codes go first.
    let mut keys: Vec<&String> = entries.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let alternation = keys
        .iter()
        .map(|key| regex::escape(key))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = Regex::new(&alternation).expect("emoji pattern is valid");

    EmojiTable { pattern, entries }
});

static EMOJI_IMG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<img class="emoji[^"]*"[^>]*/>|<br/>"#).expect("emoji image pattern is valid")
});

/// Replaces emoticons and `:shortcodes:` in text runs with emoji images.
#[derive(Debug, Clone)]
pub struct EmojiHandler {
    image_base_url: String,
    image_extension: String,
}

impl EmojiHandler {
    pub fn new(config: &EmojiConfig) -> Self {
        Self {
            image_base_url: config.image_base_url.clone(),
            image_extension: config.image_extension.clone(),
        }
    }

    /// Replaces every emoji code in `text`.
    ///
    /// If the message turns out to hold nothing but emoji and line breaks,
    /// the images also get [`EMOJI_LINE_CLASS`].
    pub fn replace(&self, text: &str) -> String {
        let mut replaced = 0usize;
        let output = map_text_runs_after(text, true, |before, run| {
            self.replace_run(run, opens_fresh(before), &mut replaced)
        });

        if replaced > 0 && is_emoji_only(&output) {
            let line_class = format!(r#"class="{} {}""#, EMOJI_CLASS, EMOJI_LINE_CLASS);
            return output.replace(&format!(r#"class="{}""#, EMOJI_CLASS), &line_class);
        }
        output
    }

    /// `fresh` tells whether an emoticon may start right at the beginning
    /// of `run`.
    fn replace_run(&self, run: &str, fresh: bool, replaced: &mut usize) -> String {
        let mut output = String::with_capacity(run.len());
        let mut copied = 0;
        let mut pos = 0;

        while let Some(m) = TABLE.pattern.find_at(run, pos) {
            let Some(emoji) = TABLE.entries.get(m.as_str()) else {
                pos = m.end();
                continue;
            };
            // A replaced emoji counts as a boundary, as it will once it is a tag.
            let boundary = if m.start() == 0 {
                fresh
            } else {
                copied > 0 && m.start() == copied
            };
            if emoji.emoticon && !stands_alone(run, m.start(), m.end(), boundary) {
                // Every code starts with an ASCII character.
                pos = m.start() + 1;
                continue;
            }

            output.push_str(&run[copied..m.start()]);
            output.push_str(&self.image(emoji));
            copied = m.end();
            pos = m.end();
            *replaced += 1;
        }

        output.push_str(&run[copied..]);
        output
    }

    fn image(&self, emoji: &Emoji) -> String {
        let src = format!(
            "{}{}.{}",
            self.image_base_url, emoji.codepoint, self.image_extension
        );
        Node::new("img")
            .attr("class", EMOJI_CLASS)
            .attr("src", src)
            .attr("alt", emoji.code.as_str())
            .to_html()
    }
}

impl Default for EmojiHandler {
    fn default() -> Self {
        Self::new(&EmojiConfig::default())
    }
}

impl TextHandler for EmojiHandler {
    fn transform(
        &self,
        record: TransformationRecord,
        _message: &dyn Message,
    ) -> Result<TransformationRecord, HandlerError> {
        let text = self.replace(&record.text);
        Ok(record.with_text(text))
    }
}

fn stands_alone(run: &str, start: usize, end: usize, boundary: bool) -> bool {
    let before = run[..start].chars().next_back();
    let after = run[end..].chars().next();
    (boundary || before.map_or(false, char::is_whitespace))
        && after.map_or(true, |c| c.is_whitespace() || EMOTICON_TRAILERS.contains(&c))
}

/// Returns `true` if a run following `output` starts a word: at the start
/// of the message, after a line break or after an emoji image.
fn opens_fresh(output: &str) -> bool {
    if output.is_empty() || output.ends_with("<br/>") {
        return true;
    }
    output.ends_with("/>")
        && output
            .rfind('<')
            .map_or(false, |open| output[open..].starts_with(r#"<img class="emoji"#))
}

fn is_emoji_only(text: &str) -> bool {
    EMOJI_IMG_RE.replace_all(text, "").trim().is_empty()
}
