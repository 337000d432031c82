//! Built-in handlers.
//!
//! | Name | Order | Opt-in | Effect |
//! |------|-------|--------|--------|
//! | `images` | 100 | yes | appends an image per bare image URL |
//! | `video` | 200 | yes | appends a player per video link |
//! | `autolinker` | 400 | no | links URLs and e-mail addresses |
//! | `emoji` | 500 | no | replaces emoticons and `:shortcodes:` with images |
//! | `newline` | 600 | no | turns line feeds into `<br/>` |
//! | `code-blocks` | 700 | no | turns backtick spans into `<pre>` and `<code>` |
//!
//! The order matters. Embeds scan the text before links wrap URLs in
//! markup; links, emoji and line breaks all run while the backtick fences
//! are still in the text, so each can step around code; code blocks run
//! last and consume the fences.
//!
//! # Text Runs
//!
//! Substituting handlers only touch *text runs*: text outside fenced spans,
//! outside markup tags and outside link content. The input was escaped
//! before the first handler, so every `<` in the text opens a tag some
//! handler produced.

mod autolink;
mod code_blocks;
mod emoji;
mod images;
mod newline;
mod video;

pub use autolink::{link, AutolinkHandler};
pub use code_blocks::{render_code, CodeBlockHandler};
pub use emoji::{EmojiHandler, EMOJI_CLASS, EMOJI_LINE_CLASS};
pub use images::{ImageEmbedHandler, EMBEDDED_IMAGE_CLASS};
pub use newline::{break_lines, NewlineHandler};
pub use video::{VideoEmbedHandler, VIDEO_EMBED_CLASS};

use chatter_fence::{Scanner, Segment};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PipelineConfig;
use crate::error::RegistryError;
use crate::handler::HandlerDescriptor;
use crate::registry::HandlerRegistry;

pub const IMAGES: &str = "images";
pub const VIDEO: &str = "video";
pub const AUTOLINKER: &str = "autolinker";
pub const EMOJI: &str = "emoji";
pub const NEWLINE: &str = "newline";
pub const CODE_BLOCKS: &str = "code-blocks";

/// Built-in names with their default order and opt-in flag.
const BUILTINS: &[(&str, i32, bool)] = &[
    (IMAGES, 100, true),
    (VIDEO, 200, true),
    (AUTOLINKER, 400, false),
    (EMOJI, 500, false),
    (NEWLINE, 600, false),
    (CODE_BLOCKS, 700, false),
];

/// Builds the descriptors of the built-in handlers enabled by `config`.
///
/// Descriptors come back in default order; overrides in `config` may
/// change order and opt-in, or leave a handler out.
pub fn builtin_descriptors(config: &PipelineConfig) -> Vec<HandlerDescriptor> {
    let mut descriptors = Vec::new();
    for &(name, order, opt_in) in BUILTINS {
        let settings = config.handlers.get(name).cloned().unwrap_or_default();
        if settings.enabled == Some(false) {
            tracing::debug!(handler = name, "built-in handler disabled by config");
            continue;
        }

        let descriptor = match name {
            IMAGES => HandlerDescriptor::new(name, ImageEmbedHandler::new(&config.images)),
            VIDEO => HandlerDescriptor::new(name, VideoEmbedHandler::new(&config.video)),
            AUTOLINKER => HandlerDescriptor::new(name, AutolinkHandler),
            EMOJI => HandlerDescriptor::new(name, EmojiHandler::new(&config.emoji)),
            NEWLINE => HandlerDescriptor::new(name, NewlineHandler),
            _ => HandlerDescriptor::new(name, CodeBlockHandler),
        }
        .with_order(settings.order.unwrap_or(order));

        let descriptor = if settings.requires_enable.unwrap_or(opt_in) {
            descriptor.requires_enable()
        } else {
            descriptor
        };
        descriptors.push(descriptor);
    }
    descriptors
}

/// Builds a registry holding the built-in handlers enabled by `config`.
pub fn builtin_registry(config: &PipelineConfig) -> Result<HandlerRegistry, RegistryError> {
    let mut registry = HandlerRegistry::new();
    for descriptor in builtin_descriptors(config) {
        registry.register(descriptor)?;
    }
    Ok(registry)
}

/// Rewrites every text run of `text` with `f`.
///
/// With `inline_code`, single-backtick spans are skipped as well as fenced
/// ones.
pub(crate) fn map_text_runs<F>(text: &str, inline_code: bool, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    map_text_runs_after(text, inline_code, |_: &str, run: &str| f(run))
}

/// Like [`map_text_runs`], but `f` also gets the output so far, which ends
/// with whatever tag or code span precedes the run.
pub(crate) fn map_text_runs_after<F>(text: &str, inline_code: bool, mut f: F) -> String
where
    F: FnMut(&str, &str) -> String,
{
    let scanner = if inline_code {
        Scanner::with_inline_code(text)
    } else {
        Scanner::new(text)
    };

    let mut output = String::with_capacity(text.len());
    for segment in scanner {
        match segment {
            Segment::Plain(plain) => walk_markup(&mut output, plain, &mut f),
            code => output.push_str(code.source()),
        }
    }
    output
}

/// Rewrites the text between tags of `plain` with `f`, leaving tags and
/// link content untouched. Backticks in `plain` are ordinary text.
pub(crate) fn map_markup_runs<F>(plain: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut output = String::with_capacity(plain.len());
    walk_markup(&mut output, plain, &mut |_: &str, run: &str| f(run));
    output
}

fn walk_markup<F>(output: &mut String, plain: &str, f: &mut F)
where
    F: FnMut(&str, &str) -> String,
{
    let mut anchor_depth = 0usize;
    let mut rest = plain;

    while let Some(open) = rest.find('<') {
        let (before, tail) = rest.split_at(open);
        push_run(output, before, anchor_depth, &mut *f);

        let close = tail.find('>').map_or(tail.len(), |end| end + 1);
        let tag = &tail[..close];
        if is_anchor_open(tag) {
            anchor_depth += 1;
        } else if tag.starts_with("</a") {
            anchor_depth = anchor_depth.saturating_sub(1);
        }
        output.push_str(tag);
        rest = &tail[close..];
    }

    push_run(output, rest, anchor_depth, f);
}

fn push_run<F>(output: &mut String, run: &str, anchor_depth: usize, f: &mut F)
where
    F: FnMut(&str, &str) -> String,
{
    if run.is_empty() {
        return;
    }
    if anchor_depth > 0 {
        output.push_str(run);
    } else {
        let mapped = f(output.as_str(), run);
        output.push_str(&mapped);
    }
}

fn is_anchor_open(tag: &str) -> bool {
    tag == "<a>" || tag.starts_with("<a ")
}

/// Candidate web URLs in escaped text.
static WEB_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bhttps?://[^\s<]+").expect("web URL regex pattern is valid")
});

/// Entities that never belong to a URL in escaped text: they stand for
/// quotes and angle brackets around it.
const URL_STOP_ENTITIES: &[&str] = &["&quot;", "&lt;", "&gt;"];

/// Characters dropped from the end of a URL match. A trailing `;` is
/// handled separately since it may close an entity.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', '!', '?', ']', '}'];

/// Cuts a URL match down to the URL proper.
///
/// The match is cut at the first quote or bracket entity; trailing
/// punctuation, a trailing `&#39;` and unbalanced closing parentheses are
/// dropped.
pub(crate) fn trim_url(candidate: &str) -> &str {
    let mut url = candidate;
    if let Some(stop) = URL_STOP_ENTITIES
        .iter()
        .filter_map(|entity| url.find(entity))
        .min()
    {
        url = &url[..stop];
    }

    loop {
        let before = url.len();
        if let Some(stripped) = url.strip_suffix("&#39;") {
            url = stripped;
        }
        url = url.trim_end_matches(TRAILING_PUNCTUATION);
        if url.ends_with(';') && !ends_with_entity(url) {
            url = &url[..url.len() - 1];
        }
        if url.ends_with(')') && url.matches(')').count() > url.matches('(').count() {
            url = &url[..url.len() - 1];
        }
        if url.len() == before {
            return url;
        }
    }
}

/// Returns `true` if `text` ends with a character entity such as `&amp;`.
fn ends_with_entity(text: &str) -> bool {
    let Some(body) = text.strip_suffix(';') else {
        return false;
    };
    let Some(amp) = body.rfind('&') else {
        return false;
    };
    let name = &body[amp + 1..];
    let name = name.strip_prefix('#').unwrap_or(name);
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Finds the web URLs in a text run, as `(start, end)` byte ranges.
pub(crate) fn find_web_urls(run: &str) -> Vec<(usize, usize)> {
    WEB_URL_RE
        .find_iter(run)
        .filter_map(|m| {
            let url = trim_url(m.as_str());
            (url.len() > url.find("://").map_or(0, |i| i + 3))
                .then(|| (m.start(), m.start() + url.len()))
        })
        .collect()
}
