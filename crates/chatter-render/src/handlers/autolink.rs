use once_cell::sync::Lazy;
use regex::Regex;

use super::{map_text_runs, trim_url};
use crate::error::HandlerError;
use crate::handler::TextHandler;
use crate::message::Message;
use crate::record::TransformationRecord;

static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?P<url>\b(?:https?://|www\.)[^\s<]+)|(?P<email>\b[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b)",
    )
    .expect("link regex pattern is valid")
});

/// Wraps web URLs and e-mail addresses in links.
///
/// Web links open in a new tab; `www.` addresses without a scheme link to
/// `http://`. Text already inside a link or inside code is left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutolinkHandler;

impl TextHandler for AutolinkHandler {
    fn transform(
        &self,
        record: TransformationRecord,
        _message: &dyn Message,
    ) -> Result<TransformationRecord, HandlerError> {
        let text = link(&record.text);
        Ok(record.with_text(text))
    }
}

/// Links every URL and e-mail address in the text runs of `text`.
pub fn link(text: &str) -> String {
    map_text_runs(text, true, link_run)
}

fn link_run(run: &str) -> String {
    let mut output = String::with_capacity(run.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(caps) = LINK_RE.captures_at(run, pos) {
        if let Some(m) = caps.name("url") {
            let url = trim_url(m.as_str());
            if !is_linkable(run, m.start(), url) {
                pos = m.end();
                continue;
            }
            output.push_str(&run[copied..m.start()]);
            output.push_str(&web_link(url));
            copied = m.start() + url.len();
            pos = copied;
        } else if let Some(m) = caps.name("email") {
            output.push_str(&run[copied..m.start()]);
            output.push_str(&format!(
                r#"<a href="mailto:{0}" class="link">{0}</a>"#,
                m.as_str()
            ));
            copied = m.end();
            pos = copied;
        } else {
            break;
        }
    }

    output.push_str(&run[copied..]);
    output
}

/// Rejects matches with nothing after the scheme or `www.`, and `www.`
/// inside a longer host name or path.
fn is_linkable(run: &str, start: usize, url: &str) -> bool {
    let prefix_len = match url.find("://") {
        Some(scheme) => scheme + 3,
        None => {
            let embedded = run[..start].ends_with(&['.', '/', '@'][..]);
            if embedded {
                return false;
            }
            "www.".len()
        }
    };
    url.len() > prefix_len
}

fn web_link(url: &str) -> String {
    let href = if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    };
    format!(
        r#"<a href="{}" class="link" target="_blank" rel="noopener noreferrer">{}</a>"#,
        href, url
    )
}
