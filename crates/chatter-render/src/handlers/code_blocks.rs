use chatter_fence::{Scanner, Segment};

use super::map_markup_runs;
use crate::error::HandlerError;
use crate::handler::TextHandler;
use crate::message::Message;
use crate::record::TransformationRecord;

/// Turns backtick spans into code markup.
///
/// Balanced triple-backtick spans become `<pre class="code_block">` blocks;
/// single-backtick spans become `<code>`. An unterminated fence is left as
/// literal text. Inline spans are only looked for between tags, so a span
/// never crosses markup added by an earlier handler, such as the `<br/>` of
/// a line break or the attributes of a link.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeBlockHandler;

impl TextHandler for CodeBlockHandler {
    fn transform(
        &self,
        record: TransformationRecord,
        _message: &dyn Message,
    ) -> Result<TransformationRecord, HandlerError> {
        let text = render_code(&record.text);
        Ok(record.with_text(text))
    }
}

/// Replaces fenced and inline code spans with `<pre>` and `<code>` markup.
pub fn render_code(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + 32);
    for segment in Scanner::new(text) {
        match segment {
            Segment::Fenced { body, .. } => {
                output.push_str(r#"<pre class="code_block">"#);
                output.push_str(body);
                output.push_str("</pre>");
            }
            other => output.push_str(&map_markup_runs(other.source(), render_inline)),
        }
    }
    output
}

fn render_inline(run: &str) -> String {
    let mut output = String::with_capacity(run.len() + 16);
    for segment in Scanner::with_inline_code(run) {
        match segment {
            Segment::InlineCode { body, .. } => {
                output.push_str("<code>");
                output.push_str(body);
                output.push_str("</code>");
            }
            other => output.push_str(other.source()),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_fenced_blocks() {
        let input = "hello```The code\nis here\n\nbut all must end``` and this is not a code block ```and here we resume again``` and end again";
        assert_eq!(
            render_code(input),
            "hello<pre class=\"code_block\">The code\nis here\n\nbut all must end</pre> and this is not a code block <pre class=\"code_block\">and here we resume again</pre> and end again"
        );
    }

    #[test]
    fn unterminated_fence_stays_literal() {
        assert_eq!(render_code("a ```b c"), "a ```b c");
        assert_eq!(
            render_code("```x``` then ```y"),
            "<pre class=\"code_block\">x</pre> then ```y"
        );
    }

    #[test]
    fn inline_code() {
        assert_eq!(
            render_code("run `make` now"),
            "run <code>make</code> now"
        );
    }

    #[test]
    fn inline_across_break_left_alone() {
        assert_eq!(render_code("`a<br/>b`"), "`a<br/>b`");
    }

    #[test]
    fn inline_never_crosses_tags() {
        let linked = r#"<a href="http://a.test/x`y" class="link">http://a.test/x`y</a>"#;
        assert_eq!(render_code(linked), linked);
        assert_eq!(
            render_code("`a`<br/>`b"),
            "<code>a</code><br/>`b"
        );
    }

    #[test]
    fn empty_fence() {
        assert_eq!(render_code("``````"), "<pre class=\"code_block\"></pre>");
    }

    #[test]
    fn no_code() {
        assert_eq!(render_code("plain text"), "plain text");
    }
}
