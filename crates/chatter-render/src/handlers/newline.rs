use chatter_fence::map_plain;

use crate::error::HandlerError;
use crate::handler::TextHandler;
use crate::message::Message;
use crate::record::TransformationRecord;

const LINE_BREAK: &str = "<br/>";

/// Turns line feeds outside fenced blocks into `<br/>`.
///
/// Fenced blocks keep their line feeds so `<pre>` can lay them out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewlineHandler;

impl TextHandler for NewlineHandler {
    fn transform(
        &self,
        record: TransformationRecord,
        _message: &dyn Message,
    ) -> Result<TransformationRecord, HandlerError> {
        let text = break_lines(&record.text);
        Ok(record.with_text(text))
    }
}

/// Replaces `\r\n` and `\n` with `<br/>` outside fenced blocks.
pub fn break_lines(text: &str) -> String {
    map_plain(text, false, |plain| {
        plain.replace("\r\n", LINE_BREAK).replace('\n', LINE_BREAK)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::PlainMessage;

    #[test]
    fn keeps_fenced_newlines() {
        let input = "hello\n\nyou```\nare in\na code\nblock```and should not mess\nwith it\n";
        assert_eq!(
            break_lines(input),
            "hello<br/><br/>you```\nare in\na code\nblock```and should not mess<br/>with it<br/>"
        );
    }

    #[test]
    fn crlf_is_one_break() {
        assert_eq!(break_lines("a\r\nb"), "a<br/>b");
    }

    #[test]
    fn unterminated_fence_is_plain() {
        assert_eq!(break_lines("```a\nb"), "```a<br/>b");
    }

    #[test]
    fn idempotent() {
        let once = break_lines("a\nb```c\nd```e\n");
        assert_eq!(break_lines(&once), once);
    }

    #[test]
    fn transform_keeps_after_text() {
        let record = TransformationRecord::new("a\nb").push_after("<hr/>");
        let out = NewlineHandler
            .transform(record, &PlainMessage::new(""))
            .unwrap();
        assert_eq!(out.text, "a<br/>b");
        assert_eq!(out.after_text.len(), 1);
    }
}
