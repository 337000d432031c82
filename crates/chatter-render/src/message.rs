//! The message a pipeline run renders for.
//!
//! Messages are owned by the messaging layer. The pipeline only reads them:
//! to check the render preconditions and to let handlers look at the mime
//! type or sender.

/// Mime type of bodies the pipeline renders.
pub const TEXT_PLAIN: &str = "text/plain";

/// Read-only view of a chat message.
pub trait Message {
    /// The raw message body.
    fn body(&self) -> &str;

    /// Mime type of the body.
    fn mime_type(&self) -> &str {
        TEXT_PLAIN
    }

    /// Identifier of the sender, when known.
    fn sender(&self) -> Option<&str> {
        None
    }

    /// `true` while the message has not been sent yet (a local placeholder).
    fn is_pending(&self) -> bool {
        false
    }
}

/// An owned message, for callers without a message model of their own.
///
/// ```rust
/// use chatter_render::{Message, PlainMessage};
///
/// let msg = PlainMessage::new("hi :)").with_sender("alice").with_pending(true);
/// assert_eq!(msg.body(), "hi :)");
/// assert_eq!(msg.sender(), Some("alice"));
/// assert!(msg.is_pending());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainMessage {
    body: String,
    mime_type: String,
    sender: Option<String>,
    pending: bool,
}

impl PlainMessage {
    /// Creates a sent `text/plain` message.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            mime_type: TEXT_PLAIN.to_string(),
            sender: None,
            pending: false,
        }
    }

    /// Sets the mime type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Sets the sender.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Marks the message as pending (not yet sent).
    pub fn with_pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }
}

impl Message for PlainMessage {
    fn body(&self) -> &str {
        &self.body
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    fn is_pending(&self) -> bool {
        self.pending
    }
}
