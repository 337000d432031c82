//! Pipeline executor.
//!
//! A [`Pipeline`] owns a [`HandlerRegistry`] and runs its handlers over one
//! message at a time:
//!
//! ```text
//! raw body
//!   → escape_html            (fresh record, empty after_text)
//!   → handler 1 … handler n  (registry order, enabled handlers only)
//!   → { text, after_text }
//! ```
//!
//! # Preconditions
//!
//! Pending (not yet sent) messages are refused with
//! [`PipelineError::MessageNotSent`] before any handler runs, unless the
//! pipeline was built with [`allow_pending`](Pipeline::allow_pending).
//!
//! # Failure
//!
//! The record moves through the chain by value. If a handler fails, the run
//! stops there and the record is dropped, so callers see either the complete
//! output or the error, never a half-transformed text.
//!
//! # Sharing
//!
//! Building the pipeline moves the registry in, so every handler is
//! registered before the first render. A pipeline is `Send + Sync` and can
//! be shared across threads; each run works on its own record.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, RegistryError};
use crate::handlers::builtin_registry;
use crate::message::{Message, TEXT_PLAIN};
use crate::record::TransformationRecord;
use crate::registry::HandlerRegistry;
use crate::tags::TagSet;

/// Runs registered handlers over message text.
#[derive(Debug, Default)]
pub struct Pipeline {
    registry: HandlerRegistry,
    allow_pending: bool,
}

impl Pipeline {
    /// Creates a pipeline over `registry`.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            allow_pending: false,
        }
    }

    /// Creates a pipeline with the built-in handlers configured by `config`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, RegistryError> {
        let registry = builtin_registry(config)?;
        Ok(Self::new(registry).allow_pending(config.allow_pending))
    }

    /// Lets pending messages through the pipeline.
    pub fn allow_pending(mut self, allow: bool) -> Self {
        self.allow_pending = allow;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Renders `raw_text` on behalf of `message`.
    ///
    /// Runs every handler enabled by `enabled`, in registry order, starting
    /// from the escaped text.
    pub fn run(
        &self,
        raw_text: &str,
        message: &dyn Message,
        enabled: &TagSet,
    ) -> Result<TransformationRecord, PipelineError> {
        if message.is_pending() && !self.allow_pending {
            tracing::debug!("refusing to render a pending message");
            return Err(PipelineError::MessageNotSent);
        }

        let mut record = TransformationRecord::from_raw(raw_text);
        for handler in self.registry.ordered_handlers(enabled) {
            tracing::debug!(
                handler = handler.name(),
                order = handler.order(),
                "running text handler"
            );
            record = handler.transform(record, message).map_err(|source| {
                tracing::debug!(handler = handler.name(), error = %source, "text handler failed");
                PipelineError::Handler {
                    name: handler.name().to_string(),
                    source,
                }
            })?;
        }

        Ok(record)
    }

    /// Renders a message's body.
    ///
    /// Only `text/plain` bodies are rendered; other mime types fail with
    /// [`PipelineError::UnsupportedMimeType`].
    pub fn render_message(
        &self,
        message: &dyn Message,
        enabled: &TagSet,
    ) -> Result<TransformationRecord, PipelineError> {
        if !is_plain_text(message.mime_type()) {
            return Err(PipelineError::UnsupportedMimeType(
                message.mime_type().to_string(),
            ));
        }
        self.run(message.body(), message, enabled)
    }

    /// Renders a message's body, falling back to the escaped body on error.
    pub fn render_or_escape(&self, message: &dyn Message, enabled: &TagSet) -> TransformationRecord {
        match self.render_message(message, enabled) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "rendering failed, falling back to escaped text");
                TransformationRecord::from_raw(message.body())
            }
        }
    }
}

/// Matches `text/plain`, ignoring case and parameters such as `charset`.
fn is_plain_text(mime_type: &str) -> bool {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case(TEXT_PLAIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handler::HandlerDescriptor;
    use crate::message::PlainMessage;

    fn append(name: &'static str) -> HandlerDescriptor {
        HandlerDescriptor::from_fn(name, move |record, _| {
            let text = format!("{}[{}]", record.text, name);
            Ok(record.with_text(text))
        })
    }

    fn failing(name: &'static str) -> HandlerDescriptor {
        HandlerDescriptor::from_fn(name, |_, _| Err(HandlerError::new("nope")))
    }

    fn pipeline(descriptors: Vec<HandlerDescriptor>) -> Pipeline {
        let mut registry = HandlerRegistry::new();
        for descriptor in descriptors {
            registry.register(descriptor).unwrap();
        }
        Pipeline::new(registry)
    }

    #[test]
    fn escapes_before_handlers() {
        let pipeline = pipeline(vec![]);
        let msg = PlainMessage::new("");
        let record = pipeline.run("<b>", &msg, &TagSet::new()).unwrap();
        assert_eq!(record.text, "&lt;b&gt;");
    }

    #[test]
    fn runs_in_registry_order() {
        let pipeline = pipeline(vec![append("b"), append("a").with_order(1)]);
        let msg = PlainMessage::new("");
        let record = pipeline.run("x", &msg, &TagSet::new()).unwrap();
        assert_eq!(record.text, "x[a][b]");
    }

    #[test]
    fn skips_handlers_not_enabled() {
        let pipeline = pipeline(vec![append("a"), append("b").requires_enable()]);
        let msg = PlainMessage::new("");

        let record = pipeline.run("x", &msg, &TagSet::new()).unwrap();
        assert_eq!(record.text, "x[a]");

        let record = pipeline
            .run("x", &msg, &TagSet::new().with("b"))
            .unwrap();
        assert_eq!(record.text, "x[a][b]");
    }

    #[test]
    fn failure_reports_handler() {
        let pipeline = pipeline(vec![append("a"), failing("broken"), append("c")]);
        let msg = PlainMessage::new("");
        let err = pipeline.run("x", &msg, &TagSet::new()).unwrap_err();
        assert_eq!(err.handler_name(), Some("broken"));
    }

    #[test]
    fn pending_refused() {
        let pipeline = pipeline(vec![append("a")]);
        let msg = PlainMessage::new("x").with_pending(true);
        let err = pipeline.run("x", &msg, &TagSet::new()).unwrap_err();
        assert!(matches!(err, PipelineError::MessageNotSent));
    }

    #[test]
    fn pending_allowed() {
        let pipeline = pipeline(vec![append("a")]).allow_pending(true);
        let msg = PlainMessage::new("x").with_pending(true);
        let record = pipeline.run("x", &msg, &TagSet::new()).unwrap();
        assert_eq!(record.text, "x[a]");
    }

    #[test]
    fn render_message_uses_body() {
        let pipeline = pipeline(vec![append("a")]);
        let msg = PlainMessage::new("body");
        let record = pipeline.render_message(&msg, &TagSet::new()).unwrap();
        assert_eq!(record.text, "body[a]");
    }

    #[test]
    fn render_message_rejects_other_types() {
        let pipeline = pipeline(vec![]);
        let msg = PlainMessage::new("x").with_mime_type("image/png");
        let err = pipeline.render_message(&msg, &TagSet::new()).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedMimeType(t) if t == "image/png"));
    }

    #[test]
    fn render_or_escape_falls_back() {
        let pipeline = pipeline(vec![append("a"), failing("broken")]);
        let msg = PlainMessage::new("<i>x</i>");
        let record = pipeline.render_or_escape(&msg, &TagSet::new());
        assert_eq!(record.text, "&lt;i&gt;x&lt;/i&gt;");
        assert!(record.after_text.is_empty());
    }

    #[test]
    fn plain_text_mime_matching() {
        assert!(is_plain_text("text/plain"));
        assert!(is_plain_text("Text/Plain; charset=utf-8"));
        assert!(!is_plain_text("text/html"));
        assert!(!is_plain_text(""));
    }

    #[test]
    fn pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }
}
