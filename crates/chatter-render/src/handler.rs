//! Handler trait and descriptors.
//!
//! A handler is one pass of the pipeline: it takes the record built so far
//! and returns the next one. Passing the record by value keeps each pass a
//! plain function of its input, and a failing pass simply never hands a
//! record back.
//!
//! Handlers are installed through a [`HandlerDescriptor`], which adds the
//! name, ordering key and required tags the registry needs.

use std::fmt;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::message::Message;
use crate::record::TransformationRecord;
use crate::tags::TagSet;

/// Order given to handlers that do not ask for one.
///
/// Explicitly early handlers use values below it, explicitly late ones
/// values above it.
pub const DEFAULT_ORDER: i32 = 1000;

/// One transformation pass over a message's text.
///
/// Implementations must be deterministic: the same record and message give
/// the same result. They are shared by every render, so they hold no
/// per-call state.
pub trait TextHandler: Send + Sync {
    fn transform(
        &self,
        record: TransformationRecord,
        message: &dyn Message,
    ) -> Result<TransformationRecord, HandlerError>;
}

/// Adapter that lets a closure act as a [`TextHandler`].
struct FnHandler<F>(F);

impl<F> TextHandler for FnHandler<F>
where
    F: Fn(TransformationRecord, &dyn Message) -> Result<TransformationRecord, HandlerError>
        + Send
        + Sync,
{
    fn transform(
        &self,
        record: TransformationRecord,
        message: &dyn Message,
    ) -> Result<TransformationRecord, HandlerError> {
        (self.0)(record, message)
    }
}

/// A named, orderable handler ready for registration.
///
/// ```rust
/// use chatter_render::HandlerDescriptor;
///
/// let shout = HandlerDescriptor::from_fn("shout", |record, _message| {
///     let text = record.text.to_uppercase();
///     Ok(record.with_text(text))
/// })
/// .with_order(50)
/// .requires_enable();
///
/// assert_eq!(shout.name(), "shout");
/// assert_eq!(shout.order(), 50);
/// assert_eq!(shout.required_tags(), ["shout".to_string()]);
/// ```
#[derive(Clone)]
pub struct HandlerDescriptor {
    name: String,
    order: i32,
    required_tags: Vec<String>,
    handler: Arc<dyn TextHandler>,
}

impl HandlerDescriptor {
    /// Creates a descriptor at [`DEFAULT_ORDER`] with no required tags.
    pub fn new<H: TextHandler + 'static>(name: impl Into<String>, handler: H) -> Self {
        Self {
            name: name.into(),
            order: DEFAULT_ORDER,
            required_tags: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Creates a descriptor from a closure.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(TransformationRecord, &dyn Message) -> Result<TransformationRecord, HandlerError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(name, FnHandler(f))
    }

    /// Sets the ordering key. Lower runs first.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Requires the caller to enable this handler by its own name.
    pub fn requires_enable(self) -> Self {
        let name = self.name.clone();
        self.requires_tag(name)
    }

    /// Requires `tag` to be active for this handler to run.
    pub fn requires_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.required_tags.contains(&tag) {
            self.required_tags.push(tag);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn required_tags(&self) -> &[String] {
        &self.required_tags
    }

    /// Returns `true` if the handler runs when `enabled` tags are active.
    pub fn is_enabled_by(&self, enabled: &TagSet) -> bool {
        enabled.contains_all(&self.required_tags)
    }

    /// Runs the handler.
    pub fn transform(
        &self,
        record: TransformationRecord,
        message: &dyn Message,
    ) -> Result<TransformationRecord, HandlerError> {
        self.handler.transform(record, message)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("required_tags", &self.required_tags)
            .finish_non_exhaustive()
    }
}
