//! # Chatter Render - Message Text Pipeline
//!
//! `chatter-render` turns the plain-text body of a chat message into
//! HTML-safe markup by running it through an ordered set of text handlers.
//!
//! ## Core Concepts
//!
//! - [`TextHandler`]: one pass over the text, `(record, message) -> record`
//! - [`HandlerDescriptor`]: a handler plus its name, order and required tags
//! - [`HandlerRegistry`]: named handlers with a deterministic execution order
//! - [`Pipeline`]: escapes a body and runs the enabled handlers over it
//! - [`TransformationRecord`]: the output, `text` plus content rendered after it
//! - [`PipelineConfig`]: YAML-loadable settings for the built-in handlers
//!
//! ## Quick Start
//!
//! ```rust
//! use chatter_render::{Pipeline, PipelineConfig, PlainMessage, TagSet};
//!
//! let pipeline = Pipeline::from_config(&PipelineConfig::default())?;
//! let message = PlainMessage::new("see https://example.test\nbye");
//!
//! let record = pipeline.render_message(&message, &TagSet::new())?;
//! assert_eq!(
//!     record.text,
//!     r#"see <a href="https://example.test" class="link" target="_blank" rel="noopener noreferrer">https://example.test</a><br/>bye"#
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Opt-in Handlers
//!
//! Some handlers only run when the caller enables them. The embed handlers
//! are opt-in by default:
//!
//! ```rust
//! use chatter_render::{Pipeline, PipelineConfig, PlainMessage, TagSet};
//!
//! let pipeline = Pipeline::from_config(&PipelineConfig::default())?;
//! let message = PlainMessage::new("https://example.test/cat.png");
//!
//! let plain = pipeline.render_message(&message, &TagSet::new())?;
//! assert!(plain.after_text.is_empty());
//!
//! let embedded = pipeline.render_message(&message, &TagSet::new().with("images"))?;
//! assert_eq!(embedded.after_text.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Handlers
//!
//! ```rust
//! use chatter_render::{HandlerDescriptor, HandlerRegistry, Pipeline, PlainMessage, TagSet};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(
//!     HandlerDescriptor::from_fn("shout", |record, _| {
//!         let text = record.text.to_uppercase();
//!         Ok(record.with_text(text))
//!     })
//!     .with_order(10),
//! )?;
//!
//! let pipeline = Pipeline::new(registry);
//! let record = pipeline.render_message(&PlainMessage::new("hi"), &TagSet::new())?;
//! assert_eq!(record.text, "HI");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod error;
mod escape;
mod handler;
pub mod handlers;
mod message;
mod pipeline;
mod record;
mod registry;
mod tags;

pub use config::{
    EmojiConfig, HandlerOverrides, HandlerSettings, ImageConfig, PipelineConfig, VideoConfig,
};
pub use error::{ConfigError, HandlerError, PipelineError, RegistryError};
pub use escape::{escape_html, unescape_html};
pub use handler::{HandlerDescriptor, TextHandler, DEFAULT_ORDER};
pub use handlers::{builtin_descriptors, builtin_registry};
pub use message::{Message, PlainMessage, TEXT_PLAIN};
pub use pipeline::Pipeline;
pub use record::{AfterContent, Attribute, Node, TransformationRecord};
pub use registry::{HandlerRegistry, OrderedHandlers};
pub use tags::TagSet;
