//! # Chatter - Chat Message Rendering
//!
//! `chatter` bundles the message rendering pipeline with a command-line
//! renderer. The pipeline itself lives in [`chatter_render`] and is
//! re-exported here; the fence scanner it builds on is available as
//! [`fence`].
//!
//! ```rust
//! use chatter::{Pipeline, PipelineConfig, PlainMessage, TagSet};
//!
//! let pipeline = Pipeline::from_config(&PipelineConfig::default())?;
//! let record = pipeline.render_message(&PlainMessage::new("run ```make```"), &TagSet::new())?;
//! assert_eq!(record.text, r#"run <pre class="code_block">make</pre>"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;

pub use chatter_fence as fence;
pub use chatter_render::*;
