//! Error types for registration, rendering and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while registering handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The descriptor has an empty name, so it cannot be addressed or replaced.
    #[error("handler descriptor has no name")]
    MissingName,
}

/// Error returned by a handler's transform.
///
/// Handlers fail with a message and optionally the underlying cause. The
/// pipeline wraps it in [`PipelineError::Handler`] together with the
/// handler's name.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    /// Human-readable error message
    pub message: String,
    /// The underlying error source, if any
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HandlerError {
    /// Creates a handler error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }
}

/// Errors returned by [`Pipeline`](crate::Pipeline) runs.
///
/// A failed run never carries partial output: whatever the earlier handlers
/// produced is dropped along with the record.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The message is still pending and the pipeline does not render
    /// pending messages.
    #[error("message has not been sent yet")]
    MessageNotSent,

    /// Only `text/plain` bodies go through the pipeline.
    #[error("unsupported mime type '{0}': only text/plain bodies are rendered")]
    UnsupportedMimeType(String),

    /// A handler failed; the rest of the chain did not run.
    #[error("handler '{name}' failed: {source}")]
    Handler {
        /// Name of the failing handler.
        name: String,
        /// What the handler reported.
        #[source]
        source: HandlerError,
    },
}

impl PipelineError {
    /// Returns the name of the failing handler, if a handler failed.
    pub fn handler_name(&self) -> Option<&str> {
        match self {
            PipelineError::Handler { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Errors raised while loading a [`PipelineConfig`](crate::PipelineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        /// Path that failed to read
        path: PathBuf,
        /// The I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The YAML was malformed or did not match the expected shape.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn handler_error_display() {
        let err = HandlerError::new("boom");
        assert_eq!(err.to_string(), "boom");
        assert!(err.source().is_none());
    }

    #[test]
    fn handler_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let err = HandlerError::new("lookup failed").with_source(io);
        assert_eq!(err.source().map(|s| s.to_string()), Some("disk".into()));
    }

    #[test]
    fn pipeline_error_names_handler() {
        let err = PipelineError::Handler {
            name: "emoji".into(),
            source: HandlerError::new("bad table"),
        };
        assert_eq!(err.handler_name(), Some("emoji"));
        assert!(err.to_string().contains("emoji"));
        assert!(err.to_string().contains("bad table"));
        assert_eq!(PipelineError::MessageNotSent.handler_name(), None);
    }

    #[test]
    fn mime_type_error_mentions_type() {
        let err = PipelineError::UnsupportedMimeType("image/png".into());
        assert!(err.to_string().contains("image/png"));
    }
}
