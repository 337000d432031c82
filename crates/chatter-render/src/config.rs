//! Pipeline configuration.
//!
//! [`PipelineConfig`] tunes the built-in handlers and is usually loaded from
//! YAML:
//!
//! ```yaml
//! allow_pending: false
//! default_tags: [images, video]
//! handlers:
//!   emoji:
//!     enabled: false
//!   video:
//!     order: 150
//!     requires_enable: false
//! emoji:
//!   image_base_url: "https://cdn.example.test/emoji/"
//! images:
//!   extensions: [png, gif]
//!   strip_urls: true
//! video:
//!   width: 640
//!   height: 360
//! ```
//!
//! Every key is optional; missing keys take their defaults. Unknown keys are
//! rejected so typos surface at load time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tags::TagSet;

/// Settings for the built-in pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Render messages that have not been sent yet.
    pub allow_pending: bool,
    /// Tags active when the caller does not pass its own.
    pub default_tags: Vec<String>,
    /// Per-handler overrides.
    pub handlers: HandlerOverrides,
    pub emoji: EmojiConfig,
    pub images: ImageConfig,
    pub video: VideoConfig,
}

impl PipelineConfig {
    /// Parses a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded pipeline config");
        Self::from_yaml(&yaml)
    }

    /// Returns [`default_tags`](Self::default_tags) as a [`TagSet`].
    pub fn default_tag_set(&self) -> TagSet {
        self.default_tags.iter().cloned().collect()
    }
}

/// Overrides for the built-in handlers, keyed by handler name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandlerOverrides {
    pub images: HandlerSettings,
    pub video: HandlerSettings,
    pub autolinker: HandlerSettings,
    pub emoji: HandlerSettings,
    pub newline: HandlerSettings,
    #[serde(rename = "code-blocks")]
    pub code_blocks: HandlerSettings,
}

impl HandlerOverrides {
    /// Looks up the settings for a built-in by name.
    pub fn get(&self, name: &str) -> Option<&HandlerSettings> {
        match name {
            "images" => Some(&self.images),
            "video" => Some(&self.video),
            "autolinker" => Some(&self.autolinker),
            "emoji" => Some(&self.emoji),
            "newline" => Some(&self.newline),
            "code-blocks" => Some(&self.code_blocks),
            _ => None,
        }
    }
}

/// Override for one built-in handler. Unset fields keep the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandlerSettings {
    /// Set to `false` to leave the handler out of the registry.
    pub enabled: Option<bool>,
    pub order: Option<i32>,
    /// Whether the caller must enable the handler by name.
    pub requires_enable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmojiConfig {
    /// Prefix of emoji image URLs; the codepoint and extension are appended.
    pub image_base_url: String,
    pub image_extension: String,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            image_base_url: "https://twemoji.maxcdn.com/2/72x72/".to_string(),
            image_extension: "png".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    /// File extensions recognized as images, without the dot.
    pub extensions: Vec<String>,
    /// Remove embedded image URLs from the message text.
    pub strip_urls: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            extensions: ["png", "jpg", "jpeg", "gif", "webp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            strip_urls: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 560,
            height: 315,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(PipelineConfig::from_yaml("").unwrap(), PipelineConfig::default());
        assert_eq!(PipelineConfig::from_yaml("{}").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn parses_full_config() {
        let config = PipelineConfig::from_yaml(
            r#"
allow_pending: true
default_tags: [images]
handlers:
  emoji:
    enabled: false
  code-blocks:
    order: 50
emoji:
  image_base_url: "https://cdn.test/e/"
images:
  extensions: [png]
  strip_urls: true
video:
  width: 640
  height: 360
"#,
        )
        .unwrap();

        assert!(config.allow_pending);
        assert!(config.default_tag_set().contains("images"));
        assert_eq!(config.handlers.emoji.enabled, Some(false));
        assert_eq!(config.handlers.code_blocks.order, Some(50));
        assert_eq!(config.handlers.get("code-blocks").unwrap().order, Some(50));
        assert_eq!(config.emoji.image_base_url, "https://cdn.test/e/");
        assert_eq!(config.emoji.image_extension, "png");
        assert_eq!(config.images.extensions, vec!["png".to_string()]);
        assert!(config.images.strip_urls);
        assert_eq!(config.video.width, 640);
        assert_eq!(config.video.height, 360);
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let config = PipelineConfig::from_yaml("video:\n  width: 100\n").unwrap();
        assert_eq!(config.video.width, 100);
        assert_eq!(config.video.height, 315);
    }

    #[test]
    fn unknown_key_rejected() {
        let err = PipelineConfig::from_yaml("emojis: {}").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_handler_rejected() {
        assert!(PipelineConfig::from_yaml("handlers:\n  markdown:\n    order: 1\n").is_err());
    }

    #[test]
    fn overrides_lookup() {
        let overrides = HandlerOverrides::default();
        assert!(overrides.get("newline").is_some());
        assert!(overrides.get("nope").is_none());
    }

    #[test]
    fn from_file_reads_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "allow_pending: true").unwrap();
        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert!(config.allow_pending);
    }

    #[test]
    fn from_file_missing() {
        let err = PipelineConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("not/here.yaml"));
    }
}
