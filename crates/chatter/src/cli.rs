//! The `chatter` command line.
//!
//! Renders one message with the built-in pipeline and prints the result:
//!
//! ```text
//! chatter [TEXT] [--enable TAG]... [--config FILE] [--format html|json]
//!         [--pending] [--list-handlers]
//! ```
//!
//! Without TEXT the message is read from stdin, minus one trailing line
//! break. HTML output prints the text, then each fragment rendered after it
//! on its own line.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chatter_render::{Pipeline, PipelineConfig, PlainMessage, TagSet, TransformationRecord};
use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "chatter")]
#[command(version)]
#[command(about = "Render a chat message to HTML")]
pub struct Cli {
    /// Message text; read from stdin when omitted
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Enable an opt-in handler such as `images` or `video` (repeatable)
    #[arg(short, long = "enable", value_name = "TAG")]
    pub enable: Vec<String>,

    /// YAML pipeline configuration
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    pub format: Format,

    /// Treat the message as not yet sent
    #[arg(long)]
    pub pending: bool,

    /// Print the registered handlers in execution order and exit
    #[arg(long)]
    pub list_handlers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Text followed by after-text fragments, one per line
    Html,
    /// The serialized transformation record
    Json,
}

/// Runs the command, reading the message from `input` when no TEXT was
/// given and writing the result to `out`.
pub fn execute(cli: &Cli, input: &mut dyn Read, out: &mut dyn Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading pipeline config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let pipeline = Pipeline::from_config(&config).context("building the pipeline")?;

    if cli.list_handlers {
        return list_handlers(&pipeline, out);
    }

    let tags = active_tags(cli, &config);
    let text = match &cli.text {
        Some(text) => text.clone(),
        None => read_message(input)?,
    };
    tracing::debug!(bytes = text.len(), tags = ?tags, "rendering message");

    let message = PlainMessage::new(text).with_pending(cli.pending);
    let record = pipeline.render_message(&message, &tags)?;

    match cli.format {
        Format::Html => write_html(&record, out)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, &record)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn read_message(input: &mut dyn Read) -> Result<String> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .context("reading message from stdin")?;
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    Ok(text)
}

fn write_html(record: &TransformationRecord, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", record.text)?;
    for content in &record.after_text {
        writeln!(out, "{}", content.to_html())?;
    }
    Ok(())
}

fn list_handlers(pipeline: &Pipeline, out: &mut dyn Write) -> Result<()> {
    let registry = pipeline.registry();
    for name in registry.names() {
        let Some(handler) = registry.get(name) else {
            continue;
        };
        let required = handler.required_tags();
        if required.is_empty() {
            writeln!(out, "{:>6}  {}", handler.order(), name)?;
        } else {
            writeln!(
                out,
                "{:>6}  {}  (requires: {})",
                handler.order(),
                name,
                required.join(", ")
            )?;
        }
    }
    Ok(())
}

/// Tags active for a run: the configured defaults plus every `--enable`.
pub fn active_tags(cli: &Cli, config: &PipelineConfig) -> TagSet {
    let mut tags = config.default_tag_set();
    tags.extend(cli.enable.iter().cloned());
    tags
}
