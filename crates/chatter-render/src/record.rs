//! The transformation record and the content appended after the text.
//!
//! A [`TransformationRecord`] is created for each render call and threaded
//! through the handler chain. Handlers rewrite `text` in place (wrapping
//! substrings in markup) or push [`AfterContent`] that the consumer renders
//! as siblings after the text: embedded images, video players and the like.

use serde::Serialize;

use crate::escape::escape_html;

/// Elements rendered without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// In-progress rendering of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformationRecord {
    /// HTML-safe message text.
    pub text: String,
    /// Fragments to render after the text, in the order handlers added them.
    pub after_text: Vec<AfterContent>,
}

impl TransformationRecord {
    /// Creates a record from text that is already HTML-safe.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            after_text: Vec::new(),
        }
    }

    /// Creates a record from a raw message body, escaping it.
    pub fn from_raw(raw: &str) -> Self {
        Self::new(escape_html(raw))
    }

    /// Replaces the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Appends a fragment after the text.
    pub fn push_after(mut self, content: impl Into<AfterContent>) -> Self {
        self.after_text.push(content.into());
        self
    }

    /// Returns `true` if there is neither text nor after content.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.after_text.is_empty()
    }

    /// Joins the text and every after fragment into one HTML string.
    ///
    /// Consumers that build their own DOM should insert `text` and append
    /// each entry of `after_text` instead.
    pub fn to_html(&self) -> String {
        let mut html = self.text.clone();
        for content in &self.after_text {
            html.push_str(&content.to_html());
        }
        html
    }
}

/// One fragment rendered after the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AfterContent {
    /// Markup supplied verbatim by a handler.
    Html(String),
    /// A structured element.
    Node(Node),
}

impl AfterContent {
    /// Renders the fragment to HTML.
    pub fn to_html(&self) -> String {
        match self {
            AfterContent::Html(markup) => markup.clone(),
            AfterContent::Node(node) => node.to_html(),
        }
    }

    /// Returns the node, if this fragment is structured.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            AfterContent::Node(node) => Some(node),
            AfterContent::Html(_) => None,
        }
    }
}

impl From<Node> for AfterContent {
    fn from(node: Node) -> Self {
        AfterContent::Node(node)
    }
}

impl From<String> for AfterContent {
    fn from(markup: String) -> Self {
        AfterContent::Html(markup)
    }
}

impl From<&str> for AfterContent {
    fn from(markup: &str) -> Self {
        AfterContent::Html(markup.to_string())
    }
}

/// An element attribute. Attributes without a value render as bare flags
/// (`allowfullscreen`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// Descriptor of an element without children.
///
/// Attribute values hold unescaped text and are escaped by [`Node::to_html`].
/// Attributes render in insertion order, so equal nodes render to identical
/// bytes.
///
/// ```rust
/// use chatter_render::Node;
///
/// let img = Node::new("img").attr("src", "https://x.test/a.png?w=1&h=2");
/// assert_eq!(img.to_html(), r#"<img src="https://x.test/a.png?w=1&amp;h=2"/>"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub tag: String,
    pub attributes: Vec<Attribute>,
}

impl Node {
    /// Creates an element with no attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute with a value.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: Some(value.into()),
        });
        self
    }

    /// Adds a valueless attribute.
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: None,
        });
        self
    }

    /// Returns the value of the first attribute called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_deref())
    }

    /// Returns `true` if the element renders without a closing tag.
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    pub fn to_html(&self) -> String {
        let mut html = format!("<{}", self.tag);
        for attribute in &self.attributes {
            html.push(' ');
            html.push_str(&attribute.name);
            if let Some(value) = &attribute.value {
                html.push_str("=\"");
                html.push_str(&escape_html(value));
                html.push('"');
            }
        }
        if self.is_void() {
            html.push_str("/>");
        } else {
            html.push_str("></");
            html.push_str(&self.tag);
            html.push('>');
        }
        html
    }
}
