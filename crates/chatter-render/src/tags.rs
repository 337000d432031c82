//! Active tags for a render call.
//!
//! Some handlers only run when the caller opts in: embeds, for instance,
//! are enabled per conversation. A handler declares the tags it requires
//! and the caller passes the set of tags active for the call; the handler
//! runs when every tag it requires is active.

use std::collections::BTreeSet;

/// Ordered set of active tag names.
///
/// ```rust
/// use chatter_render::TagSet;
///
/// let tags: TagSet = ["images", "video"].into_iter().collect();
/// assert!(tags.contains("video"));
/// assert!(tags.contains_all(&["images".to_string()]));
/// assert!(!tags.contains("emoji"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, builder style.
    pub fn with(mut self, tag: impl Into<String>) -> Self {
        self.insert(tag);
        self
    }

    /// Adds a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Removes a tag. Returns `false` if it was absent.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Returns `true` if every tag in `required` is active.
    ///
    /// An empty requirement is always satisfied.
    pub fn contains_all(&self, required: &[String]) -> bool {
        required.iter().all(|tag| self.tags.contains(tag))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterates over the tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for TagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.tags.extend(iter.into_iter().map(Into::into));
    }
}
