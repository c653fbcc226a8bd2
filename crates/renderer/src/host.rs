//! The document the loader installs its favicon into.
//!
//! Browsers expose this as `document.head` and `document.title`. Native
//! callers and tests use [`MemoryDocument`], which keeps the same structure in
//! plain vectors.

use crate::error::LoaderError;

/// Capabilities the loader needs from the hosting document.
pub trait DocumentHost {
    /// Handle to a `<link>` element. Cloning must not duplicate the element.
    type Link: Clone;

    /// Links currently in the head whose `rel` marks them as icons, in
    /// document order.
    fn icon_links(&self) -> Vec<Self::Link>;
    /// Creates a detached `<link rel="icon">`; fails with
    /// [`LoaderError::MissingContext`] when the document cannot make one.
    fn create_icon_link(&mut self) -> Result<Self::Link, LoaderError>;
    /// Appends `link` to the head, moving it to the end if already present.
    fn attach(&mut self, link: &Self::Link);
    /// Removes `link` from the head; no-op when detached.
    fn detach(&mut self, link: &Self::Link);
    fn set_href(&mut self, link: &Self::Link, href: &str);
    fn title(&self) -> String;
    fn set_title(&mut self, title: &str);
}

/// True when a `rel` attribute value marks an icon (`icon`, `shortcut icon`,
/// `apple-touch-icon`, ...).
pub fn is_icon_relation(rel: &str) -> bool {
    rel.contains("icon")
}

/// Identifies a link owned by a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(usize);

#[derive(Debug, Clone)]
struct LinkRecord {
    rel: String,
    href: Option<String>,
}

/// In-memory document with a head of `<link>` elements and a title.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    links: Vec<LinkRecord>,
    head: Vec<LinkId>,
    title: String,
}

impl MemoryDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Adds an attached link to the head.
    pub fn with_link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        let id = self.push_link(rel.into(), Some(href.into()));
        self.head.push(id);
        self
    }

    fn push_link(&mut self, rel: String, href: Option<String>) -> LinkId {
        self.links.push(LinkRecord { rel, href });
        LinkId(self.links.len() - 1)
    }

    /// Links in the head, in document order.
    pub fn head_links(&self) -> &[LinkId] {
        &self.head
    }

    /// Icon-relation links in the head.
    pub fn icon_links_in_head(&self) -> Vec<LinkId> {
        self.icon_links()
    }

    pub fn is_attached(&self, link: LinkId) -> bool {
        self.head.contains(&link)
    }

    pub fn rel(&self, link: LinkId) -> Option<&str> {
        self.links.get(link.0).map(|record| record.rel.as_str())
    }

    pub fn href(&self, link: LinkId) -> Option<&str> {
        self.links.get(link.0).and_then(|record| record.href.as_deref())
    }

    /// `href`s of the icon links in the head, in document order.
    pub fn icon_hrefs(&self) -> Vec<String> {
        self.icon_links()
            .into_iter()
            .filter_map(|link| self.href(link).map(str::to_string))
            .collect()
    }
}

impl DocumentHost for MemoryDocument {
    type Link = LinkId;

    fn icon_links(&self) -> Vec<LinkId> {
        self.head
            .iter()
            .copied()
            .filter(|&id| self.rel(id).is_some_and(is_icon_relation))
            .collect()
    }

    fn create_icon_link(&mut self) -> Result<LinkId, LoaderError> {
        Ok(self.push_link("icon".to_string(), None))
    }

    fn attach(&mut self, link: &LinkId) {
        self.head.retain(|id| id != link);
        self.head.push(*link);
    }

    fn detach(&mut self, link: &LinkId) {
        self.head.retain(|id| id != link);
    }

    fn set_href(&mut self, link: &LinkId, href: &str) {
        if let Some(record) = self.links.get_mut(link.0) {
            record.href = Some(href.to_string());
        }
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> MemoryDocument {
        MemoryDocument::new("Inbox")
            .with_link("stylesheet", "/site.css")
            .with_link("shortcut icon", "/favicon.ico")
            .with_link("apple-touch-icon", "/touch.png")
    }

    #[test]
    fn icon_relation_matches_substring() {
        assert!(is_icon_relation("icon"));
        assert!(is_icon_relation("shortcut icon"));
        assert!(is_icon_relation("apple-touch-icon"));
        assert!(!is_icon_relation("stylesheet"));
        assert!(!is_icon_relation("ICON"));
    }

    #[test]
    fn lists_only_icon_links() {
        let doc = document();
        assert_eq!(doc.icon_hrefs(), vec!["/favicon.ico", "/touch.png"]);
    }

    #[test]
    fn created_links_start_detached() {
        let mut doc = document();
        let link = doc.create_icon_link().unwrap();
        assert!(!doc.is_attached(link));
        assert_eq!(doc.rel(link), Some("icon"));
        assert_eq!(doc.href(link), None);
    }

    #[test]
    fn attach_moves_to_end_without_duplicating() {
        let mut doc = document();
        let first = doc.head_links()[0];
        doc.attach(&first);
        doc.attach(&first);
        assert_eq!(doc.head_links().len(), 3);
        assert_eq!(doc.head_links().last(), Some(&first));
    }

    #[test]
    fn detach_is_idempotent() {
        let mut doc = document();
        let icon = doc.icon_links()[0];
        doc.detach(&icon);
        doc.detach(&icon);
        assert_eq!(doc.head_links().len(), 2);
        assert!(!doc.is_attached(icon));
    }
}
