//! Document - High-level document API

use crate::{DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a document with an empty html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes under the document node cannot fail to link
        let linked = tree
            .append_child(tree.root(), html)
            .and_then(|_| tree.append_child(html, head))
            .and_then(|_| tree.append_child(html, body));
        debug_assert!(linked.is_ok());

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Re-discover the html/head/body elements after the tree was built
    /// externally (e.g. by the parser).
    pub fn finalize(&mut self) {
        self.html_element = self
            .tree
            .children(self.tree.root())
            .find(|(_, node)| node.is_element())
            .map_or(NodeId::NONE, |(id, _)| id);

        self.head_element = self.child_with_tag(self.html_element, "head");
        self.body_element = self.child_with_tag(self.html_element, "body");
    }

    fn child_with_tag(&self, parent: NodeId, tag: &str) -> NodeId {
        if !parent.is_valid() {
            return NodeId::NONE;
        }
        self.tree
            .children(parent)
            .map(|(id, _)| id)
            .find(|&id| self.tree.tag_name(id) == Some(tag))
            .unwrap_or(NodeId::NONE)
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element, if any
    pub fn document_element(&self) -> Option<NodeId> {
        self.live(self.html_element)
    }

    /// Get <head> element, if any
    pub fn head(&self) -> Option<NodeId> {
        self.live(self.head_element)
    }

    /// Get <body> element, if any
    pub fn body(&self) -> Option<NodeId> {
        self.live(self.body_element)
    }

    /// Cached elements that have since been detached are not reported
    fn live(&self, id: NodeId) -> Option<NodeId> {
        if !id.is_valid() {
            return None;
        }
        let attached = self.tree.ancestors(id).any(|a| a == self.tree.root());
        attached.then_some(id)
    }

    /// Get the first element in tree order with the given id
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .find(|&node| self.tree.element_id(node) == Some(id))
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
