//! DOM Tree (arena-based allocation)
//!
//! All structural and attribute mutations go through `DomTree` so that
//! observer registrations see every change.

use crate::observer::ObserverRegistry;
use crate::{
    DOMTokenList, DomError, DomResult, MutationObserverInit, MutationRecord, Node,
    NodeData, NodeId, ObserverId, StringInterner,
};

/// Arena-based DOM tree for memory efficiency
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    interner: StringInterner,
    observers: ObserverRegistry,
}

impl DomTree {
    /// Create a new tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            interner: StringInterner::new(),
            observers: ObserverRegistry::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    /// Number of nodes in the tree, document node included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the document node
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// # Panics
    ///
    /// Panics when the arena already holds `u32::MAX` nodes.
    fn push(&mut self, node: Node) -> NodeId {
        let len = self.nodes.len();
        let Some(id) = NodeId::from_index(len) else {
            panic!("DOM arena exhausted at {len} nodes");
        };
        self.nodes.push(node);
        id
    }

    // ------------------------------------------------------------------
    // Node creation (detached)
    // ------------------------------------------------------------------

    /// Create a detached element; the tag name is ASCII-lowercased
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let name = self.interner.intern(&tag.to_ascii_lowercase());
        self.push(Node::element(name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content.to_string()))
    }

    /// Create a detached DOCTYPE node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        let name = self.interner.intern(name);
        self.push(Node::doctype(name))
    }

    // ------------------------------------------------------------------
    // Element accessors
    // ------------------------------------------------------------------

    /// Check if a node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Lowercased tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        Some(self.interner.get(elem.name))
    }

    /// Cached `id` attribute
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element()?.id.as_deref()
    }

    /// Cached class list (present iff the element has a `class` attribute)
    pub fn class_list(&self, id: NodeId) -> Option<&DOMTokenList> {
        self.get(id)?.as_element()?.classes.as_ref()
    }

    /// Get an attribute value
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let key = self.interner.lookup(&name.to_ascii_lowercase())?;
        self.get(id)?.as_element()?.get_attr(key)
    }

    /// Check for an attribute
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        let Some(key) = self.interner.lookup(&name.to_ascii_lowercase()) else {
            return false;
        };
        self.get(id)
            .and_then(Node::as_element)
            .is_some_and(|elem| elem.has_attr(key))
    }

    // ------------------------------------------------------------------
    // Mutations (observed)
    // ------------------------------------------------------------------

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let name = name.to_ascii_lowercase();
        let key = self.interner.intern(&name);
        let elem = self
            .nodes
            .get_mut(id.index())
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;

        let old_value = elem.set_attr(key, value.to_string());
        match name.as_str() {
            "id" => elem.id = Some(value.to_string()),
            "class" => elem.classes = Some(DOMTokenList::from_string(value)),
            _ => {}
        }

        self.queue_mutation(MutationRecord::attributes(id, &name, old_value));
        Ok(())
    }

    /// Remove an attribute; returns whether it was present
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        let name = name.to_ascii_lowercase();
        let Some(key) = self.interner.lookup(&name) else {
            self.node(id)?;
            return Ok(false);
        };
        let elem = self
            .nodes
            .get_mut(id.index())
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;

        let Some(old_value) = elem.remove_attr(key) else {
            return Ok(false);
        };
        match name.as_str() {
            "id" => elem.id = None,
            "class" => elem.classes = None,
            _ => {}
        }

        self.queue_mutation(MutationRecord::attributes(id, &name, Some(old_value)));
        Ok(true)
    }

    /// Replace the content of a text node
    pub fn set_text(&mut self, id: NodeId, content: &str) -> DomResult<()> {
        let node = self.nodes.get_mut(id.index()).ok_or(DomError::NotFound(id))?;
        let NodeData::Text(text) = &mut node.data else {
            return Err(DomError::InvalidNodeType);
        };
        let old_value = std::mem::replace(&mut text.content, content.to_string());
        self.queue_mutation(MutationRecord::character_data(id, old_value));
        Ok(())
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, NodeId::NONE)
    }

    /// Insert `child` before `reference` (append when `reference` is `NONE`).
    /// The child is first detached from its current parent.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> DomResult<()> {
        if !self.node(parent)?.is_container() {
            return Err(DomError::InvalidNodeType);
        }
        if matches!(self.node(child)?.data, NodeData::Document) {
            return Err(DomError::HierarchyRequest);
        }
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::HierarchyRequest);
        }

        let mut reference = reference;
        if reference.is_valid() {
            if self.node(reference)?.parent != parent {
                return Err(DomError::NotAChild);
            }
            if reference == child {
                reference = self.nodes[child.index()].next_sibling;
            }
        }

        self.detach(child);

        let prev = if reference.is_valid() {
            self.nodes[reference.index()].prev_sibling
        } else {
            self.nodes[parent.index()].last_child
        };

        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if reference.is_valid() {
            self.nodes[reference.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }

        self.queue_mutation(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(())
    }

    /// Detach a node (and its subtree) from its parent
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        self.node(id)?;
        self.detach(id);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;

        self.queue_mutation(MutationRecord::child_list(parent, Vec::new(), vec![id]));
    }

    fn queue_mutation(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        let chain: Vec<NodeId> = std::iter::once(record.target)
            .chain(self.ancestors(record.target))
            .collect();
        tracing::trace!(kind = ?record.mutation_type, target = ?record.target, "queue mutation");
        self.observers.dispatch(&record, &chain);
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Register a mutation observer on `target`.
    ///
    /// Returns `None` when observation is unsupported for this tree.
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> Option<ObserverId> {
        self.observers.register(target, options)
    }

    /// Drop a registration and its pending records
    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.observers.unregister(observer)
    }

    /// Take the records queued for a registration
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(observer)
    }

    /// Whether a registration has queued records
    pub fn has_pending(&self, observer: ObserverId) -> bool {
        self.observers.has_pending(observer)
    }

    /// Enable or disable mutation observation. Disabling drops every
    /// registration.
    pub fn set_observers_supported(&mut self, supported: bool) {
        self.observers.set_supported(supported);
    }

    /// Whether `observe` can succeed
    pub fn observers_supported(&self) -> bool {
        self.observers.is_supported()
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Iterate over the direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next }
    }

    /// Pre-order iteration over all descendants of `root` (root excluded)
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let next = self.get(root).map_or(NodeId::NONE, |n| n.first_child);
        Descendants { tree: self, root, next }
    }

    /// Iterate over the ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let parent_of = |n: NodeId| self.get(n).map(|node| node.parent).filter(|p| p.is_valid());
        std::iter::successors(parent_of(id), move |&n| parent_of(n))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order descendant iterator
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                let Some(n) = self.tree.get(cursor) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
                if cursor == self.root || !cursor.is_valid() {
                    break NodeId::NONE;
                }
            }
        };

        Some(current)
    }
}
