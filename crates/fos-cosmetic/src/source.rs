//! Tree and change-notification seams
//!
//! The extractor and the monitor only ever see a monitored tree through
//! [`ElementTree`] (read access) and [`MutationSource`] (change
//! notifications). Node handles are borrowed positions in a tree the
//! caller owns.

use std::fmt::Debug;
use std::hash::Hash;

/// Read-only element view of a monitored tree
pub trait ElementTree {
    /// Opaque node handle
    type Node: Copy + Eq + Hash + Debug;

    /// Root element of the document, if any
    fn document_element(&self) -> Option<Self::Node>;

    /// Whether `node` is an element (text, comments etc. are not)
    fn is_element(&self, node: Self::Node) -> bool;

    /// Tag name of an element; `None` for non-elements
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// `id` attribute of an element
    fn element_id(&self, node: Self::Node) -> Option<&str>;

    /// Class tokens of an element; `None` when it has no class list
    fn class_list(&self, node: Self::Node) -> Option<impl Iterator<Item = &str>>;

    /// Raw attribute value
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Whether the attribute is present, whatever its value
    fn has_attribute(&self, node: Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// All descendants of `root` in tree order, `root` excluded
    fn descendants(&self, root: Self::Node) -> impl Iterator<Item = Self::Node>;
}

/// Subscription handle handed out by a [`MutationSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// What a subscription asks to be notified about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Node insertions and removals
    pub child_list: bool,
    /// Attribute changes
    pub attributes: bool,
    /// Extend both to every descendant of the observed root
    pub subtree: bool,
    /// Only report changes to these attributes (`None` = all)
    pub attribute_filter: Option<Vec<String>>,
}

/// One raw change, as delivered by the notification source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeRecord<N> {
    /// A watched attribute of `target` changed
    Attributes { target: N },
    /// Nodes were inserted (removals carry no added nodes)
    ChildList { added: Vec<N> },
    /// Text content changed; never yields affected elements
    CharacterData { target: N },
}

/// Source of batched change notifications for one document.
///
/// Records accumulate per subscription until taken; one `take_records`
/// batch is one monitor cycle.
pub trait MutationSource<N> {
    /// Subscribe to changes under the document element.
    ///
    /// Returns `None` when the host has no change-notification mechanism
    /// (or nothing to observe yet).
    fn observe(&mut self, options: &ObserveOptions) -> Option<SubscriptionId>;

    /// Cancel a subscription. Unknown ids are ignored.
    fn disconnect(&mut self, subscription: SubscriptionId);

    /// Drain the records queued for a subscription
    fn take_records(&mut self, subscription: SubscriptionId) -> Vec<ChangeRecord<N>>;
}
