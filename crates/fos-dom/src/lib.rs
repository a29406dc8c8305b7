//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree with mutation observation.

mod classlist;
mod document;
mod error;
mod interner;
mod node;
mod observer;
mod tree;

pub use classlist::DOMTokenList;
pub use document::Document;
pub use error::{DomError, DomResult};
pub use interner::{InternedString, StringInterner};
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use observer::{MutationObserverInit, MutationRecord, MutationType, ObserverId};
pub use tree::{Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document node)
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this is not the `NONE` sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Handle for an arena index; `None` past the last addressable slot
    /// (the `NONE` sentinel is never handed out)
    pub(crate) fn from_index(index: usize) -> Option<NodeId> {
        u32::try_from(index).ok().filter(|&raw| raw != u32::MAX).map(NodeId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index_never_yields_sentinel() {
        assert_eq!(NodeId::from_index(0), Some(NodeId::ROOT));
        assert_eq!(NodeId::from_index(7).map(NodeId::index), Some(7));
        let last = u32::MAX as usize - 1;
        assert_eq!(NodeId::from_index(last).map(NodeId::index), Some(last));
        assert_eq!(NodeId::from_index(u32::MAX as usize), None);
        assert_eq!(NodeId::from_index(usize::MAX), None);
    }
}
