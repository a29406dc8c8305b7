//! Mutation Observer registry
//!
//! Registrations live inside the tree; every mutation is offered to each
//! registration and queued as a `MutationRecord` when it matches.

use crate::NodeId;

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub(crate) fn attributes(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }

    pub(crate) fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            attribute_name: None,
            old_value: None,
        }
    }

    pub(crate) fn character_data(target: NodeId, old_value: String) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: None,
            old_value: Some(old_value),
        }
    }
}

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    fn accepts(&self, record: &MutationRecord) -> bool {
        match record.mutation_type {
            MutationType::ChildList => self.child_list,
            MutationType::CharacterData => self.character_data,
            MutationType::Attributes => {
                if !self.attributes {
                    return false;
                }
                match (&self.attribute_filter, &record.attribute_name) {
                    (Some(filter), Some(name)) => filter.iter().any(|f| f == name),
                    _ => true,
                }
            }
        }
    }
}

/// Handle returned by `DomTree::observe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Rebuild a handle from its raw value
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value, for handing the id across an API boundary
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Registration {
    id: ObserverId,
    target: NodeId,
    options: MutationObserverInit,
    pending: Vec<MutationRecord>,
}

/// All observer registrations of one tree
#[derive(Debug)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    supported: bool,
    registrations: Vec<Registration>,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            supported: true,
            registrations: Vec::new(),
        }
    }

    pub(crate) fn set_supported(&mut self, supported: bool) {
        self.supported = supported;
        if !supported {
            self.registrations.clear();
        }
    }

    pub(crate) fn is_supported(&self) -> bool {
        self.supported
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub(crate) fn register(&mut self, target: NodeId, options: MutationObserverInit) -> Option<ObserverId> {
        if !self.supported {
            return None;
        }
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration {
            id,
            target,
            options,
            pending: Vec::new(),
        });
        Some(id)
    }

    pub(crate) fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        before != self.registrations.len()
    }

    pub(crate) fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.registrations
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| std::mem::take(&mut r.pending))
            .unwrap_or_default()
    }

    pub(crate) fn has_pending(&self, id: ObserverId) -> bool {
        self.registrations
            .iter()
            .any(|r| r.id == id && !r.pending.is_empty())
    }

    /// Queue `record` on every matching registration.
    ///
    /// `chain` is the mutated node followed by its ancestors, captured at
    /// the time of the mutation.
    pub(crate) fn dispatch(&mut self, record: &MutationRecord, chain: &[NodeId]) {
        for registration in &mut self.registrations {
            let direct = chain.first() == Some(&registration.target);
            let in_subtree = registration.options.subtree && chain.contains(&registration.target);
            if (direct || in_subtree) && registration.options.accepts(record) {
                registration.pending.push(record.clone());
            }
        }
    }
}
