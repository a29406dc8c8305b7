//! `ElementTree` / `MutationSource` for the fOS arena DOM

use fos_dom::{Document, DomTree, MutationObserverInit, MutationRecord, MutationType, NodeId, ObserverId};

use crate::{ChangeRecord, ElementTree, MutationSource, ObserveOptions, SubscriptionId};

impl From<MutationRecord> for ChangeRecord<NodeId> {
    fn from(record: MutationRecord) -> Self {
        match record.mutation_type {
            MutationType::Attributes => ChangeRecord::Attributes { target: record.target },
            MutationType::ChildList => ChangeRecord::ChildList { added: record.added_nodes },
            MutationType::CharacterData => ChangeRecord::CharacterData { target: record.target },
        }
    }
}

impl From<&ObserveOptions> for MutationObserverInit {
    fn from(options: &ObserveOptions) -> Self {
        MutationObserverInit {
            child_list: options.child_list,
            attributes: options.attributes,
            character_data: false,
            subtree: options.subtree,
            attribute_filter: options.attribute_filter.clone(),
        }
    }
}

impl ElementTree for DomTree {
    type Node = NodeId;

    fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .find(|(_, node)| node.is_element())
            .map(|(id, _)| id)
    }

    fn is_element(&self, node: NodeId) -> bool {
        DomTree::is_element(self, node)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        DomTree::tag_name(self, node)
    }

    fn element_id(&self, node: NodeId) -> Option<&str> {
        DomTree::element_id(self, node)
    }

    fn class_list(&self, node: NodeId) -> Option<impl Iterator<Item = &str>> {
        DomTree::class_list(self, node).map(|list| list.iter())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get_attribute(node, name)
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        DomTree::has_attribute(self, node, name)
    }

    fn descendants(&self, root: NodeId) -> impl Iterator<Item = NodeId> {
        DomTree::descendants(self, root)
    }
}

impl MutationSource<NodeId> for DomTree {
    fn observe(&mut self, options: &ObserveOptions) -> Option<SubscriptionId> {
        let root = ElementTree::document_element(self)?;
        DomTree::observe(self, root, options.into()).map(|id| SubscriptionId::new(id.into_raw()))
    }

    fn disconnect(&mut self, subscription: SubscriptionId) {
        DomTree::disconnect(self, ObserverId::from_raw(subscription.raw()));
    }

    fn take_records(&mut self, subscription: SubscriptionId) -> Vec<ChangeRecord<NodeId>> {
        DomTree::take_records(self, ObserverId::from_raw(subscription.raw()))
            .into_iter()
            .map(ChangeRecord::from)
            .collect()
    }
}

impl ElementTree for Document {
    type Node = NodeId;

    fn document_element(&self) -> Option<NodeId> {
        Document::document_element(self)
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.tree.is_element(node)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.tree.tag_name(node)
    }

    fn element_id(&self, node: NodeId) -> Option<&str> {
        self.tree.element_id(node)
    }

    fn class_list(&self, node: NodeId) -> Option<impl Iterator<Item = &str>> {
        self.tree.class_list(node).map(|list| list.iter())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.get_attribute(node, name)
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.tree.has_attribute(node, name)
    }

    fn descendants(&self, root: NodeId) -> impl Iterator<Item = NodeId> {
        self.tree.descendants(root)
    }
}

impl MutationSource<NodeId> for Document {
    fn observe(&mut self, options: &ObserveOptions) -> Option<SubscriptionId> {
        let root = Document::document_element(self)?;
        self.tree
            .observe(root, options.into())
            .map(|id| SubscriptionId::new(id.into_raw()))
    }

    fn disconnect(&mut self, subscription: SubscriptionId) {
        MutationSource::<NodeId>::disconnect(&mut self.tree, subscription);
    }

    fn take_records(&mut self, subscription: SubscriptionId) -> Vec<ChangeRecord<NodeId>> {
        MutationSource::<NodeId>::take_records(&mut self.tree, subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_element_of_bare_tree() {
        let mut tree = DomTree::new();
        assert_eq!(ElementTree::document_element(&tree), None);

        let doctype = tree.create_doctype("html");
        let html = tree.create_element("html");
        tree.append_child(tree.root(), doctype).unwrap();
        tree.append_child(tree.root(), html).unwrap();
        assert_eq!(ElementTree::document_element(&tree), Some(html));
    }

    #[test]
    fn test_records_convert() {
        let mut doc = Document::default();
        let body = doc.body().unwrap();
        let options = ObserveOptions {
            child_list: true,
            attributes: true,
            subtree: true,
            attribute_filter: Some(vec!["class".into()]),
        };
        let subscription = MutationSource::<NodeId>::observe(&mut doc, &options).unwrap();

        let div = doc.tree_mut().create_element("div");
        doc.tree_mut().append_child(body, div).unwrap();
        doc.tree_mut().set_attribute(div, "class", "x").unwrap();
        doc.tree_mut().remove(div).unwrap();

        let records = MutationSource::<NodeId>::take_records(&mut doc, subscription);
        assert_eq!(
            records,
            vec![
                ChangeRecord::ChildList { added: vec![div] },
                ChangeRecord::Attributes { target: div },
                ChangeRecord::ChildList { added: vec![] },
            ]
        );
    }

    #[test]
    fn test_class_list_absent_without_attribute() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        assert!(ElementTree::class_list(&tree, div).is_none());
        tree.set_attribute(div, "class", "").unwrap();
        assert_eq!(ElementTree::class_list(&tree, div).map(|c| c.count()), Some(0));
    }
}
