//! Mutation monitor
//!
//! Turns batches of change records into element and feature updates.
//! Features are reported at most once over the monitor's lifetime; the
//! known sets survive `stop`/`start` and only go away with the monitor.

use std::collections::HashSet;
use std::marker::PhantomData;

use crate::features::{FeatureSet, extract_features_with};
use crate::{ChangeRecord, ElementTree, MonitorConfig, MutationSource, ObserveOptions, SubscriptionId};

/// Update delivered to the monitor callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorUpdate<N> {
    /// Non-ignored elements touched by one cycle, in discovery order
    Elements { elements: Vec<N> },
    /// Feature values never reported before; at least one list is non-empty
    Features {
        classes: Vec<String>,
        hrefs: Vec<String>,
        ids: Vec<String>,
    },
}

/// Every feature value reported so far. Only ever grows.
#[derive(Debug, Clone, Default)]
pub struct KnownFeatures {
    ids: HashSet<String>,
    classes: HashSet<String>,
    hrefs: HashSet<String>,
}

impl KnownFeatures {
    /// Record `features`, returning only the values not seen before
    pub fn retain_novel(&mut self, features: FeatureSet) -> FeatureSet {
        FeatureSet {
            ids: retain_novel(&mut self.ids, features.ids),
            classes: retain_novel(&mut self.classes, features.classes),
            hrefs: retain_novel(&mut self.hrefs, features.hrefs),
        }
    }

    pub fn ids(&self) -> &HashSet<String> {
        &self.ids
    }

    pub fn classes(&self) -> &HashSet<String> {
        &self.classes
    }

    pub fn hrefs(&self) -> &HashSet<String> {
        &self.hrefs
    }

    pub fn len(&self) -> usize {
        self.ids.len() + self.classes.len() + self.hrefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn retain_novel(known: &mut HashSet<String>, candidates: Vec<String>) -> Vec<String> {
    let mut novel = Vec::new();
    for value in candidates {
        if !known.contains(&value) {
            known.insert(value.clone());
            novel.push(value);
        }
    }
    novel
}

/// Incremental feature monitor over one document.
///
/// `N` is the node handle of the monitored tree; `F` receives every
/// update synchronously, in emission order.
pub struct DomMonitor<N, F>
where
    F: FnMut(MonitorUpdate<N>),
{
    config: MonitorConfig,
    known: KnownFeatures,
    subscription: Option<SubscriptionId>,
    callback: F,
    _node: PhantomData<fn(N)>,
}

impl<N, F> DomMonitor<N, F>
where
    N: Copy + Eq + std::hash::Hash + std::fmt::Debug,
    F: FnMut(MonitorUpdate<N>),
{
    /// Monitor with the default configuration
    pub fn new(callback: F) -> Self {
        Self::with_config(MonitorConfig::default(), callback)
    }

    pub fn with_config(config: MonitorConfig, callback: F) -> Self {
        Self {
            config,
            known: KnownFeatures::default(),
            subscription: None,
            callback,
            _node: PhantomData,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Features reported so far
    pub fn known(&self) -> &KnownFeatures {
        &self.known
    }

    /// Whether a subscription is active
    pub fn is_started(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribe to structural changes and watched-attribute changes
    /// under the document element.
    ///
    /// No-op when already started, or when the source cannot deliver
    /// notifications.
    pub fn start<S>(&mut self, source: &mut S)
    where
        S: MutationSource<N> + ?Sized,
    {
        if self.subscription.is_some() {
            return;
        }

        let options = ObserveOptions {
            child_list: true,
            attributes: true,
            subtree: true,
            attribute_filter: Some(self.config.watched_attributes.clone()),
        };
        match source.observe(&options) {
            Some(subscription) => {
                tracing::debug!(?subscription, "monitor started");
                self.subscription = Some(subscription);
            }
            None => tracing::debug!("change notifications unavailable, monitor stays idle"),
        }
    }

    /// Cancel the subscription, if any. Known features are kept.
    pub fn stop<S>(&mut self, source: &mut S)
    where
        S: MutationSource<N> + ?Sized,
    {
        if let Some(subscription) = self.subscription.take() {
            source.disconnect(subscription);
            tracing::debug!(?subscription, "monitor stopped");
        }
    }

    /// Full scan from the document element.
    ///
    /// Emits the document element on its own, then processes it as a
    /// regular cycle. Returns whether new features were reported.
    pub fn query_all<T>(&mut self, tree: &T) -> bool
    where
        T: ElementTree<Node = N> + ?Sized,
    {
        let Some(root) = tree.document_element() else {
            tracing::debug!("query_all: no document element");
            return false;
        };
        (self.callback)(MonitorUpdate::Elements { elements: vec![root] });
        self.handle_updated_nodes(tree, vec![root])
    }

    /// Process one delivered batch of change records as a single cycle.
    ///
    /// Returns whether new features were reported.
    pub fn handle_mutations<T>(&mut self, tree: &T, records: &[ChangeRecord<N>]) -> bool
    where
        T: ElementTree<Node = N> + ?Sized,
    {
        let elements = self.affected_elements(tree, records);
        tracing::trace!(records = records.len(), affected = elements.len(), "mutation batch");
        self.handle_updated_nodes(tree, elements)
    }

    /// Deliver the records queued since the last call as one cycle.
    ///
    /// No-op (returns `false`) when not started or nothing is queued.
    pub fn pump<T>(&mut self, tree: &mut T) -> bool
    where
        T: ElementTree<Node = N> + MutationSource<N> + ?Sized,
    {
        let Some(subscription) = self.subscription else {
            return false;
        };
        let records = tree.take_records(subscription);
        if records.is_empty() {
            return false;
        }
        self.handle_mutations(&*tree, &records)
    }

    /// Elements implicated by a batch, each listed once in first-seen
    /// order. Injected script carriers are skipped.
    fn affected_elements<T>(&self, tree: &T, records: &[ChangeRecord<N>]) -> Vec<N>
    where
        T: ElementTree<Node = N> + ?Sized,
    {
        let mut seen = HashSet::new();
        let mut elements = Vec::new();
        let mut push = |node: N| {
            if seen.insert(node) {
                elements.push(node);
            }
        };

        for record in records {
            match record {
                ChangeRecord::Attributes { target } => {
                    if tree.is_element(*target) {
                        push(*target);
                    }
                }
                ChangeRecord::ChildList { added } => {
                    for &node in added {
                        if tree.is_element(node)
                            && tree.element_id(node) != Some(self.config.script_id.as_str())
                        {
                            push(node);
                        }
                    }
                }
                ChangeRecord::CharacterData { .. } => {}
            }
        }

        elements
    }

    fn handle_updated_nodes<T>(&mut self, tree: &T, elements: Vec<N>) -> bool
    where
        T: ElementTree<Node = N> + ?Sized,
    {
        if elements.is_empty() {
            return false;
        }

        let visible = elements
            .iter()
            .copied()
            .filter(|&node| !tree.tag_name(node).is_some_and(|tag| self.config.is_ignored_tag(tag)))
            .collect();
        (self.callback)(MonitorUpdate::Elements { elements: visible });

        // Extraction runs on the unfiltered set; it skips ignored tags itself
        let features = extract_features_with(tree, &elements, &self.config.ignored_tags);
        self.handle_new_features(features)
    }

    fn handle_new_features(&mut self, features: FeatureSet) -> bool {
        let novel = self.known.retain_novel(features);
        if novel.is_empty() {
            return false;
        }

        tracing::debug!(
            ids = novel.ids.len(),
            classes = novel.classes.len(),
            hrefs = novel.hrefs.len(),
            "new features"
        );
        (self.callback)(MonitorUpdate::Features {
            classes: novel.classes,
            hrefs: novel.hrefs,
            ids: novel.ids,
        });
        true
    }
}

impl<N, F> std::fmt::Debug for DomMonitor<N, F>
where
    F: FnMut(MonitorUpdate<N>),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomMonitor")
            .field("config", &self.config)
            .field("known", &self.known.len())
            .field("subscription", &self.subscription)
            .finish()
    }
}
