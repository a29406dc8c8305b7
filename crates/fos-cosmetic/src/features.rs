//! Feature extraction
//!
//! Collects the identifiers, class tokens and link targets found in a set
//! of roots and their descendants. Everything the extractor depends on is
//! an argument or a constant of this module, so it can be re-hosted (for
//! instance in a sandboxed worker) without any monitor state.

use std::collections::HashSet;

use serde::Serialize;

use crate::ElementTree;

/// Element kinds that never contribute features or appear in element
/// updates. Their descendants are still visited.
pub const IGNORED_TAGS: &[&str] = &["br", "head", "link", "meta", "script", "style", "s"];

/// Attributes that make a descendant a candidate (`[id],[class],[href]`)
const CANDIDATE_ATTRIBUTES: [&str; 3] = ["id", "class", "href"];

/// Features extracted from (part of) a tree.
///
/// Each list is duplicate-free and in first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureSet {
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub hrefs: Vec<String>,
}

impl FeatureSet {
    /// True when all three lists are empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.classes.is_empty() && self.hrefs.is_empty()
    }

    /// Total number of values across the three lists
    pub fn len(&self) -> usize {
        self.ids.len() + self.classes.len() + self.hrefs.len()
    }
}

/// Extract features using the built-in [`IGNORED_TAGS`]
pub fn extract_features<T>(tree: &T, roots: &[T::Node]) -> FeatureSet
where
    T: ElementTree + ?Sized,
{
    extract_features_with(tree, roots, IGNORED_TAGS)
}

/// Extract features, skipping elements whose tag is in `ignored`
/// (compared ASCII case-insensitively).
///
/// Each root is considered itself, then every descendant element carrying
/// an `id`, `class` or `href` attribute. Ignored elements are checked per
/// candidate, so an ignored ancestor never hides its descendants.
pub fn extract_features_with<T, S>(tree: &T, roots: &[T::Node], ignored: &[S]) -> FeatureSet
where
    T: ElementTree + ?Sized,
    S: AsRef<str>,
{
    let mut ids = Bucket::default();
    let mut classes = Bucket::default();
    let mut hrefs = Bucket::default();

    for &root in roots {
        let candidates = std::iter::once(root).chain(tree.descendants(root).filter(|&node| {
            tree.is_element(node)
                && CANDIDATE_ATTRIBUTES
                    .iter()
                    .any(|attr| tree.has_attribute(node, attr))
        }));

        for node in candidates {
            let Some(tag) = tree.tag_name(node) else {
                continue;
            };
            if ignored.iter().any(|i| i.as_ref().eq_ignore_ascii_case(tag)) {
                continue;
            }

            // An empty id counts as no id
            if let Some(id) = tree.element_id(node).filter(|id| !id.is_empty()) {
                ids.insert(id);
            }

            if let Some(tokens) = tree.class_list(node) {
                for token in tokens {
                    classes.insert(token);
                }
            }

            // An empty href is still a link target
            if let Some(href) = tree.attribute(node, "href") {
                hrefs.insert(href);
            }
        }
    }

    FeatureSet {
        ids: ids.values,
        classes: classes.values,
        hrefs: hrefs.values,
    }
}

#[derive(Default)]
struct Bucket<'a> {
    seen: HashSet<&'a str>,
    values: Vec<String>,
}

impl<'a> Bucket<'a> {
    fn insert(&mut self, value: &'a str) {
        if self.seen.insert(value) {
            self.values.push(value.to_owned());
        }
    }
}
