//! Feature extraction over parsed documents

use fos_cosmetic::{FeatureSet, IGNORED_TAGS, extract_features, extract_features_with};
use fos_dom::Document;
use pretty_assertions::assert_eq;

fn doc(html: &str) -> Document {
    fos_html::parse(html).unwrap()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Ignored kinds
// ============================================================================

#[test]
fn test_ignored_kinds_contribute_nothing() {
    let document = doc(
        r#"<head><meta id="m" class="mc"><link id="l" href="/style.css"><style id="st"></style></head>
        <body><br id="br" class="brc"><s id="strike" class="sc"></s><script id="sc" class="scc"></script>
        <p id="kept" class="k"></p></body>"#,
    );
    let root = document.document_element().unwrap();

    let features = extract_features(&document, &[root]);
    assert_eq!(
        features,
        FeatureSet {
            ids: strings(&["kept"]),
            classes: strings(&["k"]),
            hrefs: vec![],
        }
    );
}

#[test]
fn test_descendants_of_ignored_kinds_are_traversed() {
    let document = doc(r#"<s id="outer"><span id="inner" class="c"><a href="/deep"></a></span></s>"#);
    let outer = document.get_element_by_id("outer").unwrap();

    let features = extract_features(&document, &[outer]);
    assert_eq!(features.ids, strings(&["inner"]));
    assert_eq!(features.classes, strings(&["c"]));
    assert_eq!(features.hrefs, strings(&["/deep"]));
}

#[test]
fn test_ignored_set_is_a_parameter() {
    let document = doc(r#"<section id="s"><p id="p"></p></section><script id="sc"></script>"#);
    let root = document.document_element().unwrap();

    let features = extract_features_with(&document, &[root], &["section"]);
    assert_eq!(features.ids, strings(&["p", "sc"]));

    let none: &[&str] = &[];
    let features = extract_features_with(&document, &[root], none);
    assert_eq!(features.ids, strings(&["s", "p", "sc"]));
}

#[test]
fn test_default_ignored_set() {
    assert_eq!(IGNORED_TAGS.len(), 7);
    for tag in ["br", "head", "link", "meta", "script", "style", "s"] {
        assert!(IGNORED_TAGS.contains(&tag));
    }
}

// ============================================================================
// Attribute semantics
// ============================================================================

#[test]
fn test_empty_values() {
    let document = doc(r#"<a id="" href=""></a><div class=""></div><div class="   "></div>"#);
    let root = document.document_element().unwrap();

    let features = extract_features(&document, &[root]);
    assert!(features.ids.is_empty());
    assert!(features.classes.is_empty());
    assert_eq!(features.hrefs, strings(&[""]));
}

#[test]
fn test_class_tokens_split_on_whitespace() {
    let document = doc("<div class=\"a\tb\n c  a\"></div>");
    let root = document.document_element().unwrap();

    let features = extract_features(&document, &[root]);
    assert_eq!(features.classes, strings(&["a", "b", "c"]));
}

#[test]
fn test_href_is_raw_attribute_value() {
    let document = doc(r#"<a href="../rel?q=1#frag"></a><area href="http://x.test/">"#);
    let root = document.document_element().unwrap();

    let features = extract_features(&document, &[root]);
    assert_eq!(features.hrefs, strings(&["../rel?q=1#frag", "http://x.test/"]));
}

#[test]
fn test_overlapping_roots() {
    let document = doc(r#"<div id="a"><div id="b"></div></div>"#);
    let a = document.get_element_by_id("a").unwrap();
    let b = document.get_element_by_id("b").unwrap();

    let features = extract_features(&document, &[b, a]);
    assert_eq!(features.ids, strings(&["b", "a"]));
    assert_eq!(features.len(), 2);
}

#[test]
fn test_no_roots() {
    let document = doc("<p id=x></p>");
    assert!(extract_features(&document, &[]).is_empty());
}

#[test]
fn test_serializes_to_json() {
    let document = doc(r#"<a id="i" class="c" href="/h"></a>"#);
    let root = document.document_element().unwrap();
    let json = serde_json::to_value(extract_features(&document, &[root])).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "ids": ["i"], "classes": ["c"], "hrefs": ["/h"] })
    );
}
