//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena DOM.

use std::path::Path;

use fos_dom::{Document, DomTree, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::ParseError;

/// HTML5 parser
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        tracing::debug!("Parsing HTML document: {}", url);
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        self.build(&dom, url)
    }

    /// Read and parse an HTML file; the URL is the `file://` form of the path
    pub fn parse_file(&self, path: &Path) -> Result<Document, ParseError> {
        let url = format!("file://{}", path.display());
        tracing::debug!("Parsing HTML document: {}", url);
        let mut file = std::fs::File::open(path)?;
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut file)?;
        self.build(&dom, &url)
    }

    fn build(&self, dom: &RcDom, url: &str) -> Result<Document, ParseError> {
        let mut document = Document::empty(url);
        self.convert_node(&dom.document, document.tree_mut(), NodeId::ROOT)?;

        // Find html, head, body elements
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Convert an RcDom node (and its children) into the arena
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), ParseError> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent)?;
                }
            }
            RcNodeData::Doctype { name, .. } => {
                let id = tree.create_doctype(name);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if !text.trim().is_empty() {
                    let id = tree.create_text(&text);
                    tree.append_child(parent, id)?;
                }
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    tree.set_attribute(id, &attr.name.local, &attr.value)?;
                }
                tree.append_child(parent, id)?;

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id)?;
                }
            }
            RcNodeData::ProcessingInstruction { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html).unwrap();

        assert!(doc.tree().len() > 1, "Expected more than 1 node, got {}", doc.tree().len());
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
    }

    #[test]
    fn test_parse_fragment() {
        // Fragments get wrapped in html/head/body by html5ever
        let doc = HtmlParser::new().parse("<div><span>Text</span></div>").unwrap();
        let html = doc.document_element().unwrap();
        assert_eq!(doc.tree().tag_name(html), Some("html"));
    }

    #[test]
    fn test_attributes_are_cached() {
        let doc = HtmlParser::new()
            .parse(r#"<div id="a" class="b c"><a href="/x">x</a></div>"#)
            .unwrap();
        let div = doc.get_element_by_id("a").unwrap();
        let classes: Vec<_> = doc.tree().class_list(div).unwrap().iter().collect();
        assert_eq!(classes, vec!["b", "c"]);
    }
}
