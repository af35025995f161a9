//! Owned element tree standing in for the live document.
//!
//! The overlay only needs a small slice of a document model: tags, attributes,
//! ordered children, text extraction and markup serialization. Nodes are addressed
//! by [`NodePath`], the list of child indices from some ancestor element.

pub mod attributes;

use std::collections::BTreeMap;
use std::fmt::Write as _;

pub use attributes::{set_attributes, AttrValue};

/// Child-index path from an ancestor element down to a node
pub type NodePath = Vec<usize>;

/// Elements serialized without a closing tag
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta"];

/// Heading tags, in the order a title is looked for
pub const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.push_child(child);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Add or remove one class token, leaving the others in place.
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        let mut classes: Vec<String> = self
            .attr("class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        if on {
            classes.push(class.to_string());
        }
        if classes.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", classes.join(" "));
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn push_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Insert a child at `index`, appending when the index is past the end.
    pub fn insert_child(&mut self, index: usize, child: impl Into<Node>) {
        let index = index.min(self.children.len());
        self.children.insert(index, child.into());
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Index of the first direct child element with `tag`.
    pub fn child_index_by_tag(&self, tag: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| node.as_element().is_some_and(|e| e.tag == tag))
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// First descendant element (depth-first, document order) matching `pred`.
    pub fn find_first(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        for element in self.child_elements() {
            if pred(element) {
                return Some(element);
            }
            if let Some(found) = element.find_first(pred) {
                return Some(found);
            }
        }
        None
    }

    /// First descendant element with one of the heading tags.
    pub fn first_heading(&self) -> Option<&Element> {
        self.find_first(&|e| HEADING_TAGS.contains(&e.tag()))
    }

    /// Paths of descendant elements matching `pred`, in document order.
    ///
    /// Matching elements are not descended into, and neither are elements for which
    /// `skip` holds.
    pub fn paths_where(
        &self,
        pred: &dyn Fn(&Element) -> bool,
        skip: &dyn Fn(&Element) -> bool,
    ) -> Vec<NodePath> {
        let mut found = Vec::new();
        let mut path = Vec::new();
        self.walk_paths(pred, skip, &mut path, &mut found);
        found
    }

    fn walk_paths(
        &self,
        pred: &dyn Fn(&Element) -> bool,
        skip: &dyn Fn(&Element) -> bool,
        path: &mut NodePath,
        found: &mut Vec<NodePath>,
    ) {
        for (index, child) in self.children.iter().enumerate() {
            let Some(element) = child.as_element() else {
                continue;
            };
            if skip(element) {
                continue;
            }
            path.push(index);
            if pred(element) {
                found.push(path.clone());
            } else {
                element.walk_paths(pred, skip, path, found);
            }
            path.pop();
        }
    }

    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &index in path {
            current = current.children.get(index)?.as_element()?;
        }
        Some(current)
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &index in path {
            current = current.children.get_mut(index)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Descendant text nodes with their paths relative to this element.
    pub fn text_nodes(&self) -> Vec<(NodePath, &str)> {
        let mut nodes = Vec::new();
        let mut path = Vec::new();
        self.walk_text(&mut path, &mut nodes);
        nodes
    }

    fn walk_text<'a>(&'a self, path: &mut NodePath, nodes: &mut Vec<(NodePath, &'a str)>) {
        for (index, child) in self.children.iter().enumerate() {
            path.push(index);
            match child {
                Node::Text(text) => nodes.push((path.clone(), text.as_str())),
                Node::Element(element) => element.walk_text(path, nodes),
            }
            path.pop();
        }
    }

    /// Serialize to markup with escaped text.
    pub fn to_markup(&self) -> String {
        self.to_markup_with(&mut |_, text, out| out.push_str(&escape(text)))
    }

    /// Serialize to markup, letting `write_text` render every text node.
    ///
    /// The callback receives the text node's path relative to `self`, its raw text,
    /// and the output buffer; it is responsible for escaping.
    pub fn to_markup_with(&self, write_text: &mut dyn FnMut(&[usize], &str, &mut String)) -> String {
        let mut out = String::new();
        let mut path = Vec::new();
        self.write_markup(&mut out, &mut path, write_text);
        out
    }

    fn write_markup(
        &self,
        out: &mut String,
        path: &mut NodePath,
        write_text: &mut dyn FnMut(&[usize], &str, &mut String),
    ) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            if value.is_empty() {
                let _ = write!(out, " {name}");
            } else {
                let _ = write!(out, " {name}=\"{}\"", escape(value));
            }
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        for (index, child) in self.children.iter().enumerate() {
            path.push(index);
            match child {
                Node::Text(text) => write_text(path, text, out),
                Node::Element(element) => element.write_markup(out, path, write_text),
            }
            path.pop();
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Escape text for inclusion in markup.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
