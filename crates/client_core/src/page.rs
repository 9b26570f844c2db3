//! In-process model of the page fragment the transform controller drives.
//!
//! Text nodes hold literal strings and nothing in this module parses markup,
//! so rendered error detail can never become structure on the page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// A displayable reference to image bytes, as handed back by the transform
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNode {
    pub source: ImageSource,
    pub alt: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub content: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Image(ImageNode),
    Text(TextNode),
}

#[derive(Debug, Default)]
struct ElementState {
    disabled: bool,
    hidden: bool,
    click_bound: bool,
    children: Vec<Node>,
}

/// Shared handle to one page element. Cloning shares state.
#[derive(Debug, Clone, Default)]
pub struct Element {
    inner: Arc<Mutex<ElementState>>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.inner.lock().expect("element lock").disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.lock().expect("element lock").disabled
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.inner.lock().expect("element lock").hidden = hidden;
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.lock().expect("element lock").hidden
    }

    pub fn bind_click(&self) {
        self.inner.lock().expect("element lock").click_bound = true;
    }

    pub fn is_click_bound(&self) -> bool {
        self.inner.lock().expect("element lock").click_bound
    }

    /// Replace all children with the given nodes.
    pub fn replace_children(&self, nodes: Vec<Node>) {
        self.inner.lock().expect("element lock").children = nodes;
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.lock().expect("element lock").children.clone()
    }

    /// Concatenated content of all text children.
    pub fn text(&self) -> String {
        self.children()
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.content.as_str()),
                Node::Image(_) => None,
            })
            .collect()
    }
}

/// Registry of elements by id, the lookup surface a page bootstrap hands to
/// the controller.
#[derive(Debug, Default)]
pub struct Page {
    elements: HashMap<String, Element>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or fetch) the element with the given id.
    pub fn insert(&mut self, id: &str) -> Element {
        self.elements.entry(id.to_string()).or_default().clone()
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.elements.get(id).cloned()
    }
}
