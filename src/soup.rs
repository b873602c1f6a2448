//! The document tree produced by [`crate::TreeBuilder`].
//!
//! Nodes live in an arena owned by [`Soup`] and refer to each other by [`NodeId`].
use html5gum::{Readable, Reader};

use crate::{Error, Tag, TagObserver, TreeBuilder};

/// Index of a node inside a [`Soup`].
///
/// Only meaningful for the soup that handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The root of the tree. There is exactly one.
    Document,
    /// `<!DOCTYPE name>`
    Doctype(String),
    /// An element, carrying the tag as it looked after all transformations.
    Element(Tag),
    /// Text content, with character references already decoded.
    Text(String),
    /// `<!-- ... -->`
    Comment(String),
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
    /// Set for `<script>` and `<style>` elements, judged by the name in the markup. Their text
    /// was tokenized verbatim, so it has to be written back verbatim too.
    raw_text: bool,
}

impl Node {
    /// The node's parent. `None` only for the document node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node's children, in document order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// What this node is.
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// The node's tag, if it is an element.
    pub fn as_tag(&self) -> Option<&Tag> {
        match self.data {
            NodeData::Element(ref tag) => Some(tag),
            _ => None,
        }
    }

    pub(crate) fn is_raw_text(&self) -> bool {
        self.raw_text
    }
}

/// A parsed HTML document.
///
/// ```
/// use soupswap::Soup;
///
/// let soup = Soup::parse(r#"<p class="intro">Hello <b>world</b></p>"#).unwrap();
/// let p = soup.find("p").unwrap();
/// assert_eq!(p.attr("class"), Some("intro"));
/// assert_eq!(p.text(), "Hello world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soup {
    nodes: Vec<Node>,
}

impl Default for Soup {
    fn default() -> Self {
        Soup {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
                raw_text: false,
            }],
        }
    }
}

impl Soup {
    /// Parse a document without transforming any tags.
    pub fn parse<'a, R: Readable<'a>>(
        input: R,
    ) -> Result<Soup, Error<<R::Reader as Reader>::Error>> {
        TreeBuilder::new().build(input)
    }

    /// Parse a document, handing every start tag to `observer` before it is inserted.
    ///
    /// Usually `observer` is a [`crate::SoupReplacer`].
    pub fn parse_with<'a, R: Readable<'a>>(
        input: R,
        observer: &mut dyn TagObserver,
    ) -> Result<Soup, Error<<R::Reader as Reader>::Error>> {
        TreeBuilder::with_observer(observer).build(input)
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node.
    ///
    /// # Panics
    ///
    /// If `id` was handed out by a different soup and is out of range.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
            raw_text: false,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn append_element(&mut self, parent: NodeId, tag: Tag, raw_text: bool) -> NodeId {
        let id = self.append(parent, NodeData::Element(tag));
        self.nodes[id.0].raw_text = raw_text;
        id
    }

    /// Append text to `parent`, merging it into a directly preceding text node.
    pub(crate) fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeData::Text(ref mut existing) = self.nodes[last.0].data {
                existing.push_str(text);
                return;
            }
        }

        self.append(parent, NodeData::Text(text.to_owned()));
    }

    /// All nodes below `id` in document order, not including `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = self.get(id).children.clone();
        stack.reverse();
        Descendants { soup: self, stack }
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.descendants(self.root())
            .filter_map(move |id| ElementRef::new(self, id))
    }

    /// The first element called `name`.
    pub fn find(&self, name: &str) -> Option<ElementRef<'_>> {
        self.elements().find(|element| element.name() == name)
    }

    /// All elements called `name`, in document order.
    pub fn find_all(&self, name: &str) -> Vec<ElementRef<'_>> {
        self.elements()
            .filter(|element| element.name() == name)
            .collect()
    }

    /// All text in the document, concatenated.
    pub fn text(&self) -> String {
        collect_text(self, self.root())
    }
}

fn collect_text(soup: &Soup, id: NodeId) -> String {
    let mut rv = String::new();
    for node in soup.descendants(id) {
        if let NodeData::Text(ref text) = soup.get(node).data {
            rv.push_str(text);
        }
    }
    rv
}

/// Pre-order iterator over node ids, see [`Soup::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    soup: &'a Soup,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.soup.get(id).children.iter().rev().copied());
        Some(id)
    }
}

/// A borrowed element of a [`Soup`].
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    soup: &'a Soup,
    id: NodeId,
    tag: &'a Tag,
}

impl<'a> ElementRef<'a> {
    fn new(soup: &'a Soup, id: NodeId) -> Option<Self> {
        soup.get(id).as_tag().map(|tag| ElementRef { soup, id, tag })
    }

    /// The element's node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The element's tag.
    pub fn tag(&self) -> &'a Tag {
        self.tag
    }

    /// The element's name.
    pub fn name(&self) -> &'a str {
        &self.tag.name
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.tag.get(name)
    }

    /// Whether the element has an attribute called `name`.
    pub fn has_attr(&self, name: &str) -> bool {
        self.tag.attributes.contains_key(name)
    }

    /// Child elements, skipping text and comments.
    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let soup = self.soup;
        soup.get(self.id)
            .children
            .iter()
            .filter_map(move |&id| ElementRef::new(soup, id))
    }

    /// The parent element, if the parent is not the document.
    pub fn parent(&self) -> Option<ElementRef<'a>> {
        ElementRef::new(self.soup, self.soup.get(self.id).parent?)
    }

    /// All text below this element, concatenated.
    pub fn text(&self) -> String {
        collect_text(self.soup, self.id)
    }
}
