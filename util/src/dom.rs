//! Arena backed XML document model.
//!
//! Nodes live in a single `Vec` owned by the [`Document`] and are addressed by
//! [`NodeId`] handles. Handles stay valid for the lifetime of the document;
//! detaching a node only unlinks it from its parent.

use std::io::{BufRead, Write};

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};

use super::{error::Error, xml::ToXml};

/// Handle to a node of one [`Document`].
///
/// Handles are plain indices: using one with a document that did not create
/// it panics when out of range, or addresses an unrelated node otherwise.
/// [`Document::contains`] checks the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document itself, or a detached fragment created by
    /// [`Document::create_fragment`].
    Root,
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

const ROOT: NodeId = NodeId(0);

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parses a complete document with exactly one root element.
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::parse_events(text, false)
    }

    /// Parses a fragment: any number of top-level elements and text nodes,
    /// all of them children of [`Document::root`].
    pub fn parse_fragment(text: &str) -> Result<Self, Error> {
        Self::parse_events(text, true)
    }

    fn parse_events(text: &str, fragment: bool) -> Result<Self, Error> {
        let mut reader = Reader::from_str(text);
        reader.trim_text(false);

        let mut document = Self::new();
        let mut stack = vec![ROOT];
        let mut buffer = Vec::new();

        loop {
            match reader.read_event(&mut buffer)? {
                Event::Start(start) => {
                    let element = document.element_from_start(&reader, &start)?;
                    document.attach_parsed(&stack, element, fragment)?;
                    stack.push(element);
                }

                Event::Empty(start) => {
                    let element = document.element_from_start(&reader, &start)?;
                    document.attach_parsed(&stack, element, fragment)?;
                }

                Event::End(..) => {
                    stack.pop();
                }

                Event::Text(text) => {
                    let content = text.unescape_and_decode(&reader)?;
                    document.attach_parsed_text(&stack, content, fragment)?;
                }

                Event::CData(text) => {
                    let content = reader.decode(&text)?.to_owned();
                    document.attach_parsed_text(&stack, content, fragment)?;
                }

                Event::Eof => break,

                _ => (),
            }

            buffer.clear();
        }

        if let Some(&open) = stack.get(1) {
            return Err(Error::UnclosedElement(
                document.name(open).unwrap_or_default().to_owned(),
            ));
        }

        if !fragment && document.document_element().is_none() {
            return Err(Error::MissingRoot);
        }

        Ok(document)
    }

    fn element_from_start<B: BufRead>(
        &mut self,
        reader: &Reader<B>,
        start: &BytesStart<'_>,
    ) -> Result<NodeId, Error> {
        let element = self.create_element(reader.decode(start.name())?);

        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = reader.decode(attribute.key)?.to_owned();
            let value = attribute.unescape_and_decode_value(reader)?;
            self.set_attribute(element, &key, &value);
        }

        Ok(element)
    }

    fn attach_parsed(
        &mut self,
        stack: &[NodeId],
        element: NodeId,
        fragment: bool,
    ) -> Result<(), Error> {
        let parent = stack.last().copied().unwrap_or(ROOT);

        if parent == ROOT && !fragment && self.document_element().is_some() {
            return Err(Error::MultipleRoots);
        }

        self.append_child(parent, element);
        Ok(())
    }

    fn attach_parsed_text(
        &mut self,
        stack: &[NodeId],
        content: String,
        fragment: bool,
    ) -> Result<(), Error> {
        if content.is_empty() {
            return Ok(());
        }

        let parent = stack.last().copied().unwrap_or(ROOT);

        if parent == ROOT && !fragment {
            // Whitespace around the root element is not part of the tree.
            if content.trim().is_empty() {
                return Ok(());
            }

            return Err(Error::TextOutsideRoot);
        }

        let text = self.create_text(content);
        self.append_child(parent, text);
        Ok(())
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// The first element directly under the document root.
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(ROOT).next()
    }

    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element {
            name: name.into(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(content.into()))
    }

    /// Creates a detached container. Appending it to a node moves its
    /// children instead of the container itself.
    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeKind::Root)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    /// # Panics
    ///
    /// Panics if `node` is not a handle of this document.
    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        match self.kind(node) {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, node: NodeId, key: &str) -> Option<&str> {
        self.attributes(node)
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `key` on an element, replacing the value in place when the
    /// attribute already exists. Has no effect on non-element nodes.
    pub fn set_attribute(&mut self, node: NodeId, key: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[node.0].kind {
            match attributes.iter_mut().find(|(name, _)| name == key) {
                Some((_, existing)) => *existing = value.to_owned(),
                None => attributes.push((key.to_owned(), value.to_owned())),
            }
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    pub fn has_children(&self, node: NodeId) -> bool {
        !self.children(node).is_empty()
    }

    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(move |&child| matches!(self.kind(child), NodeKind::Element { .. }))
    }

    pub fn find_child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.element_children(node)
            .find(|&child| self.name(child) == Some(name))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let index = self.children(parent).len();
        self.insert_at(parent, child, index);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.insert_at(parent, child, 0);
    }

    /// Inserts `child` before `reference`, or appends it when `reference` is
    /// `None` or not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);

        let index = reference
            .and_then(|reference| {
                self.children(parent)
                    .iter()
                    .position(|&existing| existing == reference)
            })
            .unwrap_or_else(|| self.children(parent).len());

        self.insert_at(parent, child, index);
    }

    fn insert_at(&mut self, parent: NodeId, child: NodeId, index: usize) {
        if child != ROOT && self.nodes[child.0].kind == NodeKind::Root {
            let moved = std::mem::take(&mut self.nodes[child.0].children);
            for (offset, grandchild) in moved.into_iter().enumerate() {
                self.nodes[grandchild.0].parent = None;
                self.insert_at(parent, grandchild, index + offset);
            }
            return;
        }

        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Unlinks `node` from its parent, returning the former parent.
    pub fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent.take()?;
        self.nodes[parent.0].children.retain(|&child| child != node);
        Some(parent)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut content = String::new();
        self.collect_text(node, &mut content);
        content
    }

    fn collect_text(&self, node: NodeId, content: &mut String) {
        match self.kind(node) {
            NodeKind::Text(text) => content.push_str(text),
            _ => {
                for &child in self.children(node) {
                    self.collect_text(child, content);
                }
            }
        }
    }

    /// Deep copies `node` out of `source` into this document. The copy is
    /// detached; importing a root yields a fragment.
    pub fn import_node(&mut self, source: &Document, node: NodeId) -> NodeId {
        let copy = self.push(source.kind(node).clone());

        for &child in source.children(node) {
            let child_copy = self.import_node(source, child);
            self.append_child(copy, child_copy);
        }

        copy
    }

    /// Overwrites the attribute values and texts of this document with those
    /// of `other`, node by node. Returns `false` and leaves `self` untouched if
    /// the two trees differ in shape (node kinds, element names, child counts
    /// or attribute keys).
    pub fn copy_values_from(&mut self, other: &Document) -> bool {
        if !self.same_shape(ROOT, other, other.root()) {
            return false;
        }

        self.copy_values(ROOT, other, other.root());
        true
    }

    fn same_shape(&self, node: NodeId, other: &Document, other_node: NodeId) -> bool {
        let kinds_match = match (self.kind(node), other.kind(other_node)) {
            (NodeKind::Root, NodeKind::Root) | (NodeKind::Text(_), NodeKind::Text(_)) => true,
            (
                NodeKind::Element { name, attributes },
                NodeKind::Element {
                    name: other_name,
                    attributes: other_attributes,
                },
            ) => {
                name == other_name
                    && attributes.len() == other_attributes.len()
                    && attributes
                        .iter()
                        .zip(other_attributes)
                        .all(|((key, _), (other_key, _))| key == other_key)
            }
            _ => false,
        };

        kinds_match
            && self.children(node).len() == other.children(other_node).len()
            && self
                .children(node)
                .iter()
                .zip(other.children(other_node))
                .all(|(&child, &other_child)| self.same_shape(child, other, other_child))
    }

    fn copy_values(&mut self, node: NodeId, other: &Document, other_node: NodeId) {
        match other.kind(other_node) {
            NodeKind::Text(text) => self.nodes[node.0].kind = NodeKind::Text(text.clone()),
            NodeKind::Element { attributes, .. } => {
                for (key, value) in attributes {
                    self.set_attribute(node, key, value);
                }
            }
            NodeKind::Root => (),
        }

        let pairs: Vec<_> = self
            .children(node)
            .iter()
            .copied()
            .zip(other.children(other_node).iter().copied())
            .collect();

        for (child, other_child) in pairs {
            self.copy_values(child, other, other_child);
        }
    }

    /// Serializes the document with an XML declaration.
    pub fn to_xml_string(&self) -> Result<String, Error> {
        let mut writer = Writer::new(Vec::new());
        self.to_xml(&mut writer)?;

        let mut xml = String::from_utf8(writer.into_inner())?;
        xml.push('\n');
        Ok(xml)
    }

    /// Serializes a single node and its descendants, without declaration.
    pub fn node_to_string(&self, node: NodeId) -> Result<String, Error> {
        let mut writer = Writer::new(Vec::new());
        self.write_node(&mut writer, node)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_node<W: Write>(&self, writer: &mut Writer<W>, node: NodeId) -> Result<(), Error> {
        let children = self.children(node);

        match self.kind(node) {
            NodeKind::Root => {
                for &child in children {
                    self.write_node(writer, child)?;
                }
            }

            NodeKind::Text(content) => {
                writer.write_event(Event::Text(BytesText::from_plain_str(content)))?;
            }

            NodeKind::Element { name, attributes } => {
                let mut start = BytesStart::borrowed_name(name.as_bytes());
                for (key, value) in attributes {
                    start.push_attribute((key.as_str(), value.as_str()));
                }

                if children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for &child in children {
                        self.write_node(writer, child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::borrowed(name.as_bytes())))?;
                }
            }
        }

        Ok(())
    }
}

impl ToXml for Document {
    fn to_xml<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error> {
        writer.write_event(Event::Decl(BytesDecl::new(b"1.0", Some(b"UTF-8"), None)))?;
        writer.write_event(Event::Text(BytesText::from_plain_str("\n")))?;
        self.write_node(writer, ROOT)
    }
}
