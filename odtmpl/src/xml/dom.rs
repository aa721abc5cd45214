//! Arena-backed mutable XML tree
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`]. Parent and child links are
//! indices, so side tables (see `fields::counter`) can key on a node without touching
//! the tree. Attaching a node always detaches it from its previous parent first, which
//! keeps the "one parent, no aliasing" invariant without reference counting.
//!
//! Removed nodes are only detached: their slot stays in the arena and the subtree below
//! them is intact, but it is no longer reachable from [`Document::root`]. A document is
//! used for a single render, so the garbage never outlives it.

/// Index of a node inside its [`Document`]. Only meaningful for the document that
/// created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot of this node
    pub fn index(self) -> usize {
        self.0
    }
}

/// A qualified attribute, kept verbatim (`text:style-name`, `xlink:href`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Payload of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The single root of the arena; parent of the document element
    Document,
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// Unescaped character data
    Text(String),
    Comment(String),
    ProcessingInstruction(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable XML document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    declaration: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the root node
    pub fn new() -> Self {
        Document {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
            declaration: None,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Contents of the `<?xml ...?>` declaration, without the delimiters
    pub fn declaration(&self) -> Option<&str> {
        self.declaration.as_deref()
    }

    pub fn set_declaration(&mut self, declaration: Option<String>) {
        self.declaration = declaration;
    }

    /// Number of arena slots, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        })
    }

    /// Create a detached element with attributes
    pub fn create_element_with(&mut self, name: &str, attributes: Vec<Attribute>) -> NodeId {
        self.push(NodeData::Element {
            name: name.to_string(),
            attributes,
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    pub fn create_processing_instruction(&mut self, text: &str) -> NodeId {
        self.push(NodeData::ProcessingInstruction(text.to_string()))
    }

    pub fn create_doctype(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Doctype(text.to_string()))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Qualified tag name, `None` for non-element nodes
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Element { .. })
    }

    /// Character data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Replace the character data of a text node. No-op for other kinds.
    pub fn set_text(&mut self, id: NodeId, value: &str) {
        if let NodeData::Text(text) = &mut self.nodes[id.0].data {
            *text = value.to_string();
        }
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.nodes[id.0].data {
            NodeData::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Set an attribute, replacing an existing value in place so attribute order is kept
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[id.0].data {
            match attributes.iter_mut().find(|attr| attr.name == name) {
                Some(attr) => attr.value = value.to_string(),
                None => attributes.push(Attribute::new(name, value)),
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.last().copied()
    }

    fn position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|child| *child == id)?;
        Some((parent, index))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position(id)?;
        self.nodes[parent.0].children.get(index + 1).copied()
    }

    /// Detach a node from its parent. The node and its subtree stay in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some((parent, index)) = self.position(id) {
            self.nodes[parent.0].children.remove(index);
        }
        self.nodes[id.0].parent = None;
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `node` right before `reference`. Returns `false` when `reference` has no
    /// parent, in which case nothing changes.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> bool {
        if reference == node || self.parent(reference).is_none() {
            return false;
        }
        self.detach(node);
        match self.position(reference) {
            Some((parent, index)) => {
                self.nodes[parent.0].children.insert(index, node);
                self.nodes[node.0].parent = Some(parent);
                true
            }
            None => false,
        }
    }

    /// Insert `node` right after `reference`, appending when `reference` is the last
    /// child. Returns `false` when `reference` has no parent.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> bool {
        if reference == node || self.parent(reference).is_none() {
            return false;
        }
        self.detach(node);
        match self.position(reference) {
            Some((parent, index)) => {
                self.nodes[parent.0].children.insert(index + 1, node);
                self.nodes[node.0].parent = Some(parent);
                true
            }
            None => false,
        }
    }

    /// Put `new` where `old` is and detach `old`
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        if !self.insert_before(old, new) {
            return false;
        }
        self.detach(old);
        true
    }

    /// Move every child of `from` to the end of `to`, keeping their order
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.0].children);
        for child in children {
            self.nodes[child.0].parent = Some(to);
            self.nodes[to.0].children.push(child);
        }
    }

    /// Iterate over the ancestors of `id`, closest first, excluding `id`
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
            remaining: self.nodes.len(),
        }
    }

    /// Nearest ancestor (excluding `id`) whose tag equals `tag`, compared
    /// ASCII-case-insensitively
    pub fn find_ancestor(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.ancestors(id).find(|ancestor| {
            self.tag_name(*ancestor)
                .is_some_and(|name| name.eq_ignore_ascii_case(tag))
        })
    }

    /// Whether the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|ancestor| ancestor == self.root())
    }

    /// The first element child of the root
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|child| self.is_element(*child))
    }

    /// All descendants of `id` in document order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Elements below `scope` named `tag`, in document order
    pub fn elements_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.tag_name(*node) == Some(tag))
            .collect()
    }

    /// First attached element named `tag`
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.elements_by_tag(self.root(), tag).into_iter().next()
    }

    /// Concatenated character data below `id`
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.text(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Deep-copy the subtree at `node` of `other` into this arena. The copy is
    /// returned detached.
    pub fn import_node(&mut self, other: &Document, node: NodeId) -> NodeId {
        let copy = self.push(other.data(node).clone());
        let mut pending: Vec<(NodeId, NodeId)> = vec![(node, copy)];
        while let Some((source, target)) = pending.pop() {
            for child in other.children(source) {
                let child_copy = self.push(other.data(*child).clone());
                self.append_child(target, child_copy);
                pending.push((*child, child_copy));
            }
        }
        copy
    }
}

/// Iterator returned by [`Document::ancestors`]
///
/// Bounded by the arena size, so a corrupted parent chain cannot loop forever.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}
