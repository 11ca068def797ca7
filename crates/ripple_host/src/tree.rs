//! Slot-map backed host tree

use indexmap::IndexMap;
use ripple_core::{EventHandler, HostOps, PropValue};
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use smallvec::SmallVec;
use tracing::trace;

use crate::journal::{Mutation, MutationStats};

new_key_type! {
    /// Handle to a node in a [`MemoryHost`]
    pub struct HostNodeId;
}

/// What a host node is
#[derive(Clone)]
pub enum HostNodeKind {
    /// The root every container hangs off
    Document,
    Element {
        tag: String,
        attrs: IndexMap<String, String>,
        handlers: IndexMap<String, EventHandler>,
    },
    Text(String),
}

/// A node in the host tree
#[derive(Clone)]
pub struct HostNode {
    pub kind: HostNodeKind,
    pub parent: Option<HostNodeId>,
    pub children: SmallVec<[HostNodeId; 4]>,
}

impl HostNode {
    fn new(kind: HostNodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: SmallVec::new(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            HostNodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match &self.kind {
            HostNodeKind::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            _ => None,
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// In-memory host tree with a mutation journal
///
/// Removed nodes stay in the store, detached, so a handle never dangles.
/// The store therefore grows with every remove until [`MemoryHost::sweep`]
/// frees what is no longer reachable from the document.
pub struct MemoryHost {
    nodes: SlotMap<HostNodeId, HostNode>,
    document: HostNodeId,
    journal: Vec<Mutation>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let document = nodes.insert(HostNode::new(HostNodeKind::Document));
        Self {
            nodes,
            document,
            journal: Vec::new(),
        }
    }

    pub fn document(&self) -> HostNodeId {
        self.document
    }

    /// Append a `<div id=..>` container to the document
    ///
    /// Setup only; nothing is journaled.
    pub fn create_container(&mut self, id: &str) -> HostNodeId {
        let mut attrs = IndexMap::new();
        attrs.insert("id".to_string(), id.to_string());
        let mut node = HostNode::new(HostNodeKind::Element {
            tag: "div".to_string(),
            attrs,
            handlers: IndexMap::new(),
        });
        node.parent = Some(self.document);
        let container = self.nodes.insert(node);
        self.nodes[self.document].children.push(container);
        container
    }

    pub fn node(&self, id: HostNodeId) -> Option<&HostNode> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: HostNodeId) -> &[HostNodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn tag(&self, id: HostNodeId) -> Option<&str> {
        self.nodes.get(id).and_then(HostNode::tag)
    }

    pub fn attr(&self, id: HostNodeId, name: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.attr(name))
    }

    /// Content of a text node
    pub fn text(&self, id: HostNodeId) -> Option<&str> {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(HostNodeKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of a subtree
    pub fn text_content(&self, id: HostNodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: HostNodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if let HostNodeKind::Text(text) = &node.kind {
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// Invoke the handler bound under `name`; returns false if none is bound
    pub fn dispatch(&self, id: HostNodeId, name: &str) -> bool {
        let handler = match self.nodes.get(id).map(|n| &n.kind) {
            Some(HostNodeKind::Element { handlers, .. }) => handlers.get(name).cloned(),
            _ => None,
        };
        match handler {
            Some(handler) => {
                trace!(node = ?id, event = name, "dispatch");
                handler();
                true
            }
            None => false,
        }
    }

    /// Number of nodes in the store, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Free every node not reachable from the document
    ///
    /// Nodes that were created but not yet inserted are freed too, so only
    /// call this between renders. Returns the number of nodes freed.
    pub fn sweep(&mut self) -> usize {
        let mut reachable: SecondaryMap<HostNodeId, ()> = SecondaryMap::new();
        let mut stack: SmallVec<[HostNodeId; 16]> = SmallVec::new();
        stack.push(self.document);
        while let Some(id) = stack.pop() {
            reachable.insert(id, ());
            stack.extend(self.nodes[id].children.iter().copied());
        }

        let before = self.nodes.len();
        self.nodes.retain(|id, _| reachable.contains_key(id));
        let freed = before - self.nodes.len();
        if freed > 0 {
            trace!(freed, live = self.nodes.len(), "sweep");
        }
        freed
    }

    // =========================================================================
    // Journal
    // =========================================================================

    pub fn mutations(&self) -> &[Mutation] {
        &self.journal
    }

    /// Drain the journal
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    pub fn stats(&self) -> MutationStats {
        MutationStats::from_mutations(&self.journal)
    }

    // =========================================================================
    // Tree plumbing
    // =========================================================================

    fn node_mut(&mut self, id: HostNodeId) -> &mut HostNode {
        match self.nodes.get_mut(id) {
            Some(node) => node,
            None => panic!("unknown host node {id:?}"),
        }
    }

    /// Unlink from the parent; returns whether the node was attached
    fn detach(&mut self, id: HostNodeId) -> bool {
        let Some(parent) = self.node_mut(id).parent.take() else {
            return false;
        };
        let siblings = &mut self.node_mut(parent).children;
        if let Some(pos) = siblings.iter().position(|&c| c == id) {
            siblings.remove(pos);
        }
        true
    }

    fn find(&self, id: HostNodeId, matches: &dyn Fn(&HostNode) -> bool) -> Option<HostNodeId> {
        let node = self.nodes.get(id)?;
        if id != self.document && matches(node) {
            return Some(id);
        }
        node.children
            .iter()
            .find_map(|&child| self.find(child, matches))
    }

    pub(crate) fn nodes(&self) -> &SlotMap<HostNodeId, HostNode> {
        &self.nodes
    }
}

impl HostOps for MemoryHost {
    type Node = HostNodeId;

    fn create_element(&mut self, tag: &str) -> HostNodeId {
        let node = self.nodes.insert(HostNode::new(HostNodeKind::Element {
            tag: tag.to_string(),
            attrs: IndexMap::new(),
            handlers: IndexMap::new(),
        }));
        self.journal.push(Mutation::CreateElement {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn create_text(&mut self, text: &str) -> HostNodeId {
        let node = self
            .nodes
            .insert(HostNode::new(HostNodeKind::Text(text.to_string())));
        self.journal.push(Mutation::CreateText {
            node,
            text: text.to_string(),
        });
        node
    }

    fn insert(&mut self, node: &HostNodeId, parent: &HostNodeId, anchor: Option<&HostNodeId>) {
        let (node, parent) = (*node, *parent);
        let moved = self.detach(node);

        let children = &mut self.node_mut(parent).children;
        match anchor {
            Some(&anchor) => match children.iter().position(|&c| c == anchor) {
                Some(pos) => children.insert(pos, node),
                None => panic!("anchor {anchor:?} is not a child of {parent:?}"),
            },
            None => children.push(node),
        }
        self.node_mut(node).parent = Some(parent);

        self.journal.push(Mutation::Insert {
            node,
            parent,
            anchor: anchor.copied(),
            moved,
        });
    }

    fn remove(&mut self, node: &HostNodeId) {
        self.detach(*node);
        self.journal.push(Mutation::Remove { node: *node });
    }

    fn set_element_text(&mut self, node: &HostNodeId, text: &str) {
        let node = *node;
        let children = std::mem::take(&mut self.node_mut(node).children);
        for child in children {
            self.node_mut(child).parent = None;
        }
        if !text.is_empty() {
            let mut text_node = HostNode::new(HostNodeKind::Text(text.to_string()));
            text_node.parent = Some(node);
            let text_id = self.nodes.insert(text_node);
            self.node_mut(node).children.push(text_id);
        }
        self.journal.push(Mutation::SetElementText {
            node,
            text: text.to_string(),
        });
    }

    fn set_text(&mut self, node: &HostNodeId, text: &str) {
        match &mut self.node_mut(*node).kind {
            HostNodeKind::Text(content) => *content = text.to_string(),
            _ => panic!("set_text on non-text node {node:?}"),
        }
        self.journal.push(Mutation::SetText {
            node: *node,
            text: text.to_string(),
        });
    }

    fn query_selector(&self, selector: &str) -> Option<HostNodeId> {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            self.find(self.document, &|n| n.attr("id") == Some(id))
        } else if let Some(class) = selector.strip_prefix('.') {
            self.find(self.document, &|n| n.has_class(class))
        } else {
            self.find(self.document, &|n| n.tag() == Some(selector))
        }
    }

    fn parent_node(&self, node: &HostNodeId) -> Option<HostNodeId> {
        self.nodes.get(*node).and_then(|n| n.parent)
    }

    fn next_sibling(&self, node: &HostNodeId) -> Option<HostNodeId> {
        let parent = self.parent_node(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|c| c == node)?;
        siblings.get(pos + 1).copied()
    }

    fn patch_prop(
        &mut self,
        node: &HostNodeId,
        key: &str,
        prev: Option<&PropValue>,
        next: Option<&PropValue>,
    ) {
        let HostNodeKind::Element {
            attrs, handlers, ..
        } = &mut self.node_mut(*node).kind
        else {
            panic!("patch_prop on non-element node {node:?}");
        };

        match next {
            None | Some(PropValue::Null) => {
                attrs.shift_remove(key);
                handlers.shift_remove(key);
            }
            Some(PropValue::Handler(handler)) => {
                attrs.shift_remove(key);
                handlers.insert(key.to_string(), handler.clone());
            }
            Some(value) => {
                handlers.shift_remove(key);
                if let Some(attr) = value.as_attr() {
                    attrs.insert(key.to_string(), attr);
                }
            }
        }

        self.journal.push(Mutation::PatchProp {
            node: *node,
            key: key.to_string(),
            prev: Mutation::describe_value(prev),
            next: Mutation::describe_value(next),
        });
    }
}
