//! Shape classification for virtual nodes
//!
//! A node's shape records whether it produces a host element and what form
//! its children take. It is computed once when the node is built, so the
//! reconciler never re-derives type information while diffing.

/// The form of a node's children
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ChildrenShape {
    /// No children
    #[default]
    None,
    /// A plain text payload
    Text,
    /// An ordered list of child nodes
    Nodes,
}

/// Shape classification of a virtual node
///
/// `element` is orthogonal to the children shape: a text node is
/// `{ element: false, children: Text }`, a `<ul>` with items is
/// `{ element: true, children: Nodes }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ShapeFlags {
    pub element: bool,
    pub children: ChildrenShape,
}

impl ShapeFlags {
    pub const fn new(element: bool, children: ChildrenShape) -> Self {
        Self { element, children }
    }

    /// Node produces a host element
    pub fn is_element(&self) -> bool {
        self.element
    }

    /// Children are a text payload
    pub fn has_text_children(&self) -> bool {
        self.children == ChildrenShape::Text
    }

    /// Children are an ordered list of nodes
    pub fn has_array_children(&self) -> bool {
        self.children == ChildrenShape::Nodes
    }
}
