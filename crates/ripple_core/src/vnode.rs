//! Virtual node model
//!
//! A [`VNode`] describes one host element or text node for a single render
//! pass. A fresh tree is built for every render; the reconciler compares it
//! with the previous tree and carries host handles across.
//!
//! ```rust
//! use ripple_core::{h, Props, VNode};
//!
//! let list: VNode<u32> = h(
//!     "ul",
//!     Props::new().attr("class", "todos"),
//!     vec![
//!         h("li", Props::new().key("a"), "first"),
//!         h("li", Props::new().key("b"), "second"),
//!     ],
//! );
//! assert!(list.shape().has_array_children());
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::VNodeError;
use crate::shape::{ChildrenShape, ShapeFlags};

/// Property name reserved for keyed identity
pub const KEY_PROP: &str = "key";

/// Event handler stored as a property value
pub type EventHandler = Arc<dyn Fn() + Send + Sync>;

// =========================================================================
// Property values
// =========================================================================

/// A single property value
#[derive(Clone)]
pub enum PropValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Event handler, compared by pointer identity
    Handler(EventHandler),
    /// Explicit removal marker
    Null,
}

impl PropValue {
    /// Returns true for the explicit removal marker
    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    /// Render the value as an attribute string (handlers and null have none)
    pub fn as_attr(&self) -> Option<String> {
        match self {
            PropValue::Str(s) => Some(s.clone()),
            PropValue::Int(i) => Some(i.to_string()),
            PropValue::Float(f) => Some(f.to_string()),
            PropValue::Bool(b) => Some(b.to_string()),
            PropValue::Handler(_) | PropValue::Null => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            // bitwise: NaN equals itself, 0.0 and -0.0 differ
            (PropValue::Float(a), PropValue::Float(b)) => a.to_bits() == b.to_bits(),
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => Arc::ptr_eq(a, b),
            (PropValue::Null, PropValue::Null) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => write!(f, "{s:?}"),
            PropValue::Int(i) => write!(f, "{i}"),
            PropValue::Float(x) => write!(f, "{x}"),
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Handler(h) => write!(f, "<handler {:p}>", Arc::as_ptr(h)),
            PropValue::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

// =========================================================================
// Keys
// =========================================================================

/// Identity of a node among its siblings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

impl From<Key> for PropValue {
    fn from(value: Key) -> Self {
        match value {
            Key::Int(i) => PropValue::Int(i),
            Key::Str(s) => PropValue::Str(s),
        }
    }
}

// =========================================================================
// Property maps
// =========================================================================

/// Insertion-ordered property map
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: IndexMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute value
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Attach an event handler (e.g. `"onClick"`)
    pub fn on<F: Fn() + Send + Sync + 'static>(mut self, name: impl Into<String>, handler: F) -> Self {
        self.entries
            .insert(name.into(), PropValue::Handler(Arc::new(handler)));
        self
    }

    /// Set the identity key
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.entries.insert(KEY_PROP.to_string(), key.into().into());
        self
    }

    /// Mark a property for removal
    ///
    /// Omitting a property does not remove it from the host node; only an
    /// explicit null does.
    pub fn remove(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), PropValue::Null);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Remove and return the reserved key entry
    fn take_key(&mut self) -> Option<PropValue> {
        self.entries.shift_remove(KEY_PROP)
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// =========================================================================
// Virtual nodes
// =========================================================================

/// What a virtual node produces
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VNodeType {
    /// A host text node
    Text,
    /// A host element with the given tag
    Element(String),
}

impl VNodeType {
    pub fn tag(&self) -> Option<&str> {
        match self {
            VNodeType::Text => None,
            VNodeType::Element(tag) => Some(tag),
        }
    }
}

/// Children of a virtual node
#[derive(Clone, Debug, Default)]
pub enum Children<N> {
    #[default]
    None,
    Text(String),
    Nodes(Vec<VNode<N>>),
}

impl<N> Children<N> {
    pub fn shape(&self) -> ChildrenShape {
        match self {
            Children::None => ChildrenShape::None,
            Children::Text(_) => ChildrenShape::Text,
            Children::Nodes(_) => ChildrenShape::Nodes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Children::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_nodes(&self) -> Option<&[VNode<N>]> {
        match self {
            Children::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }
}

impl<N> From<&str> for Children<N> {
    fn from(value: &str) -> Self {
        Children::Text(value.to_string())
    }
}

impl<N> From<String> for Children<N> {
    fn from(value: String) -> Self {
        Children::Text(value)
    }
}

impl<N> From<()> for Children<N> {
    fn from(_: ()) -> Self {
        Children::None
    }
}

impl<N> From<Vec<VNode<N>>> for Children<N> {
    fn from(value: Vec<VNode<N>>) -> Self {
        Children::Nodes(value)
    }
}

impl<N, const K: usize> From<[VNode<N>; K]> for Children<N> {
    fn from(value: [VNode<N>; K]) -> Self {
        Children::Nodes(value.into_iter().collect())
    }
}

impl<N, T: Into<VNode<N>>> FromIterator<T> for Children<N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Children::Nodes(iter.into_iter().map(Into::into).collect())
    }
}

/// A virtual node
///
/// `N` is the host node handle type. The handle is unset until the node is
/// mounted, copied forward when the node is patched by a newer node, and
/// cleared when the node is unmounted.
#[derive(Clone, Debug)]
pub struct VNode<N> {
    kind: VNodeType,
    props: Props,
    children: Children<N>,
    shape: ShapeFlags,
    key: Option<Key>,
    el: Option<N>,
}

impl<N> VNode<N> {
    /// Build a node, validating the kind/children combination
    pub fn try_new(
        kind: VNodeType,
        mut props: Props,
        children: Children<N>,
    ) -> Result<Self, VNodeError> {
        match &kind {
            VNodeType::Text => {
                if matches!(children, Children::Nodes(_)) {
                    return Err(VNodeError::TextWithChildNodes);
                }
                if !props.is_empty() {
                    return Err(VNodeError::TextWithProps(
                        props.iter().map(|(k, _)| k.to_string()).collect(),
                    ));
                }
            }
            VNodeType::Element(tag) => {
                if tag.is_empty() {
                    return Err(VNodeError::EmptyTag);
                }
            }
        }

        let key = match props.take_key() {
            Some(PropValue::Str(s)) => Some(Key::Str(s)),
            Some(PropValue::Int(i)) => Some(Key::Int(i)),
            Some(other) => return Err(VNodeError::InvalidKey(format!("{other:?}"))),
            None => None,
        };

        let shape = ShapeFlags::new(matches!(kind, VNodeType::Element(_)), children.shape());

        Ok(Self {
            kind,
            props,
            children,
            shape,
            key,
            el: None,
        })
    }

    /// Build a node
    ///
    /// # Panics
    ///
    /// Panics if the kind/children combination is malformed.
    pub fn new(kind: VNodeType, props: Props, children: Children<N>) -> Self {
        match Self::try_new(kind, props, children) {
            Ok(node) => node,
            Err(err) => panic!("malformed virtual node: {err}"),
        }
    }

    /// Build a text node
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            kind: VNodeType::Text,
            props: Props::new(),
            children: Children::Text(content),
            shape: ShapeFlags::new(false, ChildrenShape::Text),
            key: None,
            el: None,
        }
    }

    pub fn kind(&self) -> &VNodeType {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &Children<N> {
        &self.children
    }

    pub fn shape(&self) -> ShapeFlags {
        self.shape
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Host node produced by this virtual node, if mounted
    pub fn el(&self) -> Option<&N> {
        self.el.as_ref()
    }

    /// Text payload of a text node or a text-children element
    pub fn text_content(&self) -> Option<&str> {
        self.children.as_text()
    }

    pub(crate) fn set_el(&mut self, el: Option<N>) {
        self.el = el;
    }

    pub(crate) fn take_el(&mut self) -> Option<N> {
        self.el.take()
    }

    pub(crate) fn children_mut(&mut self) -> &mut Children<N> {
        &mut self.children
    }
}

impl<N> From<&str> for VNode<N> {
    fn from(value: &str) -> Self {
        VNode::text(value)
    }
}

impl<N> From<String> for VNode<N> {
    fn from(value: String) -> Self {
        VNode::text(value)
    }
}

/// Build an element node
///
/// Bare strings in a child list become text nodes:
///
/// ```rust
/// use ripple_core::{h, Children, Props, VNode};
///
/// let row: VNode<u32> = h("p", Props::new(), Children::from_iter(["a", "b"]));
/// assert_eq!(row.children().as_nodes().map(|n| n.len()), Some(2));
/// ```
pub fn h<N>(tag: &str, props: Props, children: impl Into<Children<N>>) -> VNode<N> {
    VNode::new(VNodeType::Element(tag.to_string()), props, children.into())
}

/// Two nodes are the same logical node when kind and key both match
pub fn is_same_vnode_type<N>(a: &VNode<N>, b: &VNode<N>) -> bool {
    a.kind == b.kind && a.key == b.key
}
