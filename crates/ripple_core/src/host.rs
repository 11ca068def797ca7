//! Host operation set
//!
//! The reconciler never touches real nodes itself. Every mutation goes
//! through a [`HostOps`] implementation supplied by the embedding
//! environment (a DOM binding, a native widget tree, an in-memory tree
//! for tests).

use std::fmt::Debug;
use std::hash::Hash;

use crate::vnode::PropValue;

/// Primitive operations on a host node tree
///
/// Operations are trusted to succeed. `insert` on a node that is already
/// attached moves it.
pub trait HostOps {
    /// Handle to a host node
    type Node: Clone + Eq + Hash + Debug;

    /// Create a detached element node
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Create a detached text node
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// Insert `node` into `parent` before `anchor`, or at the end
    fn insert(&mut self, node: &Self::Node, parent: &Self::Node, anchor: Option<&Self::Node>);

    /// Detach `node` from its parent
    fn remove(&mut self, node: &Self::Node);

    /// Replace an element's entire content with a text payload
    fn set_element_text(&mut self, node: &Self::Node, text: &str);

    /// Set the content of a text node
    fn set_text(&mut self, node: &Self::Node, text: &str);

    /// Find a node by selector
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    /// Parent of `node`, if attached
    fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Next sibling of `node`, if any
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Reconcile a single property
    ///
    /// `prev` is the previously rendered value, `next` is `None` when the
    /// property is being removed. Add-versus-update semantics, event
    /// handler rebinding, and any special-casing belong to the host.
    fn patch_prop(
        &mut self,
        node: &Self::Node,
        key: &str,
        prev: Option<&PropValue>,
        next: Option<&PropValue>,
    );
}
