//! Renderer and reconciliation
//!
//! [`Renderer::render`] is the only entry point. Each call compares the new
//! virtual tree with the tree previously rendered into the same container
//! and issues the minimal set of host mutations:
//!
//! ```text
//! render ──► patch ──┬─► process_text
//!                    └─► process_element ──┬─► mount_element
//!                                          └─► patch_element ──► patch_props
//!                                                            └─► patch_children ──► patch_keyed_children
//! ```
//!
//! Host nodes are reused across renders whenever kind and key match. Only a
//! kind or key mismatch destroys and recreates a subtree.

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::host::HostOps;
use crate::sequence::longest_increasing_subsequence;
use crate::vnode::{is_same_vnode_type, Children, Key, PropValue, Props, VNode, VNodeType};

/// What a container remembers between renders
#[derive(Debug)]
pub enum Binding<N> {
    /// Content was rendered and later removed with `render(None, ..)`
    Unmounted,
    /// The tree currently on screen
    Mounted(VNode<N>),
}

/// Reconciles virtual trees into a host tree
pub struct Renderer<H: HostOps> {
    host: H,
    config: RendererConfig,
    /// Containers that have been rendered into; absent means never rendered
    roots: FxHashMap<H::Node, Binding<H::Node>>,
}

impl<H: HostOps> Renderer<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, RendererConfig::default())
    }

    pub fn with_config(host: H, config: RendererConfig) -> Self {
        Self {
            host,
            config,
            roots: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Binding for a container, `None` if it was never rendered into
    pub fn binding(&self, container: &H::Node) -> Option<&Binding<H::Node>> {
        self.roots.get(container)
    }

    /// The tree currently mounted in a container
    pub fn current(&self, container: &H::Node) -> Option<&VNode<H::Node>> {
        match self.roots.get(container) {
            Some(Binding::Mounted(vnode)) => Some(vnode),
            _ => None,
        }
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Render `vnode` into `container`, or unmount its content when `None`
    pub fn render(&mut self, vnode: Option<VNode<H::Node>>, container: &H::Node) {
        debug!(container = ?container, unmount = vnode.is_none(), "render");

        let previous = match self.roots.remove(container) {
            Some(Binding::Mounted(prev)) => Some(prev),
            _ => None,
        };

        let binding = match vnode {
            None => {
                if let Some(mut prev) = previous {
                    self.unmount(&mut prev);
                }
                Binding::Unmounted
            }
            Some(mut vnode) => {
                let mut previous = previous;
                self.patch(previous.as_mut(), &mut vnode, container, None);
                if self.config.strict {
                    self.verify_subtree(&vnode, container);
                }
                Binding::Mounted(vnode)
            }
        };

        self.roots.insert(container.clone(), binding);
    }

    /// Render into the container matching `selector`
    pub fn render_to(
        &mut self,
        vnode: Option<VNode<H::Node>>,
        selector: &str,
    ) -> Result<H::Node, RenderError> {
        let container = self
            .host
            .query_selector(selector)
            .ok_or_else(|| RenderError::ContainerNotFound(selector.to_string()))?;
        self.render(vnode, &container);
        Ok(container)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn patch(
        &mut self,
        old: Option<&mut VNode<H::Node>>,
        new: &mut VNode<H::Node>,
        container: &H::Node,
        anchor: Option<&H::Node>,
    ) {
        let mut anchor = anchor.cloned();

        let old = match old {
            Some(old) if !is_same_vnode_type(old, new) => {
                debug!(old = ?old.kind(), new = ?new.kind(), "kind or key changed, replacing subtree");
                // Take the old node's place
                anchor = self.host.next_sibling(&mounted_el(old));
                self.unmount(old);
                None
            }
            old => old,
        };

        match new.kind() {
            VNodeType::Text => self.process_text(old, new, container, anchor.as_ref()),
            VNodeType::Element(_) => self.process_element(old, new, container, anchor.as_ref()),
        }
    }

    fn process_text(
        &mut self,
        old: Option<&mut VNode<H::Node>>,
        new: &mut VNode<H::Node>,
        container: &H::Node,
        anchor: Option<&H::Node>,
    ) {
        let content = new.text_content().unwrap_or_default();
        match old {
            None => {
                let el = self.create_text(content);
                self.insert(&el, container, anchor);
                new.set_el(Some(el));
            }
            Some(old) => {
                let el = mounted_el(old);
                if old.text_content() != new.text_content() {
                    self.set_text(&el, content);
                }
                new.set_el(Some(el));
            }
        }
    }

    fn process_element(
        &mut self,
        old: Option<&mut VNode<H::Node>>,
        new: &mut VNode<H::Node>,
        container: &H::Node,
        anchor: Option<&H::Node>,
    ) {
        match old {
            None => self.mount_element(new, container, anchor),
            Some(old) => self.patch_element(old, new),
        }
    }

    // =========================================================================
    // Mount / unmount
    // =========================================================================

    fn mount_element(
        &mut self,
        vnode: &mut VNode<H::Node>,
        container: &H::Node,
        anchor: Option<&H::Node>,
    ) {
        let VNodeType::Element(tag) = vnode.kind() else {
            panic!("contract violation: mount_element on {:?}", vnode.kind());
        };
        let el = self.create_element(tag);
        trace!(tag = %tag, el = ?el, "mount element");

        for (key, value) in vnode.props().iter() {
            if !value.is_null() {
                self.patch_prop(&el, key, None, Some(value));
            }
        }

        match vnode.children_mut() {
            Children::None => {}
            Children::Text(text) => self.set_element_text(&el, text),
            Children::Nodes(children) => self.mount_children(children, &el),
        }

        self.insert(&el, container, anchor);
        vnode.set_el(Some(el));
    }

    fn mount_children(&mut self, children: &mut [VNode<H::Node>], container: &H::Node) {
        for child in children {
            self.patch(None, child, container, None);
        }
    }

    fn unmount(&mut self, vnode: &mut VNode<H::Node>) {
        let Some(el) = vnode.take_el() else {
            panic!(
                "contract violation: unmounting {:?} which has no host node",
                vnode.kind()
            );
        };
        trace!(el = ?el, kind = ?vnode.kind(), "unmount");
        self.remove(&el);
        release_descendants(vnode);
    }

    fn unmount_children(&mut self, children: &mut [VNode<H::Node>]) {
        for child in children {
            self.unmount(child);
        }
    }

    // =========================================================================
    // Patch
    // =========================================================================

    fn patch_element(&mut self, old: &mut VNode<H::Node>, new: &mut VNode<H::Node>) {
        let el = mounted_el(old);
        new.set_el(Some(el.clone()));

        self.patch_props(old.props(), new.props(), &el);
        self.patch_children(old, new, &el);
    }

    /// Reconcile properties
    ///
    /// Every non-null new value that differs from the old one is patched.
    /// An old property is removed only when the new map marks it null;
    /// properties simply missing from the new map are left alone.
    fn patch_props(&mut self, old: &Props, new: &Props, el: &H::Node) {
        for (key, next) in new.iter() {
            if next.is_null() {
                continue;
            }
            let prev = old.get(key).filter(|prev| !prev.is_null());
            if prev != Some(next) {
                self.patch_prop(el, key, prev, Some(next));
            }
        }

        for (key, prev) in old.iter() {
            if !prev.is_null() && matches!(new.get(key), Some(PropValue::Null)) {
                self.patch_prop(el, key, Some(prev), None);
            }
        }
    }

    fn patch_children(&mut self, old: &mut VNode<H::Node>, new: &mut VNode<H::Node>, el: &H::Node) {
        match (old.children_mut(), new.children_mut()) {
            (Children::Nodes(prev), Children::Text(text)) => {
                self.unmount_children(prev);
                self.set_element_text(el, text);
            }
            (Children::Text(prev), Children::Text(text)) => {
                if prev != text {
                    self.set_element_text(el, text);
                }
            }
            (Children::None, Children::Text(text)) => self.set_element_text(el, text),

            (Children::Nodes(prev), Children::Nodes(next)) => {
                self.patch_keyed_children(prev, next, el);
            }
            (Children::Text(_), Children::Nodes(next)) => {
                self.set_element_text(el, "");
                self.mount_children(next, el);
            }
            (Children::None, Children::Nodes(next)) => self.mount_children(next, el),

            (Children::Nodes(prev), Children::None) => self.unmount_children(prev),
            (Children::Text(_), Children::None) => self.set_element_text(el, ""),
            (Children::None, Children::None) => {}
        }
    }

    /// Reconcile two ordered child lists
    ///
    /// `i` walks from the front; `e1` and `e2` are exclusive ends of the
    /// still-unprocessed old and new windows.
    fn patch_keyed_children(
        &mut self,
        c1: &mut [VNode<H::Node>],
        c2: &mut [VNode<H::Node>],
        parent: &H::Node,
    ) {
        let mut i = 0;
        let mut e1 = c1.len();
        let mut e2 = c2.len();

        // 1. common prefix
        while i < e1 && i < e2 && is_same_vnode_type(&c1[i], &c2[i]) {
            self.patch(Some(&mut c1[i]), &mut c2[i], parent, None);
            i += 1;
        }

        // 2. common suffix
        while i < e1 && i < e2 && is_same_vnode_type(&c1[e1 - 1], &c2[e2 - 1]) {
            self.patch(Some(&mut c1[e1 - 1]), &mut c2[e2 - 1], parent, None);
            e1 -= 1;
            e2 -= 1;
        }

        debug!(
            prefix = i,
            suffix = c1.len() - e1,
            old_window = e1 - i,
            new_window = e2 - i,
            "keyed children"
        );

        if i >= e1 {
            // 3. only insertions remain
            let anchor = c2.get(e2).and_then(|next| next.el().cloned());
            while i < e2 {
                self.patch(None, &mut c2[i], parent, anchor.as_ref());
                i += 1;
            }
        } else if i >= e2 {
            // 4. only removals remain
            while i < e1 {
                self.unmount(&mut c1[i]);
                i += 1;
            }
        } else {
            // 5. unknown sequence
            self.patch_unknown_sequence(c1, c2, i, e1, e2, parent);
        }
    }

    fn patch_unknown_sequence(
        &mut self,
        c1: &mut [VNode<H::Node>],
        c2: &mut [VNode<H::Node>],
        start: usize,
        e1: usize,
        e2: usize,
        parent: &H::Node,
    ) {
        let mut key_to_new_index: FxHashMap<Key, usize> = FxHashMap::default();
        for (index, child) in c2.iter().enumerate().take(e2).skip(start) {
            if let Some(key) = child.key() {
                if key_to_new_index.contains_key(key) {
                    warn!(key = %key, "duplicate key among siblings; later node will be mounted fresh");
                    continue;
                }
                key_to_new_index.insert(key.clone(), index);
            }
        }

        let to_be_patched = e2 - start;
        let mut patched = 0;
        let mut moved = false;
        let mut max_new_index_so_far = 0;
        // 1-based old index for each new slot; 0 = no old counterpart
        let mut new_index_to_old_index = vec![0usize; to_be_patched];

        for old_index in start..e1 {
            if patched >= to_be_patched {
                // every new slot is matched; the rest can only be removals
                self.unmount(&mut c1[old_index]);
                continue;
            }

            let new_index = {
                let prev = &c1[old_index];
                let free = |j: usize| new_index_to_old_index[j - start] == 0;
                match prev.key() {
                    Some(key) => key_to_new_index
                        .get(key)
                        .copied()
                        .filter(|&j| free(j) && is_same_vnode_type(prev, &c2[j])),
                    None => (start..e2).find(|&j| free(j) && is_same_vnode_type(prev, &c2[j])),
                }
            };

            match new_index {
                None => self.unmount(&mut c1[old_index]),
                Some(new_index) => {
                    new_index_to_old_index[new_index - start] = old_index + 1;
                    if new_index >= max_new_index_so_far {
                        max_new_index_so_far = new_index;
                    } else {
                        moved = true;
                    }
                    self.patch(Some(&mut c1[old_index]), &mut c2[new_index], parent, None);
                    patched += 1;
                }
            }
        }

        let stable = if moved {
            longest_increasing_subsequence(&new_index_to_old_index)
        } else {
            Vec::new()
        };
        let mut stable_cursor = stable.len();
        let mut moves = 0;
        let mut mounts = 0;

        // Walk backwards so the anchor (next sibling in the new order) is
        // always already in its final place.
        for offset in (0..to_be_patched).rev() {
            let new_index = start + offset;
            let anchor = c2.get(new_index + 1).and_then(|next| next.el().cloned());

            if new_index_to_old_index[offset] == 0 {
                self.patch(None, &mut c2[new_index], parent, anchor.as_ref());
                mounts += 1;
            } else if moved {
                if stable_cursor == 0 || offset != stable[stable_cursor - 1] {
                    let el = mounted_el(&c2[new_index]);
                    trace!(el = ?el, to = new_index, "move");
                    self.insert(&el, parent, anchor.as_ref());
                    moves += 1;
                } else {
                    stable_cursor -= 1;
                }
            }
        }

        debug!(patched, mounts, moves, "unknown sequence reconciled");
    }

    // =========================================================================
    // Strict-mode invariant checks
    // =========================================================================

    fn verify_subtree(&self, vnode: &VNode<H::Node>, parent: &H::Node) {
        let Some(el) = vnode.el() else {
            panic!("invariant violated: {:?} rendered without a host node", vnode.kind());
        };
        let host_parent = self.host.parent_node(el);
        if host_parent.as_ref() != Some(parent) {
            panic!(
                "invariant violated: host node {:?} has parent {:?}, expected {:?}",
                el, host_parent, parent
            );
        }

        if let Children::Nodes(children) = vnode.children() {
            for (index, child) in children.iter().enumerate() {
                self.verify_subtree(child, el);
                if let (Some(child_el), Some(next)) = (child.el(), children.get(index + 1)) {
                    let sibling = self.host.next_sibling(child_el);
                    if sibling.as_ref() != next.el() {
                        panic!(
                            "invariant violated: host order differs from virtual order after {:?}",
                            child_el
                        );
                    }
                }
            }
        }
    }

    // =========================================================================
    // Host calls
    // =========================================================================

    fn create_element(&mut self, tag: &str) -> H::Node {
        let el = self.host.create_element(tag);
        if self.config.log_mutations {
            debug!(op = "create_element", tag = %tag, el = ?el, "host mutation");
        }
        el
    }

    fn create_text(&mut self, text: &str) -> H::Node {
        let el = self.host.create_text(text);
        if self.config.log_mutations {
            debug!(op = "create_text", text = %text, el = ?el, "host mutation");
        }
        el
    }

    fn insert(&mut self, node: &H::Node, parent: &H::Node, anchor: Option<&H::Node>) {
        if self.config.log_mutations {
            debug!(op = "insert", node = ?node, parent = ?parent, anchor = ?anchor, "host mutation");
        }
        self.host.insert(node, parent, anchor);
    }

    fn remove(&mut self, node: &H::Node) {
        if self.config.log_mutations {
            debug!(op = "remove", node = ?node, "host mutation");
        }
        self.host.remove(node);
    }

    fn set_element_text(&mut self, node: &H::Node, text: &str) {
        if self.config.log_mutations {
            debug!(op = "set_element_text", node = ?node, text = %text, "host mutation");
        }
        self.host.set_element_text(node, text);
    }

    fn set_text(&mut self, node: &H::Node, text: &str) {
        if self.config.log_mutations {
            debug!(op = "set_text", node = ?node, text = %text, "host mutation");
        }
        self.host.set_text(node, text);
    }

    fn patch_prop(
        &mut self,
        node: &H::Node,
        key: &str,
        prev: Option<&PropValue>,
        next: Option<&PropValue>,
    ) {
        if self.config.log_mutations {
            debug!(op = "patch_prop", node = ?node, key = %key, prev = ?prev, next = ?next, "host mutation");
        }
        self.host.patch_prop(node, key, prev, next);
    }
}

/// Host node of a node that must already be mounted
fn mounted_el<N: Clone>(vnode: &VNode<N>) -> N {
    match vnode.el() {
        Some(el) => el.clone(),
        None => panic!(
            "contract violation: {:?} is expected to be mounted but has no host node",
            vnode.kind()
        ),
    }
}

/// Clear host handles below a node whose host subtree was removed
fn release_descendants<N>(vnode: &mut VNode<N>) {
    if let Children::Nodes(children) = vnode.children_mut() {
        for child in children {
            child.set_el(None);
            release_descendants(child);
        }
    }
}
