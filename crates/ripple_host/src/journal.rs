//! Mutation journal

use std::fmt;
use std::ops::AddAssign;

use ripple_core::PropValue;

use crate::tree::HostNodeId;

/// A single host mutation, in the order the renderer issued it
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    CreateElement {
        node: HostNodeId,
        tag: String,
    },
    CreateText {
        node: HostNodeId,
        text: String,
    },
    /// `moved` is true when the node was already attached somewhere
    Insert {
        node: HostNodeId,
        parent: HostNodeId,
        anchor: Option<HostNodeId>,
        moved: bool,
    },
    Remove {
        node: HostNodeId,
    },
    SetElementText {
        node: HostNodeId,
        text: String,
    },
    SetText {
        node: HostNodeId,
        text: String,
    },
    PatchProp {
        node: HostNodeId,
        key: String,
        prev: Option<String>,
        next: Option<String>,
    },
}

impl Mutation {
    /// Journal form of a property value
    pub(crate) fn describe_value(value: Option<&PropValue>) -> Option<String> {
        value.map(|value| match value {
            PropValue::Handler(_) => "<handler>".to_string(),
            other => other.as_attr().unwrap_or_else(|| "null".to_string()),
        })
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::CreateElement { node, tag } => write!(f, "create <{tag}> {node:?}"),
            Mutation::CreateText { node, text } => write!(f, "create text {text:?} {node:?}"),
            Mutation::Insert {
                node,
                parent,
                anchor,
                moved,
            } => {
                let verb = if *moved { "move" } else { "insert" };
                match anchor {
                    Some(anchor) => write!(f, "{verb} {node:?} into {parent:?} before {anchor:?}"),
                    None => write!(f, "{verb} {node:?} at end of {parent:?}"),
                }
            }
            Mutation::Remove { node } => write!(f, "remove {node:?}"),
            Mutation::SetElementText { node, text } => {
                write!(f, "set element text {node:?} = {text:?}")
            }
            Mutation::SetText { node, text } => write!(f, "set text {node:?} = {text:?}"),
            Mutation::PatchProp {
                node,
                key,
                prev,
                next,
            } => write!(f, "patch {node:?}.{key}: {prev:?} -> {next:?}"),
        }
    }
}

/// Counts of mutations by category
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MutationStats {
    /// Elements and text nodes created
    pub created: usize,
    /// Nodes detached with `remove`
    pub removed: usize,
    /// Fresh nodes inserted
    pub inserted: usize,
    /// Attached nodes re-inserted elsewhere
    pub moved: usize,
    pub prop_patches: usize,
    /// `set_text` and `set_element_text` calls
    pub text_writes: usize,
}

impl MutationStats {
    pub fn from_mutations(mutations: &[Mutation]) -> Self {
        let mut stats = Self::default();
        for mutation in mutations {
            match mutation {
                Mutation::CreateElement { .. } | Mutation::CreateText { .. } => stats.created += 1,
                Mutation::Insert { moved: true, .. } => stats.moved += 1,
                Mutation::Insert { moved: false, .. } => stats.inserted += 1,
                Mutation::Remove { .. } => stats.removed += 1,
                Mutation::SetElementText { .. } | Mutation::SetText { .. } => stats.text_writes += 1,
                Mutation::PatchProp { .. } => stats.prop_patches += 1,
            }
        }
        stats
    }

    /// Total number of mutations
    pub fn total(&self) -> usize {
        self.created + self.removed + self.inserted + self.moved + self.prop_patches + self.text_writes
    }
}

impl AddAssign for MutationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.created += rhs.created;
        self.removed += rhs.removed;
        self.inserted += rhs.inserted;
        self.moved += rhs.moved;
        self.prop_patches += rhs.prop_patches;
        self.text_writes += rhs.text_writes;
    }
}
