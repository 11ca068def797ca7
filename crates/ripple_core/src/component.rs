//! Component prop splitting
//!
//! Incoming attributes on a component are split into the props it declares
//! and pass-through attrs that fall through to its root element.

use rustc_hash::FxHashSet;

use crate::vnode::Props;

/// Prop names a component declares
#[derive(Clone, Debug, Default)]
pub struct PropsOptions {
    declared: FxHashSet<String>,
}

impl PropsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a prop
    pub fn prop(mut self, name: impl Into<String>) -> Self {
        self.declared.insert(name.into());
        self
    }

    pub fn declares(&self, name: &str) -> bool {
        self.declared.contains(name)
    }
}

impl<S: Into<String>> FromIterator<S> for PropsOptions {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            declared: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of splitting raw component attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentProps {
    /// Declared props
    pub props: Props,
    /// Everything else
    pub attrs: Props,
}

/// Split `raw` into declared props and pass-through attrs, preserving order
pub fn split_props(raw: Option<&Props>, options: &PropsOptions) -> ComponentProps {
    let mut split = ComponentProps::default();
    let Some(raw) = raw else {
        return split;
    };

    for (name, value) in raw.iter() {
        if options.declares(name) {
            split.props.insert(name, value.clone());
        } else {
            split.attrs.insert(name, value.clone());
        }
    }
    split
}
