//! Ripple Core Runtime
//!
//! This crate provides the reconciliation engine for the Ripple UI runtime:
//!
//! - **Virtual Nodes**: Per-render descriptions of host elements and text
//! - **Keyed Reconciliation**: Minimal host mutations between two virtual trees
//! - **Host Operations**: A pluggable trait for the real node tree
//! - **Effects**: A single-shot side-effect runner with a scoped active-effect slot
//!
//! # Example
//!
//! ```rust,ignore
//! use ripple_core::{h, Props, Renderer};
//! use ripple_host::MemoryHost;
//!
//! let mut host = MemoryHost::new();
//! let app = host.create_container("app");
//! let mut renderer = Renderer::new(host);
//!
//! renderer.render(Some(h("div", Props::new().attr("id", "a"), "hello")), &app);
//! renderer.render(Some(h("div", Props::new().attr("id", "b"), "world")), &app);
//!
//! assert_eq!(
//!     renderer.host().to_markup(app),
//!     r#"<div id="app"><div id="b">world</div></div>"#
//! );
//! ```

pub mod component;
pub mod config;
pub mod effect;
pub mod error;
pub mod host;
pub mod renderer;
pub mod sequence;
pub mod shape;
pub mod vnode;

pub use component::{split_props, ComponentProps, PropsOptions};
pub use config::RendererConfig;
pub use effect::{active_effect, effect, EffectId, ReactiveEffect};
pub use error::{ConfigError, RenderError, VNodeError};
pub use host::HostOps;
pub use renderer::{Binding, Renderer};
pub use sequence::longest_increasing_subsequence;
pub use shape::{ChildrenShape, ShapeFlags};
pub use vnode::{h, is_same_vnode_type, Children, EventHandler, Key, PropValue, Props, VNode, VNodeType};
