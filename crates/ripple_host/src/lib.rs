//! In-memory host tree
//!
//! [`MemoryHost`] implements [`ripple_core::HostOps`] over a slot-map node
//! store and journals every mutation the renderer issues. It is the host used
//! by tests, benchmarks, and the `ripple` replay CLI.
//!
//! ```rust
//! use ripple_core::{h, Props, Renderer};
//! use ripple_host::MemoryHost;
//!
//! let mut host = MemoryHost::new();
//! let app = host.create_container("app");
//! let mut renderer = Renderer::new(host);
//!
//! renderer.render(Some(h("p", Props::new(), "hi")), &app);
//! assert_eq!(renderer.host().to_markup(app), r#"<div id="app"><p>hi</p></div>"#);
//! ```

mod journal;
mod markup;
mod tree;

pub use journal::{Mutation, MutationStats};
pub use tree::{HostNode, HostNodeId, HostNodeKind, MemoryHost};
