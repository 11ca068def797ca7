//! Replay file format
//!
//! A replay file is either a bare JSON array of frames or an object naming
//! the container:
//!
//! ```json
//! {
//!   "container": "app",
//!   "frames": [
//!     { "tag": "ul", "children": [
//!       { "tag": "li", "props": { "key": 1 }, "children": "one" },
//!       "loose text"
//!     ] },
//!     null
//!   ]
//! }
//! ```
//!
//! A frame of `null` unmounts the container's tree. String props whose name
//! starts with `on` become named handlers; the same name yields the same
//! handler across frames so re-renders do not rebind it.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use ripple_core::{Children, EventHandler, PropValue, Props, VNode, VNodeType};
use ripple_host::HostNodeId;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};

fn default_container() -> String {
    "app".to_string()
}

/// A parsed replay file
#[derive(Debug, Deserialize)]
pub struct Replay {
    /// Id of the container element the frames render into
    #[serde(default = "default_container")]
    pub container: String,
    pub frames: Vec<Option<TreeSpec>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayFile {
    Frames(Vec<Option<TreeSpec>>),
    Full(Replay),
}

impl Replay {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: ReplayFile = serde_json::from_str(content)?;
        Ok(match file {
            ReplayFile::Frames(frames) => Replay {
                container: default_container(),
                frames,
            },
            ReplayFile::Full(replay) => replay,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// One virtual node as written in JSON
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum TreeSpec {
    Text(String),
    Element {
        tag: String,
        #[serde(default)]
        props: Map<String, Value>,
        #[serde(default)]
        children: Option<ChildrenSpec>,
    },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ChildrenSpec {
    Text(String),
    Nodes(Vec<TreeSpec>),
}

/// Converts JSON trees into virtual nodes
///
/// Handlers are interned by name and log when invoked.
#[derive(Default)]
pub struct FrameBuilder {
    handlers: FxHashMap<String, EventHandler>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self, spec: &TreeSpec) -> Result<VNode<HostNodeId>> {
        match spec {
            TreeSpec::Text(text) => Ok(VNode::text(text.as_str())),
            TreeSpec::Element {
                tag,
                props,
                children,
            } => {
                let props = self.props(tag, props)?;
                let children = match children {
                    None => Children::None,
                    Some(ChildrenSpec::Text(text)) => Children::Text(text.clone()),
                    Some(ChildrenSpec::Nodes(nodes)) => Children::Nodes(
                        nodes
                            .iter()
                            .map(|node| self.build(node))
                            .collect::<Result<_>>()?,
                    ),
                };
                VNode::try_new(VNodeType::Element(tag.clone()), props, children)
                    .with_context(|| format!("Invalid <{tag}> node"))
            }
        }
    }

    fn props(&mut self, tag: &str, raw: &Map<String, Value>) -> Result<Props> {
        let mut props = Props::new();
        for (name, value) in raw {
            let value = match value {
                Value::Null => PropValue::Null,
                Value::Bool(b) => PropValue::Bool(*b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => PropValue::Int(i),
                    None => PropValue::Float(n.as_f64().unwrap_or_default()),
                },
                Value::String(s) if is_handler_name(name) => {
                    PropValue::Handler(self.handler(s))
                }
                Value::String(s) => PropValue::Str(s.clone()),
                Value::Array(_) | Value::Object(_) => {
                    bail!("Prop `{name}` on <{tag}> must be a scalar or null")
                }
            };
            props.insert(name.as_str(), value);
        }
        Ok(props)
    }

    fn handler(&mut self, name: &str) -> EventHandler {
        self.handlers
            .entry(name.to_string())
            .or_insert_with(|| {
                let label = name.to_string();
                let handler: EventHandler =
                    Arc::new(move || tracing::info!(handler = %label, "handler invoked"));
                handler
            })
            .clone()
    }
}

fn is_handler_name(name: &str) -> bool {
    name.len() > 2 && name.starts_with("on")
}
