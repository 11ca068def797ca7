//! Markup serialization for snapshots and assertions

use crate::tree::{HostNodeId, HostNodeKind, MemoryHost};

impl MemoryHost {
    /// Serialize a subtree as HTML-like markup
    ///
    /// Attributes appear in the order they were first set. Handlers are not
    /// serialized.
    pub fn to_markup(&self, id: HostNodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: HostNodeId, out: &mut String) {
        let Some(node) = self.nodes().get(id) else {
            return;
        };
        match &node.kind {
            HostNodeKind::Document => {
                for &child in &node.children {
                    self.write_markup(child, out);
                }
            }
            HostNodeKind::Text(text) => escape_into(text, false, out),
            HostNodeKind::Element { tag, attrs, .. } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                for &child in &node.children {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
