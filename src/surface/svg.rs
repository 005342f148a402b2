//! Arena-backed SVG scene.

use std::fmt::Write;

use super::{NodeId, VectorSurface, escape_xml};

/// One element in an [`SvgScene`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl SvgNode {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Retained vector scene stored as an arena of nodes.
///
/// Freed slots are never reused, so stale handles stay harmless.
#[derive(Debug, Clone)]
pub struct SvgScene {
    nodes: Vec<Option<SvgNode>>,
    root: NodeId,
}

impl Default for SvgScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgScene {
    pub fn new() -> Self {
        let mut root = SvgNode::new("svg");
        root.attributes
            .push(("xmlns".to_string(), "http://www.w3.org/2000/svg".to_string()));
        Self {
            nodes: vec![Some(root)],
            root: NodeId(0),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&SvgNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut SvgNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?.attribute(name)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live descendants of `id` with the given tag, in document order.
    pub fn find_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_by_tag(id, tag, &mut found);
        found
    }

    fn collect_by_tag(&self, id: NodeId, tag: &str, found: &mut Vec<NodeId>) {
        for &child in self.children(id) {
            if self.node(child).is_some_and(|n| n.tag == tag) {
                found.push(child);
            }
            self.collect_by_tag(child, tag, found);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while let Some(parent) = self.node(id).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        let _ = write!(out, "<{}", node.tag);
        for (name, value) in &node.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_xml(value));
        }
        if node.children.is_empty() && node.text.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &node.text {
            out.push_str(&escape_xml(text));
        }
        for &child in &node.children {
            self.write_node(child, out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }
}

impl VectorSurface for SvgScene {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_node(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Some(SvgNode::new(tag)));
        NodeId(self.nodes.len() - 1)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child
            || !self.contains(parent)
            || !self.contains(child)
            || self.is_ancestor(child, parent)
        {
            return;
        }
        self.detach(child);
        if let Some(p) = self.node_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        if node == self.root || !self.contains(node) {
            return;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.nodes.get_mut(id.0).and_then(Option::take) {
                stack.extend(removed.children);
            }
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(n) = self.node_mut(node) else {
            return;
        };
        match n.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => {
                if v != value {
                    *v = value.to_string();
                }
            }
            None => n.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.node_mut(node) {
            n.attributes.retain(|(k, _)| k != name);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.node_mut(node) {
            n.text = Some(text.to_string());
        }
    }

    fn serialize(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }
}
