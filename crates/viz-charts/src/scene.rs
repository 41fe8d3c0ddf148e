//! # scene
//!
//! Render surface abstraction. Engines and decorations build a small node
//! tree; the surface owns the top-level nodes and serializes to SVG. HTML
//! blocks (title, legend, table) sit inside `foreignObject` nodes.

use std::fmt::{Display, Write};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

// ============================================================================
// NODE
// ============================================================================

/// Element in the render tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub tag: String,
    pub id: Option<String>,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
    pub text: Option<String>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set an attribute (replacing an existing one of the same name)
    pub fn attr(mut self, name: &str, value: impl Display) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Display) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let position = self.attrs.iter().position(|(k, _)| k == name)?;
        Some(self.attrs.remove(position).1)
    }

    /// Depth-first search by id, including self
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Number of nodes in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    pub fn write_svg(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if let Some(id) = &self.id {
            let _ = write!(out, " id=\"{}\"", escape(id));
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }

        if self.children.is_empty() && self.text.is_none() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_svg(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(128);
        self.write_svg(&mut out);
        out
    }
}

/// XML text/attribute escaping
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `foreignObject` hosting an HTML block at a position
pub fn html_block(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64, content: Node) -> Node {
    Node::new("foreignObject")
        .with_id(id)
        .attr("x", x)
        .attr("y", y)
        .attr("width", width.max(0.0))
        .attr("height", height.max(0.0))
        .child(content.attr("xmlns", XHTML_NS))
}

// ============================================================================
// STRATEGY PATTERN: Surface Trait
// ============================================================================

/// Vector surface a chart draws into
pub trait Surface {
    /// Remove every node
    fn clear(&mut self);

    /// Append a top-level node
    fn append(&mut self, node: Node);

    /// Remove the top-level node with this id
    fn remove(&mut self, id: &str) -> Option<Node>;

    /// Top-level nodes in paint order
    fn nodes(&self) -> &[Node];

    /// Mutable lookup anywhere in the tree
    fn find_mut(&mut self, id: &str) -> Option<&mut Node>;

    /// Canvas size for the viewBox
    fn resize(&mut self, width: f64, height: f64);

    fn find(&self, id: &str) -> Option<&Node> {
        self.nodes().iter().find_map(|node| node.find(id))
    }

    /// Append after dropping a same-id node from a previous pass
    fn replace(&mut self, node: Node) {
        if let Some(id) = node.id.clone() {
            self.remove(&id);
        }
        self.append(node);
    }
}

// ============================================================================
// SVG SURFACE
// ============================================================================

/// In-memory surface serializing to an `<svg>` string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgSurface {
    pub width: f64,
    pub height: f64,
    pub class: String,
    nodes: Vec<Node>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            class: "viz-chart".to_string(),
            nodes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(4096);
        let _ = write!(
            out,
            "<svg xmlns=\"{}\" class=\"{}\" viewBox=\"0 0 {} {}\" style=\"width:100%;max-width:100%\">",
            SVG_NS,
            escape(&self.class),
            self.width,
            self.height
        );
        for node in &self.nodes {
            node.write_svg(&mut out);
        }
        out.push_str("</svg>");
        out
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self) {
        self.nodes.clear();
    }

    fn append(&mut self, node: Node) {
        self.nodes.push(node);
    }

    fn remove(&mut self, id: &str) -> Option<Node> {
        let position = self
            .nodes
            .iter()
            .position(|node| node.id.as_deref() == Some(id))?;
        Some(self.nodes.remove(position))
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find_map(|node| node.find_mut(id))
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}
