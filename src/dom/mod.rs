//! In-memory document tree the interactive components operate on.
//! Nodes live in an arena and are addressed by `NodeId`. Subtrees dropped
//! with `remove` or `clear_children` hand their slots back for reuse; a
//! plain `detach` keeps the subtree alive for re-insertion.

pub mod html;
pub mod selector;

pub use selector::{Selector, SelectorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot, stable for as long as the node is alive.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Layout box in document coordinates, supplied by whoever hosts the page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Rect { top, left, width, height }
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Root,
    Element(Element),
    Text(String),
    /// Released slot waiting on the free list.
    Vacant,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    styles: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    layout: Option<Rect>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    free: Vec<NodeId>,
    revision: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty `html > head + body` skeleton.
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(doc.root, html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc
    }

    pub(crate) fn empty() -> Self {
        Document {
            nodes: vec![Node {
                data: NodeData::Root,
                parent: None,
                children: Vec::new(),
                layout: None,
            }],
            root: NodeId(0),
            free: Vec::new(),
            revision: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first_by_tag("body")
    }

    /// Text of the `<title>` element, if the document has a non-empty one.
    pub fn title(&self) -> Option<String> {
        let title = self.first_by_tag("title")?;
        let text = self.text_content(title).trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.tag(id) == Some(tag))
    }

    // ── Construction ────────────────────────────────────

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            styles: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: None,
            children: Vec::new(),
            layout: None,
        };
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = node;
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Hand a detached subtree's slots back to the arena.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let node = &mut self.nodes[next.0];
            if matches!(node.data, NodeData::Vacant | NodeData::Root) {
                continue;
            }
            stack.extend(std::mem::take(&mut node.children));
            node.data = NodeData::Vacant;
            node.parent = None;
            node.layout = None;
            self.free.push(next);
        }
    }

    /// Number of slots the arena holds, live or free.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Live node stored at `index`, if any.
    pub fn node_at(&self, index: usize) -> Option<NodeId> {
        match self.nodes.get(index)?.data {
            NodeData::Vacant => None,
            _ => Some(NodeId(index)),
        }
    }

    /// Bumped by every change to the tree, attributes or styles. Layout
    /// updates do not count.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Create an element with a class list and optional text in one go.
    pub fn element_with(&mut self, tag: &str, class: &str, text: Option<&str>) -> NodeId {
        let id = self.create_element(tag);
        if !class.is_empty() {
            self.set_attr(id, "class", class);
        }
        if let Some(text) = text {
            self.set_text(id, text);
        }
        id
    }

    // ── Tree mutation ───────────────────────────────────

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.touch();
    }

    /// Insert `child` before `reference`. Falls back to appending when
    /// `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference);
        self.nodes[child.0].parent = Some(parent);
        match pos {
            Some(i) => self.nodes[parent.0].children.insert(i, child),
            None => self.nodes[parent.0].children.push(child),
        }
        self.touch();
    }

    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
            self.touch();
        }
    }

    /// Detach `id` and free its whole subtree. Ids into it are dead after
    /// this and may be handed out again.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
        self.release(id);
    }

    /// Drop every child subtree of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        if children.is_empty() {
            return;
        }
        for child in children {
            self.nodes[child.0].parent = None;
            self.release(child);
        }
        self.touch();
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        if !text.is_empty() {
            let t = self.create_text(text);
            self.append_child(id, t);
        }
    }

    // ── Navigation ──────────────────────────────────────

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// All descendants in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Inclusive containment check.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Nearest inclusive ancestor carrying `class`.
    pub fn closest_with_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if self.has_class(id, class) {
                return Some(id);
            }
            cur = self.parent(id);
        }
        None
    }

    pub fn element_by_id(&self, wanted: &str) -> Option<NodeId> {
        if wanted.is_empty() {
            return None;
        }
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.attr(id, "id") == Some(wanted))
    }

    // ── Element data ────────────────────────────────────

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        self.element(id).map(|el| el.attrs.as_slice()).unwrap_or(&[])
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if name == "style" {
            self.set_style_attr(id, value);
            return;
        }
        if self.attr(id, name) == Some(value) {
            return;
        }
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => el.attrs.push((name.to_string(), value.to_string())),
            }
            self.touch();
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if self.attr(id, name).is_none() {
            return;
        }
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|(k, _)| k != name);
            self.touch();
        }
    }

    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).contains(&class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let mut list: Vec<String> = self.classes(id).iter().map(|c| c.to_string()).collect();
        list.push(class.to_string());
        self.set_attr(id, "class", &list.join(" "));
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let list: Vec<String> = self
            .classes(id)
            .iter()
            .filter(|c| **c != class)
            .map(|c| c.to_string())
            .collect();
        if list.is_empty() {
            self.remove_attr(id, "class");
        } else {
            self.set_attr(id, "class", &list.join(" "));
        }
    }

    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    pub fn style(&self, id: NodeId, prop: &str) -> Option<&str> {
        self.element(id)?
            .styles
            .iter()
            .find(|(k, _)| k == prop)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, id: NodeId, prop: &str, value: &str) {
        if self.style(id, prop) == Some(value) {
            return;
        }
        if let Some(el) = self.element_mut(id) {
            match el.styles.iter_mut().find(|(k, _)| k == prop) {
                Some(slot) => slot.1 = value.to_string(),
                None => el.styles.push((prop.to_string(), value.to_string())),
            }
            self.touch();
        }
    }

    pub fn remove_style(&mut self, id: NodeId, prop: &str) {
        if self.style(id, prop).is_none() {
            return;
        }
        if let Some(el) = self.element_mut(id) {
            el.styles.retain(|(k, _)| k != prop);
            self.touch();
        }
    }

    /// Inline `style` attribute as written on the element.
    pub fn style_attr(&self, id: NodeId) -> String {
        self.element(id)
            .map(|el| {
                el.styles
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default()
    }

    fn set_style_attr(&mut self, id: NodeId, value: &str) {
        if !self.is_element(id) {
            return;
        }
        self.touch();
        if let Some(el) = self.element_mut(id) {
            el.styles = value
                .split(';')
                .filter_map(|decl| {
                    let (k, v) = decl.split_once(':')?;
                    let k = k.trim();
                    if k.is_empty() {
                        return None;
                    }
                    Some((k.to_ascii_lowercase(), v.trim().to_string()))
                })
                .collect();
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let NodeData::Text(t) = &self.nodes[id.0].data {
            return t.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| match &self.nodes[d.0].data {
                NodeData::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub(crate) fn is_root(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Root)
    }

    // ── Layout ──────────────────────────────────────────

    pub fn set_layout(&mut self, id: NodeId, rect: Rect) {
        self.nodes[id.0].layout = Some(rect);
    }

    pub fn layout(&self, id: NodeId) -> Option<Rect> {
        self.nodes[id.0].layout
    }

    /// True unless the element or an ancestor is hidden with `display: none`.
    pub fn is_displayed(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(node) = cur {
            if self.style(node, "display") == Some("none") {
                return false;
            }
            cur = self.parent(node);
        }
        true
    }

    // ── Queries ─────────────────────────────────────────

    /// All connected elements matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        self.select_within(self.root, selector)
    }

    pub fn select_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let parsed = Selector::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|&id| parsed.matches(self, id))
            .collect())
    }

    pub fn select_first(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.select(selector)?.into_iter().next())
    }
}
