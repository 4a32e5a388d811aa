//! Page model
//!
//! An in-memory element tree standing in for the document. Nodes live in a
//! slot map so handles stay valid (or detectably stale) across removals.

use crate::error::{CoreError, Result};
use crate::selector::{Combinator, ComplexSelector, SelectorList};
use crate::style::ElementStyle;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use vitrine_paint::{Point, Rect};

new_key_type! {
    /// Handle to an element of a [`Page`]
    pub struct NodeId;
}

/// A single element
#[derive(Clone, Debug)]
pub struct Node {
    tag: String,
    classes: SmallVec<[String; 4]>,
    attributes: SmallVec<[(String, String); 4]>,
    text: String,
    rect: Rect,
    style: ElementStyle,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: SmallVec::new(),
            attributes: SmallVec::new(),
            text: String::new(),
            rect: Rect::default(),
            style: ElementStyle::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Layout rectangle in document coordinates
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn style(&self) -> &ElementStyle {
        &self.style
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Builder describing an element (and its subtree) to insert into a page
#[derive(Clone, Debug, Default)]
pub struct Element {
    tag: String,
    classes: SmallVec<[String; 4]>,
    attributes: SmallVec<[(String, String); 4]>,
    text: String,
    rect: Rect,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Add one class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add whitespace separated classes
    pub fn classes(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the layout rectangle (document coordinates)
    pub fn rect(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.rect = Rect::new(x, y, width, height);
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Shift this subtree down by `dy`, so a section can be laid out with
    /// section-relative rectangles
    pub fn offset_y(mut self, dy: f32) -> Self {
        self.rect.y += dy;
        self.children = self.children.into_iter().map(|child| child.offset_y(dy)).collect();
        self
    }
}

/// The element tree
pub struct Page {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    ids: FxHashMap<String, NodeId>,
}

impl Page {
    /// Create a page holding only an empty `body`
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("body"));
        Self {
            nodes,
            root,
            ids: FxHashMap::default(),
        }
    }

    /// The `body` element
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Like [`Page::node`] but reports stale handles as errors
    pub fn try_node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(CoreError::MissingNode(id))
    }

    // === Tree editing ===

    /// Insert an element subtree as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let Element {
            tag,
            classes,
            attributes,
            text,
            rect,
            children,
        } = element;

        let mut node = Node::new(&tag);
        node.classes = classes;
        node.text = text;
        node.rect = rect;
        node.parent = self.nodes.contains_key(parent).then_some(parent);

        let id = self.nodes.insert(node);
        for (name, value) in attributes {
            self.set_attribute(id, &name, value);
        }
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        for child in children {
            self.append(id, child);
        }
        id
    }

    /// Remove a node and its subtree. Returns false for stale handles.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.nodes.contains_key(id) {
            return false;
        }
        if let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        let mut stack = vec![id];
        let mut removed = 0usize;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                if let Some(element_id) = node.attribute("id") {
                    if self.ids.get(element_id) == Some(&current) {
                        self.ids.remove(element_id);
                    }
                }
                stack.extend(node.children);
                removed += 1;
            }
        }
        tracing::trace!("removed {:?} ({} nodes)", id, removed);
        true
    }

    // === Accessors ===

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(Node::tag)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes.get(id).is_some_and(|n| n.has_class(class))
    }

    /// Add a class; returns true when it was not present before
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) if !node.has_class(class) => {
                node.classes.push(class.to_string());
                true
            }
            _ => false,
        }
    }

    /// Remove a class; returns true when it was present
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                let before = node.classes.len();
                node.classes.retain(|c| c != class);
                node.classes.len() != before
            }
            None => false,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.attribute(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        let previous_id = if name == "id" {
            node.attribute("id").map(str::to_string)
        } else {
            None
        };
        match node.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value.clone(),
            None => node.attributes.push((name.clone(), value.clone())),
        }
        if name == "id" {
            if let Some(previous) = previous_id {
                self.ids.remove(&previous);
            }
            self.ids.insert(value, id);
        }
    }

    /// Parse an attribute into any `FromStr` type
    pub fn parse_attribute<T: std::str::FromStr>(&self, id: NodeId, name: &str) -> Result<T> {
        let raw = self
            .attribute(id, name)
            .ok_or_else(|| CoreError::MissingAttribute(name.to_string()))?;
        raw.trim()
            .parse::<T>()
            .map_err(|_| CoreError::InvalidAttribute {
                attribute: name.to_string(),
                value: raw.to_string(),
            })
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(Node::text)
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.text = text.into();
        }
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(id).map(Node::rect)
    }

    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.rect = rect;
        }
    }

    pub fn style(&self, id: NodeId) -> Option<&ElementStyle> {
        self.nodes.get(id).map(Node::style)
    }

    pub fn style_mut(&mut self, id: NodeId) -> Option<&mut ElementStyle> {
        self.nodes.get_mut(id).map(|n| &mut n.style)
    }

    /// Look up an element by its `id` attribute
    pub fn element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.ids
            .get(element_id)
            .copied()
            .filter(|id| self.nodes.contains_key(*id))
    }

    /// Height of the laid-out document (lowest element bottom edge)
    pub fn document_height(&self) -> f32 {
        self.nodes
            .values()
            .map(|n| n.rect.bottom())
            .fold(0.0, f32::max)
    }

    // === Traversal and queries ===

    /// Strict descendants of `scope` in document order
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Test a node against a selector list
    pub fn matches(&self, id: NodeId, selectors: &SelectorList) -> bool {
        selectors
            .selectors
            .iter()
            .any(|complex| self.matches_complex(id, complex))
    }

    fn matches_complex(&self, id: NodeId, complex: &ComplexSelector) -> bool {
        match complex.segments.len() {
            0 => false,
            len => self.matches_from(id, complex, len - 1),
        }
    }

    /// Right-to-left match of segment `index` and everything before it
    fn matches_from(&self, id: NodeId, complex: &ComplexSelector, index: usize) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if !complex.segments[index].0.matches(node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match complex.segments[index - 1].1.unwrap_or(Combinator::Descendant) {
            Combinator::Child => node
                .parent
                .is_some_and(|parent| self.matches_from(parent, complex, index - 1)),
            Combinator::Descendant => {
                let mut ancestor = node.parent;
                while let Some(current) = ancestor {
                    if self.matches_from(current, complex, index - 1) {
                        return true;
                    }
                    ancestor = self.parent(current);
                }
                false
            }
        }
    }

    /// All descendants of `scope` matching the selectors, in document order
    pub fn query_all(&self, scope: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.matches(*id, selectors))
            .collect()
    }

    /// First descendant of `scope` matching the selectors
    pub fn query(&self, scope: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.matches(*id, selectors))
    }

    /// Parse `selector` and run [`Page::query_all`]
    pub fn select(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let selectors = SelectorList::parse(selector)?;
        Ok(self.query_all(scope, &selectors))
    }

    /// Parse `selector` and run [`Page::query`]
    pub fn select_first(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let selectors = SelectorList::parse(selector)?;
        Ok(self.query(scope, &selectors))
    }

    /// Nearest inclusive ancestor matching the selectors
    pub fn closest(&self, id: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.matches(node, selectors) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Deepest element whose rectangle contains `point` (document coordinates)
    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| {
                self.nodes
                    .get(*id)
                    .is_some_and(|n| n.rect.area() > 0.0 && n.rect.contains(point))
            })
            .last()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> (Page, NodeId, NodeId, NodeId) {
        let mut page = Page::new();
        let root = page.root();
        let nav = page.append(
            root,
            Element::new("nav").class("nav-links").children([
                Element::new("a").attr("href", "#about").text("About"),
                Element::new("a").attr("href", "#projects").text("Projects"),
            ]),
        );
        let section = page.append(
            root,
            Element::new("section")
                .id("about")
                .rect(0.0, 800.0, 1200.0, 600.0)
                .child(
                    Element::new("div")
                        .class("section-header")
                        .rect(0.0, 820.0, 1200.0, 80.0)
                        .child(Element::new("h2").text("About").rect(0.0, 820.0, 400.0, 40.0)),
                ),
        );
        let h2 = page.select_first(root, ".section-header h2").unwrap().unwrap();
        (page, nav, section, h2)
    }

    #[test]
    fn append_builds_tree_in_order() {
        let (page, nav, _, _) = sample();
        let links = page.children(nav);
        assert_eq!(links.len(), 2);
        assert_eq!(page.text(links[0]), Some("About"));
        assert_eq!(page.parent(links[1]), Some(nav));
    }

    #[test]
    fn descendant_and_attribute_queries() {
        let (page, nav, _, h2) = sample();
        let root = page.root();
        assert_eq!(page.select(root, ".nav-links a").unwrap(), page.children(nav).to_vec());
        assert_eq!(page.select(root, "a[href^=\"#\"]").unwrap().len(), 2);
        assert_eq!(page.select(root, "a[href=\"#projects\"]").unwrap().len(), 1);
        assert_eq!(page.select(root, "section h2").unwrap(), vec![h2]);
        assert!(page.select(root, "nav > h2").unwrap().is_empty());
    }

    #[test]
    fn id_index_follows_removal() {
        let (mut page, _, section, h2) = sample();
        assert_eq!(page.element_by_id("about"), Some(section));
        assert!(page.remove(section));
        assert_eq!(page.element_by_id("about"), None);
        assert!(!page.contains(h2));
        assert!(!page.remove(section));
    }

    #[test]
    fn class_editing_reports_changes() {
        let (mut page, nav, _, _) = sample();
        assert!(page.add_class(nav, "open"));
        assert!(!page.add_class(nav, "open"));
        assert!(page.remove_class(nav, "open"));
        assert!(!page.remove_class(nav, "open"));
    }

    #[test]
    fn parse_attribute_errors() {
        let mut page = Page::new();
        let root = page.root();
        let item = page.append(root, Element::new("div").attr("data-count", "abc"));
        assert_eq!(
            page.parse_attribute::<i64>(item, "data-count"),
            Err(CoreError::InvalidAttribute {
                attribute: "data-count".into(),
                value: "abc".into()
            })
        );
        assert_eq!(
            page.parse_attribute::<i64>(item, "data-width"),
            Err(CoreError::MissingAttribute("data-width".into()))
        );
    }

    #[test]
    fn hit_test_prefers_deepest() {
        let (page, _, section, h2) = sample();
        assert_eq!(page.hit_test(Point::new(10.0, 830.0)), Some(h2));
        assert_eq!(page.hit_test(Point::new(1000.0, 1300.0)), Some(section));
        assert_eq!(page.hit_test(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn closest_walks_ancestors() {
        let (page, _, section, h2) = sample();
        let sections = SelectorList::parse("section").unwrap();
        assert_eq!(page.closest(h2, &sections), Some(section));
        assert_eq!(page.closest(section, &sections), Some(section));
    }

    #[test]
    fn document_height_is_lowest_edge() {
        let (page, _, _, _) = sample();
        assert_eq!(page.document_height(), 1400.0);
    }

    #[test]
    fn offset_moves_whole_subtree() {
        let mut page = Page::new();
        let root = page.root();
        let section = page.append(
            root,
            Element::new("section")
                .rect(0.0, 0.0, 100.0, 300.0)
                .child(Element::new("p").rect(0.0, 50.0, 100.0, 20.0))
                .offset_y(1000.0),
        );
        let para = page.children(section)[0];
        assert_eq!(page.rect(section).unwrap().y, 1000.0);
        assert_eq!(page.rect(para).unwrap().y, 1050.0);
    }
}
