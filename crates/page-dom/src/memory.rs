use std::collections::HashMap;

use ego_tree::{NodeId as TreeNodeId, NodeRef};
use html5ever::{Attribute, LocalName, Namespace, QualName};
use parking_lot::Mutex;
use scraper::node::{Element, Text};
use scraper::{ElementRef, Html, Node};
use tokio::sync::broadcast;
use tracing::debug;

use crate::document::{HostDocument, NodeId};
use crate::errors::DomError;
use crate::events::{
    DispatchOutcome, DocumentSignal, DomEvent, EventContext, EventKind, Listener, ListenerVerdict,
};
use crate::selector::Selector;

const SIGNAL_CAPACITY: usize = 1024;
const DEFAULT_VIEWPORT_HEIGHT: f64 = 900.0;
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "template", "noscript", "head"];
const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// The tree root is created before anything else, so it always gets the
/// first handle.
const DOCUMENT: NodeId = NodeId(0);

/// A scraper tree plus the state a browser keeps beside it.
///
/// Handles are dense indices into `handles`; `ids` maps tree nodes back. Both
/// only ever grow, so a handle stays valid after its node is detached.
pub(crate) struct Page {
    html: Html,
    handles: Vec<TreeNodeId>,
    ids: HashMap<TreeNodeId, NodeId>,
    body: NodeId,
    location: String,
    viewport_height: f64,
    focused: Option<NodeId>,
    caret: Option<(NodeId, usize)>,
}

impl Page {
    /// Adopts a parsed document. `<head>` and whitespace-only text are dropped
    /// and a body is created when the markup has none.
    pub(crate) fn from_parsed(location: &str, mut html: Html) -> Self {
        prune(&mut html);
        let mut page = Self {
            html,
            handles: Vec::new(),
            ids: HashMap::new(),
            body: NodeId(0),
            location: location.to_string(),
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            focused: None,
            caret: None,
        };
        let existing: Vec<TreeNodeId> = page.html.tree.nodes().map(|node| node.id()).collect();
        for id in existing {
            page.register(id);
        }
        page.body = page.ensure_body();
        page
    }

    fn register(&mut self, id: TreeNodeId) -> NodeId {
        let node = NodeId(self.handles.len() as u64);
        self.handles.push(id);
        self.ids.insert(id, node);
        node
    }

    fn ensure_body(&mut self) -> NodeId {
        let html = self.ensure_child(DOCUMENT, "html");
        self.ensure_child(html, "body")
    }

    fn ensure_child(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let existing = self
            .node(parent)
            .and_then(|node| {
                node.children()
                    .filter_map(ElementRef::wrap)
                    .find(|element| element.value().name() == tag)
                    .map(|element| element.id())
            })
            .and_then(|id| self.id_of(id));
        existing.unwrap_or_else(|| {
            let child = self.orphan(Node::Element(build_element(tag, [])));
            self.attach(parent, child);
            child
        })
    }

    /// Creates a detached node and returns its handle.
    fn orphan(&mut self, value: Node) -> NodeId {
        let id = self.html.tree.orphan(value).id();
        self.register(id)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let (Some(parent), Some(child)) = (self.handle(parent), self.handle(child)) else {
            return;
        };
        if let Some(mut parent) = self.html.tree.get_mut(parent) {
            parent.append_id(child);
        }
    }

    fn handle(&self, node: NodeId) -> Option<TreeNodeId> {
        self.handles.get(node.0 as usize).copied()
    }

    fn id_of(&self, handle: TreeNodeId) -> Option<NodeId> {
        self.ids.get(&handle).copied()
    }

    fn node(&self, node: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(self.handle(node)?)
    }

    fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        ElementRef::wrap(self.node(node)?)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        let Some(node) = self.node(node) else {
            return false;
        };
        let root = self.html.tree.root().id();
        node.id() == root || node.ancestors().any(|ancestor| ancestor.id() == root)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let (Some(ancestor), Some(node)) = (self.handle(ancestor), self.node(node)) else {
            return false;
        };
        node.id() == ancestor || node.ancestors().any(|parent| parent.id() == ancestor)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.id_of(self.node(node)?.parent()?.id())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.value().attr(name)
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.value().name())
    }

    fn text_content(&self, node: NodeId) -> String {
        let Some(node) = self.node(node) else {
            return String::new();
        };
        match ElementRef::wrap(node) {
            Some(element) => element.text().collect(),
            None => node
                .value()
                .as_text()
                .map(|text| String::from(&**text))
                .unwrap_or_default(),
        }
    }

    /// Rebuilds the element with edited attributes. `edit` reports whether it
    /// changed anything; scraper caches id and classes per element, so
    /// attributes are never patched in place.
    fn edit_attrs<F>(&mut self, node: NodeId, edit: F) -> Result<bool, DomError>
    where
        F: FnOnce(&mut Vec<(String, String)>) -> bool,
    {
        let handle = self.handle(node).ok_or(DomError::UnknownNode(node))?;
        let mut target = self
            .html
            .tree
            .get_mut(handle)
            .ok_or(DomError::UnknownNode(node))?;
        let Node::Element(element) = target.value() else {
            return Err(DomError::NotAnElement(node));
        };
        let mut attrs: Vec<(String, String)> = element
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        if !edit(&mut attrs) {
            return Ok(false);
        }
        let tag = element.name().to_string();
        *element = build_element(
            &tag,
            attrs.iter().map(|(name, value)| (name.as_str(), value.as_str())),
        );
        Ok(true)
    }

    fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node);
        if let Some(mut target) = self.handle(node).and_then(|h| self.html.tree.get_mut(h)) {
            target.detach();
        }
        parent
    }

    fn caret_at_end(&mut self, node: NodeId) {
        let length = self.text_content(node).chars().count();
        self.caret = Some((node, length));
    }
}

/// Drops what a snapshot carries but a rendered body never shows.
fn prune(html: &mut Html) {
    let doomed: Vec<TreeNodeId> = html
        .tree
        .nodes()
        .filter(|node| match node.value() {
            Node::Text(text) => text.trim().is_empty(),
            Node::Element(element) => {
                element.name() == "head"
                    && node
                        .parent()
                        .and_then(ElementRef::wrap)
                        .is_some_and(|parent| parent.value().name() == "html")
            }
            _ => false,
        })
        .map(|node| node.id())
        .collect();
    for id in doomed {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn build_element<'a>(tag: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Element {
    Element::new(
        QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs
            .into_iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: value.into(),
            })
            .collect(),
    )
}

fn text_node(text: &str) -> Node {
    Node::Text(Text { text: text.into() })
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    let value = element.value();
    NON_RENDERED_TAGS.contains(&value.name())
        || value.attr("hidden").is_some()
        || value.attr("aria-hidden") == Some("true")
        || value
            .attr("style")
            .is_some_and(|style| style_value(style, "display") == Some("none"))
}

fn height_of(node: NodeRef<'_, Node>) -> f64 {
    let Some(element) = ElementRef::wrap(node) else {
        return 0.0;
    };
    if is_hidden(element) {
        return 0.0;
    }
    let value = element.value();
    if let Some(height) = value.attr("data-height").and_then(parse_px) {
        return height;
    }
    if let Some(height) = value
        .attr("style")
        .and_then(|style| style_value(style, "height"))
        .and_then(parse_px)
    {
        return height;
    }
    node.children().map(height_of).sum()
}

fn collect_visible(node: NodeRef<'_, Node>, exclude: Option<&Selector>, out: &mut Vec<String>) {
    match node.value() {
        Node::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                out.push(text.to_string());
            }
        }
        Node::Element(_) => {
            let Some(element) = ElementRef::wrap(node) else {
                return;
            };
            if is_hidden(element) || exclude.is_some_and(|sel| sel.matches(&element)) {
                return;
            }
            for child in node.children() {
                collect_visible(child, exclude, out);
            }
        }
        _ => {}
    }
}

/// [`HostDocument`] over a scraper tree.
///
/// Listeners are invoked with no lock held, so they may freely read and write
/// the document. Only mutations of connected nodes are signalled, matching a
/// mutation observer registered on the document.
pub struct MemoryDocument {
    page: Mutex<Page>,
    listeners: Mutex<HashMap<(NodeId, EventKind), Vec<Listener>>>,
    signals: broadcast::Sender<DocumentSignal>,
    notices: Mutex<Vec<String>>,
}

impl MemoryDocument {
    /// An empty document: just `<html><body></body></html>`.
    pub fn new(location: &str) -> Self {
        Self::with_page(Page::from_parsed(location, Html::new_document()))
    }

    pub(crate) fn with_page(page: Page) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            page: Mutex::new(page),
            listeners: Mutex::new(HashMap::new()),
            signals,
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn set_viewport_height(&self, height: f64) {
        self.page.lock().viewport_height = height;
    }

    /// In-app navigation (`pushState`): the address changes silently.
    pub fn navigate(&self, location: &str) {
        self.page.lock().location = location.to_string();
    }

    /// Back/forward navigation: the address changes and a history signal fires.
    pub fn pop_state(&self, location: &str) {
        self.page.lock().location = location.to_string();
        self.emit(DocumentSignal::History {
            location: location.to_string(),
        });
    }

    /// Creates an element with attributes, appended under `parent`.
    pub fn add_element(
        &self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let lowered: Vec<(String, &str)> = attrs
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), *value))
            .collect();
        let element = build_element(
            &tag.to_ascii_lowercase(),
            lowered.iter().map(|(name, value)| (name.as_str(), *value)),
        );
        let node = self.page.lock().orphan(Node::Element(element));
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Appends a text node under `parent`.
    pub fn add_text(&self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        let node = self.page.lock().orphan(text_node(text));
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Detaches `node` from its parent.
    pub fn remove(&self, node: NodeId) -> Result<(), DomError> {
        let signal = {
            let mut page = self.page.lock();
            if page.node(node).is_none() {
                return Err(DomError::UnknownNode(node));
            }
            let was_connected = page.is_connected(node);
            match page.detach(node) {
                Some(parent) if was_connected => Some(DocumentSignal::ChildList {
                    target: parent,
                    added: Vec::new(),
                    removed: vec![node],
                }),
                _ => None,
            }
        };
        if let Some(signal) = signal {
            self.emit(signal);
        }
        Ok(())
    }

    /// Simulated user click.
    pub fn click(&self, node: NodeId) -> Result<DispatchOutcome, DomError> {
        self.dispatch(node, DomEvent::click())
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.page.lock().focused
    }

    pub fn caret(&self) -> Option<(NodeId, usize)> {
        self.page.lock().caret
    }

    /// Notices raised through [`HostDocument::notify_user`].
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().clone()
    }

    /// Number of element nodes under the body, for coarse assertions.
    pub fn element_count(&self) -> usize {
        let page = self.page.lock();
        page.element(page.body)
            .map(|body| body.descendent_elements().count().saturating_sub(1))
            .unwrap_or(0)
    }

    fn emit(&self, signal: DocumentSignal) {
        // No subscribers is fine: nothing is watching yet.
        let _ = self.signals.send(signal);
    }

    fn append_text(&self, node: NodeId, text: &str) -> Result<(), DomError> {
        let signal = {
            let mut page = self.page.lock();
            let last_text = page
                .node(node)
                .and_then(|parent| parent.last_child())
                .filter(|child| child.value().is_text())
                .map(|child| child.id());
            let target = match last_text {
                Some(existing) => {
                    if let Some(mut child) = page.html.tree.get_mut(existing) {
                        if let Node::Text(current) = child.value() {
                            current.text.push_slice(text);
                        }
                    }
                    page.id_of(existing)
                        .map(|target| DocumentSignal::CharacterData { target })
                }
                None => {
                    let added = page.orphan(text_node(text));
                    page.attach(node, added);
                    Some(DocumentSignal::ChildList {
                        target: node,
                        added: vec![added],
                        removed: Vec::new(),
                    })
                }
            };
            page.caret_at_end(node);
            target.filter(|_| page.is_connected(node))
        };
        if let Some(signal) = signal {
            self.emit(signal);
        }
        Ok(())
    }
}

impl HostDocument for MemoryDocument {
    fn location(&self) -> String {
        self.page.lock().location.clone()
    }

    fn body(&self) -> NodeId {
        self.page.lock().body
    }

    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let page = self.page.lock();
        let Some(scope) = page.element(scope) else {
            return Vec::new();
        };
        scope
            .select(selector.compiled())
            .filter_map(|element| page.id_of(element.id()))
            .collect()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.page.lock().is_connected(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.page.lock().parent(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let page = self.page.lock();
        page.element(node)
            .map(|element| {
                element
                    .child_elements()
                    .filter_map(|child| page.id_of(child.id()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.page.lock().tag(node).map(str::to_string)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.page.lock().text_content(node)
    }

    fn visible_text(&self, node: NodeId, exclude: Option<&Selector>) -> String {
        let page = self.page.lock();
        let Some(element) = page.element(node) else {
            return String::new();
        };
        if is_hidden(element) {
            return String::new();
        }
        let mut pieces = Vec::new();
        collect_visible(*element, exclude, &mut pieces);
        pieces
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn rendered_height(&self, node: NodeId) -> f64 {
        let page = self.page.lock();
        if !page.is_connected(node) {
            return 0.0;
        }
        page.node(node).map(height_of).unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.page.lock().viewport_height
    }

    fn is_editable(&self, node: NodeId) -> bool {
        let page = self.page.lock();
        let Some(element) = page.element(node) else {
            return false;
        };
        let value = element.value();
        matches!(value.name(), "textarea" | "input")
            || matches!(
                value.attr("contenteditable"),
                Some("" | "true" | "plaintext-only")
            )
    }

    fn create_element(&self, tag: &str) -> NodeId {
        let element = build_element(&tag.to_ascii_lowercase(), []);
        self.page.lock().orphan(Node::Element(element))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.page
            .lock()
            .attr(node, &name.to_ascii_lowercase())
            .map(str::to_string)
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let signalled = {
            let mut page = self.page.lock();
            let changed = page.edit_attrs(node, |attrs| {
                match attrs.iter_mut().find(|(key, _)| *key == name) {
                    Some((_, existing)) if existing.as_str() == value => false,
                    Some((_, existing)) => {
                        *existing = value.to_string();
                        true
                    }
                    None => {
                        attrs.push((name.clone(), value.to_string()));
                        true
                    }
                }
            })?;
            changed && page.is_connected(node)
        };
        if signalled {
            self.emit(DocumentSignal::Attributes { target: node, name });
        }
        Ok(())
    }

    fn remove_attribute(&self, node: NodeId, name: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let signalled = {
            let mut page = self.page.lock();
            let changed = page.edit_attrs(node, |attrs| {
                let before = attrs.len();
                attrs.retain(|(key, _)| *key != name);
                attrs.len() != before
            })?;
            changed && page.is_connected(node)
        };
        if signalled {
            self.emit(DocumentSignal::Attributes { target: node, name });
        }
        Ok(())
    }

    fn set_text(&self, node: NodeId, text: &str) -> Result<(), DomError> {
        let signal = {
            let mut page = self.page.lock();
            let existing: Vec<TreeNodeId> = match page.node(node) {
                Some(target) if target.value().is_element() => {
                    target.children().map(|child| child.id()).collect()
                }
                Some(_) => return Err(DomError::NotAnElement(node)),
                None => return Err(DomError::UnknownNode(node)),
            };
            let mut removed = Vec::new();
            for child in existing {
                if let Some(mut detached) = page.html.tree.get_mut(child) {
                    detached.detach();
                }
                removed.extend(page.id_of(child));
            }
            let mut added = Vec::new();
            if !text.is_empty() {
                let fresh = page.orphan(text_node(text));
                page.attach(node, fresh);
                added.push(fresh);
            }
            if page.caret.is_some_and(|(caret, _)| caret == node) {
                page.caret = Some((node, text.chars().count()));
            }
            (page.is_connected(node) && !(added.is_empty() && removed.is_empty())).then_some(
                DocumentSignal::ChildList {
                    target: node,
                    added,
                    removed,
                },
            )
        };
        if let Some(signal) = signal {
            self.emit(signal);
        }
        Ok(())
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let signals = {
            let mut page = self.page.lock();
            match page.node(parent) {
                Some(node) if node.value().is_element() => {}
                Some(_) => return Err(DomError::NotAnElement(parent)),
                None => return Err(DomError::UnknownNode(parent)),
            }
            if page.node(child).is_none() {
                return Err(DomError::UnknownNode(child));
            }
            if page.is_ancestor_or_self(child, parent) {
                return Err(DomError::HierarchyRequest { parent, child });
            }
            let mut signals = Vec::new();
            let was_connected = page.is_connected(child);
            if let Some(old_parent) = page.detach(child) {
                if was_connected {
                    signals.push(DocumentSignal::ChildList {
                        target: old_parent,
                        added: Vec::new(),
                        removed: vec![child],
                    });
                }
            }
            page.attach(parent, child);
            if page.is_connected(parent) {
                signals.push(DocumentSignal::ChildList {
                    target: parent,
                    added: vec![child],
                    removed: Vec::new(),
                });
            }
            signals
        };
        for signal in signals {
            self.emit(signal);
        }
        Ok(())
    }

    fn focus(&self, node: NodeId) -> Result<(), DomError> {
        let mut page = self.page.lock();
        if page.node(node).is_none() {
            return Err(DomError::UnknownNode(node));
        }
        page.focused = Some(node);
        Ok(())
    }

    fn set_caret_to_end(&self, node: NodeId) -> Result<(), DomError> {
        let mut page = self.page.lock();
        if page.node(node).is_none() {
            return Err(DomError::UnknownNode(node));
        }
        page.caret_at_end(node);
        Ok(())
    }

    fn add_listener(&self, node: NodeId, kind: EventKind, listener: Listener) {
        self.listeners
            .lock()
            .entry((node, kind))
            .or_default()
            .push(listener);
    }

    fn dispatch(&self, target: NodeId, event: DomEvent) -> Result<DispatchOutcome, DomError> {
        let path = {
            let page = self.page.lock();
            let Some(node) = page.node(target) else {
                return Err(DomError::UnknownNode(target));
            };
            let mut path = vec![target];
            if event.bubbles {
                path.extend(node.ancestors().filter_map(|ancestor| page.id_of(ancestor.id())));
            }
            path
        };

        let mut outcome = DispatchOutcome::default();
        for current in path {
            let registered = self
                .listeners
                .lock()
                .get(&(current, event.kind))
                .cloned()
                .unwrap_or_default();
            for listener in registered {
                outcome.handled = true;
                let ctx = EventContext {
                    event: &event,
                    target,
                    current,
                };
                if listener(&ctx)? == ListenerVerdict::PreventDefault {
                    outcome.default_prevented = true;
                }
            }
        }

        if event.kind == EventKind::InsertText && !outcome.default_prevented {
            if let Some(data) = event.data.as_deref() {
                if self.is_editable(target) {
                    self.append_text(target, data)?;
                } else {
                    debug!(%target, "insert ignored on non-editable target");
                }
            }
        }
        Ok(outcome)
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentSignal> {
        self.signals.subscribe()
    }

    fn notify_user(&self, message: &str) {
        self.notices.lock().push(message.to_string());
    }
}

fn style_value<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style.split(';').find_map(|decl| {
        let (key, value) = decl.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(property)
            .then(|| value.trim())
    })
}

fn parse_px(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches("px").trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::events::listener;

    fn doc() -> MemoryDocument {
        MemoryDocument::new("https://www.linkedin.com/feed/")
    }

    #[test]
    fn queries_in_document_order() {
        let doc = doc();
        let body = doc.body();
        let a = doc.add_element(body, "article", &[("class", "post")]).unwrap();
        let inner = doc.add_element(a, "div", &[("class", "post")]).unwrap();
        let b = doc.add_element(body, "article", &[("class", "post")]).unwrap();

        let sel = Selector::parse(".post").unwrap();
        assert_eq!(doc.query_all(body, &sel), vec![a, inner, b]);
        assert_eq!(doc.query_all(a, &sel), vec![inner]);
        assert_eq!(doc.query_first(b, &sel), None);
    }

    #[test]
    fn attribute_edits_are_visible_to_selectors() {
        let doc = doc();
        let body = doc.body();
        let post = doc.add_element(body, "div", &[("class", "post")]).unwrap();
        let sel = Selector::parse(".post.seen").unwrap();
        assert!(doc.query_all(body, &sel).is_empty());

        doc.add_class(post, "seen").unwrap();
        assert_eq!(doc.query_all(body, &sel), vec![post]);

        doc.set_attribute(post, "id", "first").unwrap();
        let by_id = Selector::parse("#first").unwrap();
        assert_eq!(doc.query_first(body, &by_id), Some(post));
        doc.remove_attribute(post, "id").unwrap();
        assert_eq!(doc.query_first(body, &by_id), None);
    }

    #[test]
    fn heights_fall_back_to_children() {
        let doc = doc();
        let body = doc.body();
        let post = doc.add_element(body, "div", &[]).unwrap();
        doc.add_element(post, "p", &[("data-height", "120")]).unwrap();
        doc.add_element(post, "p", &[("style", "color: red; height: 80px")])
            .unwrap();
        doc.add_element(post, "p", &[("data-height", "500"), ("hidden", "")])
            .unwrap();
        assert_eq!(doc.rendered_height(post), 200.0);

        let detached = doc.create_element("div");
        doc.set_attribute(detached, "data-height", "300").unwrap();
        assert_eq!(doc.rendered_height(detached), 0.0);
    }

    #[test]
    fn visible_text_skips_hidden_and_excluded() {
        let doc = doc();
        let body = doc.body();
        let post = doc.add_element(body, "div", &[]).unwrap();
        let p = doc.add_element(post, "p", &[]).unwrap();
        doc.add_text(p, "  Great   insight ").unwrap();
        let hidden = doc.add_element(post, "span", &[("aria-hidden", "true")]).unwrap();
        doc.add_text(hidden, "secret").unwrap();
        let control = doc.add_element(post, "div", &[("data-control", "")]).unwrap();
        doc.add_text(control, "Generating").unwrap();

        let exclude = Selector::parse("[data-control]").unwrap();
        assert_eq!(doc.visible_text(post, Some(&exclude)), "Great insight");
        assert_eq!(doc.visible_text(post, None), "Great insight Generating");
        assert_eq!(doc.visible_text(NodeId(9999), None), "");
    }

    #[test]
    fn only_connected_mutations_are_signalled() {
        let doc = doc();
        let mut rx = doc.subscribe();
        let detached = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(detached, child).unwrap();
        doc.set_attribute(child, "class", "x").unwrap();
        assert!(rx.try_recv().is_err());

        doc.append_child(doc.body(), detached).unwrap();
        match rx.try_recv().unwrap() {
            DocumentSignal::ChildList { added, .. } => assert_eq!(added, vec![detached]),
            other => panic!("unexpected signal: {other:?}"),
        }
    }

    #[test]
    fn rejects_cycles() {
        let doc = doc();
        let outer = doc.add_element(doc.body(), "div", &[]).unwrap();
        let inner = doc.add_element(outer, "div", &[]).unwrap();
        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest {
                parent: inner,
                child: outer
            })
        );
    }

    #[test]
    fn removal_disconnects_subtree() {
        let doc = doc();
        let post = doc.add_element(doc.body(), "article", &[]).unwrap();
        let text = doc.add_element(post, "p", &[]).unwrap();
        let mut rx = doc.subscribe();

        doc.remove(post).unwrap();
        assert!(!doc.is_connected(post));
        assert!(!doc.is_connected(text));
        assert_eq!(doc.parent(text), Some(post));
        assert!(matches!(
            rx.try_recv().unwrap(),
            DocumentSignal::ChildList { ref removed, .. } if removed == &vec![post]
        ));
    }

    #[test]
    fn events_bubble_and_insert_text_default_applies() {
        let doc = doc();
        let body = doc.body();
        let wrapper = doc.add_element(body, "div", &[]).unwrap();
        let editor = doc
            .add_element(wrapper, "div", &[("contenteditable", "true")])
            .unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        doc.add_listener(
            wrapper,
            EventKind::InsertText,
            listener(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ListenerVerdict::Continue)
            }),
        );

        doc.dispatch(editor, DomEvent::insert_text("h")).unwrap();
        doc.dispatch(editor, DomEvent::insert_text("i")).unwrap();
        assert_eq!(doc.text_content(editor), "hi");
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(doc.caret(), Some((editor, 2)));

        let outcome = doc.dispatch(editor, DomEvent::paste("ignored")).unwrap();
        assert!(!outcome.handled);
        assert_eq!(doc.text_content(editor), "hi");
    }

    #[test]
    fn listener_errors_surface_from_dispatch() {
        let doc = doc();
        let node = doc.add_element(doc.body(), "div", &[]).unwrap();
        doc.add_listener(
            node,
            EventKind::Paste,
            listener(|_| Err(DomError::ListenerFailed("boom".into()))),
        );
        assert_eq!(
            doc.dispatch(node, DomEvent::paste("x")),
            Err(DomError::ListenerFailed("boom".into()))
        );
    }

    #[test]
    fn class_helpers_round_trip() {
        let doc = doc();
        let node = doc.add_element(doc.body(), "div", &[("class", "a b")]).unwrap();
        doc.add_class(node, "c").unwrap();
        doc.add_class(node, "a").unwrap();
        assert_eq!(doc.attribute(node, "class").as_deref(), Some("a b c"));
        doc.remove_class(node, "b").unwrap();
        assert!(!doc.has_class(node, "b"));
        assert!(doc.has_class(node, "c"));
    }
}
