//! In-memory document used to drive the discovery pipeline without a browser.
//!
//! Nodes are stored in document order. Node 0 is `<body>`. Only the selector
//! forms the locator generator emits are understood.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use domscout_core::scripts::{CANDIDATE_SELECTOR, FACTS_PROBE, STYLE_PROBE};
use domscout_core::{BoundingBox, DriverError, ElementHandle, FrameContext, RootSource};

pub const BODY: usize = 0;

#[derive(Debug, Clone)]
pub struct FakeNode {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub display: String,
    pub visibility: String,
    pub opacity: String,
    pub width: f64,
    pub height: f64,
    pub has_box: bool,
    pub parent: Option<usize>,
    pub frame: Option<FakeDocument>,
    pub detached: bool,
    /// Enumerated by the candidate query, detached before anything else.
    pub vanishing: bool,
}

/// Start building a visible 100x20 element.
pub fn el(tag: &str) -> FakeNode {
    FakeNode {
        tag: tag.to_string(),
        attrs: BTreeMap::new(),
        text: String::new(),
        display: "block".to_string(),
        visibility: "visible".to_string(),
        opacity: "1".to_string(),
        width: 100.0,
        height: 20.0,
        has_box: true,
        parent: None,
        frame: None,
        detached: false,
        vanishing: false,
    }
}

impl FakeNode {
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn display(mut self, value: &str) -> Self {
        self.display = value.to_string();
        self
    }

    pub fn visibility(mut self, value: &str) -> Self {
        self.visibility = value.to_string();
        self
    }

    pub fn opacity(mut self, value: &str) -> Self {
        self.opacity = value.to_string();
        self
    }

    pub fn no_box(mut self) -> Self {
        self.has_box = false;
        self
    }

    pub fn vanishing(mut self) -> Self {
        self.vanishing = true;
        self
    }

    pub fn frame(mut self, doc: &FakeDocument) -> Self {
        self.frame = Some(doc.clone());
        self
    }

    fn class_attr(&self) -> &str {
        self.attrs.get("class").map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug)]
struct DocInner {
    label: String,
    nodes: Mutex<Vec<FakeNode>>,
    count_overrides: Mutex<HashMap<String, usize>>,
    destroyed: AtomicBool,
    disposed: AtomicUsize,
    script_calls: AtomicUsize,
}

/// A fake document or frame. Clones share state.
#[derive(Debug, Clone)]
pub struct FakeDocument {
    inner: Arc<DocInner>,
}

impl FakeDocument {
    pub fn new(label: &str) -> Self {
        let body = el("body").size(1280.0, 720.0);
        Self {
            inner: Arc::new(DocInner {
                label: label.to_string(),
                nodes: Mutex::new(vec![body]),
                count_overrides: Mutex::new(HashMap::new()),
                destroyed: AtomicBool::new(false),
                disposed: AtomicUsize::new(0),
                script_calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Append `node` as the last child of `parent`; returns its index.
    pub fn add(&self, parent: usize, mut node: FakeNode) -> usize {
        node.parent = Some(parent);
        let mut nodes = self.inner.nodes.lock();
        nodes.push(node);
        nodes.len() - 1
    }

    pub fn update(&self, index: usize, f: impl FnOnce(&mut FakeNode)) {
        f(&mut self.inner.nodes.lock()[index]);
    }

    pub fn detach(&self, index: usize) {
        self.update(index, |n| n.detached = true);
    }

    /// Make every further call against this document fail as if navigated away.
    pub fn destroy(&self) {
        self.inner.destroyed.store(true, Ordering::SeqCst);
    }

    /// Force `count_matches(selector)` to answer `count`.
    pub fn override_count(&self, selector: &str, count: usize) {
        self.inner
            .count_overrides
            .lock()
            .insert(selector.to_string(), count);
    }

    pub fn disposed(&self) -> usize {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    pub fn script_calls(&self) -> usize {
        self.inner.script_calls.load(Ordering::SeqCst)
    }

    fn check_alive(&self) -> Result<(), DriverError> {
        if self.inner.destroyed.load(Ordering::SeqCst) {
            Err(DriverError::ContextLost(format!("{} was destroyed", self.inner.label)))
        } else {
            Ok(())
        }
    }

    fn handle(&self, index: usize) -> Box<dyn ElementHandle> {
        Box::new(FakeElement {
            doc: self.clone(),
            index,
        })
    }

    fn same_tag_index(nodes: &[FakeNode], index: usize) -> Option<usize> {
        let node = &nodes[index];
        let parent = node.parent?;
        let position = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent == Some(parent) && n.tag == node.tag)
            .position(|(i, _)| i == index)?;
        Some(position + 1)
    }

    fn matches(nodes: &[FakeNode], index: usize, compound: &Compound) -> bool {
        let node = &nodes[index];
        if node.detached || node.vanishing {
            return false;
        }
        if let Some(tag) = &compound.tag {
            if &node.tag != tag {
                return false;
            }
        }
        for id in &compound.ids {
            if node.attrs.get("id") != Some(id) {
                return false;
            }
        }
        for class in &compound.classes {
            if !node.class_attr().split_whitespace().any(|c| c == class) {
                return false;
            }
        }
        for (name, value) in &compound.attrs {
            if node.attrs.get(name) != Some(value) {
                return false;
            }
        }
        if let Some(nth) = compound.nth {
            if Self::same_tag_index(nodes, index) != Some(nth) {
                return false;
            }
        }
        true
    }

    fn facts(&self, index: usize) -> Value {
        let nodes = self.inner.nodes.lock();
        let node = &nodes[index];
        let attr = |name: &str| node.attrs.get(name).cloned();
        let id = attr("id");

        let id_count = match id.as_deref() {
            Some(id) if !id.is_empty() => nodes
                .iter()
                .filter(|n| !n.detached && n.attrs.get("id").map(String::as_str) == Some(id))
                .count(),
            _ => 0,
        };
        let label_text = id.as_deref().and_then(|id| {
            nodes
                .iter()
                .find(|n| n.tag == "label" && n.attrs.get("for").map(String::as_str) == Some(id))
                .map(|n| n.text.trim().to_string())
        });
        let parent_label_text = node
            .parent
            .map(|p| &nodes[p])
            .filter(|p| p.tag == "label")
            .map(|p| p.text.trim().to_string());

        json!({
            "tag": node.tag,
            "id": id,
            "testId": attr("data-testid"),
            "legacyTestId": attr("data-test-id"),
            "name": attr("name"),
            "role": attr("role"),
            "type": attr("type"),
            "title": attr("title"),
            "ariaLabel": attr("aria-label"),
            "placeholder": attr("placeholder"),
            "alt": attr("alt"),
            "classes": node.class_attr().split(' ').collect::<Vec<_>>(),
            "idCount": id_count,
            "labelText": label_text,
            "parentLabelText": parent_label_text,
            "text": node.text.trim(),
            "sameTagIndex": Self::same_tag_index(&nodes, index),
        })
    }
}

#[async_trait]
impl FrameContext for FakeDocument {
    fn label(&self) -> String {
        self.inner.label.clone()
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>, DriverError> {
        self.check_alive()?;
        let nodes = self.inner.nodes.lock();
        let indices: Vec<usize> = if selector == CANDIDATE_SELECTOR {
            (1..nodes.len()).filter(|&i| !nodes[i].detached).collect()
        } else {
            let compound = Compound::parse(selector)?;
            (0..nodes.len())
                .filter(|&i| Self::matches(&nodes, i, &compound))
                .collect()
        };
        drop(nodes);
        Ok(indices.into_iter().map(|i| self.handle(i)).collect())
    }

    async fn count_matches(&self, selector: &str) -> Result<usize, DriverError> {
        self.check_alive()?;
        if let Some(count) = self.inner.count_overrides.lock().get(selector) {
            return Ok(*count);
        }
        let compound = Compound::parse(selector)?;
        let nodes = self.inner.nodes.lock();
        Ok((0..nodes.len())
            .filter(|&i| Self::matches(&nodes, i, &compound))
            .count())
    }
}

pub struct FakeElement {
    doc: FakeDocument,
    index: usize,
}

impl FakeElement {
    fn node(&self) -> Result<FakeNode, DriverError> {
        self.doc.check_alive()?;
        let node = self.doc.inner.nodes.lock()[self.index].clone();
        if node.detached || node.vanishing {
            Err(DriverError::Detached)
        } else {
            Ok(node)
        }
    }
}

#[async_trait]
impl ElementHandle for FakeElement {
    async fn bounding_box(&self) -> Result<Option<BoundingBox>, DriverError> {
        let node = self.node()?;
        Ok(node.has_box.then_some(BoundingBox {
            x: 0.0,
            y: 0.0,
            width: node.width,
            height: node.height,
        }))
    }

    async fn evaluate(&self, function: &str) -> Result<Value, DriverError> {
        let node = self.node()?;
        self.doc.inner.script_calls.fetch_add(1, Ordering::SeqCst);
        if function == STYLE_PROBE {
            Ok(json!({
                "display": node.display,
                "visibility": node.visibility,
                "opacity": node.opacity,
                "contentWidth": node.width,
                "contentHeight": node.height,
            }))
        } else if function == FACTS_PROBE {
            Ok(self.doc.facts(self.index))
        } else {
            Err(DriverError::Script("unsupported script".to_string()))
        }
    }

    async fn parent(&self) -> Result<Option<Box<dyn ElementHandle>>, DriverError> {
        let node = self.node()?;
        Ok(node.parent.map(|p| self.doc.handle(p)))
    }

    async fn content_frame(&self) -> Result<Option<Arc<dyn FrameContext>>, DriverError> {
        let node = self.node()?;
        Ok(node
            .frame
            .map(|doc| Arc::new(doc) as Arc<dyn FrameContext>))
    }

    async fn dispose(&self) -> Result<(), DriverError> {
        self.doc.inner.disposed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A single compound selector: `tag#id.class[attr="v"]:nth-of-type(n)`.
#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    nth: Option<usize>,
}

impl Compound {
    fn parse(selector: &str) -> Result<Self, DriverError> {
        let invalid = || DriverError::InvalidSelector(selector.to_string());
        let chars: Vec<char> = selector.chars().collect();
        let mut pos = 0;
        let mut compound = Compound::default();

        let tag = read_ident(&chars, &mut pos);
        if !tag.is_empty() {
            compound.tag = Some(tag);
        }

        while pos < chars.len() {
            match chars[pos] {
                '#' => {
                    pos += 1;
                    compound.ids.push(read_ident(&chars, &mut pos));
                }
                '.' => {
                    pos += 1;
                    compound.classes.push(read_ident(&chars, &mut pos));
                }
                '[' => {
                    pos += 1;
                    let name: String = read_until(&chars, &mut pos, '=');
                    if chars.get(pos) != Some(&'=') || chars.get(pos + 1) != Some(&'"') {
                        return Err(invalid());
                    }
                    pos += 2;
                    let mut value = String::new();
                    while pos < chars.len() && chars[pos] != '"' {
                        if chars[pos] == '\\' {
                            pos += 1;
                        }
                        if let Some(c) = chars.get(pos) {
                            value.push(*c);
                        }
                        pos += 1;
                    }
                    if chars.get(pos + 1) != Some(&']') {
                        return Err(invalid());
                    }
                    pos += 2;
                    compound.attrs.push((name, value));
                }
                ':' => {
                    let rest: String = chars[pos..].iter().collect();
                    let inner = rest
                        .strip_prefix(":nth-of-type(")
                        .and_then(|r| r.strip_suffix(')'))
                        .ok_or_else(invalid)?;
                    compound.nth = Some(inner.parse().map_err(|_| invalid())?);
                    pos = chars.len();
                }
                _ => return Err(invalid()),
            }
        }

        Ok(compound)
    }
}

fn read_ident(chars: &[char], pos: &mut usize) -> String {
    let mut out = String::new();
    while *pos < chars.len() {
        let c = chars[*pos];
        if c == '\\' {
            *pos += 1;
            let mut hex = String::new();
            while *pos < chars.len() && chars[*pos].is_ascii_hexdigit() && hex.len() < 6 {
                hex.push(chars[*pos]);
                *pos += 1;
            }
            if hex.is_empty() {
                if let Some(c) = chars.get(*pos) {
                    out.push(*c);
                    *pos += 1;
                }
            } else {
                if let Some(c) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(c);
                }
                if chars.get(*pos) == Some(&' ') {
                    *pos += 1;
                }
            }
        } else if c.is_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
            *pos += 1;
        } else {
            break;
        }
    }
    out
}

fn read_until(chars: &[char], pos: &mut usize, stop: char) -> String {
    let mut out = String::new();
    while *pos < chars.len() && chars[*pos] != stop {
        out.push(chars[*pos]);
        *pos += 1;
    }
    out
}

/// Root source handing out a swappable document.
pub struct FakeSource {
    root: Mutex<FakeDocument>,
    delay: Mutex<Duration>,
    failures: AtomicUsize,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(doc: &FakeDocument) -> Arc<Self> {
        Arc::new(Self {
            root: Mutex::new(doc.clone()),
            delay: Mutex::new(Duration::ZERO),
            failures: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_root(&self, doc: &FakeDocument) {
        *self.root.lock() = doc.clone();
    }

    /// Every `root()` call sleeps this long first.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// The next `n` calls fail with a lost context.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RootSource for FakeSource {
    async fn root(&self) -> Result<Arc<dyn FrameContext>, DriverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DriverError::ContextLost("navigation in progress".to_string()));
        }
        let doc = self.root.lock().clone();
        Ok(Arc::new(doc))
    }
}
