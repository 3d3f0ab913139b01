//! Segment trie for a single HTTP method.
//!
//! # Responsibilities
//! - Insert route patterns segment by segment
//! - Match a request path depth-first against the trie
//! - Rebuild wildcard bindings by walking upward from a terminal node
//!
//! # Design Decisions
//! - Nodes live in an arena (`Vec<Node>`); parents are indices, not pointers
//! - Literal segments are upper-cased, so literal matching is case-insensitive
//! - Wildcard segments (`:name`) are kept verbatim and match any segment,
//!   including an empty one
//! - No precedence between literal and wildcard siblings: registration order
//!   decides which branch is tried first
//! - Built once at startup, read concurrently afterwards (no interior mutability)

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::handler::HandlerRef;

/// Marker that turns a segment into a named parameter.
pub const WILDCARD_MARKER: char = ':';

/// Path parameters bound by wildcard segments, by name.
pub type Params = HashMap<String, String>;

/// A pattern that resolves to an already registered route.
#[derive(Debug, Error)]
#[error("route exists: {0}")]
pub struct DuplicateRoute(pub String);

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

/// One path segment in the trie.
pub struct Node {
    segment: String,
    is_terminal: bool,
    handlers: Arc<[HandlerRef]>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    fn new(segment: String, parent: Option<NodeId>) -> Self {
        Self {
            segment,
            is_terminal: false,
            handlers: Arc::new([]),
            children: Vec::new(),
            parent,
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Handler chain; empty unless terminal.
    pub fn handlers(&self) -> &Arc<[HandlerRef]> {
        &self.handlers
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("segment", &self.segment)
            .field("is_terminal", &self.is_terminal)
            .field("handlers", &self.handlers.len())
            .field("children", &self.children)
            .field("parent", &self.parent)
            .finish()
    }
}

/// Trie of registered routes for one method.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only the synthetic root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(String::new(), None)],
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Register `pattern` with its fully resolved handler chain.
    ///
    /// Fails if matching `pattern` against the current tree already lands on
    /// a terminal node; the existing route is left untouched.
    pub fn insert(
        &mut self,
        pattern: &str,
        handlers: Vec<HandlerRef>,
    ) -> Result<NodeId, DuplicateRoute> {
        let uri = strip_leading_slash(pattern);

        if self.match_path(uri).is_some() {
            return Err(DuplicateRoute(pattern.to_string()));
        }

        let mut current = ROOT;
        for raw in uri.split('/') {
            let segment = normalize(raw);
            let existing = self.nodes[current.0]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes[child.0].segment == segment);

            current = match existing {
                Some(child) => child,
                None => {
                    let id = NodeId(self.nodes.len());
                    self.nodes.push(Node::new(segment.into_owned(), Some(current)));
                    self.nodes[current.0].children.push(id);
                    id
                }
            };
        }

        let node = &mut self.nodes[current.0];
        node.is_terminal = true;
        node.handlers = handlers.into();
        Ok(current)
    }

    /// Find the terminal node for `path`, if any.
    pub fn match_path(&self, path: &str) -> Option<NodeId> {
        self.match_from(ROOT, strip_leading_slash(path))
    }

    fn match_from(&self, id: NodeId, uri: &str) -> Option<NodeId> {
        let (head, rest) = match uri.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (uri, None),
        };
        let head = normalize(head);
        let mut candidates = self.candidates(id, &head);

        match rest {
            None => candidates.find(|&child| self.nodes[child.0].is_terminal),
            Some(rest) => candidates.find_map(|child| self.match_from(child, rest)),
        }
    }

    /// Children of `id` that accept `segment`, in registration order.
    ///
    /// A wildcard query accepts every child; a literal query accepts
    /// wildcard children and the literal child with equal text.
    fn candidates<'a>(
        &'a self,
        id: NodeId,
        segment: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        let query_is_wild = is_wild_segment(segment);
        self.nodes[id.0].children.iter().copied().filter(move |&child| {
            let child_segment = self.nodes[child.0].segment.as_str();
            query_is_wild
                || is_wild_segment(child_segment)
                || child_segment == segment
        })
    }

    /// Bind wildcard names along the branch ending at `node` to the
    /// corresponding segments of `path`.
    pub fn extract_params(&self, node: NodeId, path: &str) -> Params {
        let mut params = Params::new();
        let mut current = node;

        for value in strip_leading_slash(path).split('/').rev() {
            if current == ROOT {
                break;
            }
            let n = &self.nodes[current.0];
            if let Some(name) = n.segment.strip_prefix(WILDCARD_MARKER) {
                params.insert(name.to_string(), value.to_string());
            }
            match n.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        params
    }
}

/// Whether `segment` binds a parameter rather than matching literally.
pub fn is_wild_segment(segment: &str) -> bool {
    segment.starts_with(WILDCARD_MARKER)
}

fn normalize(segment: &str) -> Cow<'_, str> {
    if is_wild_segment(segment) {
        Cow::Borrowed(segment)
    } else {
        Cow::Owned(segment.to_uppercase())
    }
}

fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}
