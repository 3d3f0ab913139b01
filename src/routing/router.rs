//! Route registration and lookup.
//!
//! # Responsibilities
//! - Own one trie per HTTP method
//! - Prepend global middleware to every route registered afterwards
//! - Resolve a method + path into a handler chain and path params
//!
//! # Design Decisions
//! - GET, POST, PUT and DELETE trees exist up front; other methods get a
//!   tree on first registration
//! - Immutable after construction (thread-safe without locks)
//! - Explicit no-match (`None`) rather than a silent default

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::dispatch::handler::HandlerRef;
use crate::http::request::normalize_method;
use crate::routing::group::Group;
use crate::routing::tree::{Params, Tree};

/// Registration failure.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The method + pattern already resolves to a registered route.
    #[error("route already exists: {method} {pattern}")]
    AlreadyExists { method: Method, pattern: String },
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub handlers: Arc<[HandlerRef]>,
    pub params: Params,
}

/// Per-method route tables plus global middleware.
#[derive(Debug)]
pub struct Router {
    trees: HashMap<Method, Tree>,
    middlewares: Vec<HandlerRef>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        let trees = [Method::GET, Method::POST, Method::PUT, Method::DELETE]
            .into_iter()
            .map(|method| (method, Tree::new()))
            .collect();

        Self {
            trees,
            middlewares: Vec::new(),
        }
    }

    /// Append global middleware. Routes registered earlier are unaffected.
    pub fn use_middleware<I>(&mut self, middlewares: I) -> &mut Self
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.middlewares.extend(middlewares);
        self
    }

    /// Register `pattern` for `method`. The stored chain is the global
    /// middleware followed by `handlers`.
    pub fn route<I>(&mut self, method: Method, pattern: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        let method = normalize_method(method);
        let chain: Vec<HandlerRef> = self.middlewares.iter().cloned().chain(handlers).collect();
        let chain_len = chain.len();

        self.trees
            .entry(method.clone())
            .or_default()
            .insert(pattern, chain)
            .map_err(|_| RouteError::AlreadyExists {
                method: method.clone(),
                pattern: pattern.to_string(),
            })?;

        tracing::debug!(method = %method, pattern = %pattern, handlers = chain_len, "Route registered");
        Ok(())
    }

    pub fn get<I>(&mut self, pattern: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.route(Method::GET, pattern, handlers)
    }

    pub fn post<I>(&mut self, pattern: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.route(Method::POST, pattern, handlers)
    }

    pub fn put<I>(&mut self, pattern: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.route(Method::PUT, pattern, handlers)
    }

    pub fn delete<I>(&mut self, pattern: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.route(Method::DELETE, pattern, handlers)
    }

    pub fn patch<I>(&mut self, pattern: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.route(Method::PATCH, pattern, handlers)
    }

    /// Open a route group rooted at `prefix`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group::new(self, prefix)
    }

    /// Look up the route for `method` and `path`.
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let method = normalize_method(method.clone());
        let tree = self.trees.get(&method)?;
        let id = tree.match_path(path)?;

        Some(RouteMatch {
            handlers: tree.node(id).handlers().clone(),
            params: tree.extract_params(id, path),
        })
    }

    pub fn tree(&self, method: &Method) -> Option<&Tree> {
        self.trees.get(&normalize_method(method.clone()))
    }
}
