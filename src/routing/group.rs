//! Route groups: shared path prefixes and middleware.
//!
//! A group borrows the router mutably for as long as it lives, and a nested
//! group borrows its parent. Prefix and middleware are therefore resolved
//! root-to-leaf when the child is opened and can no longer change underneath
//! it. Groups exist only during registration.

use axum::http::Method;

use crate::dispatch::handler::HandlerRef;
use crate::routing::router::{RouteError, Router};

pub struct Group<'r> {
    router: &'r mut Router,
    prefix: String,
    middlewares: Vec<HandlerRef>,
}

impl<'r> Group<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: &str) -> Self {
        Self {
            router,
            prefix: prefix.to_string(),
            middlewares: Vec::new(),
        }
    }

    /// Absolute prefix (ancestor prefixes concatenated with this one).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Effective middleware: ancestors' first, then this group's own.
    pub fn middlewares(&self) -> &[HandlerRef] {
        &self.middlewares
    }

    /// Append middleware for routes registered through this group from now on.
    pub fn use_middleware<I>(&mut self, middlewares: I) -> &mut Self
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.middlewares.extend(middlewares);
        self
    }

    /// Open a nested group under this one.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group {
            prefix: format!("{}{}", self.prefix, prefix),
            middlewares: self.middlewares.clone(),
            router: &mut *self.router,
        }
    }

    pub fn route<I>(&mut self, method: Method, path: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        let pattern = format!("{}{}", self.prefix, path);
        let chain: Vec<HandlerRef> = self.middlewares.iter().cloned().chain(handlers).collect();
        self.router.route(method, &pattern, chain)
    }

    pub fn get<I>(&mut self, path: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.route(Method::GET, path, handlers)
    }

    pub fn post<I>(&mut self, path: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.route(Method::POST, path, handlers)
    }

    pub fn put<I>(&mut self, path: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.route(Method::PUT, path, handlers)
    }

    pub fn delete<I>(&mut self, path: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.route(Method::DELETE, path, handlers)
    }

    pub fn patch<I>(&mut self, path: &str, handlers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = HandlerRef>,
    {
        self.route(Method::PATCH, path, handlers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::context::Context;
    use crate::dispatch::handler::handler_fn;
    use std::sync::Arc;

    fn noop() -> HandlerRef {
        handler_fn(|_ctx: Context| async { Ok(()) })
    }

    fn same_chain(actual: &[HandlerRef], expected: &[&HandlerRef]) -> bool {
        actual.len() == expected.len()
            && actual.iter().zip(expected).all(|(a, b)| Arc::ptr_eq(a, b))
    }

    #[test]
    fn test_nested_groups_compose_prefix_and_middleware() {
        let (m1, m2, m3, h) = (noop(), noop(), noop(), noop());
        let mut router = Router::new();
        {
            let mut a = router.group("/a");
            a.use_middleware(vec![m1.clone()]);
            let mut b = a.group("/b");
            b.use_middleware(vec![m2.clone()]);
            let mut c = b.group("/c");
            c.use_middleware(vec![m3.clone()]);

            assert_eq!(c.prefix(), "/a/b/c");
            c.get("/route", vec![h.clone()]).unwrap();
        }

        let found = router.find(&Method::GET, "/a/b/c/route").unwrap();
        assert!(same_chain(&found.handlers, &[&m1, &m2, &m3, &h]));
        assert!(router.find(&Method::GET, "/route").is_none());
    }

    #[test]
    fn test_use_is_not_retroactive() {
        let (m, h) = (noop(), noop());
        let mut router = Router::new();
        {
            let mut api = router.group("/api");
            api.get("/early", vec![h.clone()]).unwrap();
            api.use_middleware(vec![m.clone()]);
            api.get("/late", vec![h.clone()]).unwrap();
        }

        let early = router.find(&Method::GET, "/api/early").unwrap();
        assert!(same_chain(&early.handlers, &[&h]));

        let late = router.find(&Method::GET, "/api/late").unwrap();
        assert!(same_chain(&late.handlers, &[&m, &h]));
    }

    #[test]
    fn test_global_middleware_precedes_group_middleware() {
        let (global, local, h) = (noop(), noop(), noop());
        let mut router = Router::new();
        router.use_middleware(vec![global.clone()]);
        {
            let mut v1 = router.group("/v1");
            v1.use_middleware(vec![local.clone()]);
            v1.delete("/items/:id", vec![h.clone()]).unwrap();
        }

        let found = router.find(&Method::DELETE, "/v1/items/9").unwrap();
        assert!(same_chain(&found.handlers, &[&global, &local, &h]));
        assert_eq!(found.params["id"], "9");
    }

    #[test]
    fn test_duplicate_through_group() {
        let mut router = Router::new();
        router.post("/aaa/ccc", vec![noop()]).unwrap();

        let mut group = router.group("/aaa");
        let err = group.post("/ccc", vec![noop()]).unwrap_err();
        assert!(matches!(err, RouteError::AlreadyExists { ref pattern, .. } if pattern == "/aaa/ccc"));
    }

    #[test]
    fn test_sibling_groups_do_not_share_middleware() {
        let (m, h) = (noop(), noop());
        let mut router = Router::new();
        {
            let mut root = router.group("");
            {
                let mut admin = root.group("/admin");
                admin.use_middleware(vec![m.clone()]);
                admin.get("/panel", vec![h.clone()]).unwrap();
            }
            let mut public = root.group("/public");
            public.get("/home", vec![h.clone()]).unwrap();
        }

        let public = router.find(&Method::GET, "/public/home").unwrap();
        assert!(same_chain(&public.handlers, &[&h]));
        let admin = router.find(&Method::GET, "/admin/panel").unwrap();
        assert!(same_chain(&admin.handlers, &[&m, &h]));
    }
}
