//! Typed access to path parameters.
//!
//! The trie only ever produces strings; coercion happens here, on access.
//! An absent or empty value, or one that fails to parse, reads as `None`.

use std::str::FromStr;

use crate::dispatch::context::Context;

impl Context {
    /// Raw parameter value. Empty values count as absent.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params()
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Parse a parameter with its `FromStr` implementation.
    pub fn param_parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.param(key).and_then(|v| v.parse().ok())
    }

    pub fn param_string(&self, key: &str) -> Option<String> {
        self.param(key).map(str::to_string)
    }

    pub fn param_int(&self, key: &str) -> Option<i32> {
        self.param_parse(key)
    }

    pub fn param_i64(&self, key: &str) -> Option<i64> {
        self.param_parse(key)
    }

    pub fn param_f32(&self, key: &str) -> Option<f32> {
        self.param_parse(key)
    }

    pub fn param_f64(&self, key: &str) -> Option<f64> {
        self.param_parse(key)
    }

    /// Boolean parameter. Accepts `1 t T TRUE true True` and
    /// `0 f F FALSE false False`.
    pub fn param_bool(&self, key: &str) -> Option<bool> {
        self.param(key).and_then(parse_bool)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::handler::HandlerRef;
    use crate::http::request::RequestDescriptor;
    use crate::routing::Params;
    use axum::http::Method;

    fn context_with(pairs: &[(&str, &str)]) -> Context {
        let params: Params = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let request = RequestDescriptor::new(Method::GET, "/");
        Context::new(request, Vec::<HandlerRef>::new().into(), params)
    }

    #[test]
    fn test_numeric_params() {
        let ctx = context_with(&[("id", "42"), ("ratio", "0.5"), ("name", "bob")]);
        assert_eq!(ctx.param_int("id"), Some(42));
        assert_eq!(ctx.param_i64("id"), Some(42));
        assert_eq!(ctx.param_f64("ratio"), Some(0.5));
        assert_eq!(ctx.param_f32("ratio"), Some(0.5));
        assert_eq!(ctx.param_int("name"), None);
        assert_eq!(ctx.param_int("missing"), None);
    }

    #[test]
    fn test_bool_params() {
        let ctx = context_with(&[("a", "T"), ("b", "False"), ("c", "yes")]);
        assert_eq!(ctx.param_bool("a"), Some(true));
        assert_eq!(ctx.param_bool("b"), Some(false));
        assert_eq!(ctx.param_bool("c"), None);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let ctx = context_with(&[("id", "")]);
        assert_eq!(ctx.param("id"), None);
        assert_eq!(ctx.param_string("id"), None);
    }
}
