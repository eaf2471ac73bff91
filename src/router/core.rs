//! Route table - ordered pattern to handler mapping.
//!
//! Routes are registered at startup and only read afterwards, so the table is
//! shared as `Arc<RouteTable>` and matched without locks.

use super::pattern::CompiledPattern;
use crate::error::RouteError;
use crate::handler::{Handler, STANDARD_METHODS};
use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage. Names come from the compiled pattern,
/// so cloning them is a refcount bump.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Named parameters extracted from a matched path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(ParamVec);

impl PathParams {
    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Convert to an owned map
    /// Note: This allocates - use get() in handlers instead
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl From<ParamVec> for PathParams {
    fn from(params: ParamVec) -> Self {
        Self(params)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (Arc::from(k), v.to_string()))
                .collect(),
        )
    }
}

/// One registered route
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    compiled: CompiledPattern,
    handler: Handler,
    allowed_methods: Vec<Method>,
}

impl Route {
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    #[must_use]
    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed_methods
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: PathParams,
}

/// Ordered route table.
///
/// Insertion order is match priority: the first pattern that matches the whole
/// path wins, even when a later pattern would also match.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    ///
    /// `allowed_methods` of `None` means every standard verb. Fails when the
    /// exact pattern string is already present or cannot be compiled.
    pub fn add(
        &mut self,
        pattern: &str,
        handler: Handler,
        allowed_methods: Option<&[Method]>,
    ) -> Result<(), RouteError> {
        if self.routes.iter().any(|r| r.pattern == pattern) {
            return Err(RouteError::Duplicate {
                pattern: pattern.to_string(),
            });
        }
        let compiled = CompiledPattern::compile(pattern)?;
        let allowed_methods = allowed_methods
            .map(<[Method]>::to_vec)
            .unwrap_or_else(|| STANDARD_METHODS.to_vec());

        info!(
            pattern = %pattern,
            handler = ?handler,
            allowed_methods = ?allowed_methods,
            param_names = ?compiled.param_names(),
            total_routes = self.routes.len() + 1,
            "Route registered"
        );

        self.routes.push(Route {
            pattern: pattern.to_string(),
            compiled,
            handler,
            allowed_methods,
        });
        Ok(())
    }

    /// Find the first route whose pattern matches the whole path
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        let match_start = std::time::Instant::now();

        for route in &self.routes {
            if let Some(params) = route.compiled.match_path(path) {
                debug!(
                    path = %path,
                    route_pattern = %route.pattern,
                    path_params = ?params,
                    duration_us = match_start.elapsed().as_micros(),
                    "Route matched"
                );
                return Some(RouteMatch {
                    route,
                    params: PathParams(params),
                });
            }
        }

        debug!(
            path = %path,
            routes_checked = self.routes.len(),
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );
        None
    }

    /// Registered patterns in match order
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.pattern.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
