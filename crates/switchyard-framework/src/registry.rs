//! Route registration.
//!
//! Handlers are registered explicitly. Each feature module builds a
//! [`HandlerGroup`] of routes; a [`RegistryBuilder`] validates every group and
//! produces one immutable [`RouteRegistry`] that is shared read-only by all
//! in-flight requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_framework::registry::{self, HandlerGroup, RegistryBuilder};
//!
//! let phone = HandlerGroup::new("phone")
//!     .text_command("/phone", show_phone)
//!     .inline("/phone/{digit}", add_digit)
//!     .inline("/phone/delete", delete_digit);
//!
//! let admin = HandlerGroup::new("admin")
//!     .authorize()
//!     .text_command("/ban", ban_user);
//!
//! let queries = HandlerGroup::new("query")
//!     .text_query(".+hello.+", greet)
//!     .route(registry::text_command("/secret", secret).authorize());
//!
//! let registry = RegistryBuilder::new()
//!     .group(phone)
//!     .group(admin)
//!     .group(queries)
//!     .build()?;
//! ```
//!
//! # Validation
//!
//! [`RegistryBuilder::build`] rejects, as a [`RegistryError`]:
//!
//! - text commands that do not start with `/` or contain whitespace or braces
//! - inline templates whose placeholder count differs from the handler arity
//! - invalid text-query regexes, and text-query handlers taking anything but
//!   nothing or a single `String`
//! - two routes of the same kind with the same static shape and parameter types

use std::any::type_name;
use std::fmt;

use regex::Regex;
use tracing::debug;

use crate::binder::ParamType;
use crate::error::{RegistryError, RegistryResult};
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::route::{RouteDescriptor, RouteKind, RoutePattern};

// ============================================================================
// RouteSpec - one route before validation
// ============================================================================

/// A route that has not been validated yet.
pub struct RouteSpec {
    kind: RouteKind,
    pattern: Option<String>,
    handler_name: String,
    param_types: Vec<ParamType>,
    requires_auth: bool,
    handler: BoxedHandler,
}

impl RouteSpec {
    fn new<H, T>(kind: RouteKind, pattern: Option<String>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        Self {
            kind,
            pattern,
            handler_name: short_type_name::<H>(),
            param_types: H::param_types(),
            requires_auth: false,
            handler: into_handler(handler),
        }
    }

    /// Requires authorization for this route only.
    pub fn authorize(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Overrides the handler name used in logs and diagnostics.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.handler_name = name.into();
        self
    }
}

impl fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSpec")
            .field("kind", &self.kind)
            .field("pattern", &self.pattern)
            .field("handler_name", &self.handler_name)
            .field("param_types", &self.param_types)
            .field("requires_auth", &self.requires_auth)
            .finish_non_exhaustive()
    }
}

/// An exact slash command, e.g. `/counter`.
pub fn text_command<H, T>(pattern: impl Into<String>, handler: H) -> RouteSpec
where
    H: Handler<T>,
    T: 'static,
{
    RouteSpec::new(RouteKind::TextCommand, Some(pattern.into()), handler)
}

/// An inline callback path, e.g. `/phone/{digit}`.
pub fn inline<H, T>(pattern: impl Into<String>, handler: H) -> RouteSpec
where
    H: Handler<T>,
    T: 'static,
{
    RouteSpec::new(RouteKind::InlinePath, Some(pattern.into()), handler)
}

/// A free-text route matched by a regular expression.
pub fn text_query<H, T>(pattern: impl Into<String>, handler: H) -> RouteSpec
where
    H: Handler<T>,
    T: 'static,
{
    RouteSpec::new(RouteKind::TextQuery, Some(pattern.into()), handler)
}

/// A free-text route matching any text.
pub fn any_text<H, T>(handler: H) -> RouteSpec
where
    H: Handler<T>,
    T: 'static,
{
    RouteSpec::new(RouteKind::TextQuery, None, handler)
}

fn short_type_name<H>() -> String {
    let full = type_name::<H>();
    // Strip generic arguments before taking the last path segment.
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

// ============================================================================
// HandlerGroup
// ============================================================================

/// A named set of routes, usually one per feature module.
#[derive(Debug)]
pub struct HandlerGroup {
    name: String,
    requires_auth: bool,
    routes: Vec<RouteSpec>,
}

impl HandlerGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires_auth: false,
            routes: Vec::new(),
        }
    }

    /// Requires authorization for every route in the group.
    pub fn authorize(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn route(mut self, route: RouteSpec) -> Self {
        self.routes.push(route);
        self
    }

    pub fn text_command<H, T>(self, pattern: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.route(text_command(pattern, handler))
    }

    pub fn inline<H, T>(self, pattern: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.route(inline(pattern, handler))
    }

    pub fn text_query<H, T>(self, pattern: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.route(text_query(pattern, handler))
    }

    pub fn any_text<H, T>(self, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.route(any_text(handler))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// ============================================================================
// RouteRegistry
// ============================================================================

/// A validated route together with its handler adapter.
#[derive(Clone)]
pub struct Route {
    descriptor: RouteDescriptor,
    handler: BoxedHandler,
}

impl Route {
    pub fn descriptor(&self) -> &RouteDescriptor {
        &self.descriptor
    }

    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// The immutable set of all registered routes.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<Route>,
}

impl RouteRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes of one kind, in registration order.
    pub fn routes_of(&self, kind: RouteKind) -> impl Iterator<Item = &Route> {
        self.routes
            .iter()
            .filter(move |route| route.descriptor.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// ============================================================================
// RegistryBuilder
// ============================================================================

/// Collects handler groups and validates them into a [`RouteRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    groups: Vec<HandlerGroup>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler group (builder pattern).
    pub fn group(mut self, group: HandlerGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Validates every route and freezes the registry.
    pub fn build(self) -> RegistryResult<RouteRegistry> {
        let mut routes: Vec<Route> = Vec::new();

        for group in self.groups {
            for entry in group.routes {
                let requires_auth = group.requires_auth || entry.requires_auth;
                let descriptor = describe(
                    &group.name,
                    entry.kind,
                    entry.pattern,
                    entry.handler_name,
                    entry.param_types,
                    requires_auth,
                )?;

                if let Some(existing) = routes
                    .iter()
                    .find(|route| conflicts(&route.descriptor, &descriptor))
                {
                    return Err(RegistryError::DuplicateRoute {
                        pattern: descriptor.pattern().as_str().to_string(),
                        first: existing.descriptor.signature(),
                        second: descriptor.signature(),
                    });
                }

                debug!(route = %descriptor, auth = requires_auth, "Registered route");
                routes.push(Route {
                    descriptor,
                    handler: entry.handler,
                });
            }
        }

        Ok(RouteRegistry { routes })
    }
}

fn describe(
    group: &str,
    kind: RouteKind,
    pattern: Option<String>,
    handler: String,
    param_types: Vec<ParamType>,
    requires_auth: bool,
) -> RegistryResult<RouteDescriptor> {
    let qualified = format!("{group}::{handler}");
    let pattern = match (kind, pattern) {
        (RouteKind::TextCommand, Some(raw)) => {
            validate_command(&raw)?;
            RoutePattern::Command(raw)
        }
        (RouteKind::InlinePath, Some(raw)) => {
            if raw.is_empty() {
                return Err(invalid(raw, "inline path must not be empty"));
            }
            let pattern = RoutePattern::path(&raw);
            let placeholders = pattern.placeholder_count();
            if placeholders != param_types.len() {
                return Err(RegistryError::TemplateArity {
                    pattern: raw,
                    handler: qualified,
                    placeholders,
                    params: param_types.len(),
                });
            }
            pattern
        }
        (RouteKind::TextQuery, raw) => {
            if !matches!(param_types.as_slice(), [] | [ParamType::String]) {
                return Err(RegistryError::InvalidQueryHandler { handler: qualified });
            }
            let regex = raw
                .map(|raw| {
                    Regex::new(&raw).map_err(|source| RegistryError::InvalidRegex {
                        pattern: raw.clone(),
                        source,
                    })
                })
                .transpose()?;
            RoutePattern::Query(regex)
        }
        (_, None) => {
            return Err(invalid(String::new(), "pattern is required"));
        }
    };

    Ok(RouteDescriptor::new(
        kind,
        pattern,
        group.to_string(),
        handler,
        param_types,
        requires_auth,
    ))
}

fn validate_command(raw: &str) -> RegistryResult<()> {
    if !raw.starts_with('/') || raw.len() < 2 {
        return Err(invalid(raw, "text command must be '/' followed by a name"));
    }
    if raw.chars().any(|c| c.is_whitespace() || c == '{' || c == '}') {
        return Err(invalid(
            raw,
            "text command must not contain whitespace or placeholders",
        ));
    }
    Ok(())
}

fn invalid(pattern: impl Into<String>, reason: &'static str) -> RegistryError {
    RegistryError::InvalidPattern {
        pattern: pattern.into(),
        reason,
    }
}

/// Two routes conflict when no request could ever tell them apart.
fn conflicts(a: &RouteDescriptor, b: &RouteDescriptor) -> bool {
    a.kind() == b.kind()
        && a.pattern().same_shape(b.pattern())
        && (a.kind() == RouteKind::TextQuery || a.param_types() == b.param_types())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::context::RequestContext;
    use crate::reply::Reply;

    async fn show(_ctx: Arc<RequestContext>) -> Reply {
        Reply::empty()
    }

    async fn add_digit(_ctx: Arc<RequestContext>, _digit: i32) -> Reply {
        Reply::empty()
    }

    async fn add_name(_ctx: Arc<RequestContext>, _name: String) -> Reply {
        Reply::empty()
    }

    async fn two(_ctx: Arc<RequestContext>, _a: i32, _b: i32) -> Reply {
        Reply::empty()
    }

    #[test]
    fn test_build_collects_routes() {
        let registry = RegistryBuilder::new()
            .group(
                HandlerGroup::new("phone")
                    .text_command("/phone", show)
                    .inline("/phone/{digit}", add_digit)
                    .inline("/phone/delete", show),
            )
            .group(HandlerGroup::new("query").any_text(add_name))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.routes_of(RouteKind::InlinePath).count(), 2);

        let digit = &registry.routes()[1];
        assert_eq!(digit.descriptor().signature(), "phone::add_digit(int)");
        assert!(!digit.descriptor().requires_auth());
    }

    #[test]
    fn test_group_and_route_authorization() {
        let registry = RegistryBuilder::new()
            .group(HandlerGroup::new("admin").authorize().text_command("/ban", show))
            .group(
                HandlerGroup::new("open")
                    .text_command("/help", show)
                    .route(text_command("/secret", show).authorize()),
            )
            .build()
            .unwrap();

        let auth: Vec<bool> = registry
            .routes()
            .iter()
            .map(|r| r.descriptor().requires_auth())
            .collect();
        assert_eq!(auth, vec![true, false, true]);
    }

    #[test]
    fn test_template_arity_mismatch() {
        let err = RegistryBuilder::new()
            .group(HandlerGroup::new("bad").inline("/pair/{a}", two))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::TemplateArity {
                placeholders: 1,
                params: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_literal_inline_path_takes_no_params() {
        let err = RegistryBuilder::new()
            .group(HandlerGroup::new("bad").inline("/phone/delete", add_digit))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::TemplateArity { .. }));
    }

    #[test]
    fn test_invalid_regex() {
        let err = RegistryBuilder::new()
            .group(HandlerGroup::new("q").text_query("(unclosed", show))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRegex { .. }));
    }

    #[test]
    fn test_query_handler_signature() {
        let err = RegistryBuilder::new()
            .group(HandlerGroup::new("q").text_query("hi", add_digit))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidQueryHandler { .. }));
    }

    #[test]
    fn test_invalid_command_patterns() {
        for pattern in ["counter", "/", "/two words", "/phone/{digit}"] {
            let result = RegistryBuilder::new()
                .group(HandlerGroup::new("c").text_command(pattern, show))
                .build();
            assert!(
                matches!(result, Err(RegistryError::InvalidPattern { .. })),
                "{pattern} should be rejected"
            );
        }
    }

    #[test]
    fn test_duplicate_static_shape() {
        let err = RegistryBuilder::new()
            .group(HandlerGroup::new("a").text_command("/start", show))
            .group(HandlerGroup::new("b").text_command("/start", show))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRoute { .. }));

        let err = RegistryBuilder::new()
            .group(
                HandlerGroup::new("a")
                    .inline("/item/{id}", add_digit)
                    .inline("/item/{other}", add_digit),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_overloads_with_different_types_are_allowed() {
        let registry = RegistryBuilder::new()
            .group(
                HandlerGroup::new("a")
                    .text_command("/start", add_digit)
                    .text_command("/start", add_name)
                    .text_command("/start", show),
            )
            .build()
            .unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
        assert_eq!(short_type_name::<RouteRegistry>(), "RouteRegistry");
    }
}
