//! Route descriptors.
//!
//! A [`RouteDescriptor`] is the immutable metadata of one routable handler:
//! what kind of request it answers, the pattern it answers to, the declared
//! parameter types and whether it requires authorization. Descriptors are
//! created by the [`RegistryBuilder`](crate::RegistryBuilder) and never change
//! afterwards.

use std::fmt;

use regex::Regex;

use switchyard_core::RequestKind;

use crate::binder::ParamType;

/// The family of requests a route answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// An exact slash command typed as text, e.g. `/counter`.
    TextCommand,
    /// A `/`-delimited callback path, optionally with `{name}` placeholders.
    InlinePath,
    /// A regular expression over free text; no pattern means catch-all.
    TextQuery,
}

impl RouteKind {
    /// The request kind this route family is eligible for.
    pub fn request_kind(&self) -> RequestKind {
        match self {
            Self::TextCommand => RequestKind::TextCommand,
            Self::InlinePath => RequestKind::Callback,
            Self::TextQuery => RequestKind::FreeText,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextCommand => "text_command",
            Self::InlinePath => "inline_path",
            Self::TextQuery => "text_query",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `/`-separated segment of an inline path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Must equal the request segment verbatim.
    Literal(String),
    /// Captures the request segment. The name is informational only.
    Placeholder(String),
}

impl PathSegment {
    fn parse(segment: &str) -> Self {
        match segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            Some(name) => Self::Placeholder(name.to_string()),
            None => Self::Literal(segment.to_string()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

/// The compiled pattern of a route.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// Literal command token, leading slash included.
    Command(String),
    /// Inline path template.
    Path {
        raw: String,
        segments: Vec<PathSegment>,
    },
    /// Free-text regex; `None` matches any text.
    Query(Option<Regex>),
}

impl RoutePattern {
    /// Parses an inline path template.
    pub fn path(raw: &str) -> Self {
        Self::Path {
            raw: raw.to_string(),
            segments: raw.split('/').map(PathSegment::parse).collect(),
        }
    }

    /// Number of captured values the pattern produces.
    pub fn placeholder_count(&self) -> usize {
        match self {
            Self::Path { segments, .. } => segments.iter().filter(|s| s.is_placeholder()).count(),
            _ => 0,
        }
    }

    /// Source text of the pattern, `*` for a catch-all query.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Command(literal) => literal,
            Self::Path { raw, .. } => raw,
            Self::Query(Some(regex)) => regex.as_str(),
            Self::Query(None) => "*",
        }
    }

    /// Returns `true` if no request can tell the two patterns apart.
    ///
    /// Placeholder names are ignored; regexes compare by source text.
    pub fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Command(a), Self::Command(b)) => a == b,
            (Self::Path { segments: a, .. }, Self::Path { segments: b, .. }) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|pair| match pair {
                        (PathSegment::Literal(x), PathSegment::Literal(y)) => x == y,
                        (PathSegment::Placeholder(_), PathSegment::Placeholder(_)) => true,
                        _ => false,
                    })
            }
            (Self::Query(a), Self::Query(b)) => {
                a.as_ref().map(Regex::as_str) == b.as_ref().map(Regex::as_str)
            }
            _ => false,
        }
    }
}

/// Immutable metadata of a registered route.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    kind: RouteKind,
    pattern: RoutePattern,
    group: String,
    handler: String,
    param_types: Vec<ParamType>,
    requires_auth: bool,
}

impl RouteDescriptor {
    pub(crate) fn new(
        kind: RouteKind,
        pattern: RoutePattern,
        group: String,
        handler: String,
        param_types: Vec<ParamType>,
        requires_auth: bool,
    ) -> Self {
        Self {
            kind,
            pattern,
            group,
            handler,
            param_types,
            requires_auth,
        }
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Name of the handler group the route was registered in.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Name of the handler function.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Declared parameter types, positionally aligned with captured values.
    pub fn param_types(&self) -> &[ParamType] {
        &self.param_types
    }

    pub fn arity(&self) -> usize {
        self.param_types.len()
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// Qualified handler name, `group::handler`.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.group, self.handler)
    }

    /// Handler signature for diagnostics, e.g. `phone::add_digit(int)`.
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.param_types.iter().map(ParamType::as_str).collect();
        format!("{}({})", self.qualified_name(), params.join(", "))
    }
}

impl fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.kind, self.pattern.as_str(), self.signature())
    }
}
