//! Route matching.
//!
//! [`match_route`] scans the registry for routes eligible for a request kind
//! and returns every route that accepts the payload once its arguments bind:
//!
//! | Request kind  | Routes          | Accepts when                                          |
//! |---------------|-----------------|-------------------------------------------------------|
//! | text command  | `TextCommand`   | first token equals the pattern, the rest bind          |
//! | callback      | `InlinePath`    | same segment count, literals agree, captures bind      |
//! | free text     | `TextQuery`     | no pattern, or the regex finds a match in the text     |
//!
//! Exactly one accepting route is a match. None is silently nothing. Two or
//! more is always [`MatchOutcome::Ambiguous`]; no precedence is applied, not
//! even between a catch-all query and a specific one.

use switchyard_core::RequestKind;

use crate::binder::{ArgValue, ParamType, try_convert};
use crate::registry::{Route, RouteRegistry};
use crate::route::{PathSegment, RoutePattern};
use crate::split::tokenize;

/// A route selected for a request, with its bound arguments.
#[derive(Debug)]
pub struct MatchedRoute<'r> {
    pub route: &'r Route,
    pub args: Vec<ArgValue>,
}

/// The result of matching one request.
#[derive(Debug)]
pub enum MatchOutcome<'r> {
    /// No route accepts the request.
    NoMatch,
    /// Exactly one route accepts the request.
    Single(MatchedRoute<'r>),
    /// Several routes accept the request.
    Ambiguous(Vec<&'r Route>),
}

impl MatchOutcome<'_> {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Single(_))
    }
}

/// Matches a classified payload against the registry.
pub fn match_route<'r>(
    registry: &'r RouteRegistry,
    kind: RequestKind,
    payload: &str,
) -> MatchOutcome<'r> {
    let tokens = match kind {
        RequestKind::TextCommand => tokenize(payload),
        _ => Vec::new(),
    };

    let mut matches: Vec<MatchedRoute<'r>> = registry
        .routes()
        .iter()
        .filter(|route| route.descriptor().kind().request_kind() == kind)
        .filter_map(|route| {
            accept(route, payload, &tokens).map(|args| MatchedRoute { route, args })
        })
        .collect();

    match matches.len() {
        0 => MatchOutcome::NoMatch,
        1 => match matches.pop() {
            Some(matched) => MatchOutcome::Single(matched),
            None => MatchOutcome::NoMatch,
        },
        _ => MatchOutcome::Ambiguous(matches.into_iter().map(|m| m.route).collect()),
    }
}

/// Returns the bound arguments if `route` accepts the payload.
fn accept(route: &Route, payload: &str, tokens: &[String]) -> Option<Vec<ArgValue>> {
    let descriptor = route.descriptor();
    let types = descriptor.param_types();

    match descriptor.pattern() {
        RoutePattern::Command(literal) => {
            let (command, rest) = tokens.split_first()?;
            if command != literal {
                return None;
            }
            try_convert(types, rest)
        }
        RoutePattern::Path { segments, .. } => {
            let parts: Vec<&str> = payload.split('/').collect();
            if parts.len() != segments.len() {
                return None;
            }
            let mut captured = Vec::with_capacity(types.len());
            for (segment, part) in segments.iter().zip(&parts) {
                match segment {
                    PathSegment::Literal(literal) if literal.as_str() != *part => return None,
                    PathSegment::Literal(_) => {}
                    PathSegment::Placeholder(_) => captured.push(*part),
                }
            }
            try_convert(types, captured.as_slice())
        }
        RoutePattern::Query(regex) => {
            if regex.as_ref().is_some_and(|re| !re.is_match(payload)) {
                return None;
            }
            match types {
                [] => Some(Vec::new()),
                [ParamType::String] => Some(vec![ArgValue::String(payload.to_string())]),
                _ => None,
            }
        }
    }
}
