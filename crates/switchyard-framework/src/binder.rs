//! Argument binding.
//!
//! Routes declare the primitive types their handler takes as a list of
//! [`ParamType`]s. At match time the binder converts the raw string tokens of
//! a request into [`ArgValue`]s of exactly those types. Binding is
//! all-or-nothing: one bad token rejects the whole candidate, which lets an
//! overload with better-fitting types win instead.
//!
//! Handler parameters opt into binding through [`FromArg`].

use std::fmt;

use uuid::Uuid;

/// Length of the canonical `8-4-4-4-12` GUID text.
const GUID_LEN: usize = 36;

/// The primitive parameter types a handler may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// Finite 64-bit float.
    Double,
    /// `true` / `false`, case-insensitive.
    Bool,
    /// A UUID in textual form.
    Guid,
    /// Any token, verbatim.
    String,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Guid => "guid",
            Self::String => "string",
        }
    }

    /// Parses a single token as this type.
    ///
    /// Numeric parses are strict: surrounding whitespace, thousands
    /// separators and trailing garbage are all rejected.
    pub fn parse(&self, token: &str) -> Option<ArgValue> {
        match self {
            Self::Int => token.parse().ok().map(ArgValue::Int),
            Self::Long => token.parse().ok().map(ArgValue::Long),
            Self::Double => token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ArgValue::Double),
            Self::Bool => {
                if token.eq_ignore_ascii_case("true") {
                    Some(ArgValue::Bool(true))
                } else if token.eq_ignore_ascii_case("false") {
                    Some(ArgValue::Bool(false))
                } else {
                    None
                }
            }
            // Only the hyphenated form is 36 characters long.
            Self::Guid => (token.len() == GUID_LEN)
                .then(|| Uuid::try_parse(token).ok())
                .flatten()
                .map(ArgValue::Guid),
            Self::String => Some(ArgValue::String(token.to_string())),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bound argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    Guid(Uuid),
    String(String),
}

impl ArgValue {
    /// The declared type this value was bound as.
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Int(_) => ParamType::Int,
            Self::Long(_) => ParamType::Long,
            Self::Double(_) => ParamType::Double,
            Self::Bool(_) => ParamType::Bool,
            Self::Guid(_) => ParamType::Guid,
            Self::String(_) => ParamType::String,
        }
    }
}

/// Converts every token to its declared type, or fails as a whole.
///
/// Returns `None` on arity mismatch or if any token fails to parse.
pub fn try_convert<S: AsRef<str>>(types: &[ParamType], tokens: &[S]) -> Option<Vec<ArgValue>> {
    if types.len() != tokens.len() {
        return None;
    }
    types
        .iter()
        .zip(tokens)
        .map(|(ty, token)| ty.parse(token.as_ref()))
        .collect()
}

// ============================================================================
// FromArg - typed handler parameters
// ============================================================================

/// A type that can be used as a bound handler parameter.
pub trait FromArg: Sized + Send + 'static {
    /// The declared type used for matching.
    const PARAM_TYPE: ParamType;

    /// Extracts the typed value; `None` if the value has another type.
    fn from_arg(value: ArgValue) -> Option<Self>;
}

macro_rules! impl_from_arg {
    ($ty:ty, $variant:ident) => {
        impl FromArg for $ty {
            const PARAM_TYPE: ParamType = ParamType::$variant;

            fn from_arg(value: ArgValue) -> Option<Self> {
                match value {
                    ArgValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_from_arg!(i32, Int);
impl_from_arg!(i64, Long);
impl_from_arg!(f64, Double);
impl_from_arg!(bool, Bool);
impl_from_arg!(Uuid, Guid);
impl_from_arg!(String, String);
