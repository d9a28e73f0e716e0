use http::Method;
use std::cmp::Ordering;
use std::fmt;

use crate::error::CompileError;

/// One segment of a route path: a literal string or a named variable.
///
/// Variant order matters: the derived ordering sorts variable segments
/// before literal segments at the same position, which is the tie-break
/// the table normalizer relies on for deterministic diagnostics output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// A named variable, e.g. `{id}`. Matches any single segment.
    Variable(String),
    /// A literal segment matched verbatim.
    Literal(String),
}

impl PathSegment {
    /// The variable name, if this segment is a variable.
    #[must_use]
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            PathSegment::Variable(name) => Some(name),
            PathSegment::Literal(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Variable(name) => write!(f, "{{{name}}}"),
            PathSegment::Literal(s) => write!(f, "{s}"),
        }
    }
}

/// Ordered sequence of path segments.
pub type PathVec = Vec<PathSegment>;

/// Method key of a dispatch leaf: a concrete HTTP verb or the
/// "any method" marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKey {
    /// Matches every request method. Sorts before all concrete verbs.
    Any,
    Method(Method),
}

impl MethodKey {
    /// Name used for ordering and display; the any-method marker is `*`.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            MethodKey::Any => "*",
            MethodKey::Method(m) => m.as_str(),
        }
    }
}

impl From<Method> for MethodKey {
    fn from(m: Method) -> Self {
        MethodKey::Method(m)
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl PartialOrd for MethodKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MethodKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

/// `(method, path-segment-sequence)` identifying one logical endpoint shape.
///
/// Two route specs are equal iff their segment sequences and methods are
/// equal. The ordering compares segment sequences position-by-position
/// first (a sequence that is a strict prefix of another sorts first), then
/// breaks remaining ties on the method name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteSpec {
    pub method: MethodKey,
    pub path: PathVec,
}

impl RouteSpec {
    #[must_use]
    pub fn new(method: MethodKey, path: PathVec) -> Self {
        Self { method, path }
    }

    /// Parse a route spec from a method and a path-and-placeholders string.
    pub fn parse(method: MethodKey, pattern: &str) -> Result<Self, CompileError> {
        Ok(Self {
            method,
            path: parse_path(pattern)?,
        })
    }

    /// Ordered names of the variable segments in this path.
    #[must_use]
    pub fn variable_names(&self) -> Vec<String> {
        self.path
            .iter()
            .filter_map(|s| s.variable_name().map(str::to_string))
            .collect()
    }
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, format_path(&self.path))
    }
}

impl PartialOrd for RouteSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RouteSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then_with(|| self.method.cmp(&other.method))
    }
}

/// Parse a path-and-placeholders string (`/widgets/{id}`) into segments.
///
/// Empty segments are skipped, so `/widgets/`, `widgets` and `/widgets`
/// parse identically. Variable names must be non-empty and unique within
/// the path; stray braces are rejected.
pub fn parse_path(pattern: &str) -> Result<PathVec, CompileError> {
    let mut segments = PathVec::new();
    let mut seen = Vec::new();
    for raw in pattern.split('/').filter(|s| !s.is_empty()) {
        if raw.starts_with('{') && raw.ends_with('}') {
            let name = raw.trim_start_matches('{').trim_end_matches('}');
            if name.is_empty() || name.contains(['{', '}']) {
                return Err(CompileError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: format!("malformed variable segment `{raw}`"),
                });
            }
            if seen.contains(&name) {
                return Err(CompileError::DuplicateVariable {
                    name: name.to_string(),
                    pattern: pattern.to_string(),
                });
            }
            seen.push(name);
            segments.push(PathSegment::Variable(name.to_string()));
        } else if raw.contains(['{', '}']) {
            return Err(CompileError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: format!("stray brace in segment `{raw}`"),
            });
        } else {
            segments.push(PathSegment::Literal(raw.to_string()));
        }
    }
    Ok(segments)
}

/// Render segments back into the `/a/{b}` string form. The empty path
/// renders as `/`.
#[must_use]
pub fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for segment in path {
        out.push('/');
        out.push_str(&segment.to_string());
    }
    out
}
