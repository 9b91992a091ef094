//! Route pattern compilation, matching and reverse building.
//!
//! # Syntax
//! - `/posts/all` literal segments (case-sensitive)
//! - `{id}` required parameter, `{page?}` optional parameter
//! - `{id:\d+}` parameter constrained by a regex over the whole segment
//! - trailing `/` requires a trailing slash, trailing `/?` accepts both
//!
//! # Design Decisions
//! - Segment-by-segment matching, no backtracking
//! - `/foo` and `/foo/` are distinct unless the pattern ends in `/?`
//! - Parameter values are percent-decoded before constraints run

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::error::RouterError;

/// Parameters extracted from a matched path, or supplied for URL generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: HashMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// How a pattern treats a trailing slash on the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingSlash {
    Forbidden,
    Required,
    Optional,
}

/// A named parameter segment.
#[derive(Debug, Clone)]
pub struct ParamSegment {
    pub name: String,
    pub optional: bool,
    pub constraint: Option<Regex>,
}

impl ParamSegment {
    fn accepts(&self, value: &str) -> bool {
        self.constraint.as_ref().map_or(true, |re| re.is_match(value))
    }
}

/// One `/`-delimited piece of a compiled pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    Literal(String),
    Param(ParamSegment),
}

/// A compiled route pattern. Immutable once built.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
    trailing_slash: TrailingSlash,
}

/// Why a pattern could not be turned back into a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BuildError {
    Missing(String),
    Rejected { parameter: String, value: String },
}

impl RoutePattern {
    /// Compile a pattern string.
    pub fn compile(pattern: &str) -> Result<Self, RouterError> {
        let invalid = |reason: String| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let raw = split_pattern(pattern).map_err(invalid)?;
        let mut raw = raw.as_slice();

        if raw.first() == Some(&"") {
            raw = &raw[1..];
        }

        let mut trailing_slash = TrailingSlash::Forbidden;
        match raw.split_last() {
            Some((&"", rest)) => {
                raw = rest;
                if !raw.is_empty() {
                    trailing_slash = TrailingSlash::Required;
                }
            }
            Some((&"?", rest)) => {
                raw = rest;
                if !raw.is_empty() {
                    trailing_slash = TrailingSlash::Optional;
                }
            }
            _ => {}
        }

        let mut segments = Vec::with_capacity(raw.len());
        let mut seen = HashSet::new();
        let mut after_optional = false;

        for piece in raw.iter().filter(|piece| !piece.is_empty()) {
            let segment = parse_segment(piece).map_err(invalid)?;
            match &segment {
                Segment::Param(param) => {
                    if !seen.insert(param.name.clone()) {
                        return Err(invalid(format!("parameter `{}` appears more than once", param.name)));
                    }
                    if after_optional && !param.optional {
                        return Err(invalid(format!(
                            "required parameter `{}` follows an optional one",
                            param.name
                        )));
                    }
                    after_optional |= param.optional;
                }
                Segment::Literal(text) if after_optional => {
                    return Err(invalid(format!("literal `{text}` follows an optional parameter")));
                }
                Segment::Literal(_) => {}
            }
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
            trailing_slash,
        })
    }

    /// The pattern as written at registration.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn trailing_slash(&self) -> TrailingSlash {
        self.trailing_slash
    }

    /// Names of every parameter, in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(param) => Some(param.name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a request path (already stripped of any base path).
    pub fn matches(&self, path: &str) -> Option<Params> {
        let (pieces, trailing) = split_path(path);

        let trailing_ok = match self.trailing_slash {
            TrailingSlash::Forbidden => !trailing,
            TrailingSlash::Required => trailing || pieces.is_empty(),
            TrailingSlash::Optional => true,
        };
        if !trailing_ok || pieces.len() > self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (index, segment) in self.segments.iter().enumerate() {
            let Some(piece) = pieces.get(index) else {
                match segment {
                    Segment::Param(param) if param.optional => continue,
                    _ => return None,
                }
            };

            match segment {
                Segment::Literal(text) => {
                    if text != piece {
                        return None;
                    }
                }
                Segment::Param(param) => {
                    if piece.is_empty() {
                        return None;
                    }
                    let value = urlencoding::decode(piece).ok()?;
                    if !param.accepts(&value) {
                        return None;
                    }
                    params.insert(param.name.clone(), value.into_owned());
                }
            }
        }

        Some(params)
    }

    /// Substitute parameters back into the pattern. The result starts with
    /// `/` and carries no trailing slash.
    pub(crate) fn build(&self, params: &Params) -> Result<String, BuildError> {
        let mut pieces: Vec<Cow<'_, str>> = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => pieces.push(Cow::Borrowed(text.as_str())),
                Segment::Param(param) => match params.get(&param.name).filter(|v| !v.is_empty()) {
                    Some(value) => {
                        if !param.accepts(value) {
                            return Err(BuildError::Rejected {
                                parameter: param.name.clone(),
                                value: value.to_string(),
                            });
                        }
                        pieces.push(Cow::Owned(urlencoding::encode(value).into_owned()));
                    }
                    // Only optional parameters can follow an optional one.
                    None if param.optional => break,
                    None => return Err(BuildError::Missing(param.name.clone())),
                },
            }
        }

        Ok(format!("/{}", pieces.join("/")))
    }
}

/// Join two path fragments with exactly one `/` between them. The result
/// always starts with `/`; a trailing slash on `path` is kept.
pub(crate) fn join_paths(prefix: &str, path: &str) -> String {
    let head = prefix.trim_end_matches('/');
    let tail = path.trim_start_matches('/');

    let mut joined = String::with_capacity(head.len() + tail.len() + 2);
    if !head.starts_with('/') {
        joined.push('/');
    }
    joined.push_str(head);
    if !tail.is_empty() {
        if !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(tail);
    }
    if path.ends_with('/') && !joined.ends_with('/') {
        joined.push('/');
    }
    joined
}

/// Split on `/` outside of braces, rejecting unbalanced braces.
fn split_pattern(pattern: &str) -> Result<Vec<&str>, String> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, ch) in pattern.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unexpected `}}` at offset {index}"))?;
            }
            '/' if depth == 0 => {
                pieces.push(&pattern[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err("unclosed `{`".to_string());
    }
    pieces.push(&pattern[start..]);
    Ok(pieces)
}

fn parse_segment(raw: &str) -> Result<Segment, String> {
    let Some(inner) = raw.strip_prefix('{') else {
        if raw.contains(['{', '}', '?', '#']) {
            return Err(format!("segment `{raw}` mixes literal text with parameter syntax"));
        }
        return Ok(Segment::Literal(raw.to_string()));
    };

    let inner = inner
        .strip_suffix('}')
        .ok_or_else(|| format!("segment `{raw}` mixes literal text with parameter syntax"))?;

    let (head, constraint) = match inner.split_once(':') {
        Some((head, constraint)) => (head, Some(constraint)),
        None => (inner, None),
    };
    let (name, optional) = match head.strip_suffix('?') {
        Some(name) => (name, true),
        None => (head, false),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid parameter name `{name}`"));
    }

    let constraint = match constraint {
        Some("") => return Err(format!("empty constraint on parameter `{name}`")),
        Some(expr) => Some(
            Regex::new(&format!("^(?:{expr})$"))
                .map_err(|e| format!("bad constraint on parameter `{name}`: {e}"))?,
        ),
        None => None,
    };

    Ok(Segment::Param(ParamSegment {
        name: name.to_string(),
        optional,
        constraint,
    }))
}

fn split_path(path: &str) -> (Vec<&str>, bool) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (Vec::new(), false);
    }
    match trimmed.strip_suffix('/') {
        Some(body) => (body.split('/').collect(), true),
        None => (trimmed.split('/').collect(), false),
    }
}
