//! Cross-resource output references.
//!
//! A reference is written `${ResourceId.outputKey}` inside a string config
//! value. The id is everything before the first `.`; resource ids never
//! contain dots.

use std::fmt;

use serde::Serialize;

/// A typed reference to one output of another resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OutputRef {
    /// Id of the resource producing the output.
    pub resource: String,
    /// Output key on that resource.
    pub key: String,
}

impl OutputRef {
    pub fn new(resource: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            key: key.into(),
        }
    }

    /// Parse the inside of a `${...}` token.
    pub fn parse(token: &str) -> Result<Self, ReferenceError> {
        match token.split_once('.') {
            Some((resource, key)) if !resource.is_empty() && !key.is_empty() => {
                Ok(Self::new(resource, key))
            }
            _ => Err(ReferenceError::Malformed {
                token: token.to_string(),
            }),
        }
    }

    /// Render this reference as an embeddable `${...}` token.
    pub fn token(&self) -> String {
        format!("${{{}.{}}}", self.resource, self.key)
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.key)
    }
}

/// Errors from scanning a string for references.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("unterminated reference in '{input}' (missing '}}')")]
    Unterminated { input: String },

    #[error("malformed reference '${{{token}}}', expected '${{ResourceId.outputKey}}'")]
    Malformed { token: String },
}

/// A piece of a string split around its references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Reference(OutputRef),
}

/// Split a string into literal text and references.
pub fn segments(input: &str) -> Result<Vec<Segment<'_>>, ReferenceError> {
    let mut out = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        if start > 0 {
            out.push(Segment::Literal(&rest[..start]));
        }
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| ReferenceError::Unterminated {
            input: input.to_string(),
        })?;
        out.push(Segment::Reference(OutputRef::parse(&after[..end])?));
        rest = &after[end + 1..];
    }

    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    Ok(out)
}

/// Collect the references in a string, in order of appearance.
pub fn scan(input: &str) -> Result<Vec<OutputRef>, ReferenceError> {
    Ok(segments(input)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Reference(r) => Some(r),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Replace every reference in `input` with the value returned by `lookup`.
pub fn interpolate<E>(
    input: &str,
    mut lookup: impl FnMut(&OutputRef) -> Result<String, E>,
) -> Result<String, E>
where
    E: From<ReferenceError>,
{
    let mut out = String::with_capacity(input.len());
    for segment in segments(input)? {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Reference(r) => out.push_str(&lookup(&r)?),
        }
    }
    Ok(out)
}
