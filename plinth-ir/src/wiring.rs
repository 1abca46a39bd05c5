//! Event and integration wiring records.
//!
//! Routes bind a gateway path + method to a function; notifications bind a
//! bucket change event to a function. Both are lowered into their own
//! descriptors so the binding is materialized after both endpoints.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// HTTP method accepted on a gateway route.
///
/// Parsing ignores case, both through [`FromStr`] and when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Any,
}

impl HttpMethod {
    pub const ALL: &'static [HttpMethod] = &[
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown HTTP method '{}'", s))
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Bucket change event that triggers a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    ObjectCreated,
    ObjectRemoved,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ObjectCreated => "object-created",
            EventType::ObjectRemoved => "object-removed",
        }
    }

    /// The provider's event name pattern.
    pub fn event_name(&self) -> &'static str {
        match self {
            EventType::ObjectCreated => "s3:ObjectCreated:*",
            EventType::ObjectRemoved => "s3:ObjectRemoved:*",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gateway route bound to a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub api: String,
    pub path: String,
    pub method: HttpMethod,
    pub function: String,
    /// Authorizer resource id, if the route requires authentication.
    pub authorizer: Option<String>,
}

impl Route {
    /// The path with empty segments removed, e.g. `/users/` becomes `/users`.
    ///
    /// Two routes on the same api and method with the same normalized path
    /// are the same route.
    pub fn normalized_path(&self) -> String {
        format!("/{}", segments(&self.path).collect::<Vec<_>>().join("/"))
    }

    /// Id of the descriptor this route lowers into, e.g. `Api-POST-users`.
    ///
    /// Segments are joined with `-`. A `{param}` segment becomes `__param`,
    /// and any character other than an ASCII letter or digit is written as
    /// `_xx` per UTF-8 byte, so distinct paths never share an id. The root
    /// path adds no suffix: `Api-GET`.
    pub fn descriptor_id(&self) -> String {
        let mut id = format!("{}-{}", self.api, self.method);
        for segment in segments(&self.path) {
            id.push('-');
            match segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .filter(|name| !name.is_empty())
            {
                Some(param) => {
                    id.push_str("__");
                    id.push_str(&encode(param));
                }
                None => id.push_str(&encode(segment)),
            }
        }
        id
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Encode `s` using only ASCII letters, digits and `_`.
fn encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            let mut buf = [0; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("_{:02x}", byte));
            }
        }
    }
    out
}

/// A bucket event notification bound to a function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Notification {
    pub bucket: String,
    pub event: EventType,
    pub function: String,
    /// Only keys starting with this prefix trigger the notification.
    pub prefix: Option<String>,
    /// Only keys ending with this suffix trigger the notification.
    pub suffix: Option<String>,
}

impl Notification {
    /// Id of the descriptor this notification lowers into.
    ///
    /// Key filters are part of the id, so one function can be notified for
    /// several prefixes of the same bucket:
    /// `Uploads-object-created-Handler-prefix-images_2f`.
    pub fn descriptor_id(&self) -> String {
        let mut id = format!("{}-{}-{}", self.bucket, self.event, self.function);
        if let Some(prefix) = &self.prefix {
            id.push_str("-prefix-");
            id.push_str(&encode(prefix));
        }
        if let Some(suffix) = &self.suffix {
            id.push_str("-suffix-");
            id.push_str(&encode(suffix));
        }
        id
    }
}
