use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde_json::{Map, Value};

use crate::retry::RetryPolicy;

/// Request or response payload.
///
/// A payload may be absent, raw bytes, or a structured value: plugins such
/// as [`crate::plugins::json_decode`] replace byte payloads with structured
/// ones, and middleware may install structured request bodies that the
/// transport serializes on the wire.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Bytes(Bytes),
    Json(Value),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Json(_) => false,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Lossy text view of the payload; structured values render compact.
    pub fn text_lossy(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Self::Json(value) => value.to_string(),
        }
    }

    /// Bytes as sent on the wire; structured values serialize compact.
    pub fn to_wire_bytes(&self) -> Bytes {
        match self {
            Self::Empty => Bytes::new(),
            Self::Bytes(bytes) => bytes.clone(),
            Self::Json(value) => Bytes::from(value.to_string()),
        }
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Bytes(Bytes::from(text))
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Request half of a [`Context`]. Middleware may rewrite any field before
/// the transport runs.
#[derive(Clone, Debug)]
pub struct RequestParts {
    pub method: Method,
    /// Absolute request URL, without the accumulated query pairs.
    pub url: String,
    pub headers: HeaderMap,
    /// Ordered query parameters, appended to the URL by the transport.
    pub query_pairs: Vec<(String, String)>,
    pub body: Body,
    /// Per-request socket-timeout override enforced by the transport.
    pub timeout: Option<Duration>,
}

/// Response half of a [`Context`], populated by the transport and further
/// transformed by middleware post-phases.
#[derive(Clone, Debug)]
pub struct ResponseParts {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
    /// Wall time between transport entry and exit. `None` when capture is
    /// disabled through `opts["time"] = false`.
    pub elapsed: Option<Duration>,
}

/// Record of one failed attempt that triggered a retry.
#[derive(Clone, Debug)]
pub struct Attempt {
    /// Status code attached to the failure, absent for timeouts.
    pub status: Option<u16>,
    /// Display message of the failure.
    pub reason: String,
}

/// The single mutable value threaded through the middleware pipeline for
/// the duration of one top-level call, across all of its attempts.
///
/// A Context is owned by exactly one call and is never shared.
#[derive(Clone, Debug)]
pub struct Context {
    pub req: RequestParts,
    /// `None` until the transport has been entered; reset between retry
    /// attempts.
    pub res: Option<ResponseParts>,
    /// Prior-attempt records, appended by the retry engine.
    pub retries: Vec<Attempt>,
    pub retry_policy: RetryPolicy,
    /// Open mapping of plugin-scoped options.
    pub opts: Map<String, Value>,
}

impl Context {
    pub(crate) fn new(req: RequestParts, retry_policy: RetryPolicy) -> Self {
        Self {
            req,
            res: None,
            retries: Vec::new(),
            retry_policy,
            opts: Map::new(),
        }
    }

    /// Elapsed-time capture is on unless `opts["time"]` is `false`.
    pub fn time_enabled(&self) -> bool {
        self.opts.get("time") != Some(&Value::Bool(false))
    }

    /// Assign `value` at a dotted `path` inside the context.
    ///
    /// `"opts"` replaces the whole option map (the value must be an
    /// object); `"opts.a.b"` traverses the option map, creating
    /// intermediate objects as needed. The typed leaves `"req.timeout"`
    /// (milliseconds), `"retry_policy.max"` and `"retry_policy.delay_ms"`
    /// are matched explicitly. Returns `false` for paths that address
    /// nothing.
    pub fn set_path(&mut self, path: &str, value: Value) -> bool {
        let mut segments = path.split('.');
        let Some(root) = segments.next() else {
            return false;
        };
        let rest: Vec<&str> = segments.collect();
        match root {
            "opts" if rest.is_empty() => match value {
                Value::Object(map) => {
                    self.opts = map;
                    true
                }
                _ => false,
            },
            "opts" => {
                set_json_path(&mut self.opts, &rest, value);
                true
            }
            "req" => match rest.as_slice() {
                ["timeout"] | ["_timeout"] => match value.as_u64() {
                    Some(millis) => {
                        self.req.timeout = Some(Duration::from_millis(millis));
                        true
                    }
                    None => false,
                },
                _ => false,
            },
            "retry_policy" => match rest.as_slice() {
                ["max"] => match value.as_u64() {
                    Some(max) => {
                        self.retry_policy.max = max as usize;
                        true
                    }
                    None => false,
                },
                ["delay_ms"] => match value.as_u64() {
                    Some(millis) => {
                        self.retry_policy.delay = Duration::from_millis(millis);
                        true
                    }
                    None => false,
                },
                _ => false,
            },
            _ => false,
        }
    }
}

fn set_json_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let mut current = map;
    for segment in parents {
        let slot = current
            .entry((*segment).to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot.as_object_mut() {
            Some(next) => current = next,
            None => return,
        }
    }
    current.insert((*leaf).to_owned(), value);
}
