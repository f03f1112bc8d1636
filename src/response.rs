use std::time::Duration;

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::context::{Attempt, Body, Context};
use crate::error::Error;
use crate::util::truncate_text;

/// Terminal view of a finished call: the populated response parts plus the
/// attempt records the retry engine accumulated along the way.
#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
    elapsed: Option<Duration>,
    retries: Vec<Attempt>,
}

impl Response {
    pub(crate) fn from_context(ctx: Context) -> crate::Result<Self> {
        let Context { res, retries, .. } = ctx;
        let Some(res) = res else {
            return Err(Error::NoResponse);
        };
        Ok(Self {
            status: res.status,
            headers: res.headers,
            body: res.body,
            elapsed: res.elapsed,
            retries,
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn into_body(self) -> Body {
        self.body
    }

    /// Wall time the final attempt spent in the transport, when captured.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Failed attempts that preceded this response.
    pub fn retries(&self) -> &[Attempt] {
        &self.retries
    }

    pub fn text_lossy(&self) -> String {
        self.body.text_lossy()
    }

    pub fn json<T>(&self) -> crate::Result<T>
    where
        T: DeserializeOwned,
    {
        let parsed = match &self.body {
            Body::Json(value) => serde_json::from_value(value.clone()),
            Body::Bytes(bytes) => serde_json::from_slice(bytes),
            Body::Empty => serde_json::from_slice(b""),
        };
        parsed.map_err(|source| Error::Decode {
            source,
            body: truncate_text(&self.body.text_lossy()),
        })
    }
}
