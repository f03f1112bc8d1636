use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;

use crate::client::Client;
use crate::context::{Body, Context, RequestParts};
use crate::error::Error;
use crate::middleware::Middleware;
use crate::response::Response;
use crate::retry::{RetryPolicy, run_with_retries};
use crate::util::{merge_headers, parse_header_name, parse_header_value};

/// Fluent accumulator for one call. Setters compose in any order; a verb
/// method fixes the method and URL; `as_response`, `as_body` or `.await`
/// finalize. Terminal calls consume the builder, so nothing can be
/// mutated after finalization.
pub struct RequestBuilder {
    client: Client,
    method: Option<Method>,
    url: Option<String>,
    headers: HeaderMap,
    query_pairs: Vec<(String, String)>,
    body: Body,
    timeout: Option<Duration>,
    retries: Option<usize>,
    retry_delay: Option<Duration>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl RequestBuilder {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            method: None,
            url: None,
            headers: HeaderMap::new(),
            query_pairs: Vec::new(),
            body: Body::Empty,
            timeout: None,
            retries: None,
            retry_delay: None,
            middleware: Vec::new(),
        }
    }

    pub fn request(mut self, method: Method, url: impl Into<String>) -> Self {
        self.method = Some(method);
        self.url = Some(url.into());
        self
    }

    pub fn get(self, url: impl Into<String>) -> Self {
        self.request(Method::GET, url)
    }

    pub fn post(self, url: impl Into<String>) -> Self {
        self.request(Method::POST, url)
    }

    pub fn put(self, url: impl Into<String>) -> Self {
        self.request(Method::PUT, url)
    }

    pub fn patch(self, url: impl Into<String>) -> Self {
        self.request(Method::PATCH, url)
    }

    pub fn delete(self, url: impl Into<String>) -> Self {
        self.request(Method::DELETE, url)
    }

    pub fn head(self, url: impl Into<String>) -> Self {
        self.request(Method::HEAD, url)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn try_header(self, name: &str, value: &str) -> crate::Result<Self> {
        let name = parse_header_name(name)?;
        let value = parse_header_value(name.as_str(), value)?;
        Ok(self.header(name, value))
    }

    /// Merge a header map into the request; later assignments win per
    /// name and an empty map is a no-op.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        merge_headers(&mut self.headers, &headers);
        self
    }

    pub fn query_pair(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_pairs.push((name.into(), value.into()));
        self
    }

    pub fn query_pairs<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.query_pairs.extend(
            pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        self
    }

    pub fn query<T>(mut self, params: &T) -> crate::Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_urlencoded::to_string(params)
            .map_err(|source| Error::SerializeQuery { source })?;
        self.query_pairs.extend(
            url::form_urlencoded::parse(encoded.as_bytes())
                .map(|(name, value)| (name.into_owned(), value.into_owned())),
        );
        Ok(self)
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn json<T>(self, payload: &T) -> crate::Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let body =
            serde_json::to_vec(payload).map_err(|source| Error::SerializeJson { source })?;
        Ok(self
            .body(Bytes::from(body))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json")))
    }

    /// Per-request socket timeout, enforced by the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the client's re-attempt budget for this call.
    pub fn retry(mut self, retries: usize) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Override the client's inter-attempt delay for this call.
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = Some(retry_delay);
        self
    }

    /// Append a middleware to the per-request chain. Per-request
    /// middleware run inside the client's global middleware.
    pub fn with<M>(self, middleware: M) -> Self
    where
        M: Middleware,
    {
        self.with_arc(Arc::new(middleware))
    }

    pub fn with_arc(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Freeze the accumulated state into a Context plus the execution
    /// chain (global middleware first, then per-request).
    pub(crate) fn freeze(self) -> crate::Result<(Client, Vec<Arc<dyn Middleware>>, Context)> {
        let Self {
            client,
            method,
            url,
            headers: request_headers,
            query_pairs,
            body,
            timeout,
            retries,
            retry_delay,
            middleware,
        } = self;
        let (Some(method), Some(url)) = (method, url) else {
            return Err(Error::MissingVerb);
        };

        let mut headers = HeaderMap::new();
        if let Ok(user_agent) = HeaderValue::from_str(client.user_agent()) {
            headers.insert(USER_AGENT, user_agent);
        }
        merge_headers(&mut headers, &request_headers);

        let retry_policy = RetryPolicy::new(
            retries.unwrap_or(client.retry_policy().max),
            retry_delay.unwrap_or(client.retry_policy().delay),
        );
        let req = RequestParts {
            method,
            url,
            headers,
            query_pairs,
            body,
            timeout,
        };

        let global = client.middleware();
        let mut chain = Vec::with_capacity(global.len() + middleware.len());
        chain.extend(global.iter().cloned());
        chain.extend(middleware);

        Ok((client, chain, Context::new(req, retry_policy)))
    }

    /// Run the pipeline and retry engine to completion and return the
    /// finished [`Context`], attempt records included.
    pub async fn exchange(self) -> crate::Result<Context> {
        let (client, chain, mut ctx) = self.freeze()?;
        run_with_retries(client.transport(), &chain, &mut ctx).await?;
        Ok(ctx)
    }

    /// Finalize and return the full response view.
    pub async fn as_response(self) -> crate::Result<Response> {
        Response::from_context(self.exchange().await?)
    }

    /// Finalize and return the response body only.
    pub async fn as_body(self) -> crate::Result<Body> {
        let ctx = self.exchange().await?;
        match ctx.res {
            Some(res) => Ok(res.body),
            None => Err(Error::NoResponse),
        }
    }
}

impl IntoFuture for RequestBuilder {
    type Output = crate::Result<Response>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    /// Awaiting a builder is shorthand for [`RequestBuilder::as_response`],
    /// which lets a verb call be the terminal call:
    /// `client.delete(url).await`.
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.as_response())
    }
}
