use std::sync::Arc;
use std::time::Duration;

use http::Method;

use crate::middleware::Middleware;
use crate::request::RequestBuilder;
use crate::retry::{DEFAULT_RETRY_DELAY, RetryPolicy};
use crate::transport::{HyperTransport, Transport};

/// `User-Agent` advertised by clients built without an override.
pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Accumulates client-wide defaults: the transport adapter, the
/// `User-Agent`, global middleware and the retry defaults every request
/// builder starts from.
pub struct ClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    user_agent: String,
    middleware: Vec<Arc<dyn Middleware>>,
    retries: usize,
    retry_delay: Duration,
}

impl ClientBuilder {
    pub(crate) fn new() -> Self {
        Self {
            transport: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            middleware: Vec::new(),
            retries: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Replace the default hyper transport.
    pub fn transport<T>(self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport_arc(Arc::new(transport))
    }

    pub fn transport_arc(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Append a global middleware; global middleware wrap every call and
    /// run outside any per-request middleware.
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

    /// Default re-attempt budget beyond the first call.
    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Default fixed delay between attempts.
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn build(self) -> Client {
        Client {
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(HyperTransport::new())),
            user_agent: Arc::from(self.user_agent),
            middleware: Arc::new(self.middleware),
            retry_policy: RetryPolicy::new(self.retries, self.retry_delay),
        }
    }
}

/// Shared handle producing pre-seeded request builders. Cloning is cheap
/// and clones share the transport and middleware; the configuration is
/// immutable after construction.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    user_agent: Arc<str>,
    middleware: Arc<Vec<Arc<dyn Middleware>>>,
    retry_policy: RetryPolicy,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("user_agent", &self.user_agent)
            .field("middleware_count", &self.middleware.len())
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone()).request(method, url)
    }

    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    pub fn head(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::HEAD, url)
    }

    /// Request builder with middleware attached but no verb yet, for the
    /// `client.with(mw).get(url)` flow.
    pub fn with<M>(&self, middleware: M) -> RequestBuilder
    where
        M: Middleware,
    {
        RequestBuilder::new(self.clone()).with(middleware)
    }

    pub fn with_arc(&self, middleware: Arc<dyn Middleware>) -> RequestBuilder {
        RequestBuilder::new(self.clone()).with_arc(middleware)
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub(crate) fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::builder().build()
    }
}
