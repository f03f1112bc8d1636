use std::time::{Duration, Instant};

use http::Request as HttpRequest;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tokio::time::timeout;

use crate::context::{Body, Context, ResponseParts};
use crate::error::Error;
use crate::middleware::BoxFuture;
use crate::util::append_query_pairs;

const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 8;

/// One HTTP exchange against a populated [`Context`].
///
/// The adapter reads `ctx.req` and, on success, fills `ctx.res` with the
/// status, headers, body and (unless `opts["time"]` is `false`) the
/// elapsed wall time. A socket timeout rejects with [`Error::Timeout`];
/// any other transport failure rejects with [`Error::Transport`].
///
/// Adapters are shared across concurrent calls and must not keep per-call
/// state outside the Context.
pub trait Transport: Send + Sync {
    fn execute<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, crate::Result<()>>;
}

/// Default transport: a pooled hyper client over plain HTTP.
///
/// TLS, proxying and connection tuning are deliberately left to
/// replacement adapters; the pipeline only depends on the [`Transport`]
/// contract.
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient<HttpConnector, Full<bytes::Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        let client = HyperClient::builder(TokioExecutor::new())
            .pool_idle_timeout(DEFAULT_POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(DEFAULT_POOL_MAX_IDLE_PER_HOST)
            .build_http();
        Self { client }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    fn execute<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, crate::Result<()>> {
        Box::pin(async move {
            let method = ctx.req.method.clone();
            let url = append_query_pairs(&ctx.req.url, &ctx.req.query_pairs);
            let uri: http::Uri = url
                .parse()
                .map_err(|_| Error::InvalidUrl { url: url.clone() })?;

            let mut request = HttpRequest::builder().method(method.clone()).uri(uri);
            if let Some(headers) = request.headers_mut() {
                *headers = ctx.req.headers.clone();
            }
            let request = request
                .body(Full::new(ctx.req.body.to_wire_bytes()))
                .map_err(|source| Error::Transport {
                    method: method.clone(),
                    url: url.clone(),
                    source: Box::new(source),
                })?;

            let capture_elapsed = ctx.time_enabled();
            let started_at = Instant::now();
            let exchange = async {
                let response =
                    self.client
                        .request(request)
                        .await
                        .map_err(|source| Error::Transport {
                            method: method.clone(),
                            url: url.clone(),
                            source: Box::new(source),
                        })?;
                let (parts, body) = response.into_parts();
                let body = body
                    .collect()
                    .await
                    .map_err(|source| Error::Transport {
                        method: method.clone(),
                        url: url.clone(),
                        source: Box::new(source),
                    })?
                    .to_bytes();
                Ok::<_, Error>((parts.status, parts.headers, body))
            };
            // The socket timeout covers the whole exchange, response body
            // included.
            let (status, headers, body) = match ctx.req.timeout {
                Some(limit) => timeout(limit, exchange).await.map_err(|_| Error::Timeout {
                    method: method.clone(),
                    url: url.clone(),
                })??,
                None => exchange.await?,
            };

            ctx.res = Some(ResponseParts {
                status,
                headers,
                body: if body.is_empty() {
                    Body::Empty
                } else {
                    Body::Bytes(body)
                },
                elapsed: capture_elapsed.then(|| started_at.elapsed()),
            });
            Ok(())
        })
    }
}
