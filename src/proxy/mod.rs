// Proxy module - Pingora ProxyHttp implementation
//
// Every request is answered inside request_filter; nothing is proxied through
// Pingora's upstream machinery. Origin fetches happen in the pipeline.

use async_trait::async_trait;
use bytes::Bytes;
use pingora_core::upstreams::peer::HttpPeer;
use pingora_core::Result;
use pingora_http::ResponseHeader;
use pingora_proxy::{ProxyHttp, Session};
use std::sync::Arc;
use std::time::Instant;

use crate::background::TokioBackground;
use crate::cache::{build_cache, ResponseCache};
use crate::config::Config;
use crate::metrics::Metrics;
use crate::origin::{HttpOrigin, Origin};
use crate::pipeline::{Dispatcher, ImageResponse, RequestContext};

pub mod helpers;
pub mod special_endpoints;

use special_endpoints::{handle_health, handle_metrics, BuiltinEndpoint, EndpointResponse};

/// KasasagiProxy implements the Pingora ProxyHttp trait
pub struct KasasagiProxy {
    config: Arc<Config>,
    dispatcher: Dispatcher,
    metrics: Arc<Metrics>,
    background: TokioBackground,
    cache_backend: &'static str,
    /// Proxy start time (for uptime in the health endpoint)
    start_time: Instant,
}

impl KasasagiProxy {
    /// Create a proxy with the configured cache backend and an HTTP origin
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let cache = build_cache(&config.cache)?;
        let origin = Arc::new(HttpOrigin::new(&config.origin)?);
        Self::with_components(config, cache, origin)
    }

    /// Create a proxy around explicit cache and origin implementations
    pub fn with_components(
        config: Config,
        cache: Arc<dyn ResponseCache>,
        origin: Arc<dyn Origin>,
    ) -> anyhow::Result<Self> {
        let metrics = Arc::new(
            Metrics::new().map_err(|e| anyhow::anyhow!("failed to register metrics: {}", e))?,
        );
        let background = TokioBackground::new();
        let cache_backend = cache.name();
        let dispatcher = Dispatcher::new(
            &config,
            cache,
            origin,
            Arc::new(background.clone()),
            metrics.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            dispatcher,
            metrics,
            background,
            cache_backend,
            start_time: Instant::now(),
        })
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Executor holding detached cache stores; drain it before shutdown
    pub fn background(&self) -> &TokioBackground {
        &self.background
    }

    async fn write_endpoint_response(
        session: &mut Session,
        response: EndpointResponse,
        request_id: &str,
    ) -> Result<()> {
        let mut header = ResponseHeader::build(response.status, Some(3))?;
        header.insert_header("Content-Type", response.content_type)?;
        header.insert_header("Content-Length", response.body.len().to_string())?;
        header.insert_header("X-Request-ID", request_id.to_string())?;

        session
            .write_response_header(Box::new(header), false)
            .await?;
        session
            .write_response_body(Some(response.body.into()), true)
            .await?;
        Ok(())
    }

    async fn write_image_response(
        session: &mut Session,
        response: ImageResponse,
        request_id: &str,
    ) -> Result<()> {
        let mut header = ResponseHeader::build(response.status, Some(response.headers.len() + 2))?;
        for (name, value) in response.headers {
            // One bad origin header should not cost the whole response
            if let Err(e) = header.append_header(name.clone(), value) {
                tracing::warn!(
                    request_id = %request_id,
                    header = %name,
                    error = %e,
                    "Dropping invalid response header"
                );
            }
        }
        header.insert_header("Content-Length", response.body.len().to_string())?;
        header.insert_header("X-Request-ID", request_id.to_string())?;

        let body: Bytes = response.body;
        session
            .write_response_header(Box::new(header), false)
            .await?;
        session.write_response_body(Some(body), true).await?;
        Ok(())
    }
}

#[async_trait]
impl ProxyHttp for KasasagiProxy {
    type CTX = RequestContext;

    fn new_ctx(&self) -> Self::CTX {
        RequestContext::new(String::new(), String::new())
    }

    /// Never reached: request_filter answers every request
    async fn upstream_peer(
        &self,
        _session: &mut Session,
        ctx: &mut Self::CTX,
    ) -> Result<Box<HttpPeer>> {
        tracing::error!(
            request_id = %ctx.request_id(),
            "upstream_peer reached; request was not answered in request_filter"
        );
        Err(pingora_core::Error::explain(
            pingora_core::ErrorType::InternalError,
            "kasasagi answers every request in request_filter",
        ))
    }

    async fn request_filter(&self, session: &mut Session, ctx: &mut Self::CTX) -> Result<bool> {
        let req = session.req_header();
        let method = req.method.as_str().to_string();
        let path = req.uri.path().to_string();
        ctx.set_request(&method, &path);

        if let Some(endpoint) = BuiltinEndpoint::route(&self.config.server, &method, &path) {
            let response = match endpoint {
                BuiltinEndpoint::Health => handle_health(self.start_time, self.cache_backend),
                BuiltinEndpoint::Metrics => {
                    self.metrics
                        .set_background_in_flight(self.background.in_flight());
                    handle_metrics(&self.metrics)
                }
            };
            Self::write_endpoint_response(session, response, ctx.request_id()).await?;
            return Ok(true);
        }

        let image_request = helpers::image_request(session.req_header());
        let response = self
            .dispatcher
            .handle(&image_request, ctx.request_id())
            .await;
        ctx.set_cache_status(response.cache_status);

        Self::write_image_response(session, response, ctx.request_id()).await?;
        Ok(true)
    }

    /// Record metrics and emit one access log line per request
    async fn logging(
        &self,
        session: &mut Session,
        _e: Option<&pingora_core::Error>,
        ctx: &mut Self::CTX,
    ) {
        let status_code = session
            .response_written()
            .map(|resp| resp.status.as_u16())
            .unwrap_or(500);
        let duration_secs = ctx.elapsed_secs();
        let cache_status = ctx.cache_status().as_str();

        self.metrics
            .record_request(ctx.method(), status_code, cache_status, duration_secs);
        self.metrics
            .set_background_in_flight(self.background.in_flight());

        tracing::info!(
            request_id = %ctx.request_id(),
            client_ip = %helpers::get_client_ip(session),
            method = %ctx.method(),
            path = %ctx.path(),
            status_code = status_code,
            cache = cache_status,
            duration_ms = duration_secs * 1000.0,
            "Request completed"
        );
    }
}
