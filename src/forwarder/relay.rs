//! Upstream request construction and response relay.
//!
//! Per request:
//! ```text
//! parse Referer → resolve path → build request → copy request headers
//!     → execute → copy response headers → status → stream body
//! ```
//! No retries. The response body is streamed chunk by chunk and the
//! upstream connection is released when the body is dropped.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, Response, Uri},
};
use futures_util::TryStreamExt;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{MissingRefererPolicy, UpstreamConfig};
use crate::error::{ForwardError, UpstreamAddrError};
use crate::forwarder::headers::copy_headers;
use crate::forwarder::path::resolve_path;
use crate::forwarder::upstream::UpstreamAddr;

/// Forwards requests to a single fixed upstream.
///
/// Immutable after construction and cheap to share: the inner client pools
/// connections and is safe for concurrent use.
#[derive(Clone)]
pub struct Forwarder {
    upstream: UpstreamAddr,
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    forward_body: bool,
    missing_referer: MissingRefererPolicy,
}

impl Forwarder {
    /// Create a forwarder for `upstream` with default settings.
    pub fn new(upstream: &str) -> Result<Self, UpstreamAddrError> {
        Self::from_config(&UpstreamConfig {
            address: upstream.to_string(),
            ..UpstreamConfig::default()
        })
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamAddrError> {
        let upstream = UpstreamAddr::parse(&config.address)?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            upstream,
            client,
            timeout: Duration::from_secs(config.timeout_secs),
            forward_body: config.forward_body,
            missing_referer: config.missing_referer,
        })
    }

    pub fn upstream(&self) -> &UpstreamAddr {
        &self.upstream
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `http://<upstream><resolved_path>`
    pub fn upstream_uri(&self, resolved_path: &str) -> Result<Uri, ForwardError> {
        let uri = format!("http://{}{}", self.upstream, resolved_path);
        Uri::try_from(uri.as_str()).map_err(|source| ForwardError::InvalidUpstreamUri { uri, source })
    }

    /// Build the outbound request for an inbound one.
    ///
    /// Only method, URI and filtered headers carry over. The inbound body is
    /// dropped unless body forwarding is enabled. The query string is not
    /// forwarded.
    pub fn build_request(&self, request: Request<Body>) -> Result<Request<Body>, ForwardError> {
        let (parts, body) = request.into_parts();

        let referer = parts
            .headers
            .get(header::REFERER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .filter(|v| !v.is_empty());
        let resolved = resolve_path(referer.as_deref(), parts.uri.path(), self.missing_referer)?;
        let uri = self.upstream_uri(&resolved)?;

        let mut builder = Request::builder().method(parts.method).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            copy_headers(&parts.headers, headers);
            // Host comes from the upstream authority.
            headers.remove(header::HOST);
            headers.remove(header::TRANSFER_ENCODING);
            if !self.forward_body {
                headers.remove(header::CONTENT_LENGTH);
            }
        }

        let body = if self.forward_body { body } else { Body::empty() };
        Ok(builder.body(body)?)
    }

    /// Forward `request` upstream and relay the response.
    pub async fn forward(
        &self,
        request: Request<Body>,
        remote_addr: Option<SocketAddr>,
    ) -> Result<Response<Body>, ForwardError> {
        let outbound = self.build_request(request)?;
        let remote = remote_addr.map_or_else(|| "-".to_string(), |a| a.to_string());

        tracing::info!(
            remote_addr = %remote,
            method = %outbound.method(),
            upstream_url = %outbound.uri(),
            "Forwarding request"
        );

        let response = tokio::time::timeout(self.timeout, self.client.request(outbound))
            .await
            .map_err(|_| ForwardError::UpstreamTimeout(self.timeout))??;

        Ok(relay_response(response))
    }
}

/// Turn an upstream response into the client response.
///
/// Status is copied, headers go through the copy policy and the body is
/// streamed. A failure mid-body is logged; status and headers are already
/// on the wire by then.
pub fn relay_response(upstream: Response<Incoming>) -> Response<Body> {
    let (parts, body) = upstream.into_parts();
    let status = parts.status;

    let stream = Body::new(body).into_data_stream().inspect_err(move |e| {
        tracing::warn!(error = %e, status = %status, "Upstream body stream failed");
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    copy_headers(&parts.headers, response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Method};

    fn forwarder(upstream: &str) -> Forwarder {
        Forwarder::new(upstream).unwrap()
    }

    fn inbound(path: &str, referer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(referer) = referer {
            builder = builder.header(header::REFERER, referer);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_independent_instances() {
        let a = forwarder("10.0.0.5");
        let b = forwarder("10.0.0.6:8080");
        assert_eq!(a.upstream().as_str(), "10.0.0.5:80");
        assert_eq!(b.upstream().as_str(), "10.0.0.6:8080");
        assert_eq!(a.timeout(), Duration::from_secs(3600));
    }

    #[test]
    fn test_new_rejects_bad_address() {
        assert!(Forwarder::new("::1").is_err());
    }

    #[tokio::test]
    async fn test_build_request_directory_referer() {
        let f = forwarder("10.0.0.5");
        let req = f
            .build_request(inbound("/img/logo.png", Some("http://site/gallery/")))
            .unwrap();
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.uri(), "http://10.0.0.5:80/img/logo.png");
    }

    #[tokio::test]
    async fn test_build_request_concatenates_and_drops_query() {
        let f = forwarder("10.0.0.5:81");
        let req = f
            .build_request(inbound("/b.js?v=3", Some("http://site/a")))
            .unwrap();
        assert_eq!(req.uri(), "http://10.0.0.5:81/a/b.js");
    }

    #[tokio::test]
    async fn test_build_request_filters_headers() {
        let f = forwarder("10.0.0.5");
        let mut req = inbound("/x", Some("http://site/"));
        let headers = req.headers_mut();
        headers.insert(header::HOST, HeaderValue::from_static("proxy.local"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("4"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("test"));

        let out = f.build_request(req).unwrap();
        let headers = out.headers();
        assert!(headers.get(header::HOST).is_none());
        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get(header::ACCEPT_ENCODING).is_none());
        assert!(headers.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(headers.get(header::USER_AGENT).unwrap(), "test");
        assert_eq!(headers.get(header::REFERER).unwrap(), "http://site/");
    }

    #[tokio::test]
    async fn test_build_request_keeps_content_length_when_forwarding_body() {
        let f = Forwarder::from_config(&UpstreamConfig {
            address: "10.0.0.5".into(),
            forward_body: true,
            ..UpstreamConfig::default()
        })
        .unwrap();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/submit")
            .header(header::REFERER, "http://site/")
            .header(header::CONTENT_LENGTH, "4")
            .body(Body::from("data"))
            .unwrap();

        let out = f.build_request(req).unwrap();
        assert_eq!(out.method(), Method::POST);
        assert_eq!(out.headers().get(header::CONTENT_LENGTH).unwrap(), "4");
        let body = axum::body::to_bytes(out.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"data");
    }

    #[tokio::test]
    async fn test_build_request_drops_body_by_default() {
        let f = forwarder("10.0.0.5");
        let req = Request::builder()
            .method(Method::POST)
            .uri("/submit")
            .header(header::REFERER, "http://site/")
            .body(Body::from("data"))
            .unwrap();

        let out = f.build_request(req).unwrap();
        let body = axum::body::to_bytes(out.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_build_request_referer_errors() {
        let f = forwarder("10.0.0.5");
        assert!(matches!(
            f.build_request(inbound("/x", None)),
            Err(ForwardError::MissingReferer)
        ));
        assert!(matches!(
            f.build_request(inbound("/x", Some(""))),
            Err(ForwardError::MissingReferer)
        ));
        assert!(matches!(
            f.build_request(inbound("/x", Some("garbage"))),
            Err(ForwardError::RefererWithoutPath(_))
        ));
    }

    #[tokio::test]
    async fn test_build_request_keeps_raw_referer_path() {
        let f = forwarder("10.0.0.5");
        let req = f
            .build_request(inbound("/s.css", Some("http://site/app/./page")))
            .unwrap();
        assert_eq!(req.uri(), "http://10.0.0.5:80/app/./page/s.css");

        let req = f.build_request(inbound("/s.css", Some("/app/page"))).unwrap();
        assert_eq!(req.uri(), "http://10.0.0.5:80/app/page/s.css");
    }

    #[tokio::test]
    async fn test_forward_unreachable_upstream() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let f = forwarder(&addr.to_string());
        let err = f
            .forward(inbound("/x", Some("http://site/")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ForwardError::Upstream(_)));
    }
}
