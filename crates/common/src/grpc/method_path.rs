use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Full gRPC method path of the current call, e.g.
/// `/meter_reading.v1.MeterReadingService/CreateToken`.
///
/// Recorded into request extensions by [`GrpcMethodPathLayer`] so that the
/// tracing and logging layers and interceptors, which only see metadata and
/// extensions, can tell calls apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrpcMethodPath(pub String);

impl GrpcMethodPath {
    /// Path recorded by [`GrpcMethodPathLayer`], or the request URI when the layer is absent
    pub fn of<B>(req: &http::Request<B>) -> Self {
        req.extensions()
            .get::<GrpcMethodPath>()
            .cloned()
            .unwrap_or_else(|| GrpcMethodPath(req.uri().path().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `CreateToken` for `/meter_reading.v1.MeterReadingService/CreateToken`
    pub fn method(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// `MeterReadingService` for `/meter_reading.v1.MeterReadingService/CreateToken`
    pub fn service(&self) -> &str {
        let mut parts = self.0.trim_start_matches('/').split('/');
        match (parts.next(), parts.next()) {
            (Some(service), Some(_)) => service.rsplit('.').next().unwrap_or(service),
            _ => &self.0,
        }
    }
}

/// Path prefixes the logging and tracing layers stay silent for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredPaths(Vec<String>);

impl Default for IgnoredPaths {
    fn default() -> Self {
        Self(vec!["/grpc.reflection.".to_string()])
    }
}

impl IgnoredPaths {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self(prefixes)
    }

    /// Parse `"/grpc.reflection.,/grpc.health.v1.Health/"`; blanks are skipped
    pub fn from_comma_separated(value: &str) -> Self {
        Self(
            value
                .split(',')
                .map(str::trim)
                .filter(|prefix| !prefix.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn matches(&self, path: &GrpcMethodPath) -> bool {
        self.0.iter().any(|prefix| path.as_str().starts_with(prefix))
    }
}

/// gRPC status carried in the response headers, 0 (OK) when absent.
///
/// Only trailers-only responses put `grpc-status` in the headers; a streamed
/// response reports its status in trailers that tower layers never see.
pub fn response_grpc_status<B>(response: &http::Response<B>) -> i32 {
    response
        .headers()
        .get("grpc-status")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Tower layer that records the request path as a [`GrpcMethodPath`] extension
#[derive(Clone, Default)]
pub struct GrpcMethodPathLayer;

impl GrpcMethodPathLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for GrpcMethodPathLayer {
    type Service = GrpcMethodPathService<S>;

    fn layer(&self, service: S) -> Self::Service {
        GrpcMethodPathService { inner: service }
    }
}

#[derive(Clone)]
pub struct GrpcMethodPathService<S> {
    inner: S,
}

impl<S, ReqBody> Service<http::Request<ReqBody>> for GrpcMethodPathService<S>
where
    S: Service<http::Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<ReqBody>) -> Self::Future {
        let path = GrpcMethodPath(req.uri().path().to_string());
        req.extensions_mut().insert(path);
        self.inner.call(req)
    }
}
