use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::{Request, Response};
use opentelemetry::{global, propagation::Extractor, trace::TraceContextExt as _};
use tower::{Layer, Service};
use tracing::{field, info_span, Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::method_path::{response_grpc_status, GrpcMethodPath, IgnoredPaths};

/// Tower layer opening one span per gRPC call.
///
/// The span continues any W3C trace context sent by the caller, follows the
/// `rpc.*` semantic conventions and gets the final gRPC status on completion.
#[derive(Clone, Default)]
pub struct GrpcTracingLayer {
    ignored: IgnoredPaths,
}

impl GrpcTracingLayer {
    pub fn new(ignored: IgnoredPaths) -> Self {
        Self { ignored }
    }
}

impl<S> Layer<S> for GrpcTracingLayer {
    type Service = GrpcTracingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        GrpcTracingService {
            inner: service,
            ignored: self.ignored.clone(),
        }
    }
}

#[derive(Clone)]
pub struct GrpcTracingService<S> {
    inner: S,
    ignored: IgnoredPaths,
}

struct HeaderExtractor<'a>(&'a http::HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

fn call_span<B>(req: &Request<B>, path: &GrpcMethodPath) -> Span {
    let span = info_span!(
        target: "grpc",
        "grpc_request",
        otel.name = %path.method(),
        rpc.system = "grpc",
        rpc.service = %path.service(),
        rpc.method = %path.method(),
        rpc.grpc.status_code = field::Empty,
        otel.status_code = field::Empty,
        trace_id = field::Empty,
        span_id = field::Empty,
    );

    let parent = global::get_text_map_propagator(|propagator| {
        propagator.extract(&HeaderExtractor(req.headers()))
    });
    span.set_parent(parent);

    let span_context = span.context().span().span_context().clone();
    if span_context.is_valid() {
        span.record("trace_id", span_context.trace_id().to_string());
        span.record("span_id", span_context.span_id().to_string());
    }

    span
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for GrpcTracingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let path = GrpcMethodPath::of(&req);
        if self.ignored.matches(&path) {
            return Box::pin(self.inner.call(req));
        }

        let span = call_span(&req, &path);

        // The service in `self` is the one poll_ready was called on
        let ready = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, ready);

        Box::pin(
            async move {
                let result = inner.call(req).await;

                let status = match &result {
                    Ok(response) => response_grpc_status(response),
                    Err(_) => tonic::Code::Unknown as i32,
                };
                let span = Span::current();
                span.record("rpc.grpc.status_code", status);
                if status != tonic::Code::Ok as i32 {
                    span.record("otel.status_code", "ERROR");
                }

                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::future::{ready, Ready};

    #[derive(Clone)]
    struct Status(&'static str);

    impl Service<Request<()>> for Status {
        type Response = Response<()>;
        type Error = Infallible;
        type Future = Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: Request<()>) -> Self::Future {
            let response = Response::builder()
                .header("grpc-status", self.0)
                .body(())
                .unwrap();
            ready(Ok(response))
        }
    }

    fn request(path: &str) -> Request<()> {
        Request::builder()
            .uri(format!("http://localhost{}", path))
            .body(())
            .unwrap()
    }

    #[tokio::test]
    async fn test_traced_call_passes_response_through() {
        let mut service = GrpcTracingLayer::default().layer(Status("11"));
        let response = service
            .call(request("/meter_reading.v1.MeterReadingService/AddReadingBatch"))
            .await
            .unwrap();

        assert_eq!(response_grpc_status(&response), 11);
    }

    #[tokio::test]
    async fn test_ignored_call_passes_response_through() {
        let mut service = GrpcTracingLayer::default().layer(Status("0"));
        let response = service
            .call(request("/grpc.reflection.v1.ServerReflection/ServerReflectionInfo"))
            .await
            .unwrap();

        assert_eq!(response_grpc_status(&response), 0);
    }
}
