use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{error, info, warn, Instrument, Span};

use super::method_path::{response_grpc_status, GrpcMethodPath, IgnoredPaths};

/// Tower layer that logs one line per gRPC call
#[derive(Clone, Default)]
pub struct GrpcLoggingLayer {
    ignored: IgnoredPaths,
}

impl GrpcLoggingLayer {
    pub fn new(ignored: IgnoredPaths) -> Self {
        Self { ignored }
    }
}

impl<S> Layer<S> for GrpcLoggingLayer {
    type Service = GrpcLoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        GrpcLoggingService {
            inner: service,
            ignored: self.ignored.clone(),
        }
    }
}

#[derive(Clone)]
pub struct GrpcLoggingService<S> {
    inner: S,
    ignored: IgnoredPaths,
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for GrpcLoggingService<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>>,
    S::Error: std::fmt::Display,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<ReqBody>) -> Self::Future {
        let path = GrpcMethodPath::of(&req);
        let should_ignore = self.ignored.matches(&path);
        let start = Instant::now();
        let future = self.inner.call(req);

        // Keep log lines correlated with the enclosing request span
        let span = Span::current();

        Box::pin(
            async move {
                let result = future.await;

                if should_ignore {
                    return result;
                }

                let method = path.method();
                let duration_ms = start.elapsed().as_millis();

                match &result {
                    Ok(response) => {
                        let grpc_status = response_grpc_status(response);

                        if grpc_status == 0 {
                            info!(
                                path = %path.as_str(),
                                method = %method,
                                grpc_status = %grpc_status,
                                duration_ms = %duration_ms,
                                "{} completed in {}ms",
                                method,
                                duration_ms
                            );
                        } else {
                            warn!(
                                path = %path.as_str(),
                                method = %method,
                                grpc_status = %grpc_status,
                                duration_ms = %duration_ms,
                                "{} failed in {}ms with gRPC status {}",
                                method,
                                duration_ms,
                                grpc_status
                            );
                        }
                    }
                    Err(e) => {
                        error!(
                            path = %path.as_str(),
                            method = %method,
                            duration_ms = %duration_ms,
                            error = %e,
                            "{} transport error after {}ms: {}",
                            method,
                            duration_ms,
                            e
                        );
                    }
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
    struct Unauthenticated;

    impl Service<http::Request<()>> for Unauthenticated {
        type Response = http::Response<()>;
        type Error = Infallible;
        type Future = Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: http::Request<()>) -> Self::Future {
            let response = http::Response::builder()
                .header("grpc-status", "16")
                .body(())
                .unwrap();
            ready(Ok(response))
        }
    }

    #[tokio::test]
    async fn test_logged_call_passes_response_through() {
        let mut service = GrpcLoggingLayer::default().layer(Unauthenticated);
        let request = http::Request::builder()
            .uri("http://localhost/meter_reading.v1.MeterReadingService/AddReadingBatch")
            .body(())
            .unwrap();

        let response = service.call(request).await.unwrap();
        assert_eq!(response_grpc_status(&response), 16);
    }
}
