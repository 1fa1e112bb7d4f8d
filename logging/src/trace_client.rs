use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use std::time::Instant;
use tracing::{debug, warn};

struct TraceRequests;

#[async_trait::async_trait]
impl Middleware for TraceRequests {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let url = req.url().clone();
        let started = Instant::now();
        let result = next.run(req, extensions).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), elapsed_ms, "outbound request");
            }
            Err(error) => {
                warn!(%method, %url, %error, elapsed_ms, "outbound request failed");
            }
        }
        result
    }
}

/// Builds the HTTP client used for provider calls, with request tracing
/// attached.
pub fn new_client() -> ClientWithMiddleware {
    ClientBuilder::new(reqwest::Client::new())
        .with(TraceRequests)
        .build()
}
