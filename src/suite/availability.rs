//! Concurrent availability sweep over the endpoint catalog.
//!
//! "Available" means the route exists on the server: 200 is an answer, and
//! 404/405 count too since many routes only accept POST or require a body.
//! Only a transport failure marks an endpoint unavailable, and that failure
//! is reported per element, never for the batch.

use std::sync::Arc;

use crate::domain::HttpMethod;
use crate::engine::{run_fan_out, FanOutBatch, HttpClient, RequestTracker};
use crate::logging::StructuredLogger;

#[derive(Debug, Clone)]
pub struct EndpointAvailability {
    pub name: String,
    pub path: String,
    pub available: bool,
    pub status: u16,
}

/// A status code that proves the route is mounted.
pub fn indicates_available(status: u16) -> bool {
    matches!(status, 200 | 404 | 405)
}

/// Probe every endpoint concurrently. Each probe gets its own tracker, so
/// the structured log carries one record per endpoint regardless of outcome.
pub async fn sweep_endpoints(
    client: Arc<HttpClient>,
    logger: Arc<StructuredLogger>,
    endpoints: Vec<(String, String)>,
) -> FanOutBatch<EndpointAvailability> {
    run_fan_out(endpoints, move |_, (name, path)| {
        let client = client.clone();
        let logger = logger.clone();
        async move {
            let mut tracker = RequestTracker::new(
                logger,
                format!("Endpoint Sweep: {name}"),
                path.clone(),
                HttpMethod::Get,
            );
            match client.get(&path).await {
                Ok(response) => {
                    tracker.set_response(&response);
                    Ok(EndpointAvailability {
                        name,
                        path,
                        available: indicates_available(response.status),
                        status: response.status,
                    })
                }
                Err(err) => {
                    tracker.set_error(err.to_string());
                    Err(err)
                }
            }
        }
    })
    .await
}
