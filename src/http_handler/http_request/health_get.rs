use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use crate::http_handler::http_response::health::HealthResponse;
use std::time::Duration;

/// Connectivity probe against the rudder service. Anything but a timely
/// answer counts as loss of operator contact, so the timeout is tight.
#[derive(Debug)]
pub struct HealthRequest {}

impl HealthRequest {
    const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
}

impl NoBodyHTTPRequestType for HealthRequest {}

impl HTTPRequestType for HealthRequest {
    type Response = HealthResponse;

    fn endpoint(&self) -> &'static str { "/" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
    fn timeout(&self) -> Option<Duration> { Some(Self::PROBE_TIMEOUT) }
}
