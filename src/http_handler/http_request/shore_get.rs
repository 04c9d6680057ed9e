use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use crate::http_handler::http_response::shore::ShoreDataResponse;

/// Shoreline metadata lookup around the boat's position. The `alternate`
/// flag selects between the provider's two data partitions; its effect is
/// owned entirely by the provider.
#[derive(Debug)]
pub struct ShoreDataRequest {
    pub lat: f64,
    pub lng: f64,
    pub heading: f64,
    pub alternate: bool,
    pub api_key: String,
}

impl NoBodyHTTPRequestType for ShoreDataRequest {}

impl HTTPRequestType for ShoreDataRequest {
    type Response = ShoreDataResponse;

    fn endpoint(&self) -> &'static str { "/api/v1/shoreline" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("lat", self.lat.to_string()),
            ("lng", self.lng.to_string()),
            ("heading", self.heading.to_string()),
            ("alternate", self.alternate.to_string()),
            ("access_token", self.api_key.clone()),
        ]
    }
}
