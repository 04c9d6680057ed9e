use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use crate::http_handler::http_response::wind::WindDataResponse;

/// Current-weather lookup at the boat's position against the wind data
/// provider. The provider authenticates via an api key query parameter.
#[derive(Debug)]
pub struct WindDataRequest {
    pub lat: f64,
    pub lon: f64,
    pub api_key: String,
}

impl NoBodyHTTPRequestType for WindDataRequest {}

impl HTTPRequestType for WindDataRequest {
    type Response = WindDataResponse;

    fn endpoint(&self) -> &'static str { "/data/2.5/weather" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("lat", self.lat.to_string()),
            ("lon", self.lon.to_string()),
            ("appid", self.api_key.clone()),
        ]
    }
}
