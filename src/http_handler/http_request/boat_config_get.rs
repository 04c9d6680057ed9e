use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use crate::http_handler::http_response::boat_config::BoatConfigResponse;

/// One-time fetch of the declared boat hardware from the rudder backend.
/// The client must carry the boat's bearer token.
#[derive(Debug)]
pub struct BoatConfigRequest {}

impl NoBodyHTTPRequestType for BoatConfigRequest {}

impl HTTPRequestType for BoatConfigRequest {
    type Response = BoatConfigResponse;

    fn endpoint(&self) -> &'static str { "/boat/v1/" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
}
