use super::response_common::{HTTPResponseType, ResponseError};

/// Probe answer from the rudder service. The body is irrelevant, a 2xx in
/// time is the entire signal.
#[derive(Debug)]
pub struct HealthResponse {}

impl HTTPResponseType for HealthResponse {
    type ParsedResponseType = HealthResponse;

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        Self::unwrap_return_code(response).await?;
        Ok(HealthResponse {})
    }
}
