use super::http_request::request_common::RequestError;
use super::http_response::response_common::ResponseError;
use strum_macros::Display;

#[derive(Debug, Display)]
pub enum HTTPError {
    HTTPRequestError(RequestError),
    HTTPResponseError(ResponseError),
}

impl std::error::Error for HTTPError {}

impl HTTPError {
    /// Whether this error means the remote side is unreachable, as opposed
    /// to reachable-but-unhappy. Connectivity watchdogs neutralize on this,
    /// and only on this.
    pub fn is_connection_loss(&self) -> bool {
        matches!(
            self,
            HTTPError::HTTPRequestError(RequestError::Timeout | RequestError::NoConnection)
                | HTTPError::HTTPResponseError(ResponseError::NoConnection)
        )
    }
}

impl From<RequestError> for HTTPError {
    fn from(value: RequestError) -> Self { HTTPError::HTTPRequestError(value) }
}

impl From<ResponseError> for HTTPError {
    fn from(value: ResponseError) -> Self { HTTPError::HTTPResponseError(value) }
}
