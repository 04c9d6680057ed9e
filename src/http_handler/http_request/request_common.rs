use crate::http_handler::HTTPError;
use crate::http_handler::http_client::HTTPClient;
use crate::http_handler::http_response::response_common::HTTPResponseType;
use std::time::Duration;
use strum_macros::Display;

#[derive(Debug, Copy, Clone)]
pub enum HTTPRequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Display)]
pub enum RequestError {
    Timeout,
    NoConnection,
    FailedRequest(String),
}

impl std::error::Error for RequestError {}

impl From<reqwest::Error> for RequestError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            RequestError::Timeout
        } else if value.is_connect() {
            RequestError::NoConnection
        } else {
            RequestError::FailedRequest(value.to_string())
        }
    }
}

pub trait HTTPRequestType {
    type Response: HTTPResponseType;

    fn endpoint(&self) -> &str;
    fn request_method(&self) -> HTTPRequestMethod;
    fn header_params(&self) -> reqwest::header::HeaderMap {
        reqwest::header::HeaderMap::default()
    }
    fn query_params(&self) -> Vec<(&'static str, String)> { Vec::new() }
    /// Per-request timeout override; `None` keeps the client default.
    fn timeout(&self) -> Option<Duration> { None }

    fn prepare(&self, client: &HTTPClient) -> reqwest::RequestBuilder {
        let mut builder = client
            .request_builder(self.request_method(), self.endpoint())
            .headers(self.header_params());
        let query = self.query_params();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        builder
    }
}

pub trait NoBodyHTTPRequestType: HTTPRequestType {
    async fn send_request(
        &self,
        client: &HTTPClient,
    ) -> Result<<Self::Response as HTTPResponseType>::ParsedResponseType, HTTPError> {
        let response = self.prepare(client).send().await.map_err(RequestError::from)?;
        Ok(Self::Response::read_response(response).await?)
    }
}

pub trait JSONBodyHTTPRequestType: HTTPRequestType {
    type Body: serde::Serialize;

    fn body(&self) -> &Self::Body;

    async fn send_request(
        &self,
        client: &HTTPClient,
    ) -> Result<<Self::Response as HTTPResponseType>::ParsedResponseType, HTTPError> {
        let response = self
            .prepare(client)
            .json(self.body())
            .send()
            .await
            .map_err(RequestError::from)?;
        Ok(Self::Response::read_response(response).await?)
    }
}
