//! Request/response exchange with the remote service.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// Errors raised while exchanging a request with the remote.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed")]
    Request(#[from] reqwest::Error),
}

/// A raw response: HTTP status code and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub const OK: u16 = 200;

    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Only `200 OK` counts as success.
    pub fn is_ok(&self) -> bool {
        self.status == Self::OK
    }
}

/// One synchronous exchange per call, no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body.
    async fn post_json(&self, url: &Url, body: Vec<u8>) -> Result<Response, TransportError>;

    async fn get(&self, url: &Url) -> Result<Response, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn post_json(&self, url: &Url, body: Vec<u8>) -> Result<Response, TransportError> {
        (**self).post_json(url, body).await
    }

    async fn get(&self, url: &Url) -> Result<Response, TransportError> {
        (**self).get(url).await
    }
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &Url, body: Vec<u8>) -> Result<Response, TransportError> {
        let res = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        read(res).await
    }

    async fn get(&self, url: &Url) -> Result<Response, TransportError> {
        let res = self.client.get(url.clone()).send().await?;
        read(res).await
    }
}

async fn read(res: reqwest::Response) -> Result<Response, TransportError> {
    let status = res.status().as_u16();
    let body = res.bytes().await?;
    Ok(Response::new(status, body.to_vec()))
}
