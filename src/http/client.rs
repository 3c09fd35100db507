//! Thin wrapper over `reqwest` for the two requests a transfer needs.

use anyhow::{Context, Result};
use log::debug;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Response};
use std::time::Duration;

use super::status::check_status;

const USER_AGENT: &str = concat!("terapkg/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client with the given connect and whole-request timeouts.
    pub fn with_timeouts(connect_timeout: Duration, read_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }

    /// Sends a HEAD request and returns the advertised `Content-Length`.
    ///
    /// The header is read directly: a HEAD response has no body to size.
    #[tracing::instrument(skip(self))]
    pub async fn content_length(&self, url: &str) -> Result<Option<u64>> {
        debug!("HEAD {}", url);

        let response = self
            .client
            .head(url)
            .send()
            .await
            .context("Failed to send HEAD request")?;
        let response = response.error_for_status().map_err(check_status)?;

        let length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        debug!("HEAD {} -> content length {:?}", url, length);
        Ok(length)
    }

    /// Starts a GET request, failing on error statuses. The body is left
    /// unread for the caller to stream with [`Response::chunk`].
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to start download request")?;

        response.error_for_status().map_err(check_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusError;

    #[tokio::test]
    async fn test_content_length_from_head() {
        let mut server = mockito::Server::new_async().await;
        let body = vec![7u8; 1000];

        let mock = server
            .mock("HEAD", "/game.zip")
            .with_status(200)
            .with_body(&body)
            .with_header("content-length", &body.len().to_string())
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let length = client
            .content_length(&format!("{}/game.zip", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(length, Some(1000));
    }

    #[tokio::test]
    async fn test_content_length_not_found() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("HEAD", "/game.zip")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let err = client
            .content_length(&format!("{}/game.zip", server.url()))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(
            err.downcast_ref::<StatusError>(),
            Some(StatusError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_streams_body() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/game.zip")
            .with_status(200)
            .with_body("test content")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let mut response = client
            .get(&format!("{}/game.zip", server.url()))
            .await
            .unwrap();

        let mut received = Vec::new();
        while let Some(chunk) = response.chunk().await.unwrap() {
            received.extend_from_slice(&chunk);
        }

        mock.assert_async().await;
        assert_eq!(received, b"test content");
    }

    #[tokio::test]
    async fn test_get_server_error() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/game.zip")
            .with_status(503)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let err = client
            .get(&format!("{}/game.zip", server.url()))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(
            err.downcast_ref::<StatusError>(),
            Some(StatusError::ServerError(503))
        ));
    }

    #[test]
    fn test_with_timeouts_builds() {
        let client = HttpClient::with_timeouts(Duration::from_secs(30), Duration::from_secs(300));
        assert!(client.is_ok());
    }
}
