use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::server::{CorrectionRequest, CorrectionResponse};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to correction service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("correction service returned {0}")]
    Status(StatusCode),
}

/// Sends input text to the correction service and returns the corrected text
#[async_trait]
pub trait CorrectionTransport: Send + Sync {
    async fn request_correction(&self, input_text: &str) -> Result<String, TransportError>;
}

#[async_trait]
impl<T: CorrectionTransport + ?Sized> CorrectionTransport for Arc<T> {
    async fn request_correction(&self, input_text: &str) -> Result<String, TransportError> {
        (**self).request_correction(input_text).await
    }
}

/// Transport posting to the correction proxy over HTTP
pub struct HttpTransport {
    client: Client,
    endpoint_url: String,
}

impl HttpTransport {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint_url: endpoint_url.into(),
        }
    }
}

#[async_trait]
impl CorrectionTransport for HttpTransport {
    async fn request_correction(&self, input_text: &str) -> Result<String, TransportError> {
        let request = CorrectionRequest {
            input_text: input_text.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }

        let body: CorrectionResponse = response.json().await?;
        Ok(body.corrected_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_posts_input_text_and_decodes_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/endpoint")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({ "inputText": "He go to school." }),
            ))
            .with_status(200)
            .with_body(r#"{"correctedText":"He goes to school."}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/api/endpoint", server.url()));
        let corrected = transport
            .request_correction("He go to school.")
            .await
            .unwrap();

        assert_eq!(corrected, "He goes to school.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/endpoint")
            .with_status(500)
            .with_body(r#"{"error":"Internal Server Error"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/api/endpoint", server.url()));
        let err = transport.request_correction("text").await.unwrap_err();

        assert!(matches!(
            err,
            TransportError::Status(StatusCode::INTERNAL_SERVER_ERROR)
        ));
    }

    #[tokio::test]
    async fn test_unexpected_body_is_request_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/endpoint")
            .with_status(200)
            .with_body(r#"{"somethingElse":true}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/api/endpoint", server.url()));
        let err = transport.request_correction("text").await.unwrap_err();

        assert!(matches!(err, TransportError::Request(_)));
    }
}
