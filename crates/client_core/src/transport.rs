use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::RecordId, protocol::users_route, protocol::CreateUserRequest};
use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// Status line and body text of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network access to the remote user collection.
///
/// Implementations report any completed exchange as `Ok`, whatever the status;
/// interpreting the status is left to the controller. `Err` means no response
/// was obtained at all.
#[async_trait]
pub trait CollectionTransport: Send + Sync {
    async fn list(&self) -> Result<TransportResponse, TransportError>;
    async fn create(&self, request: &CreateUserRequest)
        -> Result<TransportResponse, TransportError>;
    async fn delete(&self, id: &RecordId) -> Result<TransportResponse, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    collection_url: Url,
}

impl HttpTransport {
    pub fn new(api_base: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), api_base)
    }

    pub fn with_client(http: Client, api_base: &str) -> Result<Self, TransportError> {
        Ok(Self {
            http,
            collection_url: collection_url(api_base)?,
        })
    }

    pub fn member_url(&self, id: &RecordId) -> Url {
        let mut url = self.collection_url.clone();
        // collection_url() rejects cannot-be-a-base urls, so this always succeeds
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
        }
        url
    }
}

/// Absolute URL of the collection resource, e.g. `http://localhost:5000/api/users`.
pub fn collection_url(api_base: &str) -> Result<Url, TransportError> {
    let base = api_base.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{base}{}", users_route()))
        .map_err(|err| TransportError::InvalidEndpoint(format!("'{base}': {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(TransportError::InvalidEndpoint(format!(
            "'{base}': expected an http(s) base url"
        )));
    }
    Ok(url)
}

#[async_trait]
impl CollectionTransport for HttpTransport {
    async fn list(&self) -> Result<TransportResponse, TransportError> {
        debug!(url = %self.collection_url, "users: GET");
        let response = self.http.get(self.collection_url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }

    async fn create(
        &self,
        request: &CreateUserRequest,
    ) -> Result<TransportResponse, TransportError> {
        debug!(url = %self.collection_url, "users: POST");
        let response = self
            .http
            .post(self.collection_url.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status().as_u16();
        // Body text is only diagnostic here; an unreadable body is reported as empty.
        let body = response.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }

    async fn delete(&self, id: &RecordId) -> Result<TransportResponse, TransportError> {
        let url = self.member_url(id);
        debug!(%url, "users: DELETE");
        let response = self.http.delete(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
