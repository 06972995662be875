//! One-request transport used by the fetcher.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::Url;
use tracing::debug;

use crate::error::TransportError;

/// Raw response of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues exactly one GET per call. Retrying is the caller's business.
#[async_trait]
pub trait ResourceTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: ResourceTransport + ?Sized> ResourceTransport for &T {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        (**self).get(url).await
    }
}

/// reqwest-backed transport.
///
/// Credentials are scoped to the configured origin: the cookie header is only
/// attached when the requested URL has the same scheme, host and port.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    origin: Option<Url>,
    credentials: Option<HeaderValue>,
}

impl HttpTransport {
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    fn attaches_credentials(&self, url: &Url) -> bool {
        match (&self.origin, &self.credentials) {
            (Some(origin), Some(_)) => is_same_origin(origin, url),
            _ => false,
        }
    }
}

#[async_trait]
impl ResourceTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let parsed = Url::parse(url).map_err(|err| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        let mut request = self.client.get(parsed.clone());
        if self.attaches_credentials(&parsed) {
            if let Some(cookie) = &self.credentials {
                request = request.header(COOKIE, cookie.clone());
            }
        }

        let response = request
            .send()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;

        debug!(url, status, len = body.len(), "transport_response");
        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Default, Clone)]
pub struct HttpTransportBuilder {
    origin: Option<String>,
    cookie: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Cookie header sent to same-origin URLs only.
    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Overall request timeout. Unset means the reqwest default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let origin = self
            .origin
            .map(|raw| Url::parse(&raw).map_err(|_| TransportError::InvalidOrigin(raw)))
            .transpose()?;
        let credentials = self
            .cookie
            .map(|cookie| {
                HeaderValue::from_str(&cookie).map_err(|_| TransportError::InvalidCredentials)
            })
            .transpose()?;

        let mut builder = reqwest::Client::builder();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::Client(err.to_string()))?;

        Ok(HttpTransport {
            client,
            origin,
            credentials,
        })
    }
}

pub(crate) fn is_same_origin(origin: &Url, url: &Url) -> bool {
    origin.scheme() == url.scheme()
        && origin.host_str() == url.host_str()
        && origin.port_or_known_default() == url.port_or_known_default()
}
