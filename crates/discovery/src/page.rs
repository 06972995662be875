//! Paged upstream source of contest entries.

use std::fmt;

use async_trait::async_trait;
use fetch::ResourceTransport;
use normalize::WorkKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PageSourceError;

/// Entries endpoint, relative to the origin.
pub const DEFAULT_ENTRIES_TEMPLATE: &str =
    "/ajax/{kind}/contest/{name}/entries?p={page}&order={order}";

/// Listing order of contest entries.
///
/// Deserializes through [`ContestOrder::from_ui_value`], so configured values
/// follow the same fallback as the page's order selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ContestOrder {
    /// Newest first.
    #[default]
    #[serde(rename = "date_d")]
    DateDesc,
    /// Oldest first.
    #[serde(rename = "date")]
    Date,
    /// Most popular first. Upstream only honours it for premium accounts.
    #[serde(rename = "popular_d")]
    PopularDesc,
}

impl ContestOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            ContestOrder::DateDesc => "date_d",
            ContestOrder::Date => "date",
            ContestOrder::PopularDesc => "popular_d",
        }
    }

    /// Map the value of the page's order selector.
    ///
    /// Accounts without access to popularity sorting see `redirect_premium`
    /// instead of `popular_d`; that, and anything unrecognised, falls back to
    /// [`ContestOrder::DateDesc`].
    pub fn from_ui_value(value: &str) -> Self {
        match value {
            "date_d" => ContestOrder::DateDesc,
            "date" => ContestOrder::Date,
            "popular_d" => ContestOrder::PopularDesc,
            other => {
                debug!(value = other, "contest_order_fallback");
                ContestOrder::DateDesc
            }
        }
    }
}

impl From<String> for ContestOrder {
    fn from(value: String) -> Self {
        ContestOrder::from_ui_value(&value)
    }
}

impl fmt::Display for ContestOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful page payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBody {
    /// Rendered entry list; candidates are embedded as `id="<kind>:<digits>"`.
    pub html: String,
    /// Continuation token; `None` ends pagination.
    pub next_url: Option<String>,
}

/// One page as reported upstream. `error` set means the page failed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResponse {
    pub body: Option<PageBody>,
    pub error: Option<String>,
}

impl PageResponse {
    pub fn ok(html: impl Into<String>, next_url: Option<String>) -> Self {
        Self {
            body: Some(PageBody {
                html: html.into(),
                next_url,
            }),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            body: None,
            error: Some(message.into()),
        }
    }

    /// The body, or the message explaining why there is none.
    pub fn into_body(self) -> Result<PageBody, String> {
        match (self.error, self.body) {
            (Some(message), _) => Err(message),
            (None, Some(body)) => Ok(body),
            (None, None) => Err("page payload has no body".to_string()),
        }
    }
}

/// Paged source of contest entries.
#[async_trait]
pub trait UpstreamPageSource: Send + Sync {
    async fn get_page(
        &self,
        kind: WorkKind,
        collection: &str,
        page: u32,
        order: ContestOrder,
    ) -> Result<PageResponse, PageSourceError>;
}

#[async_trait]
impl<T: UpstreamPageSource + ?Sized> UpstreamPageSource for &T {
    async fn get_page(
        &self,
        kind: WorkKind,
        collection: &str,
        page: u32,
        order: ContestOrder,
    ) -> Result<PageResponse, PageSourceError> {
        (**self).get_page(kind, collection, page, order).await
    }
}

/// Wire shape of the entries endpoint. Error responses may carry any body
/// (often `[]`), so it is only decoded once `error` is known to be false.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    body: serde_json::Value,
}

impl Envelope {
    fn into_response(self) -> Result<PageResponse, PageSourceError> {
        if self.error {
            let message = if self.message.is_empty() {
                "upstream reported an error".to_string()
            } else {
                self.message
            };
            return Ok(PageResponse::failed(message));
        }
        let body = serde_json::from_value::<Option<PageBody>>(self.body)
            .map_err(|err| PageSourceError::Decode(err.to_string()))?;
        Ok(PageResponse { body, error: None })
    }
}

/// [`UpstreamPageSource`] over a [`ResourceTransport`].
///
/// Issues one request per page; retrying a failed page is not this type's
/// business.
pub struct HttpPageSource<T> {
    transport: T,
    origin: String,
    template: String,
}

impl<T: ResourceTransport> HttpPageSource<T> {
    pub fn new(transport: T, origin: impl Into<String>) -> Self {
        Self {
            transport,
            origin: origin.into().trim_end_matches('/').to_string(),
            template: DEFAULT_ENTRIES_TEMPLATE.to_string(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn page_url(
        &self,
        kind: WorkKind,
        collection: &str,
        page: u32,
        order: ContestOrder,
    ) -> String {
        let path = self
            .template
            .replace("{kind}", kind.as_str())
            .replace("{name}", collection)
            .replace("{page}", &page.to_string())
            .replace("{order}", order.as_str());
        format!("{}{}", self.origin, path)
    }
}

#[async_trait]
impl<T: ResourceTransport> UpstreamPageSource for HttpPageSource<T> {
    async fn get_page(
        &self,
        kind: WorkKind,
        collection: &str,
        page: u32,
        order: ContestOrder,
    ) -> Result<PageResponse, PageSourceError> {
        let url = self.page_url(kind, collection, page, order);
        let response = self
            .transport
            .get(&url)
            .await
            .map_err(|err| PageSourceError::Transport(err.to_string()))?;

        // Upstream answers errors with a JSON envelope and a 4xx status; the
        // envelope carries the message worth logging.
        match serde_json::from_slice::<Envelope>(&response.body) {
            Ok(envelope) => envelope.into_response(),
            Err(_) if !response.is_success() => Err(PageSourceError::Status {
                status: response.status,
            }),
            Err(err) => Err(PageSourceError::Decode(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;
    use fetch::{TransportError, TransportResponse};

    use super::*;

    struct CannedTransport {
        status: u16,
        body: &'static str,
        urls: Mutex<Vec<String>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                urls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ResourceTransport for CannedTransport {
        async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(TransportResponse {
                status: self.status,
                content_type: Some("application/json".into()),
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    #[test]
    fn redirect_premium_falls_back_to_newest_first() {
        assert_eq!(ContestOrder::from_ui_value("redirect_premium"), ContestOrder::DateDesc);
        assert_eq!(ContestOrder::from_ui_value("redirect_premium").as_str(), "date_d");
        assert_eq!(ContestOrder::from_ui_value("popular_d"), ContestOrder::PopularDesc);
        assert_eq!(ContestOrder::from_ui_value("date"), ContestOrder::Date);
    }

    #[test]
    fn order_serializes_as_upstream_value() {
        assert_eq!(serde_json::to_string(&ContestOrder::DateDesc).unwrap(), "\"date_d\"");
    }

    #[test]
    fn deserialized_order_uses_selector_fallback() {
        let parse = |raw: &str| serde_json::from_str::<ContestOrder>(raw).unwrap();
        assert_eq!(parse("\"popular_d\""), ContestOrder::PopularDesc);
        assert_eq!(parse("\"date\""), ContestOrder::Date);
        assert_eq!(parse("\"redirect_premium\""), ContestOrder::DateDesc);
    }

    #[test]
    fn page_url_fills_template() {
        let source =
            HttpPageSource::new(CannedTransport::new(200, "{}"), "https://www.example.net/");
        assert_eq!(
            source.page_url(WorkKind::Novel, "uroko2025", 2, ContestOrder::Date),
            "https://www.example.net/ajax/novel/contest/uroko2025/entries?p=2&order=date"
        );
    }

    #[tokio::test]
    async fn decodes_success_envelope() {
        let source = HttpPageSource::new(
            CannedTransport::new(
                200,
                r#"{"error":false,"message":"","body":{"html":"<li id=\"illust:5\"></li>","next_url":null}}"#,
            ),
            "https://www.example.net",
        );
        let page = source
            .get_page(WorkKind::Illust, "starseed", 1, ContestOrder::DateDesc)
            .await
            .expect("page");
        let body = page.into_body().expect("body");
        assert!(body.html.contains("illust:5"));
        assert_eq!(body.next_url, None);
    }

    #[tokio::test]
    async fn error_envelope_with_bad_status_keeps_message() {
        let source = HttpPageSource::new(
            CannedTransport::new(400, r#"{"error":true,"message":"invalid order","body":[]}"#),
            "https://www.example.net",
        );
        let page = source
            .get_page(WorkKind::Novel, "uroko2025", 1, ContestOrder::PopularDesc)
            .await
            .expect("envelope");
        assert_eq!(page.into_body(), Err("invalid order".to_string()));
    }

    #[tokio::test]
    async fn non_json_error_maps_to_status() {
        let source = HttpPageSource::new(
            CannedTransport::new(503, "<html>busy</html>"),
            "https://www.example.net",
        );
        let err = source
            .get_page(WorkKind::Illust, "starseed", 1, ContestOrder::DateDesc)
            .await
            .expect_err("status");
        assert_eq!(err, PageSourceError::Status { status: 503 });
    }
}
