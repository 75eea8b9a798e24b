//! Portfolio page client
//!
//! Provides the [`PortfolioSource`] seam and [`B3Client`], its HTTP
//! implementation against the public index proxy.

use super::PageRequest;
use crate::error::ExtractError;
use eyre::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::future::Future;
use url::Url;

/// One row of the portfolio listing, as the service returns it
pub type Record = Map<String, Value>;

/// One page of the portfolio listing
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PortfolioPage {
    #[serde(default)]
    pub page: Option<PageInfo>,
    #[serde(default)]
    pub results: Option<Vec<Record>>,
}

/// Paging metadata reported by the service
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_pages: Option<i64>,
}

impl PortfolioPage {
    /// Total page count as reported by the server
    ///
    /// The server sometimes reports a negative count; the magnitude is used.
    /// A missing count means a single page.
    pub fn total_pages(&self) -> u32 {
        self.page
            .as_ref()
            .and_then(|p| p.total_pages)
            .map(|n| u32::try_from(n.unsigned_abs()).unwrap_or(u32::MAX))
            .unwrap_or(1)
    }

    pub fn into_results(self) -> Vec<Record> {
        self.results.unwrap_or_default()
    }
}

/// Anything that can serve portfolio pages
pub trait PortfolioSource: Send + Sync {
    /// Fetch a single page
    ///
    /// # Errors
    /// Returns [`ExtractError::Request`] when the page cannot be retrieved or parsed
    fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<PortfolioPage, ExtractError>> + Send;
}

/// HTTP client for the B3 index proxy
///
/// Requests carry no timeout; a stalled server blocks the run.
///
/// # Example
/// ```no_run
/// use b3_carteira::portfolio::{B3Client, PageRequest, PortfolioSource};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse(b3_carteira::config::DEFAULT_BASE_URL)?;
/// let client = B3Client::try_new(url)?;
/// let page = client.fetch_page(&PageRequest::default()).await?;
/// println!("{} pages", page.total_pages());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct B3Client {
    client: Client,
    base_url: Url,
}

impl B3Client {
    pub fn try_new(base_url: Url) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, base_url })
    }

    /// Full URL for a request: the encoded payload is the last path segment
    pub fn page_url(&self, request: &PageRequest) -> Result<Url, ExtractError> {
        let encoded = request.encode()?;
        let raw = format!("{}{}", self.base_url, encoded);
        Url::parse(&raw).map_err(|e| ExtractError::request(request.page_number, e.to_string()))
    }
}

impl PortfolioSource for B3Client {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PortfolioPage, ExtractError> {
        let page = request.page_number;
        let url = self.page_url(request)?;
        log::debug!("GET page {} of {}", page, request.index);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExtractError::request(page, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::request(
                page,
                format!("status code {}", status.as_u16()),
            ));
        }

        response
            .json::<PortfolioPage>()
            .await
            .map_err(|e| ExtractError::request(page, format!("invalid response body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> B3Client {
        let base = Url::parse(&format!("{}/indexCall/GetPortfolioDay/", server.uri())).unwrap();
        B3Client::try_new(base).unwrap()
    }

    fn request_path(request: &PageRequest) -> String {
        format!("/indexCall/GetPortfolioDay/{}", request.encode().unwrap())
    }

    #[test]
    fn test_total_pages() {
        let page: PortfolioPage =
            serde_json::from_value(json!({"page": {"totalPages": -4}, "results": []})).unwrap();
        assert_eq!(page.total_pages(), 4);

        let page: PortfolioPage = serde_json::from_value(json!({"results": []})).unwrap();
        assert_eq!(page.total_pages(), 1);

        let page: PortfolioPage =
            serde_json::from_value(json!({"page": {"pageNumber": 1}})).unwrap();
        assert_eq!(page.total_pages(), 1);
        assert!(page.into_results().is_empty());
    }

    #[test]
    fn test_page_url() {
        let base = Url::parse("https://example.com/indexCall/GetPortfolioDay/").unwrap();
        let client = B3Client::try_new(base).unwrap();
        let request = PageRequest::default();
        let url = client.page_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            format!(
                "https://example.com/indexCall/GetPortfolioDay/{}",
                request.encode().unwrap()
            )
        );
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let server = MockServer::start().await;
        let request = PageRequest::default();

        Mock::given(method("GET"))
            .and(path(request_path(&request)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": {"pageNumber": 1, "pageSize": 20, "totalRecords": 2, "totalPages": 1},
                "results": [
                    {"cod": "PETR4", "asset": "PETROBRAS", "part": "7,123", "theoricalQty": "4.566.457.037"},
                    {"cod": "VALE3", "asset": "VALE", "part": "11,002", "theoricalQty": "4.196.924.316"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let page = client.fetch_page(&request).await.unwrap();
        assert_eq!(page.total_pages(), 1);

        let results = page.into_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["cod"], "PETR4");
    }

    #[tokio::test]
    async fn test_fetch_page_non_success() {
        let server = MockServer::start().await;
        let request = PageRequest::default().page(2);

        Mock::given(method("GET"))
            .and(path(request_path(&request)))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_page(&request).await.unwrap_err();
        match err {
            ExtractError::Request { page, message } => {
                assert_eq!(page, 2);
                assert!(message.contains("503"));
            }
            other => panic!("expected Request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_invalid_body() {
        let server = MockServer::start().await;
        let request = PageRequest::default();

        Mock::given(method("GET"))
            .and(path(request_path(&request)))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_page(&request).await.unwrap_err();
        assert!(matches!(err, ExtractError::Request { page: 1, .. }));
    }
}
