//! # HTTP Backend
//!
//! [`ShopBackend`] over JSON/HTTP with reqwest.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  backend.person("ana@shop.test")                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  endpoint(["persons", "ana@shop.test"])                                │
//! │       │   base_url + percent-encoded segments                          │
//! │       ▼                                                                 │
//! │  GET http://localhost:8080/api/persons/ana@shop.test                   │
//! │       │                                                                 │
//! │       ├── 2xx ───────► decode JSON body ──► Ok(T)                      │
//! │       ├── 404 ───────► NotFound / None (per endpoint)                  │
//! │       └── other ─────► parse_error ──► BackendError::Status            │
//! │                                                                         │
//! │  One attempt per call. No timeouts, no retries.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use shopfront_core::{
    CreatedSale, Discount, DiscountUpdate, FrequentCustomer, LoginRequest, LoginResponse,
    NewSale, Person, PersonUpdate, Product, ProductUpdate, Registration, Sale, SaleLine,
    TopSellingProduct,
};

use crate::backend::ShopBackend;
use crate::error::{BackendError, BackendResult};

/// Default backend location.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Storefront backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// Creates a client for the backend rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Url`] if the URL does not parse or is not
    /// http(s), and [`BackendError::Request`] if the HTTP client fails to build.
    pub fn new(base_url: &str) -> BackendResult<Self> {
        let base_url = parse_base_url(base_url)?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("shopfront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpBackend { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> BackendResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::Url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url) -> BackendResult<reqwest::Response> {
        debug!(%method, %url, "Backend request");
        let response = self.client.request(method, url).send().await?;
        debug!(status = response.status().as_u16(), "Backend response");
        Ok(response)
    }

    async fn send_json<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> BackendResult<reqwest::Response> {
        debug!(%method, %url, "Backend request");
        let response = self.client.request(method, url).json(body).send().await?;
        debug!(status = response.status().as_u16(), "Backend response");
        Ok(response)
    }

    /// GET a resource that must exist.
    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> BackendResult<T> {
        let response = self.send(Method::GET, self.endpoint(segments)?).await?;
        handle_response(response).await
    }

    /// GET a resource where any non-success answer means "absent".
    async fn get_optional<T: DeserializeOwned>(&self, segments: &[&str]) -> BackendResult<Option<T>> {
        let response = self.send(Method::GET, self.endpoint(segments)?).await?;

        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "Treating response as absent");
            return Ok(None);
        }

        decode(response).await.map(Some)
    }
}

// =============================================================================
// Response Handling
// =============================================================================

fn parse_base_url(raw: &str) -> BackendResult<Url> {
    let url = Url::parse(raw.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(BackendError::Url(format!(
                "expected an http or https URL, got scheme '{other}'"
            )))
        }
    }

    if url.cannot_be_a_base() {
        return Err(BackendError::Url(format!("{url} cannot be a base")));
    }

    Ok(url)
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> BackendResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Decodes a success body, or turns the failure into a [`BackendError`].
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> BackendResult<T> {
    if response.status().is_success() {
        return decode(response).await;
    }

    Err(parse_error(response).await)
}

/// Checks the status only; the body of a success is ignored.
async fn expect_success(response: reqwest::Response) -> BackendResult<()> {
    if response.status().is_success() {
        return Ok(());
    }

    Err(parse_error(response).await)
}

async fn parse_error(response: reqwest::Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);

    warn!(status = status.as_u16(), message = %message, "Backend rejected request");

    BackendError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Prefers the backend's `{"message": "..."}`, then the raw body, then the
/// status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    if let Ok(ErrorBody { message: Some(m) }) = serde_json::from_str::<ErrorBody>(body) {
        if !m.trim().is_empty() {
            return m;
        }
    }

    let body = body.trim();
    if !body.is_empty() && !body.starts_with('{') {
        return body.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

// =============================================================================
// ShopBackend
// =============================================================================

#[async_trait]
impl ShopBackend for HttpBackend {
    async fn products(&self) -> BackendResult<Vec<Product>> {
        self.get(&["products"]).await
    }

    async fn active_products(&self) -> BackendResult<Vec<Product>> {
        self.get(&["products", "active"]).await
    }

    async fn product(&self, id: i64) -> BackendResult<Option<Product>> {
        self.get_optional(&["products", &id.to_string()]).await
    }

    async fn update_product(&self, id: i64, update: &ProductUpdate) -> BackendResult<Product> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        let response = self.send_json(Method::PUT, url, update).await?;
        handle_response(response).await
    }

    async fn top_selling_products(&self) -> BackendResult<Vec<TopSellingProduct>> {
        self.get(&["sale-products", "top-products"]).await
    }

    async fn persons(&self) -> BackendResult<Vec<Person>> {
        self.get(&["persons"]).await
    }

    async fn person(&self, email: &str) -> BackendResult<Person> {
        let response = self.send(Method::GET, self.endpoint(&["persons", email])?).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound {
                entity: "person",
                id: email.to_string(),
            });
        }

        handle_response(response).await
    }

    async fn update_person(&self, email: &str, update: &PersonUpdate) -> BackendResult<Person> {
        let url = self.endpoint(&["persons", email])?;
        let response = self.send_json(Method::PUT, url, update).await?;
        handle_response(response).await
    }

    async fn login(&self, request: &LoginRequest) -> BackendResult<LoginResponse> {
        let url = self.endpoint(&["persons", "login"])?;
        let response = self.send_json(Method::POST, url, request).await?;
        handle_response(response).await
    }

    async fn register(&self, registration: &Registration) -> BackendResult<()> {
        let url = self.endpoint(&["persons"])?;
        let response = self.send_json(Method::POST, url, registration).await?;
        expect_success(response).await
    }

    async fn discounts(&self) -> BackendResult<Vec<Discount>> {
        self.get(&["discounts"]).await
    }

    async fn active_discount(&self) -> BackendResult<Option<Discount>> {
        let response = self.send(Method::GET, self.endpoint(&["discounts", "active"])?).await?;

        if response.status() != StatusCode::OK {
            return Ok(None);
        }

        decode(response).await.map(Some)
    }

    async fn update_discount(&self, id: i64, update: &DiscountUpdate) -> BackendResult<Discount> {
        let url = self.endpoint(&["discounts", &id.to_string()])?;
        let response = self.send_json(Method::PUT, url, update).await?;
        handle_response(response).await
    }

    async fn create_sale(&self, sale: &NewSale) -> BackendResult<CreatedSale> {
        let url = self.endpoint(&["sales"])?;
        let response = self.send_json(Method::POST, url, sale).await?;
        handle_response(response).await
    }

    async fn sale(&self, id: i64) -> BackendResult<Option<Sale>> {
        self.get_optional(&["sales", &id.to_string()]).await
    }

    async fn sales_by_person(&self, email: &str) -> BackendResult<Vec<Sale>> {
        self.get(&["sales", "person", email]).await
    }

    async fn top_frequent_customers(&self) -> BackendResult<Vec<FrequentCustomer>> {
        self.get(&["sales", "top-frequent-customers"]).await
    }

    async fn create_sale_line(&self, line: &SaleLine) -> BackendResult<()> {
        let url = self.endpoint(&["sale-products"])?;
        let response = self.send_json(Method::POST, url, line).await?;
        expect_success(response).await
    }

    async fn sale_lines(&self, sale_id: i64) -> BackendResult<Vec<SaleLine>> {
        self.get(&["sale-products", "sale", &sale_id.to_string()]).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_validation() {
        assert!(HttpBackend::new(DEFAULT_API_URL).is_ok());
        assert!(HttpBackend::new("https://shop.test/api/").is_ok());
        assert!(matches!(HttpBackend::new("ftp://shop.test"), Err(BackendError::Url(_))));
        assert!(matches!(HttpBackend::new("not a url"), Err(BackendError::Url(_))));
        assert!(matches!(HttpBackend::new("mailto:ana@shop.test"), Err(BackendError::Url(_))));
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let backend = HttpBackend::new(DEFAULT_API_URL).unwrap();

        assert_eq!(
            backend.endpoint(&["sales", "person", "ana@shop.test"]).unwrap().as_str(),
            "http://localhost:8080/api/sales/person/ana@shop.test"
        );
        assert_eq!(
            backend.endpoint(&["sale-products", "top-products"]).unwrap().as_str(),
            "http://localhost:8080/api/sale-products/top-products"
        );
    }

    #[test]
    fn test_endpoint_handles_trailing_slash_and_encoding() {
        let backend = HttpBackend::new("http://localhost:8080/api/").unwrap();

        assert_eq!(
            backend.endpoint(&["persons", "a b/c"]).unwrap().as_str(),
            "http://localhost:8080/api/persons/a%20b%2Fc"
        );
    }

    #[test]
    fn test_error_message_sources() {
        assert_eq!(
            error_message(StatusCode::CONFLICT, r#"{"message":"Email already registered"}"#),
            "Email already registered"
        );
        assert_eq!(error_message(StatusCode::BAD_REQUEST, "bad payload"), "bad payload");
        assert_eq!(error_message(StatusCode::UNAUTHORIZED, ""), "Unauthorized");
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#),
            "Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_request_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let backend = HttpBackend::new("http://127.0.0.1:9/api").unwrap();

        let err = backend.products().await.unwrap_err();
        assert!(matches!(err, BackendError::Request(_)));
        assert_eq!(err.status(), None);
    }
}
