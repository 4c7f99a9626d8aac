//! Thin typed client for the storefront REST API.

pub mod types;

use crate::error::ApiError;
use crate::view::TimeFilter;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;
use types::{Cart, CatalogQuery, Category, HistoryPage, HistoryRecord, Product, ProductPage, Session, User};

pub const DEFAULT_API_URL: &str = "https://api.dealscope.app";

#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(base_url.into()),
            token: None,
        }
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dealscope/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url.into()),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    // ── Auth ────────────────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let request = self
            .request(Method::POST, "/api/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }));
        self.send(request).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Session, ApiError> {
        let request = self.request(Method::POST, "/api/auth/register").json(&serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
        }));
        self.send(request).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let request = self.authed(Method::GET, "/api/auth/me")?;
        self.send(request).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = self.authed(Method::POST, "/api/auth/logout")?;
        self.send_empty(request).await
    }

    // ── History ─────────────────────────────────────────────────────────────

    pub async fn history(&self, filter: TimeFilter) -> Result<HistoryPage, ApiError> {
        let request = self
            .authed(Method::GET, "/api/history")?
            .query(&[("filter", filter.as_str())]);
        let page: HistoryPage = self.send(request).await?;
        tracing::debug!(filter = %filter, total = page.total, items = page.items.len(), "fetched history");
        Ok(page)
    }

    pub async fn record_view(&self, product_id: &str) -> Result<HistoryRecord, ApiError> {
        let request = self
            .authed(Method::POST, "/api/history")?
            .json(&serde_json::json!({ "productId": product_id }));
        self.send(request).await
    }

    pub async fn delete_history_item(&self, id: &str) -> Result<(), ApiError> {
        let request = self.authed(Method::DELETE, &format!("/api/history/{}", path_segment(id)))?;
        self.send_empty(request).await
    }

    pub async fn clear_history(&self) -> Result<(), ApiError> {
        let request = self.authed(Method::DELETE, "/api/history")?;
        self.send_empty(request).await
    }

    // ── Catalog ─────────────────────────────────────────────────────────────

    pub async fn products(&self, query: &CatalogQuery) -> Result<ProductPage, ApiError> {
        let request = self
            .request(Method::GET, "/api/products")
            .query(&query.to_pairs());
        self.send(request).await
    }

    pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
        let request = self.request(Method::GET, &format!("/api/products/{}", path_segment(id)));
        self.send(request).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let request = self.request(Method::GET, "/api/categories");
        self.send(request).await
    }

    // ── Cart ────────────────────────────────────────────────────────────────

    pub async fn cart(&self) -> Result<Cart, ApiError> {
        let request = self.authed(Method::GET, "/api/cart")?;
        self.send(request).await
    }

    pub async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<Cart, ApiError> {
        let request = self
            .authed(Method::POST, "/api/cart")?
            .json(&serde_json::json!({ "productId": product_id, "quantity": quantity }));
        self.send(request).await
    }

    pub async fn update_cart_item(&self, item_id: &str, quantity: u32) -> Result<Cart, ApiError> {
        let request = self
            .authed(Method::PATCH, &format!("/api/cart/{}", path_segment(item_id)))?
            .json(&serde_json::json!({ "quantity": quantity }));
        self.send(request).await
    }

    pub async fn remove_from_cart(&self, item_id: &str) -> Result<Cart, ApiError> {
        let request = self.authed(Method::DELETE, &format!("/api/cart/{}", path_segment(item_id)))?;
        self.send(request).await
    }

    // ── Plumbing ────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!(method = method.as_str(), url = url.as_str(), "api request");
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Like `request`, but fails without a round trip when there is no session.
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        if self.token.is_none() {
            return Err(ApiError::Unauthorized);
        }
        Ok(self.request(method, path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }
        Ok(())
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
fn path_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}
