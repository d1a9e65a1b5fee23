#![doc = "Page-service integration: implements the core `PageStore` trait against the Flarum pages API."]
//
//! # Page client (CLI <-> Core)
//!
//! This module bridges the [`PageStore`] abstraction in
//! [`wallpaper_sync_core::contract`] to a real forum running the pages
//! extension. It speaks JSON:API:
//!
//! - `POST /api/pages` (201), `GET /api/pages/{id}` (200),
//!   `GET /api/pages?filter[slug]=` (200), `PATCH /api/pages/{id}` (200),
//!   `DELETE /api/pages/{id}` (204), `GET /api/pages?filter[isHidden]=0` (200).
//! - Every request carries `Authorization: Token <api_token>`.
//! - Responses are `{data: {id, attributes: {...}}}` envelopes, or a `data`
//!   array for listings. Malformed envelopes are logged and surface as
//!   [`SyncError::ParseFailure`].
//!
//! Request construction and envelope parsing are public so they can be tested
//! without a server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, Request, StatusCode};
use serde_json::{json, Value};

use wallpaper_sync_core::contract::{NewPage, Page, PageStore, PageUpdate};
use wallpaper_sync_core::SyncError;

pub struct FlarumClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl FlarumClient {
    pub fn new(base_url: &str, api_token: &str) -> Result<Self, SyncError> {
        let client = Client::builder().build()?;
        tracing::info!(
            base_url,
            api_token_set = !api_token.is_empty(),
            "Initialized page-service client"
        );
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.api_token))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    pub fn create_request(&self, page: &NewPage) -> Result<Request, SyncError> {
        let mut attributes = json!({
            "title": page.title,
            "content": page.content,
            "isHidden": page.is_hidden,
            "isHtml": page.is_html,
        });
        if let Some(slug) = page.slug.as_deref().filter(|s| !s.is_empty()) {
            attributes["slug"] = json!(slug);
        }
        let body = json!({ "data": { "type": "pages", "attributes": attributes } });
        Ok(self.request(Method::POST, "/api/pages").json(&body).build()?)
    }

    pub fn get_request(&self, id: i64) -> Result<Request, SyncError> {
        Ok(self.request(Method::GET, &format!("/api/pages/{id}")).build()?)
    }

    pub fn slug_request(&self, slug: &str) -> Result<Request, SyncError> {
        Ok(self
            .request(Method::GET, "/api/pages")
            .query(&[("filter[slug]", slug)])
            .build()?)
    }

    pub fn update_request(&self, id: i64, fields: &PageUpdate) -> Result<Request, SyncError> {
        let body = json!({
            "data": { "type": "pages", "id": id.to_string(), "attributes": fields }
        });
        Ok(self
            .request(Method::PATCH, &format!("/api/pages/{id}"))
            .json(&body)
            .build()?)
    }

    pub fn delete_request(&self, id: i64) -> Result<Request, SyncError> {
        Ok(self.request(Method::DELETE, &format!("/api/pages/{id}")).build()?)
    }

    pub fn list_request(&self, include_hidden: bool) -> Result<Request, SyncError> {
        let mut builder = self.request(Method::GET, "/api/pages");
        if !include_hidden {
            builder = builder.query(&[("filter[isHidden]", "0")]);
        }
        Ok(builder.build()?)
    }

    /// Sends `request`, checks for `expected` and returns the parsed JSON body.
    async fn send(&self, request: Request, expected: StatusCode) -> Result<Value, SyncError> {
        let method = request.method().clone();
        let url = request.url().to_string();
        tracing::debug!(%method, url = %url, "Sending page-service request");

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::error!(error = ?e, %method, url = %url, "Failed to reach page service");
            SyncError::from(e)
        })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
        let text = check_status(status, expected, text).map_err(|e| {
            tracing::error!(%status, %method, url = %url, error = %e, "Page service returned error");
            e
        })?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(error = ?e, %method, url = %url, "Failed to parse page-service JSON");
            SyncError::ParseFailure(e.to_string())
        })
    }
}

#[async_trait]
impl PageStore for FlarumClient {
    async fn create(&self, page: NewPage) -> Result<Page, SyncError> {
        tracing::info!(title = %page.title, slug = ?page.slug, "Creating page");
        let body = self.send(self.create_request(&page)?, StatusCode::CREATED).await?;
        let created = parse_envelope(&body)?;
        tracing::info!(page_id = created.id, title = %created.title, "Successfully created page");
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Page, SyncError> {
        tracing::info!(page_id = id, "Fetching page by id");
        let body = self.send(self.get_request(id)?, StatusCode::OK).await?;
        parse_envelope(&body)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Page>, SyncError> {
        tracing::info!(slug, "Fetching page by slug");
        let body = self.send(self.slug_request(slug)?, StatusCode::OK).await?;
        let data = body
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| log_parse_failure("listing without `data` array", &body))?;
        data.first().map(parse_page).transpose()
    }

    async fn update(&self, id: i64, fields: PageUpdate) -> Result<Page, SyncError> {
        tracing::info!(page_id = id, title = ?fields.title, has_content = fields.content.is_some(), "Updating page");
        let body = self
            .send(self.update_request(id, &fields)?, StatusCode::OK)
            .await?;
        let updated = parse_envelope(&body)?;
        tracing::info!(page_id = updated.id, "Successfully updated page");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> bool {
        tracing::info!(page_id = id, "Deleting page");
        let request = match self.delete_request(id) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(error = %e, page_id = id, "Failed to build delete request");
                return false;
            }
        };
        match self.client.execute(request).await {
            Ok(response) if delete_confirmed(response.status()) => {
                tracing::info!(page_id = id, "Successfully deleted page");
                true
            }
            Ok(response) => {
                tracing::error!(status = %response.status(), page_id = id, "Failed to delete page");
                false
            }
            Err(e) => {
                tracing::error!(error = ?e, page_id = id, "Failed to reach page service");
                false
            }
        }
    }

    async fn list(&self, include_hidden: bool) -> Result<Vec<Page>, SyncError> {
        tracing::info!(include_hidden, "Listing pages");
        let body = self
            .send(self.list_request(include_hidden)?, StatusCode::OK)
            .await?;
        let pages = parse_list(&body)?;
        tracing::info!(count = pages.len(), "Fetched pages");
        Ok(pages)
    }
}

/// Passes `body` through only when `status` is the one the call expects;
/// anything else is mapped onto the error taxonomy with the body attached.
pub fn check_status(status: StatusCode, expected: StatusCode, body: String) -> Result<String, SyncError> {
    if status == expected {
        Ok(body)
    } else {
        Err(SyncError::from_status(status.as_u16(), body))
    }
}

/// A delete counts only when the service answers `204 No Content`.
pub fn delete_confirmed(status: StatusCode) -> bool {
    status == StatusCode::NO_CONTENT
}

fn log_parse_failure(reason: &str, raw: &Value) -> SyncError {
    tracing::error!(reason, raw = %raw, "Malformed page envelope");
    SyncError::ParseFailure(reason.to_string())
}

fn parse_time(raw: Option<&Value>) -> Option<DateTime<Utc>> {
    raw.and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// Parses a single resource object `{id, attributes: {...}}`.
pub fn parse_page(data: &Value) -> Result<Page, SyncError> {
    let id = match data.get("id") {
        Some(Value::String(s)) => s.parse::<i64>().ok(),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    }
    .ok_or_else(|| log_parse_failure("resource without integer `id`", data))?;
    let attrs = data
        .get("attributes")
        .and_then(Value::as_object)
        .ok_or_else(|| log_parse_failure("resource without `attributes`", data))?;

    let text = |key: &str| {
        attrs
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let flag = |key: &str| attrs.get(key).and_then(Value::as_bool).unwrap_or(false);

    Ok(Page {
        id,
        title: text("title"),
        slug: text("slug"),
        content: text("content"),
        is_hidden: flag("isHidden"),
        is_html: flag("isHtml"),
        created_at: parse_time(attrs.get("time")).unwrap_or_else(Utc::now),
        edited_at: parse_time(attrs.get("editTime")),
    })
}

/// Parses a `{data: {...}}` envelope.
pub fn parse_envelope(body: &Value) -> Result<Page, SyncError> {
    let data = body
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| log_parse_failure("envelope without `data` object", body))?;
    parse_page(data)
}

/// Parses a `{data: [...]}` listing; malformed items are logged and dropped.
pub fn parse_list(body: &Value) -> Result<Vec<Page>, SyncError> {
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| log_parse_failure("listing without `data` array", body))?;
    Ok(data.iter().filter_map(|item| parse_page(item).ok()).collect())
}
