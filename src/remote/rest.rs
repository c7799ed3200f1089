//! REST implementation of [`RemoteStore`] against a PostgREST-style API.
//!
//! Every table is exposed at `{base}/rest/v1/{table}`; filters and limits
//! travel as query parameters, upsert conflict handling as a `Prefer`
//! header, and counts come back in the `content-range` response header.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;

use async_trait::async_trait;

use crate::collection::Collection;
use crate::error::RemoteError;

use super::{RemoteConfig, RemoteStore, SelectQuery};

pub struct RestRemoteStore {
    http: reqwest::Client,
    config: RemoteConfig,
}

impl RestRemoteStore {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.config.url, collection.table())
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }

    /// Map non-success statuses into [`RemoteError::Status`], keeping the
    /// response body for diagnostics.
    async fn checked(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn select(
        &self,
        collection: Collection,
        query: SelectQuery,
    ) -> Result<Vec<Value>, RemoteError> {
        let mut request = self
            .authed(self.http.get(self.endpoint(collection)))
            .query(&[("select", "*")]);
        if let Some((column, expr)) = &query.filter {
            request = request.query(&[(column.as_str(), expr.as_str())]);
        }
        if let Some(limit) = query.limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        let response = Self::checked(request.send().await?).await?;
        let rows: Vec<Value> = response.json().await?;
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, records: &[Value]) -> Result<(), RemoteError> {
        let response = self
            .authed(self.http.post(self.endpoint(collection)))
            .header("Prefer", "return=minimal")
            .json(records)
            .send()
            .await?;
        Self::checked(response).await.map(|_| ())
    }

    async fn update(
        &self,
        collection: Collection,
        patch: &Value,
        filter: (&str, &str),
    ) -> Result<(), RemoteError> {
        let response = self
            .authed(self.http.patch(self.endpoint(collection)))
            .query(&[filter])
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        Self::checked(response).await.map(|_| ())
    }

    async fn delete_all(&self, collection: Collection) -> Result<(), RemoteError> {
        // PostgREST refuses an unfiltered delete; `id=not.is.null` matches
        // every row since the identity column is non-nullable.
        let response = self
            .authed(self.http.delete(self.endpoint(collection)))
            .query(&[("id", "not.is.null")])
            .send()
            .await?;
        Self::checked(response).await.map(|_| ())
    }

    async fn upsert(
        &self,
        collection: Collection,
        records: &[Value],
        on_conflict: &str,
    ) -> Result<(), RemoteError> {
        let response = self
            .authed(self.http.post(self.endpoint(collection)))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(records)
            .send()
            .await?;
        Self::checked(response).await.map(|_| ())
    }

    async fn count(&self, collection: Collection) -> Result<usize, RemoteError> {
        let response = self
            .authed(self.http.get(self.endpoint(collection)))
            .query(&[("select", "id"), ("limit", "1")])
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED
            || response.status() == StatusCode::FORBIDDEN
        {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, body });
        }

        let header = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        Self::checked(response).await?;

        let header = header.ok_or_else(|| {
            RemoteError::Decode("count response missing content-range header".to_string())
        })?;
        parse_content_range(&header)
            .ok_or_else(|| RemoteError::Decode(format!("unparseable content-range \"{header}\"")))
    }
}

/// Extract the total from a `content-range` value such as `0-0/42` or `*/0`.
fn parse_content_range(header: &str) -> Option<usize> {
    header.rsplit('/').next()?.trim().parse().ok()
}
