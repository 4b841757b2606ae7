//! Generic table access over HTTP.
//!
//! [`TableExecutor`] turns a [`Query`] descriptor into requests against
//! `/rest/v1/<table>` and normalizes every outcome into a `Result`. This is
//! the load-bearing contract of the crate: no operation here panics on a
//! backend or transport failure, so call sites branch on `Err` instead of
//! wrapping calls in their own recovery.

use std::fmt;
use std::time::Instant;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::ApiAuth;
use crate::error::{classify_backend_error, extract_error_message, Result, VizinhaLinkError};
use crate::query::{CountMode, Filter, Query};

/// Primary-key value: integer for the feature tables, string (UUID) for
/// `usuario`, whose id is the auth identity id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{}", id),
            Self::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<i32> for RowId {
    fn from(id: i32) -> Self {
        Self::Int(id as i64)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<&String> for RowId {
    fn from(id: &String) -> Self {
        Self::Text(id.clone())
    }
}

/// Result window of a `find_all`: the rows plus the row count when one was
/// requested through [`Query::with_count`].
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub count: Option<u64>,
}

impl<T> Page<T> {
    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Executes generic CRUD operations against named tables.
///
/// Cheap to clone; clones share the HTTP connection pool and the credential
/// cell, so feature services hold their own copy.
#[derive(Clone)]
pub struct TableExecutor {
    base_url: String,
    http_client: reqwest::Client,
    auth: ApiAuth,
}

impl TableExecutor {
    pub(crate) fn new(
        base_url: impl Into<String>,
        http_client: reqwest::Client,
        auth: ApiAuth,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
            auth,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Fetch every row matching the descriptor.
    ///
    /// Filters apply in order, then ordering, then the pagination range.
    /// When a count mode is set, the count comes from a separate head-only
    /// request; a count failure degrades to `count: None` instead of
    /// failing the fetch.
    pub async fn find_all<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Page<T>> {
        let count = match query.count {
            Some(mode) => self.fetch_count(table, mode).await,
            None => None,
        };

        let mut request = self
            .http_client
            .get(self.table_url(table))
            .query(&query.to_params());
        if let Some(pagination) = &query.pagination {
            let (from, to) = pagination.range();
            request = request
                .header("Range-Unit", "items")
                .header("Range", format!("{}-{}", from, to));
        }

        let response = self.send(request, "TABLE_FIND_ALL", table).await?;
        let rows = response.json::<Vec<T>>().await?;
        Ok(Page { rows, count })
    }

    /// Fetch a single row by primary key.
    ///
    /// Fetches up to one row instead of using a strict single-row mode, so
    /// "zero rows" is distinguishable from a backend error: it becomes a
    /// locally synthesized [`VizinhaLinkError::NotFound`] naming the table
    /// and id.
    pub async fn find_by_id<T: DeserializeOwned>(
        &self,
        table: &str,
        id: impl Into<RowId>,
        select: Option<&str>,
    ) -> Result<T> {
        let id = id.into();
        let id_param = format!("eq.{}", id);
        let request = self
            .http_client
            .get(self.table_url(table))
            .query(&[
                ("select", select.unwrap_or("*")),
                ("id", id_param.as_str()),
                ("limit", "1"),
            ]);

        let response = self.send(request, "TABLE_FIND_BY_ID", table).await?;
        let mut rows = response.json::<Vec<T>>().await?;
        match rows.pop() {
            Some(row) => Ok(row),
            None => Err(VizinhaLinkError::NotFound(not_found_message(table, &id))),
        }
    }

    /// Insert one row and return it.
    ///
    /// A successful insert that returns no row is reported as a failure
    /// ("failed to create..."), distinct from a backend error.
    pub async fn create<T: DeserializeOwned>(
        &self,
        table: &str,
        row: &impl Serialize,
        select: Option<&str>,
    ) -> Result<T> {
        let request = self
            .http_client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&[("select", select.unwrap_or("*")), ("limit", "1")])
            .json(row);

        let response = self.send(request, "TABLE_CREATE", table).await?;
        let mut rows = response.json::<Vec<T>>().await?;
        match rows.pop() {
            Some(row) => Ok(row),
            None => Err(VizinhaLinkError::QueryError(format!(
                "failed to create row in table '{}'",
                table
            ))),
        }
    }

    /// Insert several rows and return them.
    pub async fn create_many<T: DeserializeOwned>(
        &self,
        table: &str,
        rows: &[impl Serialize],
        select: Option<&str>,
    ) -> Result<Vec<T>> {
        let request = self
            .http_client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&[("select", select.unwrap_or("*"))])
            .json(rows);

        let response = self.send(request, "TABLE_CREATE_MANY", table).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    /// Update one row by primary key and return it. Zero affected rows is a
    /// [`VizinhaLinkError::NotFound`] naming the table and id.
    pub async fn update<T: DeserializeOwned>(
        &self,
        table: &str,
        id: impl Into<RowId>,
        patch: &impl Serialize,
        select: Option<&str>,
    ) -> Result<T> {
        let id = id.into();
        let id_param = format!("eq.{}", id);
        let request = self
            .http_client
            .patch(self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&[
                ("select", select.unwrap_or("*")),
                ("id", id_param.as_str()),
                ("limit", "1"),
            ])
            .json(patch);

        let response = self.send(request, "TABLE_UPDATE", table).await?;
        let mut rows = response.json::<Vec<T>>().await?;
        match rows.pop() {
            Some(row) => Ok(row),
            None => Err(VizinhaLinkError::NotFound(not_found_message(table, &id))),
        }
    }

    /// Update every row matching the filters and return them.
    /// Matching nothing is an empty `Ok`, not an error.
    pub async fn update_many<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &impl Serialize,
        select: Option<&str>,
    ) -> Result<Vec<T>> {
        let mut params: Vec<(String, String)> =
            vec![("select".to_string(), select.unwrap_or("*").to_string())];
        for filter in filters {
            params.extend(filter.to_params());
        }

        let request = self
            .http_client
            .patch(self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&params)
            .json(patch);

        let response = self.send(request, "TABLE_UPDATE_MANY", table).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    /// Delete one row by primary key and return it. Zero affected rows is a
    /// [`VizinhaLinkError::NotFound`] naming the table and id.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        table: &str,
        id: impl Into<RowId>,
    ) -> Result<T> {
        let id = id.into();
        let id_param = format!("eq.{}", id);
        let request = self
            .http_client
            .delete(self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&[
                ("select", "*"),
                ("id", id_param.as_str()),
                ("limit", "1"),
            ]);

        let response = self.send(request, "TABLE_DELETE", table).await?;
        let mut rows = response.json::<Vec<T>>().await?;
        match rows.pop() {
            Some(row) => Ok(row),
            None => Err(VizinhaLinkError::NotFound(not_found_message(table, &id))),
        }
    }

    /// Delete every row matching the filters and return them.
    pub async fn delete_many<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Vec<T>> {
        let mut params: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        for filter in filters {
            params.extend(filter.to_params());
        }

        let request = self
            .http_client
            .delete(self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&params);

        let response = self.send(request, "TABLE_DELETE_MANY", table).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    /// Call a database function (`/rest/v1/rpc/<function>`).
    ///
    /// Used where a privileged server-side path must replace a direct
    /// insert, such as profile creation during sign-up.
    pub async fn rpc<T: DeserializeOwned>(
        &self,
        function: &str,
        args: &impl Serialize,
    ) -> Result<T> {
        let request = self
            .http_client
            .post(format!("{}/rest/v1/rpc/{}", self.base_url, function))
            .json(args);

        let response = self.send(request, "TABLE_RPC", function).await?;
        Ok(response.json::<T>().await?)
    }

    /// Head-only row count. Failures are absorbed: a count is an accessory
    /// to the data fetch, never a reason to fail it.
    async fn fetch_count(&self, table: &str, mode: CountMode) -> Option<u64> {
        let request = self
            .http_client
            .head(self.table_url(table))
            .query(&[("select", "*")])
            .header("Prefer", mode.prefer_value());

        match self.send(request, "TABLE_COUNT", table).await {
            Ok(response) => response
                .headers()
                .get("content-range")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range_total),
            Err(err) => {
                warn!("[TABLE_COUNT] count request for '{}' failed: {}", table, err);
                None
            }
        }
    }

    /// Apply credentials, send, and map non-success responses to classified
    /// errors with the backend message preserved.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        tag: &str,
        target: &str,
    ) -> Result<reqwest::Response> {
        let request = self.auth.apply_to_request(request);
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        debug!(
            "[{}] target={} status={} duration_ms={}",
            tag,
            target,
            status,
            started.elapsed().as_millis()
        );

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        warn!(
            "[{}] target={} backend error: status={} message=\"{}\"",
            tag, target, status, message
        );
        Err(classify_backend_error(status.as_u16(), &message))
    }
}

fn not_found_message(table: &str, id: &RowId) -> String {
    format!("no row found in table '{}' with id {}", table, id)
}

/// Parse the total from a `Content-Range` header value such as `0-24/3573`
/// or `*/3573`. An unknown total (`*`) yields `None`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    let total = value.rsplit('/').next()?;
    total.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_display() {
        assert_eq!(RowId::from(42i64).to_string(), "42");
        assert_eq!(
            RowId::from("550e8400-e29b-41d4-a716-446655440000").to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn test_not_found_message_names_table_and_id() {
        let message = not_found_message("agenda", &RowId::Int(42));
        assert!(message.contains("agenda"));
        assert!(message.contains("42"));
        assert_eq!(message, "no row found in table 'agenda' with id 42");
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/17"), Some(17));
        assert_eq!(parse_content_range_total("*/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_page_helpers() {
        let page = Page {
            rows: vec![1, 2, 3],
            count: Some(10),
        };
        assert_eq!(page.len(), 3);
        assert!(!page.is_empty());
        assert_eq!(page.into_rows(), vec![1, 2, 3]);

        let empty: Page<i32> = Page {
            rows: vec![],
            count: None,
        };
        assert!(empty.is_empty());
    }
}
