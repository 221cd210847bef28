//! PostgREST-backed implementation of [`TableStore`].

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::trace;

use crate::curso::seeder::config::BackendConfig;
use crate::curso::seeder::error::{Result, SeedError};
use crate::curso::seeder::store::{Filter, TableStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the hosted table API.
///
/// Every call is one synchronous HTTPS round trip against
/// `{url}/rest/v1/{table}`; the seeder performs them strictly one at a
/// time. Failures are not retried.
pub struct SupabaseStore {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    /// Creates a store from resolved backend settings.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, table: &str, filters: &[Filter]) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}/{table}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key);

        for filter in filters {
            request = request.query(&[(
                filter.column.as_str(),
                format!("eq.{}", param_value(&filter.value)),
            )]);
        }
        request
    }
}

impl TableStore for SupabaseStore {
    fn select(&self, table: &str, columns: &str, filters: &[Filter]) -> Result<Vec<Value>> {
        trace!(table, columns, "select");
        let response = self
            .request(Method::GET, table, filters)
            .query(&[("select", columns)])
            .send()?;
        Ok(check_response(response)?.json()?)
    }

    fn insert(&self, table: &str, rows: &[Value]) -> Result<Vec<Value>> {
        trace!(table, rows = rows.len(), "insert");
        let response = self
            .request(Method::POST, table, &[])
            .header("Prefer", "return=representation")
            .json(rows)
            .send()?;
        Ok(check_response(response)?.json()?)
    }

    fn update(&self, table: &str, filters: &[Filter], patch: &Value) -> Result<()> {
        trace!(table, "update");
        let response = self
            .request(Method::PATCH, table, filters)
            .json(patch)
            .send()?;
        check_response(response)?;
        Ok(())
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> Result<()> {
        trace!(table, "delete");
        let response = self.request(Method::DELETE, table, filters).send()?;
        check_response(response)?;
        Ok(())
    }
}

/// Renders a filter value the way PostgREST expects it in a query string.
fn param_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Fails on non-success statuses, carrying the response body for diagnosis.
fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(SeedError::Api {
            status: status.as_u16(),
            message: response.text().unwrap_or_default(),
        });
    }
    Ok(response)
}
