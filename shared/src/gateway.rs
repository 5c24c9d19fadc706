//! Show gateway backed by the Airtable REST API.
//!
//! Every operation is one HTTP round trip, except `list`, which walks
//! Airtable's pages until no `offset` is returned. Nothing is cached and
//! nothing is retried.

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::AirtableConfig;
use crate::filter::{partition_at, ShowFilter};
use crate::mapper::{to_record_fields, to_show, AirtableRecord, WriteMode};
use crate::models::{Show, ShowInput, ShowPage};
use crate::{Error, Result};

/// Records requested per list call (Airtable's maximum).
const PAGE_SIZE: &str = "100";

/// Airtable error types that mean the record does not exist.
const MISSING_RECORD_TYPES: [&str; 3] = ["NOT_FOUND", "ROW_DOES_NOT_EXIST", "MODEL_ID_NOT_FOUND"];

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<AirtableRecord>,
    offset: Option<String>,
}

/// Client for show records stored in an Airtable table.
pub struct ShowGateway {
    http: Client,
    config: AirtableConfig,
}

impl ShowGateway {
    /// Create a new gateway.
    pub fn new(config: AirtableConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a gateway sharing an existing HTTP client.
    pub fn with_client(http: Client, config: AirtableConfig) -> Self {
        Self { http, config }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.base_id),
            urlencoding::encode(&self.config.table_name)
        )
    }

    fn record_url(&self, id: &str) -> Result<String> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::Validation("Show id cannot be empty".to_string()));
        }
        Ok(format!("{}/{}", self.table_url(), urlencoding::encode(id)))
    }

    /// List every show in the table, filtered against the current instant.
    pub async fn list(&self, filter: ShowFilter) -> Result<Vec<Show>> {
        self.list_at(filter, Utc::now()).await
    }

    /// List every show, following Airtable's `offset` until the last page,
    /// then filter the combined sequence against `now`.
    pub async fn list_at(&self, filter: ShowFilter, now: DateTime<Utc>) -> Result<Vec<Show>> {
        let mut shows = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0;

        loop {
            let response = self.fetch_page(offset.as_deref()).await?;
            pages += 1;
            shows.extend(response.records.iter().map(to_show));

            match response.offset.filter(|o| !o.is_empty()) {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        let fetched = shows.len();
        let results = partition_at(shows, filter, now);
        debug!(
            "Listed {} of {} shows across {} pages with filter {}",
            results.len(),
            fetched,
            pages,
            filter
        );

        Ok(results)
    }

    /// Fetch one page of records and filter it against `now`.
    ///
    /// `offset` is the continuation token returned with a previous page.
    pub async fn list_page(
        &self,
        filter: ShowFilter,
        offset: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ShowPage> {
        let response = self.fetch_page(offset).await?;
        let shows: Vec<Show> = response.records.iter().map(to_show).collect();

        Ok(ShowPage {
            results: partition_at(shows, filter, now),
            offset: response.offset,
        })
    }

    async fn fetch_page(&self, offset: Option<&str>) -> Result<ListResponse> {
        let mut query = vec![("pageSize", PAGE_SIZE)];
        if let Some(offset) = offset.filter(|o| !o.is_empty()) {
            query.push(("offset", offset));
        }

        let request = self.http.get(self.table_url()).query(&query);
        self.send(request, None).await
    }

    /// Fetch a single show.
    pub async fn get(&self, id: &str) -> Result<Show> {
        let request = self.http.get(self.record_url(id)?);
        let record: AirtableRecord = self.send(request, Some(id)).await?;
        Ok(to_show(&record))
    }

    /// Create a show; required fields are checked before any request is made.
    pub async fn create(&self, input: &ShowInput) -> Result<Show> {
        let fields = to_record_fields(input, WriteMode::Create)?;

        let request = self
            .http
            .post(self.table_url())
            .json(&json!({ "fields": fields }));
        let record: AirtableRecord = self.send(request, None).await?;

        info!("Created show {}", record.id);
        Ok(to_show(&record))
    }

    /// Merge-write the supplied fields and return the show as stored.
    pub async fn update(&self, id: &str, input: &ShowInput) -> Result<Show> {
        let url = self.record_url(id)?;
        let fields = to_record_fields(input, WriteMode::Update)?;
        let field_names: Vec<&str> = fields.keys().map(String::as_str).collect();
        debug!("Updating show {} fields {:?}", id, field_names);

        let request = self.http.patch(url).json(&json!({ "fields": fields }));
        let record: AirtableRecord = self.send(request, Some(id)).await?;

        info!("Updated show {}", record.id);
        Ok(to_show(&record))
    }

    /// Delete a show. Deleting an unknown id yields [`Error::NotFound`].
    pub async fn delete(&self, id: &str) -> Result<()> {
        let request = self.http.delete(self.record_url(id)?);
        let _: Value = self.send(request, Some(id)).await?;

        info!("Deleted show {}", id);
        Ok(())
    }

    /// Execute a request. `record_id` is set for single-record operations,
    /// where a missing record is reported as [`Error::NotFound`].
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        record_id: Option<&str>,
    ) -> Result<T> {
        let response = request.bearer_auth(&self.config.api_key).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(upstream_error(status, &body, record_id))
    }
}

/// Map an Airtable error response onto the error taxonomy.
fn upstream_error(status: StatusCode, body: &str, record_id: Option<&str>) -> Error {
    let (error_type, message) = parse_error_body(body);

    if let Some(id) = record_id {
        let missing = status == StatusCode::NOT_FOUND
            || (status == StatusCode::UNPROCESSABLE_ENTITY
                && error_type
                    .as_deref()
                    .is_some_and(|t| MISSING_RECORD_TYPES.contains(&t)));

        if missing {
            return Error::NotFound(format!("Show {} not found", id));
        }
    }

    warn!(
        "Airtable returned {} for {}: {}",
        status,
        record_id.unwrap_or("table"),
        message
    );
    Error::Gateway {
        status: Some(status.as_u16()),
        message,
    }
}

/// Airtable error bodies are `{"error": "TYPE"}` or
/// `{"error": {"type": "...", "message": "..."}}`.
fn parse_error_body(body: &str) -> (Option<String>, String) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return (None, body.to_string());
    };

    match value.get("error") {
        Some(Value::String(error_type)) => (Some(error_type.clone()), error_type.clone()),
        Some(Value::Object(error)) => {
            let error_type = error.get("type").and_then(Value::as_str).map(String::from);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(String::from)
                .or_else(|| error_type.clone())
                .unwrap_or_else(|| body.to_string());
            (error_type, message)
        }
        _ => (None, body.to_string()),
    }
}
