//! Shared data models.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A comedy show as served to the front-end.
///
/// Optional attributes are always present: missing strings are `""` and a
/// missing price is `null`, so consumers never test for absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    pub title: String,
    pub date_time: String,
    pub location: String,
    pub description: String,
    pub comedian: String,
    pub ticket_price: Option<f64>,
    pub ticket_url: String,
}

impl Show {
    /// The instant the show starts, if `date_time` holds a recognizable timestamp.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        parse_show_time(&self.date_time)
    }
}

/// Ticket price as supplied by a caller: either a JSON number or the raw text
/// typed into a form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

/// Write-side view of a show used by create and update.
///
/// `None` means "not supplied". For `ticket_price`, `Some(None)` is an explicit
/// `null`, which clears the price on update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShowInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub comedian: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub ticket_price: Option<Option<PriceInput>>,
    #[serde(default)]
    pub ticket_url: Option<String>,
}

impl From<&Show> for ShowInput {
    fn from(show: &Show) -> Self {
        Self {
            title: Some(show.title.clone()),
            date_time: Some(show.date_time.clone()),
            location: Some(show.location.clone()),
            description: Some(show.description.clone()),
            comedian: Some(show.comedian.clone()),
            ticket_price: Some(show.ticket_price.map(PriceInput::Number)),
            ticket_url: Some(show.ticket_url.clone()),
        }
    }
}

/// Keeps a present-but-null field distinguishable from a missing one.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One page of shows from the record store.
#[derive(Debug, Clone, Serialize)]
pub struct ShowPage {
    pub results: Vec<Show>,
    /// Continuation token for the next page, when the store has more records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// Show details embedded in an invitation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InviteShow {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ticket_url: Option<String>,
}

/// The person being invited.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Guest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Invitation response payload.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub success: bool,
    pub message: String,
}

/// Parse a show timestamp.
///
/// Accepts RFC 3339 with an offset, offset-less date-times (read as UTC) and
/// bare dates (midnight UTC).
pub fn parse_show_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
