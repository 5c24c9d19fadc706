//! Translation between Airtable records and [`Show`] values.
//!
//! This is the only module that knows the Airtable column names.

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::models::{parse_show_time, PriceInput, Show, ShowInput};
use crate::{Error, Result};

/// Outgoing Airtable field bag.
pub type FieldBag = Map<String, Value>;

/// Airtable column names.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const DATE_TIME: &str = "date_time";
    pub const LOCATION: &str = "location";
    pub const DESCRIPTION: &str = "description";
    pub const COMEDIAN: &str = "comedian";
    pub const TICKET_PRICE: &str = "ticket_price";
    pub const TICKET_URL: &str = "ticket_url";
}

/// A record as returned by the Airtable REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct AirtableRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Whether a field bag is built for a new record or a merge-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// Convert an Airtable record into a [`Show`], filling empty sentinels for
/// missing fields.
pub fn to_show(record: &AirtableRecord) -> Show {
    let text = |name: &str| {
        record
            .fields
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Show {
        id: record.id.clone(),
        title: text(fields::TITLE),
        date_time: text(fields::DATE_TIME),
        location: text(fields::LOCATION),
        description: text(fields::DESCRIPTION),
        comedian: text(fields::COMEDIAN),
        ticket_price: record.fields.get(fields::TICKET_PRICE).and_then(price_from_value),
        ticket_url: text(fields::TICKET_URL),
    }
}

fn price_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|p| p.is_finite()),
        _ => None,
    }
}

/// Build the Airtable field bag for a create or update.
///
/// Only fields the caller supplied are included. Required fields must be
/// present on create and may never be set to an empty value.
pub fn to_record_fields(input: &ShowInput, mode: WriteMode) -> Result<FieldBag> {
    let mut bag = FieldBag::new();

    let required = [
        (fields::TITLE, &input.title),
        (fields::DATE_TIME, &input.date_time),
        (fields::LOCATION, &input.location),
        (fields::DESCRIPTION, &input.description),
    ];

    let mut missing = Vec::new();
    for (name, value) in required {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => {}
            Some(_) => missing.push(name),
            None if mode == WriteMode::Create => missing.push(name),
            None => {}
        }
    }
    if !missing.is_empty() {
        return Err(Error::Validation(format!(
            "{} cannot be empty",
            missing.join(", ")
        )));
    }

    if let Some(date_time) = &input.date_time {
        if parse_show_time(date_time).is_none() {
            return Err(Error::Validation(format!(
                "date_time is not a valid timestamp: {}",
                date_time
            )));
        }
    }

    for (name, value) in required {
        if let Some(v) = value {
            bag.insert(name.to_string(), Value::String(v.clone()));
        }
    }

    for (name, value) in [
        (fields::COMEDIAN, &input.comedian),
        (fields::TICKET_URL, &input.ticket_url),
    ] {
        match (value, mode) {
            (Some(v), WriteMode::Create) if v.is_empty() => {}
            (Some(v), _) => {
                bag.insert(name.to_string(), Value::String(v.clone()));
            }
            (None, _) => {}
        }
    }

    if let Some(price) = &input.ticket_price {
        match (parse_price(price.as_ref())?, mode) {
            (Some(p), _) => {
                let number = Number::from_f64(p).ok_or_else(|| invalid_price(&p.to_string()))?;
                bag.insert(fields::TICKET_PRICE.to_string(), Value::Number(number));
            }
            (None, WriteMode::Update) => {
                bag.insert(fields::TICKET_PRICE.to_string(), Value::Null);
            }
            (None, WriteMode::Create) => {}
        }
    }

    Ok(bag)
}

/// Parse a supplied price. `Ok(None)` means "no price" (null or blank text).
fn parse_price(price: Option<&PriceInput>) -> Result<Option<f64>> {
    let parsed = match price {
        None => return Ok(None),
        Some(PriceInput::Number(n)) => *n,
        Some(PriceInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>().map_err(|_| invalid_price(text))?
        }
    };

    if parsed.is_finite() {
        Ok(Some(parsed))
    } else {
        Err(invalid_price(&parsed.to_string()))
    }
}

fn invalid_price(raw: &str) -> Error {
    Error::Validation(format!("ticket_price is not a number: {}", raw))
}
