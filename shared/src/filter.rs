//! Upcoming/past partitioning of shows.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::models::Show;
use crate::Error;

/// Temporal filter applied to a show listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShowFilter {
    #[default]
    All,
    Upcoming,
    Past,
}

impl ShowFilter {
    /// Parse an optional query parameter; absent or blank means [`ShowFilter::All`].
    pub fn from_param(param: Option<&str>) -> Result<Self, Error> {
        match param.map(str::trim) {
            None | Some("") => Ok(ShowFilter::All),
            Some(value) => value.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShowFilter::All => "all",
            ShowFilter::Upcoming => "upcoming",
            ShowFilter::Past => "past",
        }
    }
}

impl FromStr for ShowFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ShowFilter::All),
            "upcoming" => Ok(ShowFilter::Upcoming),
            "past" => Ok(ShowFilter::Past),
            other => Err(Error::Validation(format!(
                "Unknown filter '{}' (expected all, upcoming or past)",
                other
            ))),
        }
    }
}

impl fmt::Display for ShowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partition shows against the current instant.
pub fn partition(shows: Vec<Show>, filter: ShowFilter) -> Vec<Show> {
    partition_at(shows, filter, Utc::now())
}

/// Partition shows against a fixed reference instant.
///
/// Order is preserved. A show starting exactly at `now` is upcoming. Shows
/// without a parseable `date_time` only appear under [`ShowFilter::All`].
pub fn partition_at(shows: Vec<Show>, filter: ShowFilter, now: DateTime<Utc>) -> Vec<Show> {
    match filter {
        ShowFilter::All => shows,
        ShowFilter::Upcoming => shows
            .into_iter()
            .filter(|show| show.starts_at().is_some_and(|at| at >= now))
            .collect(),
        ShowFilter::Past => shows
            .into_iter()
            .filter(|show| show.starts_at().is_some_and(|at| at < now))
            .collect(),
    }
}
