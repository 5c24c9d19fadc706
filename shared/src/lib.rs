//! Shared library for the comedy show Lambda functions.
//!
//! This crate provides the show gateway over Airtable, the record mapping and
//! date filtering it relies on, the SendGrid invite mailer, and the request
//! handlers used by the Lambda binaries.

pub mod config;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod handlers;
pub mod http;
pub mod mailer;
pub mod mapper;
pub mod models;
pub mod secrets;

pub use config::{AirtableConfig, SendGridConfig};
pub use error::{Error, Result};
pub use filter::{partition, partition_at, ShowFilter};
pub use gateway::ShowGateway;
pub use mailer::{compose_invitation, InviteRequest, Invitation, SendGridMailer};
pub use mapper::{to_record_fields, to_show, AirtableRecord, FieldBag, WriteMode};
pub use models::{Guest, InviteShow, PriceInput, Show, ShowInput, ShowPage};
