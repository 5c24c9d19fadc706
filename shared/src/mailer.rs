//! Show invitations sent through the SendGrid v3 mail API.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use validator::ValidateEmail;

use crate::config::SendGridConfig;
use crate::models::{parse_show_time, Guest, InviteShow};
use crate::{Error, Result};

/// Invitation request payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InviteRequest {
    #[serde(default)]
    pub to_email: Option<String>,
    #[serde(default)]
    pub show_data: Option<InviteShow>,
    #[serde(default)]
    pub guest_data: Option<Guest>,
}

/// A composed, ready-to-send invitation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invitation {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

/// Validate the request and build the plain-text invitation.
pub fn compose_invitation(
    request: &InviteRequest,
    fallback_ticket_url: Option<&str>,
) -> Result<Invitation> {
    let to_email = request
        .to_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| Error::Validation("to_email is required".to_string()))?;

    if !to_email.validate_email() {
        return Err(Error::Validation(
            "to_email is not a valid email address".to_string(),
        ));
    }

    let show = request.show_data.clone().unwrap_or_default();
    let guest = request.guest_data.clone().unwrap_or_default();

    let title = text_or(&show.title, "Comedy Show");
    let first_name = text_or(&guest.first_name, "Guest");
    let location = text_or(&show.location, "Venue TBA");

    let starts_at = show.date_time.as_deref().and_then(parse_show_time);
    let date = starts_at
        .map(|at| at.format("%A, %B %-d, %Y").to_string())
        .unwrap_or_else(|| "Date TBA".to_string());
    let time = starts_at
        .map(|at| at.format("%-I:%M %p").to_string())
        .unwrap_or_else(|| "Time TBA".to_string());

    let mut body = format!(
        "Hi {first_name}!\n\nYou're invited to {title} @ {location}.\n\n"
    );
    if let Some(description) = show.description.as_deref().filter(|d| !d.trim().is_empty()) {
        body.push_str(description.trim());
        body.push_str("\n\n");
    }
    body.push_str(&format!("Event Details:\n{date}\nShow time: {time}\n"));

    let ticket_url = show
        .ticket_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .or(fallback_ticket_url);
    if let Some(url) = ticket_url {
        body.push_str(&format!("\nGet your tickets here: {}\n", url.trim()));
    }

    Ok(Invitation {
        to_email: to_email.to_string(),
        subject: format!("{title} - You're Invited!"),
        body,
    })
}

fn text_or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

/// Client that dispatches invitations through SendGrid.
pub struct SendGridMailer {
    http: Client,
    config: SendGridConfig,
}

impl SendGridMailer {
    pub fn new(config: SendGridConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: SendGridConfig) -> Self {
        Self { http, config }
    }

    /// Compose and send an invitation. One HTTP round trip; no retries.
    pub async fn send_invite(&self, request: &InviteRequest) -> Result<Invitation> {
        let invitation = compose_invitation(request, self.config.fallback_ticket_url.as_deref())?;

        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            error!("SENDGRID_API_KEY not configured");
            Error::Config("Email service not configured".to_string())
        })?;

        let payload = json!({
            "personalizations": [{
                "to": [{ "email": invitation.to_email }],
                "subject": invitation.subject,
            }],
            "from": { "email": self.config.from_email },
            "content": [{
                "type": "text/plain",
                "value": invitation.body,
            }],
        });

        let response = self
            .http
            .post(format!("{}/mail/send", self.config.api_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("SendGrid returned {}: {}", status, body);
            return Err(Error::Gateway {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        info!("Sent invitation to {}", invitation.to_email);
        Ok(invitation)
    }
}
