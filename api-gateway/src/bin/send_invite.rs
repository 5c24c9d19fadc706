//! Send Invite Lambda - Emails a show invitation through SendGrid.

use lambda_http::{run, service_fn, Error};
use shared::{handlers, SendGridConfig, SendGridMailer};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = SendGridConfig::load().await?;
    if config.api_key.is_none() {
        warn!("SENDGRID_API_KEY not configured, invitations will be rejected");
    }

    let mailer = Arc::new(SendGridMailer::new(config));

    run(service_fn(move |event| {
        let mailer = Arc::clone(&mailer);
        async move { handlers::handle_send_invite(&mailer, event).await }
    }))
    .await
}
