//! Shows Lambda - CRUD over comedy show records stored in Airtable.
//!
//! Endpoints:
//! - GET /shows?filter={all|upcoming|past} - List shows
//! - GET /shows/{id} - Get a show
//! - POST /shows - Create a show
//! - PUT/PATCH /shows/{id} - Update a show
//! - DELETE /shows/{id} - Delete a show

use lambda_http::{run, service_fn, Error};
use shared::{handlers, AirtableConfig, ShowGateway};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = AirtableConfig::load().await?;
    info!(
        "Serving shows from base {} table {}",
        config.base_id, config.table_name
    );

    let gateway = Arc::new(ShowGateway::new(config));

    run(service_fn(move |event| {
        let gateway = Arc::clone(&gateway);
        async move { handlers::handle_shows(&gateway, event).await }
    }))
    .await
}
