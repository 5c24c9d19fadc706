//! Request handlers behind the `shows` and `send_invite` Lambdas.
//!
//! Endpoints:
//! - GET /shows?filter={all|upcoming|past} - List all shows (`offset` fetches one page)
//! - GET /shows/{id} - Get a show
//! - POST /shows - Create a show
//! - PUT /shows/{id} - Merge-update a show (PATCH is accepted too)
//! - DELETE /shows/{id} - Delete a show
//! - POST /send-invite - Email an invitation for a show

use chrono::Utc;
use lambda_http::{Body, Request, RequestExt, Response};
use tracing::info;

use crate::filter::ShowFilter;
use crate::gateway::ShowGateway;
use crate::http::{
    empty_response, error_for, error_response, json_response, normalize_path, parse_json_body,
};
use crate::mailer::{InviteRequest, SendGridMailer};
use crate::models::{InviteResponse, Show, ShowInput, ShowPage};
use crate::Result;

/// Methods allowed by the shows function.
pub const SHOWS_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
/// Methods allowed by the invite function.
pub const INVITE_METHODS: &str = "POST, OPTIONS";

#[derive(Debug, PartialEq)]
enum ShowRoute {
    Collection,
    Item(String),
}

fn parse_route(path: &str) -> Option<ShowRoute> {
    if path == "/shows" {
        return Some(ShowRoute::Collection);
    }

    let id = path.strip_prefix("/shows/")?;
    if id.is_empty() || id.contains('/') {
        return None;
    }

    let id = urlencoding::decode(id)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| id.to_string());
    Some(ShowRoute::Item(id))
}

enum Reply {
    Page(ShowPage),
    Show(u16, Show),
    NoContent,
}

/// Route a shows request to the gateway.
pub async fn handle_shows(
    gateway: &ShowGateway,
    event: Request,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    let path = normalize_path(event.uri().path()).to_string();
    let method = event.method().as_str().to_string();

    info!("{} {}", method, path);

    if method == "OPTIONS" {
        return empty_response(200, SHOWS_METHODS);
    }

    let Some(route) = parse_route(&path) else {
        return error_response(404, SHOWS_METHODS, "Not found");
    };

    match dispatch(gateway, &method, route, &event).await {
        Ok(Some(Reply::Page(page))) => json_response(200, SHOWS_METHODS, &page),
        Ok(Some(Reply::Show(status, show))) => json_response(status, SHOWS_METHODS, &show),
        Ok(Some(Reply::NoContent)) => empty_response(204, SHOWS_METHODS),
        Ok(None) => error_response(405, SHOWS_METHODS, "Method not allowed"),
        Err(e) => error_for(&e, SHOWS_METHODS),
    }
}

async fn dispatch(
    gateway: &ShowGateway,
    method: &str,
    route: ShowRoute,
    event: &Request,
) -> Result<Option<Reply>> {
    let reply = match (method, route) {
        ("GET", ShowRoute::Collection) => {
            let params = event.query_string_parameters();
            let filter = ShowFilter::from_param(params.first("filter"))?;
            let page = match params.first("offset").filter(|o| !o.is_empty()) {
                Some(offset) => gateway.list_page(filter, Some(offset), Utc::now()).await?,
                None => ShowPage {
                    results: gateway.list(filter).await?,
                    offset: None,
                },
            };
            Reply::Page(page)
        }
        ("POST", ShowRoute::Collection) => {
            let input: ShowInput = parse_json_body(event.body())?;
            Reply::Show(201, gateway.create(&input).await?)
        }
        ("GET", ShowRoute::Item(id)) => Reply::Show(200, gateway.get(&id).await?),
        ("PUT" | "PATCH", ShowRoute::Item(id)) => {
            let input: ShowInput = parse_json_body(event.body())?;
            Reply::Show(200, gateway.update(&id, &input).await?)
        }
        ("DELETE", ShowRoute::Item(id)) => {
            gateway.delete(&id).await?;
            Reply::NoContent
        }
        _ => return Ok(None),
    };

    Ok(Some(reply))
}

/// Validate an invitation request and hand it to SendGrid.
pub async fn handle_send_invite(
    mailer: &SendGridMailer,
    event: Request,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    let method = event.method().as_str();
    info!("{} {}", method, event.uri().path());

    match method {
        "OPTIONS" => return empty_response(200, INVITE_METHODS),
        "POST" => {}
        _ => return error_response(405, INVITE_METHODS, "Method not allowed"),
    }

    let request: InviteRequest = match parse_json_body(event.body()) {
        Ok(request) => request,
        Err(e) => return error_for(&e, INVITE_METHODS),
    };

    match mailer.send_invite(&request).await {
        Ok(invitation) => json_response(
            200,
            INVITE_METHODS,
            &InviteResponse {
                success: true,
                message: format!("Email sent successfully to {}", invitation.to_email),
            },
        ),
        Err(e) => error_for(&e, INVITE_METHODS),
    }
}
