//! Show gateway tests against a mock Airtable server.

use chrono::{TimeZone, Utc};
use serde_json::json;
use shared::{AirtableConfig, Error, PriceInput, ShowFilter, ShowGateway, ShowInput};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE_PATH: &str = "/v0/appTest/Shows";

fn gateway(server: &MockServer) -> ShowGateway {
    ShowGateway::new(
        AirtableConfig::new("test-key", "appTest").with_api_url(format!("{}/v0", server.uri())),
    )
}

fn record(id: &str, date_time: &str) -> serde_json::Value {
    json!({
        "id": id,
        "createdTime": "2024-12-01T00:00:00.000Z",
        "fields": {
            "title": format!("Show {}", id),
            "date_time": date_time,
            "location": "Comedy Cellar",
            "description": "Stand-up night",
        }
    })
}

fn new_show() -> ShowInput {
    ShowInput {
        title: Some("Friday Night Laughs".into()),
        date_time: Some("2025-03-14T20:00:00.000Z".into()),
        location: Some("The Laugh Factory".into()),
        description: Some("Stand-up showcase".into()),
        comedian: Some("Jane Doe".into()),
        ticket_price: Some(Some(PriceInput::Text("25".into()))),
        ticket_url: None,
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn test_list_upcoming_with_fixed_now() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("pageSize", "100"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [record("recOld", "2020-01-01"), record("recNew", "2099-01-01")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let page = gateway(&server)
            .list_page(ShowFilter::Upcoming, None, now)
            .await
            .unwrap();

        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, "recNew");
        assert!(page.offset.is_none());
    }

    #[tokio::test]
    async fn test_list_all_preserves_store_order_and_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [
                    record("recB", "2099-01-01"),
                    {"id": "recBare", "createdTime": "2024-12-01T00:00:00.000Z", "fields": {}},
                    record("recA", "2020-01-01"),
                ],
                "offset": "itrNext/recA"
            })))
            .mount(&server)
            .await;

        let page = gateway(&server)
            .list_page(ShowFilter::All, None, Utc::now())
            .await
            .unwrap();

        let ids: Vec<&str> = page.results.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["recB", "recBare", "recA"]);
        assert_eq!(page.results[1].title, "");
        assert_eq!(page.results[1].ticket_price, None);
        assert_eq!(page.offset.as_deref(), Some("itrNext/recA"));
    }

    #[tokio::test]
    async fn test_list_forwards_offset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("offset", "itrNext/recA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [record("recC", "2099-02-01")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = gateway(&server)
            .list_page(ShowFilter::All, Some("itrNext/recA"), Utc::now())
            .await
            .unwrap();
        assert_eq!(page.results[0].id, "recC");
    }

    #[tokio::test]
    async fn test_list_follows_offset_across_pages() {
        let server = MockServer::start().await;
        let first_page: Vec<serde_json::Value> = (0..100)
            .map(|i| record(&format!("rec{:03}", i), "2099-01-01"))
            .collect();

        // Mounted first so the continuation request matches it before the
        // offset-less mock below.
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("offset", "itr1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [record("rec100", "2020-01-01")]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("pageSize", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": first_page,
                "offset": "itr1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let shows = gateway(&server).list(ShowFilter::All).await.unwrap();

        assert_eq!(shows.len(), 101);
        assert_eq!(shows[0].id, "rec000");
        assert_eq!(shows[99].id, "rec099");
        assert_eq!(shows[100].id, "rec100");
    }

    #[tokio::test]
    async fn test_list_filters_across_pages_with_one_instant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("offset", "itr1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [record("recLate", "2030-01-01"), record("recEarly", "2021-01-01")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [record("recPast", "2020-01-01"), record("recSoon", "2026-01-01")],
                "offset": "itr1"
            })))
            .mount(&server)
            .await;

        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let gateway = gateway(&server);

        let upcoming = gateway.list_at(ShowFilter::Upcoming, now).await.unwrap();
        let ids: Vec<&str> = upcoming.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["recSoon", "recLate"]);

        let past = gateway.list_at(ShowFilter::Past, now).await.unwrap();
        let ids: Vec<&str> = past.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["recPast", "recEarly"]);
    }

    #[tokio::test]
    async fn test_list_past_uses_current_time() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [record("recOld", "2001-01-01"), record("recNew", "2999-01-01")]
            })))
            .mount(&server)
            .await;

        let shows = gateway(&server).list(ShowFilter::Past).await.unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].id, "recOld");
    }

    #[tokio::test]
    async fn test_list_surfaces_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"type": "AUTHENTICATION_REQUIRED", "message": "Authentication required"}
            })))
            .mount(&server)
            .await;

        match gateway(&server).list(ShowFilter::All).await {
            Err(Error::Gateway { status, message }) => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "Authentication required");
            }
            other => panic!("Expected gateway error, got {:?}", other),
        }
    }
}

mod get {
    use super::*;

    #[tokio::test]
    async fn test_get_maps_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/recABC", TABLE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "recABC",
                "createdTime": "2024-12-01T00:00:00.000Z",
                "fields": {
                    "title": "Open Mic",
                    "date_time": "2025-03-14T20:00:00.000Z",
                    "location": "The Basement",
                    "description": "Five minutes each",
                    "ticket_price": 10
                }
            })))
            .mount(&server)
            .await;

        let show = gateway(&server).get("recABC").await.unwrap();
        assert_eq!(show.title, "Open Mic");
        assert_eq!(show.ticket_price, Some(10.0));
        assert_eq!(show.comedian, "");
        assert_eq!(show.ticket_url, "");
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/recMissing", TABLE_PATH)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "NOT_FOUND"})))
            .mount(&server)
            .await;

        assert!(matches!(
            gateway(&server).get("recMissing").await,
            Err(Error::NotFound(_))
        ));
    }
}

mod create {
    use super::*;

    #[tokio::test]
    async fn test_create_sends_fields_and_returns_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TABLE_PATH))
            .and(body_json(json!({
                "fields": {
                    "title": "Friday Night Laughs",
                    "date_time": "2025-03-14T20:00:00.000Z",
                    "location": "The Laugh Factory",
                    "description": "Stand-up showcase",
                    "comedian": "Jane Doe",
                    "ticket_price": 25.0
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "recNew1",
                "createdTime": "2025-01-01T00:00:00.000Z",
                "fields": {
                    "title": "Friday Night Laughs",
                    "date_time": "2025-03-14T20:00:00.000Z",
                    "location": "The Laugh Factory",
                    "description": "Stand-up showcase",
                    "comedian": "Jane Doe",
                    "ticket_price": 25
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let show = gateway(&server).create(&new_show()).await.unwrap();
        assert_eq!(show.id, "recNew1");
        assert_eq!(show.ticket_price, Some(25.0));
        assert_eq!(show.ticket_url, "");
    }

    #[tokio::test]
    async fn test_create_without_title_makes_no_request() {
        let server = MockServer::start().await;

        let input = ShowInput {
            title: None,
            ..new_show()
        };
        let result = gateway(&server).create(&input).await;

        assert!(matches!(result, Err(Error::Validation(_))));
        let requests = server.received_requests().await.unwrap();
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn test_create_with_bad_price_makes_no_request() {
        let server = MockServer::start().await;

        let input = ShowInput {
            ticket_price: Some(Some(PriceInput::Text("about twenty".into()))),
            ..new_show()
        };
        let result = gateway(&server).create(&input).await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn test_update_sends_only_supplied_field() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/recABC", TABLE_PATH)))
            .and(body_json(json!({"fields": {"location": "X"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "recABC",
                "createdTime": "2024-12-01T00:00:00.000Z",
                "fields": {
                    "title": "Show recABC",
                    "date_time": "2025-03-14T20:00:00.000Z",
                    "location": "X",
                    "description": "Stand-up night"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let input = ShowInput {
            location: Some("X".into()),
            ..ShowInput::default()
        };
        let show = gateway(&server).update("recABC", &input).await.unwrap();

        assert_eq!(show.location, "X");
        assert_eq!(show.title, "Show recABC");
    }

    #[tokio::test]
    async fn test_update_returns_store_normalized_values() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/recABC", TABLE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "recABC",
                "fields": {
                    "title": "Trimmed Title",
                    "date_time": "2025-03-14T20:00:00.000Z",
                    "location": "Club",
                    "description": "Night"
                }
            })))
            .mount(&server)
            .await;

        let input = ShowInput {
            title: Some("  Trimmed Title  ".into()),
            ..ShowInput::default()
        };
        let show = gateway(&server).update("recABC", &input).await.unwrap();
        assert_eq!(show.title, "Trimmed Title");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/recGone", TABLE_PATH)))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "error": {"type": "ROW_DOES_NOT_EXIST", "message": "Record ID recGone does not exist"}
            })))
            .mount(&server)
            .await;

        let input = ShowInput {
            location: Some("X".into()),
            ..ShowInput::default()
        };
        assert!(matches!(
            gateway(&server).update("recGone", &input).await,
            Err(Error::NotFound(_))
        ));
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn test_delete_existing_show() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/recABC", TABLE_PATH)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "recABC", "deleted": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        gateway(&server).delete("recABC").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_show_twice_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/recMissing", TABLE_PATH)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "NOT_FOUND"})))
            .expect(2)
            .mount(&server)
            .await;

        let gateway = gateway(&server);
        assert!(matches!(gateway.delete("recMissing").await, Err(Error::NotFound(_))));
        assert!(matches!(gateway.delete("recMissing").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_is_gateway_error() {
        let gateway = ShowGateway::new(
            AirtableConfig::new("test-key", "appTest").with_api_url("http://127.0.0.1:1/v0"),
        );

        assert!(matches!(
            gateway.delete("recABC").await,
            Err(Error::Gateway { status: None, .. })
        ));
    }
}
