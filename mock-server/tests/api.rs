use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, new_db, Db, OrderList, BASE_PATH, DEFAULT_TOKEN};
use tower::ServiceExt;

const ORDER: &str = r#"{"customer_account_no":"","confirmed_at":null,"contact_info":"+31634000000","contact_name":"Rekki Rekki","location_name":"Reki","delivery_address":"Herengracht 514, Amsterdam, 1017 CC","delivery_on":"2020-03-07","inserted_at_ts":1583516677,"notes":"","reference":"rekki-fetch-1","supplier_notes":"","items":[{"id":"52008c36-5b98-4a4d-bc59-9b02c0f9dbb6","name":"Cucumber","price":"0.00","price_cents":0,"product_code":"Cc","quantity":1,"units":"kg","spec":""}]}"#;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn signed_request(endpoint: &str, token: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(format!("{BASE_PATH}/{endpoint}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::ACCEPT, "application/json")
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .header("X-REKKI-Authorization-Type", "supplier_api_token")
        .body(body.to_string())
        .unwrap()
}

async fn seeded_db() -> Db {
    let db = new_db(DEFAULT_TOKEN);
    db.write()
        .await
        .orders
        .push(serde_json::from_str(ORDER).unwrap());
    db
}

// --- list ---

#[tokio::test]
async fn list_empty() {
    let resp = app(new_db(DEFAULT_TOKEN))
        .oneshot(signed_request("list_not_integrated", DEFAULT_TOKEN, r#"{"since":0}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let list: OrderList = body_json(resp).await;
    assert!(list.orders.is_empty());
}

#[tokio::test]
async fn list_filters_by_since() {
    let db = seeded_db().await;

    let resp = app(db.clone())
        .oneshot(signed_request("list_not_integrated", DEFAULT_TOKEN, r#"{"since":0}"#))
        .await
        .unwrap();
    let list: OrderList = body_json(resp).await;
    assert_eq!(list.orders.len(), 1);
    assert_eq!(list.orders[0].reference, "rekki-fetch-1");

    let resp = app(db)
        .oneshot(signed_request(
            "list_not_integrated",
            DEFAULT_TOKEN,
            r#"{"since":1583516678}"#,
        ))
        .await
        .unwrap();
    let list: OrderList = body_json(resp).await;
    assert!(list.orders.is_empty());
}

#[tokio::test]
async fn list_malformed_body_returns_400() {
    let resp = app(new_db(DEFAULT_TOKEN))
        .oneshot(signed_request("list_not_integrated", DEFAULT_TOKEN, r#"{"from":0}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- auth ---

#[tokio::test]
async fn wrong_token_returns_401() {
    let db = new_db(DEFAULT_TOKEN);
    let resp = app(db.clone())
        .oneshot(signed_request("set_integrated", "wrong", r#"{"orders":[]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(db.read().await.integrated.is_empty());
}

#[tokio::test]
async fn missing_auth_type_returns_401() {
    let resp = app(new_db(DEFAULT_TOKEN))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("{BASE_PATH}/list_not_integrated"))
                .header(http::header::AUTHORIZATION, format!("Bearer {DEFAULT_TOKEN}"))
                .body(r#"{"since":0}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- set_integrated ---

#[tokio::test]
async fn set_integrated_removes_orders_and_records_body() {
    let db = seeded_db().await;
    let resp = app(db.clone())
        .oneshot(signed_request(
            "set_integrated",
            DEFAULT_TOKEN,
            r#"{"orders":["rekki-fetch-1"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let state = db.read().await;
    assert!(state.orders.is_empty());
    assert_eq!(state.integrated, vec!["rekki-fetch-1".to_string()]);
    assert_eq!(state.requests[0].body, r#"{"orders":["rekki-fetch-1"]}"#);
}

// --- set_error ---

#[tokio::test]
async fn set_error_records_report() {
    let db = new_db(DEFAULT_TOKEN);
    let body = format!(r#"{{"order":{ORDER},"error":"failed to integrate","attempts":5}}"#);
    let resp = app(db.clone())
        .oneshot(signed_request("set_error", DEFAULT_TOKEN, &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let state = db.read().await;
    assert_eq!(state.errors.len(), 1);
    assert_eq!(state.errors[0].attempts, 5);
    assert_eq!(state.errors[0].order.reference, "rekki-fetch-1");
}

// --- failure mode ---

#[tokio::test]
async fn failure_mode_applies_to_every_route() {
    let db = new_db(DEFAULT_TOKEN);
    db.write().await.failure = Some((500, "boom".to_string()));

    for (endpoint, body) in [
        ("list_not_integrated", r#"{"since":0}"#),
        ("set_integrated", r#"{"orders":[]}"#),
        ("set_error", "{}"),
    ] {
        let resp = app(db.clone())
            .oneshot(signed_request(endpoint, DEFAULT_TOKEN, body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{endpoint}");
        assert_eq!(body_bytes(resp).await, "boom", "{endpoint}");
    }
    assert_eq!(db.read().await.requests.len(), 3);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app(new_db(DEFAULT_TOKEN))
        .oneshot(signed_request("confirm", DEFAULT_TOKEN, "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
