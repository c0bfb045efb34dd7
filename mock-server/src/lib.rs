use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, warn};

pub const BASE_PATH: &str = "/api/integration/v1/orders";
pub const DEFAULT_TOKEN: &str = "XXXXX-XXXXX-XXXXX";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub customer_account_no: String,
    #[serde(default)]
    pub confirmed_at: Option<String>,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub delivery_on: Option<String>,
    pub inserted_at_ts: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub supplier_notes: String,
    pub items: Vec<OrderItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: String,
    pub price_cents: i64,
    #[serde(default)]
    pub product_code: String,
    pub quantity: f64,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub spec: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
}

#[derive(Deserialize)]
pub struct ListRequest {
    pub since: i64,
}

#[derive(Deserialize)]
pub struct SetIntegratedRequest {
    pub orders: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderIntegrationError {
    pub order: Order,
    pub error: String,
    pub attempts: u32,
}

/// A request body as the server received it, before decoding.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub token: String,
    /// Orders not yet integrated, in the order they are served.
    pub orders: Vec<Order>,
    pub integrated: Vec<String>,
    pub errors: Vec<OrderIntegrationError>,
    pub requests: Vec<Recorded>,
    /// When set, every route answers with this status and body.
    pub failure: Option<(u16, String)>,
}

pub type Db = Arc<RwLock<MockState>>;

pub fn new_db(token: &str) -> Db {
    Arc::new(RwLock::new(MockState {
        token: token.to_string(),
        ..MockState::default()
    }))
}

pub fn app(db: Db) -> Router {
    Router::new()
        .route(&format!("{BASE_PATH}/list_not_integrated"), post(list_not_integrated))
        .route(&format!("{BASE_PATH}/set_integrated"), post(set_integrated))
        .route(&format!("{BASE_PATH}/set_error"), post(set_error))
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

type Rejection = (StatusCode, String);

async fn list_not_integrated(
    State(db): State<Db>,
    request: Request,
) -> Result<Json<OrderList>, Rejection> {
    let input: ListRequest = accept(&db, request).await?;
    let state = db.read().await;
    let orders = state
        .orders
        .iter()
        .filter(|o| o.inserted_at_ts >= input.since)
        .cloned()
        .collect();
    Ok(Json(OrderList { orders }))
}

async fn set_integrated(State(db): State<Db>, request: Request) -> Result<StatusCode, Rejection> {
    let input: SetIntegratedRequest = accept(&db, request).await?;
    let mut state = db.write().await;
    state.orders.retain(|o| !input.orders.contains(&o.reference));
    state.integrated.extend(input.orders);
    Ok(StatusCode::OK)
}

async fn set_error(State(db): State<Db>, request: Request) -> Result<StatusCode, Rejection> {
    let input: OrderIntegrationError = accept(&db, request).await?;
    db.write().await.errors.push(input);
    Ok(StatusCode::OK)
}

/// Record the request, then apply the failure mode, the auth check and body
/// decoding, in that order.
async fn accept<T: DeserializeOwned>(db: &Db, request: Request) -> Result<T, Rejection> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let body = String::from_utf8_lossy(&bytes).into_owned();
    let path = parts.uri.path().to_string();
    debug!(%path, body_len = body.len(), "received request");

    let mut state = db.write().await;
    state.requests.push(Recorded {
        path,
        authorization: header(&parts.headers, "authorization"),
        body: body.clone(),
    });

    if let Some((status, body)) = &state.failure {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Err((status, body.clone()));
    }
    if !authorized(&parts.headers, &state.token) {
        warn!("rejecting request with invalid credentials");
        return Err((StatusCode::UNAUTHORIZED, "invalid bearer token".to_string()));
    }
    serde_json::from_str(&body).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

fn authorized(headers: &HeaderMap, token: &str) -> bool {
    let bearer = header(headers, "authorization");
    let scheme = header(headers, "x-rekki-authorization-type");
    bearer.as_deref().and_then(|v| v.strip_prefix("Bearer ")) == Some(token)
        && scheme.as_deref() == Some("supplier_api_token")
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
