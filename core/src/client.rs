//! Integration client for the supplier order API.
//!
//! # Design
//! `IntegrationClient` holds only immutable configuration: the three endpoint
//! URLs, the token, the missing-reference policy and a transport handle.
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`, both
//! free of I/O. The `OrderIntegrationApi` implementation runs the transport
//! between the two, exactly once per call, racing the caller's
//! `CancelSignal`.

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use tracing::{debug, trace};

use crate::cancel::CancelSignal;
use crate::config::{ApiToken, ClientConfig, MissingReferencePolicy};
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{
    ListOrdersRequest, Order, OrderIntegrationError, OrderList, OrderMap, SetIntegratedRequest,
};

pub const LIST_NOT_INTEGRATED_PATH: &str = "api/integration/v1/orders/list_not_integrated";
pub const SET_INTEGRATED_PATH: &str = "api/integration/v1/orders/set_integrated";
pub const SET_ERROR_PATH: &str = "api/integration/v1/orders/set_error";

pub const AUTH_TYPE_HEADER: &str = "X-REKKI-Authorization-Type";
pub const AUTH_TYPE: &str = "supplier_api_token";

/// The operations a supplier integration loop depends on.
#[async_trait]
pub trait OrderIntegrationApi: Send + Sync {
    /// Orders not yet integrated, inserted at or after `since` (epoch seconds).
    async fn list_not_integrated_orders(
        &self,
        since: i64,
        cancel: &CancelSignal,
    ) -> Result<OrderMap>;

    /// Acknowledge orders as integrated. An empty slice is still sent.
    async fn set_order_integrated(
        &self,
        references: &[String],
        cancel: &CancelSignal,
    ) -> Result<()>;

    /// Report a failed integration attempt.
    async fn set_order_error(
        &self,
        report: &OrderIntegrationError,
        cancel: &CancelSignal,
    ) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct IntegrationClient<T = ReqwestTransport> {
    transport: T,
    list_url: String,
    set_integrated_url: String,
    set_error_url: String,
    token: ApiToken,
    missing_reference: MissingReferencePolicy,
}

impl IntegrationClient<ReqwestTransport> {
    /// Build a client with the default reqwest transport.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.transport)
            .map_err(|e| ApiError::Configuration(format!("unable to build transport: {e}")))?;
        Ok(Self::new(transport, &config.base_url, config.token.clone())?
            .with_missing_reference_policy(config.missing_reference))
    }
}

impl<T: HttpTransport> IntegrationClient<T> {
    pub fn new(transport: T, base_url: &str, token: impl Into<ApiToken>) -> Result<Self> {
        Ok(Self {
            transport,
            list_url: endpoint_url(base_url, LIST_NOT_INTEGRATED_PATH)?,
            set_integrated_url: endpoint_url(base_url, SET_INTEGRATED_PATH)?,
            set_error_url: endpoint_url(base_url, SET_ERROR_PATH)?,
            token: token.into(),
            missing_reference: MissingReferencePolicy::default(),
        })
    }

    pub fn with_missing_reference_policy(mut self, policy: MissingReferencePolicy) -> Self {
        self.missing_reference = policy;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_list_not_integrated_orders(&self, since: i64) -> Result<HttpRequest> {
        self.build_post(&self.list_url, &ListOrdersRequest { since })
    }

    pub fn build_set_order_integrated(&self, references: &[String]) -> Result<HttpRequest> {
        self.build_post(
            &self.set_integrated_url,
            &SetIntegratedRequest {
                orders: references.to_vec(),
            },
        )
    }

    pub fn build_set_order_error(&self, report: &OrderIntegrationError) -> Result<HttpRequest> {
        self.build_post(&self.set_error_url, report)
    }

    /// Decode a listing response. Nothing is returned unless every order in
    /// the body decodes.
    pub fn parse_list_not_integrated_orders(&self, response: HttpResponse) -> Result<OrderMap> {
        check_status(response)
            .and_then(|body| {
                serde_json::from_str::<OrderList>(&body)
                    .map_err(|e| ApiError::Decode(e.to_string()))
            })
            .and_then(|list| collect_orders(list.orders, self.missing_reference))
    }

    pub fn parse_set_order_integrated(&self, response: HttpResponse) -> Result<()> {
        check_status(response).map(|_| ())
    }

    pub fn parse_set_order_error(&self, response: HttpResponse) -> Result<()> {
        check_status(response).map(|_| ())
    }

    fn build_post<B: Serialize + ?Sized>(&self, url: &str, payload: &B) -> Result<HttpRequest> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers: vec![
                ("accept".to_string(), "application/json".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
                (
                    "authorization".to_string(),
                    format!("Bearer {}", self.token.expose_secret()),
                ),
                (AUTH_TYPE_HEADER.to_string(), AUTH_TYPE.to_string()),
            ],
            body,
        })
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: HttpRequest,
        cancel: &CancelSignal,
    ) -> Result<HttpResponse> {
        if cancel.is_cancelled() {
            trace!(operation, "cancelled before dispatch");
            return Err(ApiError::Cancelled);
        }
        debug!(operation, url = %request.url, "dispatching request");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                trace!(operation, "cancelled while awaiting response");
                Err(ApiError::Cancelled)
            }
            result = self.transport.send(request) => {
                let response = result?;
                debug!(
                    operation,
                    status = response.status,
                    body_len = response.body.len(),
                    "received response"
                );
                Ok(response)
            }
        }
    }
}

#[async_trait]
impl<T: HttpTransport> OrderIntegrationApi for IntegrationClient<T> {
    async fn list_not_integrated_orders(
        &self,
        since: i64,
        cancel: &CancelSignal,
    ) -> Result<OrderMap> {
        let request = self.build_list_not_integrated_orders(since)?;
        let response = self.execute("list_not_integrated", request, cancel).await?;
        self.parse_list_not_integrated_orders(response)
    }

    async fn set_order_integrated(
        &self,
        references: &[String],
        cancel: &CancelSignal,
    ) -> Result<()> {
        let request = self.build_set_order_integrated(references)?;
        let response = self.execute("set_integrated", request, cancel).await?;
        self.parse_set_order_integrated(response)
    }

    async fn set_order_error(
        &self,
        report: &OrderIntegrationError,
        cancel: &CancelSignal,
    ) -> Result<()> {
        let request = self.build_set_order_error(report)?;
        let response = self.execute("set_error", request, cancel).await?;
        self.parse_set_order_error(response)
    }
}

/// Join `suffix` onto the path of `base`, keeping any prefix the base has.
fn endpoint_url(base: &str, suffix: &str) -> Result<String> {
    let mut url = Url::parse(base.trim())
        .map_err(|e| ApiError::Configuration(format!("unable to parse host {base:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::Configuration(format!(
            "host {base:?} cannot carry a path"
        )));
    }
    let path = format!("{}/{}", url.path().trim_end_matches('/'), suffix);
    url.set_path(&path);
    Ok(url.into())
}

/// Anything but 200 is a failure; on success the body is handed back.
fn check_status(response: HttpResponse) -> Result<String> {
    if response.status == 200 {
        return Ok(response.body);
    }
    Err(ApiError::Remote {
        status: response.status,
        body: response.body,
    })
}

/// Key orders by reference. Later duplicates replace earlier ones.
fn collect_orders(orders: Vec<Order>, policy: MissingReferencePolicy) -> Result<OrderMap> {
    let mut map = OrderMap::with_capacity(orders.len());
    for (index, order) in orders.into_iter().enumerate() {
        if !order.has_reference() {
            match policy {
                MissingReferencePolicy::Skip => {
                    debug!(index, "skipping listed order without reference");
                    continue;
                }
                MissingReferencePolicy::Reject => {
                    return Err(ApiError::MissingReference { index });
                }
            }
        }
        map.insert(order.reference.clone(), order);
    }
    Ok(map)
}
