//! Order DTOs exchanged with the integration API.
//!
//! # Design
//! Field names match the wire format exactly, so no renames are needed.
//! Free-text fields default to empty when the server omits them, while
//! `inserted_at_ts`, `items`, and the item `id`, `name`, `price_cents` and
//! `quantity` are required, and a missing one fails the whole decode. That
//! set is stricter than the server contract, which allows any field to be
//! omitted; a lenient decoder would zero such a field instead. `reference`
//! also defaults to empty, and the client decides what to do with such
//! orders (see `MissingReferencePolicy`).
//!
//! A JSON `null` in place of the `orders` or `items` array decodes as empty,
//! and a `delivery_on` of `null` or `"null"` decodes as absent.
//!
//! `price` and `price_cents` carry the same amount in two encodings. Both
//! come from the server and are never reconciled here.

use std::collections::HashMap;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::date::{self, CalendarDate};

/// A customer order awaiting integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub customer_account_no: String,
    /// Server-formatted timestamp, absent until the remote side confirms.
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
    #[serde(default, deserialize_with = "date::deserialize_optional")]
    pub delivery_on: Option<CalendarDate>,
    /// Seconds since the Unix epoch.
    pub inserted_at_ts: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub supplier_notes: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn has_reference(&self) -> bool {
        !self.reference.is_empty()
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    /// Display price, pre-formatted by the server.
    #[serde(default)]
    pub price: String,
    pub price_cents: i64,
    #[serde(default)]
    pub product_code: String,
    #[serde(deserialize_with = "non_negative")]
    pub quantity: f64,
    #[serde(default)]
    pub units: String,
    /// Preparation notes.
    #[serde(default)]
    pub spec: String,
}

fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value < 0.0 {
        return Err(de::Error::custom(format!(
            "quantity must be non-negative, got {value}"
        )));
    }
    Ok(value)
}

// Required, but `null` stands for an empty array.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Report sent when a local integration attempt fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntegrationError {
    pub order: Order,
    pub error: String,
    pub attempts: u32,
}

/// Orders keyed by reference.
pub type OrderMap = HashMap<String, Order>;

/// Response envelope of the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderList {
    #[serde(deserialize_with = "null_as_empty")]
    pub orders: Vec<Order>,
}

/// Request payload for the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListOrdersRequest {
    pub since: i64,
}

/// Request payload acknowledging integrated orders by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetIntegratedRequest {
    pub orders: Vec<String>,
}
