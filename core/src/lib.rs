//! Client core for the supplier order-integration API.
//!
//! # Overview
//! Suppliers pull orders that are not yet integrated, acknowledge the ones
//! they ingested, and report the ones that failed. Each operation issues one
//! POST through an injected `HttpTransport` and either returns the decoded
//! result or a classified `ApiError`. Nothing is retried, cached or paginated.
//!
//! # Design
//! - `IntegrationClient` holds only read-only configuration, so one instance
//!   can serve concurrent calls.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit and testable.
//! - `CalendarDate` carries the API's bare `YYYY-MM-DD` delivery dates.
//! - The mock-server crate implements the same wire contract independently;
//!   integration tests catch schema drift.

pub mod cancel;
pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use client::{IntegrationClient, OrderIntegrationApi};
pub use config::{ApiToken, ClientConfig, MissingReferencePolicy};
pub use date::{CalendarDate, DateFormatError};
pub use error::{ApiError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{HttpTransport, ReqwestTransport, TransportConfig};
pub use types::{Order, OrderIntegrationError, OrderItem, OrderMap};
