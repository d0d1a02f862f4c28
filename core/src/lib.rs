//! Client library for the bitcoin.tax REST API.
//!
//! # Overview
//! Two operations: paginated listing of a tax year's transactions and
//! all-or-nothing batch submission of new ones, both over an authenticated
//! HTTPS/JSON exchange. The center of the crate is sans-I/O: `build_*`
//! methods produce [`HttpRequest`] values and `parse_*` methods consume
//! [`HttpResponse`] values, while the [`Client`] facade runs the round-trip
//! through whatever [`HttpTransport`] the caller injects.
//!
//! # Design
//! - `Client` is stateless after construction — credentials and base URL
//!   are immutable, so it is safe to share across threads.
//! - The transaction codec pins one canonical date form (RFC 3339, UTC)
//!   and a closed action tag set; anything else is a decode error, never a
//!   silent default.
//! - Every response arrives in the service's `{status, data, message}`
//!   envelope with HTTP 200; the envelope type stays crate-private and is
//!   translated into values or [`ApiError`]s at the boundary.
//! - No retries, no caching, no logging: all failures are returned as
//!   values and policy belongs to the caller.

pub mod client;
pub mod codec;
pub mod error;
pub mod http;
pub mod types;

mod envelope;

pub use client::{Client, DEFAULT_API_URL, TRANSACTIONS_PATH};
pub use error::{ApiError, ApiStatus, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use types::{Credentials, Transaction, TxAction};
