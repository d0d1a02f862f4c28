//! Stateless client for the bitcoin.tax transactions API.
//!
//! # Design
//! `Client` holds a base URL, immutable credentials, and the injected
//! transport — nothing else, so one client serves concurrent callers. Each
//! operation is split into a `build_*` method that produces an
//! [`HttpRequest`] and a `parse_*` method that consumes an
//! [`HttpResponse`]; the facade methods (`list_transactions`,
//! `add_transactions`) run build → execute → parse as a single at-most-once
//! exchange. No retries, no caching: transport failures, decode failures,
//! and server-side rejections all come back as [`ApiError`] values for the
//! caller to act on.

use std::time::Duration;

use serde_json::Value;

use crate::codec;
use crate::envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::types::{Credentials, Transaction};

/// Production endpoint of the service.
pub const DEFAULT_API_URL: &str = "https://api.bitcoin.tax/v1";

/// The single resource path both operations use.
pub const TRANSACTIONS_PATH: &str = "/transactions";

/// Client for the bitcoin.tax REST API.
///
/// Stateless after construction; credentials and base URL are fixed for
/// its lifetime. `T` is the caller-supplied transport that executes the
/// HTTP round-trips.
#[derive(Debug, Clone)]
pub struct Client<T> {
    base_url: String,
    credentials: Credentials,
    transport: T,
}

impl<T> Client<T> {
    /// A client against the production endpoint.
    pub fn new(credentials: Credentials, transport: T) -> Self {
        Self::with_base_url(credentials, transport, DEFAULT_API_URL)
    }

    /// A client against a non-default endpoint, e.g. a test server.
    pub fn with_base_url(credentials: Credentials, transport: T, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            transport,
        }
    }

    /// GET request for one page of transactions in `tax_year`.
    ///
    /// `start` is the zero-based offset into the server's ordering. A
    /// `limit` of zero is not sent, which lets the server apply its own
    /// default page size. No calendar-plausibility check is applied to
    /// `tax_year` — that is the caller's job.
    pub fn build_list_transactions(
        &self,
        tax_year: u16,
        start: u64,
        limit: u64,
        timeout: Option<Duration>,
    ) -> HttpRequest {
        let mut url = format!(
            "{}{}?taxyear={}&start={}",
            self.base_url, TRANSACTIONS_PATH, tax_year, start
        );
        if limit != 0 {
            url.push_str(&format!("&limit={limit}"));
        }
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: self.headers(),
            body: None,
            timeout,
        }
    }

    /// POST request submitting `txs` as one batch.
    ///
    /// An empty batch is a caller error, rejected before any network
    /// activity.
    pub fn build_add_transactions(
        &self,
        txs: &[Transaction],
        timeout: Option<Duration>,
    ) -> Result<HttpRequest, ApiError> {
        if txs.is_empty() {
            return Err(ApiError::InvalidArgument("transaction batch is empty"));
        }
        let body = Value::Array(txs.iter().map(codec::encode).collect());
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}{}", self.base_url, TRANSACTIONS_PATH),
            headers: self.headers(),
            body: Some(body.to_string()),
            timeout,
        })
    }

    /// Decode a list response into the page of transactions and the
    /// server-side total, which may exceed the page length.
    pub fn parse_list_transactions(
        &self,
        response: HttpResponse,
    ) -> Result<(Vec<Transaction>, u64), ApiError> {
        let data = check_status(response).and_then(|body| envelope::decode(&body))?;
        let txs = data
            .transactions
            .iter()
            .map(codec::decode)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((txs, data.total))
    }

    /// Decode an add response. Success is binary; the payload carries
    /// nothing the caller needs.
    pub fn parse_add_transactions(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response)
            .and_then(|body| envelope::decode(&body))
            .map(|_| ())
    }

    /// Credential and content-type headers attached to every request.
    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("X-APIKEY".to_string(), self.credentials.key.clone()),
            ("X-APISECRET".to_string(), self.credentials.secret.clone()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
    }
}

impl<T: HttpTransport> Client<T> {
    /// Fetch one page of transactions for `tax_year`.
    ///
    /// Returns the page in server order plus the total count of matching
    /// records on the server. `timeout` bounds the whole exchange;
    /// expiry surfaces as [`ApiError::DeadlineExceeded`].
    pub fn list_transactions(
        &self,
        tax_year: u16,
        start: u64,
        limit: u64,
        timeout: Option<Duration>,
    ) -> Result<(Vec<Transaction>, u64), ApiError> {
        let request = self.build_list_transactions(tax_year, start, limit, timeout);
        let response = self.transport.execute(&request)?;
        self.parse_list_transactions(response)
    }

    /// Submit `txs` as one all-or-nothing batch.
    pub fn add_transactions(
        &self,
        txs: &[Transaction],
        timeout: Option<Duration>,
    ) -> Result<(), ApiError> {
        let request = self.build_add_transactions(txs, timeout)?;
        let response = self.transport.execute(&request)?;
        self.parse_add_transactions(response)
    }
}

/// The service reports every application-level outcome through a 200
/// envelope; anything else never reached it and is not envelope material.
fn check_status(response: HttpResponse) -> Result<String, ApiError> {
    if response.status == 200 {
        return Ok(response.body);
    }
    Err(ApiError::UnexpectedStatus {
        status: response.status,
        body: response.body,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::error::TransportError;
    use crate::types::TxAction;

    /// Transport stub that counts executions and replays a canned result.
    struct StubTransport {
        calls: Cell<usize>,
        result: fn() -> Result<HttpResponse, TransportError>,
    }

    impl StubTransport {
        fn with(result: fn() -> Result<HttpResponse, TransportError>) -> Self {
            Self {
                calls: Cell::new(0),
                result,
            }
        }
    }

    impl HttpTransport for StubTransport {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.calls.set(self.calls.get() + 1);
            (self.result)()
        }
    }

    fn ok_envelope() -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 200,
            body: r#"{"status":"success","data":{"total":0,"transactions":[]}}"#.to_string(),
        })
    }

    fn client(result: fn() -> Result<HttpResponse, TransportError>) -> Client<StubTransport> {
        Client::with_base_url(
            Credentials::new("k", "s"),
            StubTransport::with(result),
            "http://localhost:3000",
        )
    }

    fn sample_tx() -> Transaction {
        Transaction::new(
            Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
            TxAction::Sell,
            "ETH",
            "EUR",
            1.5,
        )
    }

    #[test]
    fn list_request_has_query_and_credential_headers() {
        let c = client(ok_envelope);
        let req = c.build_list_transactions(2023, 10, 50, None);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/transactions?taxyear=2023&start=10&limit=50"
        );
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![
                ("X-APIKEY".to_string(), "k".to_string()),
                ("X-APISECRET".to_string(), "s".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn zero_limit_is_omitted_from_query() {
        let c = client(ok_envelope);
        let req = c.build_list_transactions(2023, 0, 0, None);
        assert_eq!(
            req.url,
            "http://localhost:3000/transactions?taxyear=2023&start=0"
        );
    }

    #[test]
    fn add_request_is_a_json_array_post() {
        let c = client(ok_envelope);
        let req = c
            .build_add_transactions(&[sample_tx(), sample_tx()], None)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/transactions");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        let arr = body.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["action"], "SELL");
    }

    #[test]
    fn empty_batch_fails_before_any_request() {
        let c = client(ok_envelope);
        let err = c.add_transactions(&[], None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
        assert_eq!(c.transport.calls.get(), 0);
    }

    #[test]
    fn request_carries_caller_timeout() {
        let c = client(ok_envelope);
        let timeout = Some(Duration::from_secs(5));
        let req = c.build_list_transactions(2023, 0, 0, timeout);
        assert_eq!(req.timeout, timeout);
    }

    #[test]
    fn list_decodes_page_and_total() {
        fn page() -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                body: concat!(
                    r#"{"status":"success","data":{"total":130,"transactions":["#,
                    r#"{"date":"2023-06-01T00:00:00Z","action":"SELL","symbol":"ETH","currency":"EUR","volume":1.5},"#,
                    r#"{"date":"2023-06-02T00:00:00Z","action":"BUY","symbol":"BTC","currency":"USD","volume":0.1,"id":"srv-7"}"#,
                    r#"]}}"#
                )
                .to_string(),
            })
        }
        let c = client(page);
        let (txs, total) = c.list_transactions(2023, 100, 50, None).unwrap();
        assert_eq!(total, 130);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].action, TxAction::Sell);
        assert_eq!(txs[1].id.as_deref(), Some("srv-7"));
    }

    #[test]
    fn fail_envelope_surfaces_as_api_error() {
        fn rejected() -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                body: r#"{"status":"fail","data":{"message":"invalid key"}}"#.to_string(),
            })
        }
        let c = client(rejected);
        let err = c.list_transactions(2023, 0, 0, None).unwrap_err();
        match err {
            ApiError::Api { message, .. } => assert_eq!(message, "invalid key"),
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn non_200_surfaces_before_envelope_parse() {
        fn gateway_error() -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 502,
                body: "<html>bad gateway</html>".to_string(),
            })
        }
        let c = client(gateway_error);
        let err = c.list_transactions(2023, 0, 0, None).unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { status: 502, .. }));
    }

    #[test]
    fn transport_deadline_surfaces_as_deadline_exceeded() {
        fn timed_out() -> Result<HttpResponse, TransportError> {
            Err(TransportError::DeadlineExceeded)
        }
        let c = client(timed_out);
        let err = c.list_transactions(2023, 0, 0, None).unwrap_err();
        assert!(matches!(err, ApiError::DeadlineExceeded));
    }

    #[test]
    fn malformed_transaction_in_page_is_a_decode_error() {
        fn drifted() -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                body: concat!(
                    r#"{"status":"success","data":{"total":1,"transactions":["#,
                    r#"{"date":"2023-06-01T00:00:00Z","action":"AIRDROP","symbol":"ETH","currency":"EUR","volume":1.5}"#,
                    r#"]}}"#
                )
                .to_string(),
            })
        }
        let c = client(drifted);
        let err = c.list_transactions(2023, 0, 0, None).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn add_discards_success_payload() {
        let c = client(ok_envelope);
        c.add_transactions(&[sample_tx()], None).unwrap();
        assert_eq!(c.transport.calls.get(), 1);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let c = Client::with_base_url(
            Credentials::new("k", "s"),
            StubTransport::with(ok_envelope),
            "http://localhost:3000/",
        );
        let req = c.build_list_transactions(2023, 0, 0, None);
        assert!(req.url.starts_with("http://localhost:3000/transactions?"));
    }
}
