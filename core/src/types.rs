//! Domain types for the bitcoin.tax API.
//!
//! # Design
//! `Transaction` mirrors the wire object but uses `Option` for every field
//! the service treats as optional — presence on the wire is meaningful, so
//! the in-memory type must be able to say "not set" without sentinel values.
//! `TxAction` is a closed enum; decoding an unknown tag is an error rather
//! than a silent default, so schema drift on the remote side is detected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// The taxable-event category of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAction {
    /// Selling crypto-currency to fiat or BTC.
    Sell,
    /// Buying crypto-currency for fiat or BTC.
    Buy,
    /// General income.
    Income,
    /// Income received as a gift or tip.
    GiftIncome,
    /// Income received from mining.
    Mining,
    /// General spending of crypto-currencies.
    Spend,
    /// Spending as a gift or tip.
    Gift,
    /// Spending to a registered charity.
    Donation,
}

impl TxAction {
    /// Every recognized action, in wire-tag order.
    pub const ALL: [TxAction; 8] = [
        TxAction::Sell,
        TxAction::Buy,
        TxAction::Income,
        TxAction::GiftIncome,
        TxAction::Mining,
        TxAction::Spend,
        TxAction::Gift,
        TxAction::Donation,
    ];

    /// The wire tag the service uses for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            TxAction::Sell => "SELL",
            TxAction::Buy => "BUY",
            TxAction::Income => "INCOME",
            TxAction::GiftIncome => "GIFTIN",
            TxAction::Mining => "MINING",
            TxAction::Spend => "SPEND",
            TxAction::Gift => "GIFT",
            TxAction::Donation => "DONATION",
        }
    }
}

impl fmt::Display for TxAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the recognized action tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized action `{}`", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for TxAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// One taxable event, as sent to and received from the service.
///
/// Records built for submission carry `id: None`; records decoded from a
/// list response carry the server-assigned `id`. The service expects at
/// least one of `price` and `total` and derives the other, but the client
/// does not enforce that — the server is authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// When the transaction occurred.
    pub date: DateTime<Utc>,
    /// Taxable-event category.
    pub action: TxAction,
    /// Crypto-asset ticker, e.g. "BTC".
    pub symbol: String,
    /// Fiat or reference-asset code, e.g. "USD".
    pub currency: String,
    /// Number of units of `symbol`; signed.
    pub volume: f64,
    /// Exchange or wallet name, e.g. "Coinbase".
    pub exchange: Option<String>,
    /// Exchange or wallet's own transaction id.
    pub exchange_id: Option<String>,
    /// Price of `symbol` in units of `currency`, if `total` is unknown.
    pub price: Option<f64>,
    /// Total value in `currency`, if `price` is unknown.
    pub total: Option<f64>,
    /// Fee in units of the fee currency; server default is zero.
    pub fee: Option<f64>,
    /// Currency of the fee; server default is `currency`.
    pub fee_currency: Option<String>,
    /// Free-form note.
    pub memo: Option<String>,
    /// Hash from the asset's blockchain.
    pub tx_hash: Option<String>,
    /// Coin address of the sender.
    pub sender: Option<String>,
    /// Coin address of the recipient.
    pub recipient: Option<String>,
    /// Server-assigned identifier; never set on records built locally.
    pub id: Option<String>,
}

impl Transaction {
    /// A transaction with the five required fields set and every optional
    /// field absent, ready to fill in and submit.
    pub fn new(
        date: DateTime<Utc>,
        action: TxAction,
        symbol: impl Into<String>,
        currency: impl Into<String>,
        volume: f64,
    ) -> Self {
        Self {
            date,
            action,
            symbol: symbol.into(),
            currency: currency.into(),
            volume,
            exchange: None,
            exchange_id: None,
            price: None,
            total: None,
            fee: None,
            fee_currency: None,
            memo: None,
            tx_hash: None,
            sender: None,
            recipient: None,
            id: None,
        }
    }
}

/// API credentials, fixed for the client's lifetime.
#[derive(Clone)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}
