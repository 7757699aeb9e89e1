use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{OrderError, OrderResult};

/// Which side of the market the order is on.
///
/// The record format carries this as a boolean: `true` is a buy, `false` a sell.
/// A default-constructed order is a sell, matching an all-zero record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    Buy, // Bid
    #[default]
    Sell, // Ask
}

impl Side {
    pub fn is_buy(self) -> bool {
        self == Side::Buy
    }
}

impl From<bool> for Side {
    fn from(buy: bool) -> Self {
        if buy { Side::Buy } else { Side::Sell }
    }
}

impl From<Side> for bool {
    fn from(side: Side) -> Self {
        side.is_buy()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type derived from the `price` and `stop` fields.
///
/// - `Market`: neither price nor stop is set
/// - `Limit`: only a limit price is set
/// - `Stop`: only a stop price is set
/// - `StopLimit`: both are set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Stop => write!(f, "STOP"),
            OrderType::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

/// Fill state as far as a caller can know it.
///
/// An [`Order`] on its own never knows whether it was filled; that comes from an
/// execution report. [`Order::fill_status`] therefore reports `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillStatus {
    Filled,
    Unfilled,
    Unknown,
}

impl FillStatus {
    /// Status from an execution report's cumulative filled quantity.
    ///
    /// A zero-sized order has nothing to fill, so its status stays `Unknown`.
    pub fn from_filled(filled: i32, size: i32) -> Self {
        if size == 0 {
            FillStatus::Unknown
        } else if filled.unsigned_abs() >= size.unsigned_abs() {
            FillStatus::Filled
        } else {
            FillStatus::Unfilled
        }
    }
}

impl fmt::Display for FillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillStatus::Filled => write!(f, "FILLED"),
            FillStatus::Unfilled => write!(f, "UNFILLED"),
            FillStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A single order as exchanged between a trading application and a broker connector.
///
/// - `price == 0` means no limit price, `stop == 0` means no stop price
/// - `id` is opaque; uniqueness belongs to whoever assigns it
/// - `date`, `time` and `sec` are carried as the caller encodes them
///
/// Classification is always computed from the current field values, so
/// mutating `price` or `stop` changes what the predicates report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: u64,
    pub size: i32,
    pub price: f64,
    pub stop: f64,
    pub side: Side,
    pub symbol: String,
    pub localsymbol: String,
    pub security: String,
    pub exchange: String,
    pub account: String,
    pub currency: String,
    pub comment: String,
    pub tif: String,
    pub date: i32,
    pub time: i32,
    pub sec: i32,
}

impl Order {
    /// Creates a market order for `size` units of `symbol`.
    pub fn new(symbol: impl Into<String>, side: Side, size: i32) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            size,
            ..Self::default()
        }
    }

    pub fn is_limit(&self) -> bool {
        self.price != 0.0
    }

    pub fn is_stop(&self) -> bool {
        self.stop != 0.0
    }

    pub fn is_market(&self) -> bool {
        self.price == 0.0 && self.stop == 0.0
    }

    pub fn order_type(&self) -> OrderType {
        match (self.is_limit(), self.is_stop()) {
            (false, false) => OrderType::Market,
            (true, false) => OrderType::Limit,
            (false, true) => OrderType::Stop,
            (true, true) => OrderType::StopLimit,
        }
    }

    /// Always [`FillStatus::Unknown`]: fill state is not tracked on the order itself.
    pub fn fill_status(&self) -> FillStatus {
        FillStatus::Unknown
    }

    /// Whether the order is structurally usable.
    ///
    /// Requires a symbol, an account, a non-zero size and finite, non-negative
    /// prices. Broker-side rules (margin, tradability) are not checked.
    pub fn is_valid(&self) -> bool {
        self.invalid_reason().is_none()
    }

    /// Opt-in validity check returning the first rule the order breaks.
    pub fn validate(&self) -> OrderResult<()> {
        match self.invalid_reason() {
            Some(reason) => Err(OrderError::InvalidOrder(reason.to_string())),
            None => Ok(()),
        }
    }

    fn invalid_reason(&self) -> Option<&'static str> {
        if self.symbol.trim().is_empty() {
            Some("missing symbol")
        } else if self.account.trim().is_empty() {
            Some("missing account")
        } else if self.size == 0 {
            Some("size must be non-zero")
        } else if !self.price.is_finite() || self.price < 0.0 {
            Some("price must be finite and non-negative")
        } else if !self.stop.is_finite() || self.stop < 0.0 {
            Some("stop must be finite and non-negative")
        } else {
            None
        }
    }
}
