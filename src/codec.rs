//! Positional text encoding of an [`Order`].
//!
//! A record is one line of 16 comma-separated slots. Position, not name,
//! identifies a field:
//!
//! ```text
//! symbol,side,size,price,stop,user,exchange,account,security,currency,localsymbol,id,tif,date,time,sec
//! ```
//!
//! - `side` is `true` for a buy and `false` for a sell (decoded case-insensitively)
//! - integers are plain decimal, floats use the shortest text that parses back to the same value
//! - the `user` slot carries the order's `comment`
//!
//! Text slots may contain the delimiter. Under [`EscapePolicy::Backslash`] it is
//! written as `\,` (with `\\`, `\n`, `\r` for the escape character and line breaks).
//! Peers that do not understand escapes should use [`EscapePolicy::Reject`], which
//! refuses to encode such orders instead of truncating them.

use std::{fmt, str::FromStr};

use tracing::{debug, warn};

use crate::{
    errors::{OrderError, OrderResult},
    orders::{Order, Side},
};

/// Separator between slots of a record.
pub const DELIMITER: char = ',';

/// Number of slots in every record.
pub const FIELD_COUNT: usize = 16;

const ESCAPE: char = '\\';
const SIDE_BUY: &str = "true";
const SIDE_SELL: &str = "false";

/// Positional slots of the record, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderField {
    Symbol = 0,
    Side,
    Size,
    Price,
    Stop,
    User,
    Exchange,
    Account,
    Security,
    Currency,
    LocalSymbol,
    Id,
    Tif,
    Date,
    Time,
    Sec,
}

impl OrderField {
    pub const ALL: [OrderField; FIELD_COUNT] = [
        OrderField::Symbol,
        OrderField::Side,
        OrderField::Size,
        OrderField::Price,
        OrderField::Stop,
        OrderField::User,
        OrderField::Exchange,
        OrderField::Account,
        OrderField::Security,
        OrderField::Currency,
        OrderField::LocalSymbol,
        OrderField::Id,
        OrderField::Tif,
        OrderField::Date,
        OrderField::Time,
        OrderField::Sec,
    ];

    /// Zero-based position of the slot in a record.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            OrderField::Symbol => "symbol",
            OrderField::Side => "side",
            OrderField::Size => "size",
            OrderField::Price => "price",
            OrderField::Stop => "stop",
            OrderField::User => "user",
            OrderField::Exchange => "exchange",
            OrderField::Account => "account",
            OrderField::Security => "security",
            OrderField::Currency => "currency",
            OrderField::LocalSymbol => "localsymbol",
            OrderField::Id => "id",
            OrderField::Tif => "tif",
            OrderField::Date => "date",
            OrderField::Time => "time",
            OrderField::Sec => "sec",
        }
    }

    /// Free-text slots are copied verbatim (modulo escaping); the rest are parsed.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            OrderField::Symbol
                | OrderField::User
                | OrderField::Exchange
                | OrderField::Account
                | OrderField::Security
                | OrderField::Currency
                | OrderField::LocalSymbol
                | OrderField::Tif
        )
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How text slots containing the delimiter are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapePolicy {
    /// Backslash-escape the delimiter, the backslash itself and line breaks.
    #[default]
    Backslash,
    /// No escaping on the wire; encoding fails if a text slot would break the framing.
    Reject,
}

/// Encoder/decoder for order records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WireFormat {
    pub escape: EscapePolicy,
}

impl WireFormat {
    pub fn new(escape: EscapePolicy) -> Self {
        Self { escape }
    }

    /// Format for peers that split on every delimiter.
    pub fn strict() -> Self {
        Self::new(EscapePolicy::Reject)
    }

    /// Renders `order` as a single record, without a trailing line break.
    pub fn encode(&self, order: &Order) -> OrderResult<String> {
        let mut out = String::with_capacity(96);
        for field in OrderField::ALL {
            if field.index() > 0 {
                out.push(DELIMITER);
            }
            if let Err(e) = self.write_field(&mut out, field, order) {
                warn!("refusing to encode order {}: {}", order.id, e);
                return Err(e);
            }
        }
        debug!("encoded order {}: {}", order.id, out);
        Ok(out)
    }

    /// Parses one record. A single trailing `\n` or `\r\n` is ignored.
    pub fn decode(&self, record: &str) -> OrderResult<Order> {
        let line = strip_line_ending(record);
        match self.decode_line(line) {
            Ok(order) => {
                debug!("decoded order {} ({})", order.id, order.order_type());
                Ok(order)
            }
            Err(e) => {
                warn!("failed to decode order record `{}`: {}", line, e);
                Err(e)
            }
        }
    }

    fn decode_line(&self, line: &str) -> OrderResult<Order> {
        let slots = self.split(line)?;
        if slots.len() != FIELD_COUNT {
            return Err(OrderError::MalformedRecord {
                expected: FIELD_COUNT,
                found: slots.len(),
            });
        }

        let mut order = Order::default();
        for (field, raw) in OrderField::ALL.into_iter().zip(slots) {
            match field {
                OrderField::Symbol => order.symbol = raw,
                OrderField::Side => order.side = parse_side(field, &raw)?,
                OrderField::Size => order.size = parse_slot(field, &raw)?,
                OrderField::Price => order.price = parse_slot(field, &raw)?,
                OrderField::Stop => order.stop = parse_slot(field, &raw)?,
                OrderField::User => order.comment = raw,
                OrderField::Exchange => order.exchange = raw,
                OrderField::Account => order.account = raw,
                OrderField::Security => order.security = raw,
                OrderField::Currency => order.currency = raw,
                OrderField::LocalSymbol => order.localsymbol = raw,
                OrderField::Id => order.id = parse_slot(field, &raw)?,
                OrderField::Tif => order.tif = raw,
                OrderField::Date => order.date = parse_slot(field, &raw)?,
                OrderField::Time => order.time = parse_slot(field, &raw)?,
                OrderField::Sec => order.sec = parse_slot(field, &raw)?,
            }
        }
        Ok(order)
    }

    fn write_field(&self, out: &mut String, field: OrderField, o: &Order) -> OrderResult<()> {
        match field {
            OrderField::Symbol => self.write_text(out, field, &o.symbol)?,
            OrderField::Side => out.push_str(if o.side.is_buy() { SIDE_BUY } else { SIDE_SELL }),
            OrderField::Size => out.push_str(&o.size.to_string()),
            OrderField::Price => out.push_str(&o.price.to_string()),
            OrderField::Stop => out.push_str(&o.stop.to_string()),
            OrderField::User => self.write_text(out, field, &o.comment)?,
            OrderField::Exchange => self.write_text(out, field, &o.exchange)?,
            OrderField::Account => self.write_text(out, field, &o.account)?,
            OrderField::Security => self.write_text(out, field, &o.security)?,
            OrderField::Currency => self.write_text(out, field, &o.currency)?,
            OrderField::LocalSymbol => self.write_text(out, field, &o.localsymbol)?,
            OrderField::Id => out.push_str(&o.id.to_string()),
            OrderField::Tif => self.write_text(out, field, &o.tif)?,
            OrderField::Date => out.push_str(&o.date.to_string()),
            OrderField::Time => out.push_str(&o.time.to_string()),
            OrderField::Sec => out.push_str(&o.sec.to_string()),
        }
        Ok(())
    }

    fn write_text(&self, out: &mut String, field: OrderField, value: &str) -> OrderResult<()> {
        match self.escape {
            EscapePolicy::Backslash => {
                for c in value.chars() {
                    match c {
                        ESCAPE => out.push_str("\\\\"),
                        DELIMITER => out.push_str("\\,"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        c => out.push(c),
                    }
                }
            }
            EscapePolicy::Reject => {
                if value.contains([DELIMITER, '\n', '\r']) {
                    return Err(OrderError::DelimiterInField(field));
                }
                out.push_str(value);
            }
        }
        Ok(())
    }

    /// Splits a line into unescaped slots.
    fn split(&self, line: &str) -> OrderResult<Vec<String>> {
        match self.escape {
            EscapePolicy::Reject => Ok(line.split(DELIMITER).map(str::to_owned).collect()),
            EscapePolicy::Backslash => {
                let mut slots = Vec::with_capacity(FIELD_COUNT);
                let mut current = String::new();
                let mut chars = line.char_indices();
                while let Some((position, c)) = chars.next() {
                    match c {
                        ESCAPE => {
                            let unescaped = match chars.next() {
                                Some((_, ESCAPE)) => ESCAPE,
                                Some((_, DELIMITER)) => DELIMITER,
                                Some((_, 'n')) => '\n',
                                Some((_, 'r')) => '\r',
                                _ => return Err(OrderError::BadEscape { position }),
                            };
                            current.push(unescaped);
                        }
                        DELIMITER => slots.push(std::mem::take(&mut current)),
                        c => current.push(c),
                    }
                }
                slots.push(current);
                Ok(slots)
            }
        }
    }
}

fn strip_line_ending(record: &str) -> &str {
    match record.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => record,
    }
}

fn parse_slot<T: FromStr>(field: OrderField, raw: &str) -> OrderResult<T> {
    raw.parse().map_err(|_| field_error(field, raw))
}

fn parse_side(field: OrderField, raw: &str) -> OrderResult<Side> {
    if raw.eq_ignore_ascii_case(SIDE_BUY) {
        Ok(Side::Buy)
    } else if raw.eq_ignore_ascii_case(SIDE_SELL) {
        Ok(Side::Sell)
    } else {
        Err(field_error(field, raw))
    }
}

fn field_error(field: OrderField, raw: &str) -> OrderError {
    OrderError::FieldParse {
        index: field.index(),
        field,
        value: raw.to_string(),
    }
}

/// Encodes with the default (backslash-escaping) format.
pub fn encode(order: &Order) -> OrderResult<String> {
    WireFormat::default().encode(order)
}

/// Decodes with the default (backslash-escaping) format.
pub fn decode(record: &str) -> OrderResult<Order> {
    WireFormat::default().decode(record)
}

impl Order {
    pub fn to_record(&self) -> OrderResult<String> {
        encode(self)
    }
}

impl FromStr for Order {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = "IBM,false,-200,101.5,0,note,NYSE,ACC9,STK,USD,IBM,7,DAY,20240102,93000,15";

    #[test]
    fn test_field_positions() {
        assert_eq!(OrderField::Symbol.index(), 0);
        assert_eq!(OrderField::User.index(), 5);
        assert_eq!(OrderField::Account.index(), 7);
        assert_eq!(OrderField::Id.index(), 11);
        assert_eq!(OrderField::Sec.index(), FIELD_COUNT - 1);
        for (i, field) in OrderField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
            assert_eq!(OrderField::from_index(i), Some(*field));
        }
        assert_eq!(OrderField::from_index(FIELD_COUNT), None);
    }

    #[test]
    fn test_decode_known_record() {
        let o = decode(RECORD).unwrap();
        assert_eq!(o.symbol, "IBM");
        assert_eq!(o.side, Side::Sell);
        assert_eq!(o.size, -200);
        assert_eq!(o.price, 101.5);
        assert_eq!(o.comment, "note");
        assert_eq!(o.exchange, "NYSE");
        assert_eq!(o.account, "ACC9");
        assert_eq!(o.security, "STK");
        assert_eq!(o.localsymbol, "IBM");
        assert_eq!(o.id, 7);
        assert_eq!(o.tif, "DAY");
        assert_eq!((o.date, o.time, o.sec), (20240102, 93000, 15));
        assert_eq!(encode(&o).unwrap(), RECORD);
    }

    #[test]
    fn test_default_order_encoding() {
        assert_eq!(
            encode(&Order::default()).unwrap(),
            ",false,0,0,0,,,,,,,0,,0,0,0"
        );
    }

    #[test]
    fn test_side_token_is_case_insensitive() {
        let o = decode(&RECORD.replacen("false", "True", 1)).unwrap();
        assert_eq!(o.side, Side::Buy);
    }

    #[test]
    fn test_trailing_line_ending_ignored() {
        let expected = decode(RECORD).unwrap();
        assert_eq!(decode(&format!("{}\n", RECORD)).unwrap(), expected);
        assert_eq!(decode(&format!("{}\r\n", RECORD)).unwrap(), expected);
    }

    #[test]
    fn test_escaped_text_slots() {
        let mut o = decode(RECORD).unwrap();
        o.comment = "a,b\\c\nd\re".into();
        let record = encode(&o).unwrap();
        assert!(record.contains("a\\,b\\\\c\\nd\\re"));
        assert!(!record.contains('\n'));
        assert_eq!(decode(&record).unwrap(), o);
    }

    #[test]
    fn test_bad_escape_is_malformed() {
        let err = decode("IBM\\x,false,0,0,0,,,,,,,0,,0,0,0").unwrap_err();
        assert_eq!(err, OrderError::BadEscape { position: 3 });
        assert!(err.is_malformed());

        let err = decode(",false,0,0,0,,,,,,,0,,0,0,\\").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_strict_format_rejects_delimiter() {
        let mut o = decode(RECORD).unwrap();
        o.exchange = "NY,SE".into();
        let err = WireFormat::strict().encode(&o).unwrap_err();
        assert_eq!(err, OrderError::DelimiterInField(OrderField::Exchange));
        assert_eq!(err.field_index(), Some(6));
    }

    #[test]
    fn test_strict_format_passes_backslash_verbatim() {
        let mut o = decode(RECORD).unwrap();
        o.comment = "C:\\orders".into();
        let strict = WireFormat::strict();
        let record = strict.encode(&o).unwrap();
        assert!(record.contains(",C:\\orders,"));
        assert_eq!(strict.decode(&record).unwrap(), o);
    }
}
