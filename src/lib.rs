pub mod cli;
pub mod codec;
pub mod errors;
pub mod orders;

pub use codec::{WireFormat, decode, encode};
pub use errors::{OrderError, OrderResult};
pub use orders::{FillStatus, Order, OrderType, Side};
