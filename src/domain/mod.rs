//! Domain layer: strong types with validation and invariants (no I/O).

mod numeric;
mod request;
mod response;
mod validation;
mod value;

pub use numeric::parse_numeric;
pub use request::{Action, AddOrder, MAX_ORDERS_PER_REQUEST, Orders, QUANTITY_FIELD};
pub use response::{
    BalanceResponse, CancelItem, ERROR_STATUS, OrderReply, OrderResponse, RefillResponse,
    RequestOutcome, Service, StatusResponse, TERMINAL_STATUSES,
};
pub use validation::ValidationError;
pub use value::{ApiKey, Link, OrderId, ServiceId};
