//! Typed Rust client and order harness for SMM reseller panel HTTP APIs.
//!
//! Panels expose a single form-encoded POST endpoint with the actions
//! `services`, `add`, `status`, `refill`, `balance` and `cancel`. The crate is
//! layered the same way throughout: a domain layer of strong types, a transport
//! layer for wire-format quirks, a client layer that posts and retries, and a
//! workflow layer that runs an order from service selection to a settled status.
//!
//! ```rust,no_run
//! use smm_panel::{ApiKey, Orders, OrderId, SmmClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smm_panel::SmmError> {
//!     let client = SmmClient::new(ApiKey::new("...")?);
//!     let balance = client.balance().await?;
//!     println!("{} {}", balance.balance, balance.currency);
//!
//!     let status = client.status(Orders::one(OrderId::new(23501))).await?;
//!     println!("{status:?}");
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
mod transport;
pub mod workflow;

pub use client::{
    ActionReply, FailureKind, RetryPolicy, SmmClient, SmmClientBuilder, SmmError,
};
pub use config::Settings;
pub use domain::{
    Action, AddOrder, ApiKey, BalanceResponse, CancelItem, Link, OrderId, OrderReply,
    OrderResponse, Orders, RefillResponse, RequestOutcome, Service, ServiceId, StatusResponse,
    ValidationError, parse_numeric,
};
pub use workflow::{
    OrderPlan, OrderSummary, PollOptions, ServiceSelector, WorkflowError, run_order,
    wait_for_status,
};
