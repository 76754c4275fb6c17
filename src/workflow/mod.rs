//! Order lifecycle: safety gate, balance check, service selection, quantity
//! validation, placement and status polling.

mod poll;
mod quantity;
mod select;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::client::{SmmClient, SmmError};
use crate::config::Settings;
use crate::domain::{AddOrder, OrderId, Service, ServiceId, StatusResponse, ValidationError};

pub use poll::{PollOptions, PollSchedule, wait_for_status};
pub use quantity::validate_quantity;
pub use select::{ServiceSelector, select_service};

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("DRY_RUN=1 is set and this run places real orders; set DRY_RUN=0 or allow dry run to simulate")]
    DryRunBlocked,

    #[error("no balance available ({balance} {currency}); top up before placing real orders")]
    NoBalance { balance: String, currency: String },

    #[error("the panel returned no services")]
    NoServices,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Client(#[from] SmmError),
}

impl WorkflowError {
    /// Process exit code for the order CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::DryRunBlocked => 2,
            Self::NoBalance { .. } => 3,
            Self::NoServices => 4,
            Self::Validation(_) | Self::Client(_) => 1,
        }
    }
}

/// Refuse to continue in dry-run mode unless simulation was explicitly allowed.
pub fn ensure_production_allowed(
    settings: &Settings,
    allow_dry_run: bool,
) -> Result<(), WorkflowError> {
    if settings.dry_run && !allow_dry_run {
        return Err(WorkflowError::DryRunBlocked);
    }
    Ok(())
}

#[derive(Debug, Clone)]
/// What to order and how to follow it up.
pub struct OrderPlan {
    pub selector: ServiceSelector,
    pub link: String,
    pub quantity: Option<u64>,
    pub poll: PollOptions,
    pub allow_dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub id: ServiceId,
    pub name: String,
    pub rate: String,
    pub min: String,
    pub max: String,
}

impl From<&Service> for ServiceSummary {
    fn from(service: &Service) -> Self {
        Self {
            id: service.service,
            name: service.name.clone(),
            rate: service.rate.clone(),
            min: service.min.clone(),
            max: service.max.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of [`run_order`].
pub struct OrderSummary {
    pub service: ServiceSummary,
    pub order_id: OrderId,
    pub final_status: StatusResponse,
    pub dry_run: bool,
}

/// Place one order end to end and poll it until it settles.
pub async fn run_order(
    client: &SmmClient,
    settings: &Settings,
    plan: &OrderPlan,
) -> Result<OrderSummary, WorkflowError> {
    ensure_production_allowed(settings, plan.allow_dry_run)?;

    let balance = client.balance().await?;
    tracing::info!(balance = %balance.balance, currency = %balance.currency, "account balance");
    if !settings.dry_run {
        match balance.amount() {
            Some(amount) if amount <= Decimal::ZERO => {
                return Err(WorkflowError::NoBalance {
                    balance: balance.balance,
                    currency: balance.currency,
                });
            }
            Some(_) => {}
            None => tracing::warn!(
                balance = %balance.balance,
                "balance is not numeric, continuing"
            ),
        }
    }

    let services = client.services().await?;
    if services.is_empty() {
        return Err(WorkflowError::NoServices);
    }

    let service = select_service(&services, &plan.selector)?;
    tracing::info!(
        service = %service.service,
        name = %service.name,
        rate = %service.rate,
        min = %service.min,
        max = %service.max,
        cancel = ?service.cancel,
        refill = ?service.refill,
        "selected service"
    );

    let quantity = validate_quantity(service, plan.quantity)?;
    let request = AddOrder::new(service.service, plan.link.as_str())?.with_quantity(quantity);

    tracing::info!(
        service = %service.service,
        link = %plan.link,
        quantity = ?quantity,
        dry_run = settings.dry_run,
        "placing order"
    );
    let order = client.add_order(request).await?;
    tracing::info!(order = %order.order, simulated = order.simulated, "order placed");

    let final_status = wait_for_status(client, order.order, &plan.poll).await?;

    Ok(OrderSummary {
        service: ServiceSummary::from(service),
        order_id: order.order,
        final_status,
        dry_run: settings.dry_run,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::client::RetryPolicy;
    use crate::client::testing::{RecordingSleeper, ScriptedTransport, test_client};

    use super::*;

    const SERVICES: &str = r#"
    [
      {"service": 1, "name": "Instagram Followers", "type": "Default", "category": "IG", "rate": "2.00", "min": "10", "max": "5000"},
      {"service": 2, "name": "Instagram Likes", "type": "Default", "category": "IG", "rate": "0.50", "min": "20", "max": "1000"}
    ]
    "#;

    fn settings(dry_run: bool) -> Settings {
        Settings {
            dry_run,
            retry: RetryPolicy::none(),
            ..Settings::default()
        }
    }

    fn plan(selector: ServiceSelector, quantity: Option<u64>, allow_dry_run: bool) -> OrderPlan {
        OrderPlan {
            selector,
            link: "https://instagram.com/demo".to_owned(),
            quantity,
            poll: PollOptions::new(Duration::from_secs(10), 3),
            allow_dry_run,
        }
    }

    #[test]
    fn safety_gate_blocks_dry_run_unless_allowed() {
        let err = ensure_production_allowed(&settings(true), false).unwrap_err();
        assert!(matches!(err, WorkflowError::DryRunBlocked));
        assert_eq!(err.exit_code(), 2);

        assert!(ensure_production_allowed(&settings(true), true).is_ok());
        assert!(ensure_production_allowed(&settings(false), false).is_ok());
    }

    #[test]
    fn exit_codes() {
        assert_eq!(WorkflowError::NoServices.exit_code(), 4);
        assert_eq!(
            WorkflowError::NoBalance {
                balance: "0".to_owned(),
                currency: "USD".to_owned()
            }
            .exit_code(),
            3
        );
        assert_eq!(
            WorkflowError::from(ValidationError::ServiceNotFound { id: 1 }).exit_code(),
            1
        );
        assert_eq!(WorkflowError::from(SmmError::MissingApiKey).exit_code(), 1);
    }

    #[tokio::test]
    async fn blocked_dry_run_makes_no_requests() {
        let transport = ScriptedTransport::new();
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), true);

        let err = run_order(
            &client,
            &settings(true),
            &plan(ServiceSelector::Cheapest, None, false),
        )
        .await
        .unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn places_and_polls_a_real_order() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"balance": "12.40", "currency": "USD"}"#);
        transport.reply(200, SERVICES);
        transport.reply(200, r#"{"order": 9001}"#);
        transport.reply(200, r#"{"status": "In progress", "remains": "30"}"#);
        transport.reply(200, r#"{"status": "Completed", "remains": "0", "charge": "0.05"}"#);
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let summary = run_order(
            &client,
            &settings(false),
            &plan(ServiceSelector::NameContains("followers".to_owned()), Some(100), false),
        )
        .await
        .unwrap();

        assert_eq!(summary.service.id, ServiceId::new(1));
        assert_eq!(summary.order_id, OrderId::new(9001));
        assert_eq!(summary.final_status.status.as_deref(), Some("Completed"));
        assert!(!summary.dry_run);
        assert_eq!(
            transport.actions(),
            vec!["balance", "services", "add", "status", "status"]
        );
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(10)]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["service"]["id"], 1);
        assert_eq!(json["service"]["rate"], "2.00");
        assert_eq!(json["order_id"], 9001);
        assert_eq!(json["final_status"]["charge"], "0.05");
        assert_eq!(json["dry_run"], false);
    }

    #[tokio::test]
    async fn allowed_dry_run_simulates_placement() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"balance": "0", "currency": "USD"}"#);
        transport.reply(200, SERVICES);
        transport.reply(200, r#"{"error": "Incorrect order ID"}"#);
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), true);

        let summary = run_order(
            &client,
            &settings(true),
            &plan(ServiceSelector::Cheapest, None, true),
        )
        .await
        .unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.service.id, ServiceId::new(2));
        assert_eq!(summary.final_status.status.as_deref(), Some("Error"));
        assert_eq!(transport.actions(), vec!["balance", "services", "status"]);
    }

    #[tokio::test]
    async fn zero_balance_aborts_before_listing_services() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"balance": "0.00", "currency": "USD"}"#);
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let err = run_order(
            &client,
            &settings(false),
            &plan(ServiceSelector::Cheapest, None, false),
        )
        .await
        .unwrap_err();

        assert_eq!(err.exit_code(), 3);
        assert_eq!(transport.actions(), vec!["balance"]);
    }

    #[tokio::test]
    async fn unparseable_balance_does_not_abort() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"balance": "n/a", "currency": "USD"}"#);
        transport.reply(200, "[]");
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let err = run_order(
            &client,
            &settings(false),
            &plan(ServiceSelector::Cheapest, None, false),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WorkflowError::NoServices));
        assert_eq!(err.exit_code(), 4);
        assert_eq!(transport.actions(), vec!["balance", "services"]);
    }

    #[tokio::test]
    async fn invalid_quantity_never_places_an_order() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"balance": "5", "currency": "USD"}"#);
        transport.reply(200, SERVICES);
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let err = run_order(
            &client,
            &settings(false),
            &plan(ServiceSelector::ById(ServiceId::new(2)), Some(5), false),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::QuantityBelowMin { .. })
        ));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(transport.actions(), vec!["balance", "services"]);
    }

    #[tokio::test]
    async fn panel_errors_surface_as_client_failures() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"error": "Invalid API key"}"#);
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let err = run_order(
            &client,
            &settings(false),
            &plan(ServiceSelector::Cheapest, None, false),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WorkflowError::Client(SmmError::Api { .. })));
        assert_eq!(err.exit_code(), 1);
    }
}
