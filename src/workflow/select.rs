use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::domain::{Service, ServiceId, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
/// How to pick a service from the panel catalogue.
pub enum ServiceSelector {
    /// Exact service id.
    ById(ServiceId),
    /// Cheapest service whose name contains the text, case-insensitively.
    NameContains(String),
    /// Cheapest service overall.
    Cheapest,
}

/// Pick a service. Ties on rate keep catalogue order; unparseable rates sort last.
pub fn select_service<'a>(
    services: &'a [Service],
    selector: &ServiceSelector,
) -> Result<&'a Service, ValidationError> {
    match selector {
        ServiceSelector::ById(id) => services
            .iter()
            .find(|service| service.service == *id)
            .ok_or(ValidationError::ServiceNotFound { id: id.get() }),
        ServiceSelector::NameContains(needle) => {
            let needle_lower = needle.to_lowercase();
            cheapest(
                services
                    .iter()
                    .filter(|service| service.name.to_lowercase().contains(&needle_lower)),
            )
            .ok_or_else(|| ValidationError::NoServiceMatches {
                needle: needle.clone(),
            })
        }
        ServiceSelector::Cheapest => {
            cheapest(services.iter()).ok_or(ValidationError::Empty { field: "services" })
        }
    }
}

fn cheapest<'a>(services: impl Iterator<Item = &'a Service>) -> Option<&'a Service> {
    services.min_by(|a, b| compare_rates(a.rate_value(), b.rate_value()))
}

fn compare_rates(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
