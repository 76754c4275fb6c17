use std::collections::BTreeMap;
use std::fmt;

use crate::domain::validation::ValidationError;
use crate::domain::value::{Link, OrderId, ServiceId};

/// Maximum number of order ids the panel accepts in one `status`/`refill`/`cancel` request.
pub const MAX_ORDERS_PER_REQUEST: usize = 100;

/// Form field name for the order quantity.
pub const QUANTITY_FIELD: &str = "quantity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Panel action (`action` form field).
pub enum Action {
    Services,
    Add,
    Status,
    Refill,
    Balance,
    Cancel,
}

impl Action {
    /// Form field name used by the panel (`action`).
    pub const FIELD: &'static str = "action";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Add => "add",
            Self::Status => "status",
            Self::Refill => "refill",
            Self::Balance => "balance",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RESERVED_FIELDS: [&str; 5] = [
    crate::domain::ApiKey::FIELD,
    Action::FIELD,
    ServiceId::FIELD,
    Link::FIELD,
    QUANTITY_FIELD,
];

#[derive(Debug, Clone)]
/// Request for the `add` action.
///
/// Invariants: the service id is positive and the link is non-empty.
pub struct AddOrder {
    service: ServiceId,
    link: Link,
    quantity: Option<u64>,
    extra: BTreeMap<String, String>,
}

impl AddOrder {
    pub fn new(service: ServiceId, link: impl Into<String>) -> Result<Self, ValidationError> {
        if service.get() == 0 {
            return Err(ValidationError::NotPositive {
                field: ServiceId::FIELD,
            });
        }
        Ok(Self {
            service,
            link: Link::new(link)?,
            quantity: None,
            extra: BTreeMap::new(),
        })
    }

    /// Set the quantity sent with the order. `None` omits the field entirely.
    pub fn with_quantity(mut self, quantity: Option<u64>) -> Self {
        self.quantity = quantity;
        self
    }

    /// Attach a service-specific panel parameter (`runs`, `interval`, `comments`, ...).
    pub fn with_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "param" });
        }
        if RESERVED_FIELDS.contains(&trimmed) {
            return Err(ValidationError::ReservedParam {
                name: trimmed.to_owned(),
            });
        }
        self.extra.insert(trimmed.to_owned(), value.into());
        Ok(self)
    }

    pub fn service(&self) -> ServiceId {
        self.service
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn quantity(&self) -> Option<u64> {
        self.quantity
    }

    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Order ids addressed by `status`, `refill` and `cancel`.
pub enum Orders {
    One(OrderId),
    Many(Vec<OrderId>),
}

impl Orders {
    pub fn one(order: OrderId) -> Self {
        Self::One(order)
    }

    /// Batch of order ids. Must be non-empty and at most [`MAX_ORDERS_PER_REQUEST`].
    pub fn many(orders: Vec<OrderId>) -> Result<Self, ValidationError> {
        if orders.is_empty() {
            return Err(ValidationError::Empty {
                field: OrderId::BATCH_FIELD,
            });
        }
        if orders.len() > MAX_ORDERS_PER_REQUEST {
            return Err(ValidationError::TooManyOrders {
                max: MAX_ORDERS_PER_REQUEST,
                actual: orders.len(),
            });
        }
        Ok(Self::Many(orders))
    }

    pub fn ids(&self) -> &[OrderId] {
        match self {
            Self::One(order) => std::slice::from_ref(order),
            Self::Many(orders) => orders,
        }
    }

    pub(crate) fn joined(&self) -> String {
        self.ids()
            .iter()
            .map(OrderId::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
