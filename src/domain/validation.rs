use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty {
        field: &'static str,
    },
    NotPositive {
        field: &'static str,
    },
    ReservedParam {
        name: String,
    },
    TooManyOrders {
        max: usize,
        actual: usize,
    },
    ServiceNotFound {
        id: u64,
    },
    NoServiceMatches {
        needle: String,
    },
    QuantityBelowMin {
        service: u64,
        quantity: u64,
        min: String,
    },
    QuantityAboveMax {
        service: u64,
        quantity: u64,
        max: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::NotPositive { field } => write!(f, "{field} must be a positive integer"),
            Self::ReservedParam { name } => {
                write!(f, "parameter {name} is reserved and cannot be overridden")
            }
            Self::TooManyOrders { max, actual } => {
                write!(f, "too many order ids: {actual} (max {max})")
            }
            Self::ServiceNotFound { id } => write!(f, "service #{id} not found"),
            Self::NoServiceMatches { needle } => {
                write!(f, "no services with a name containing '{needle}'")
            }
            Self::QuantityBelowMin {
                service,
                quantity,
                min,
            } => write!(f, "quantity {quantity} < min {min} for service #{service}"),
            Self::QuantityAboveMax {
                service,
                quantity,
                max,
            } => write!(f, "quantity {quantity} > max {max} for service #{service}"),
        }
    }
}

impl std::error::Error for ValidationError {}
