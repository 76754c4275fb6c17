use rust_decimal::Decimal;

use crate::domain::{Service, ValidationError};

/// Check a requested quantity against the service's `min`/`max`.
///
/// Bounds are truncated toward zero. A bound that does not parse is not enforced.
/// `None` passes through: the panel applies its own default.
pub fn validate_quantity(
    service: &Service,
    quantity: Option<u64>,
) -> Result<Option<u64>, ValidationError> {
    let Some(quantity) = quantity else {
        return Ok(None);
    };
    let requested = Decimal::from(quantity);

    let min = service.min_value().map(|min| min.trunc());
    if let Some(min) = min.filter(|min| requested < *min) {
        return Err(ValidationError::QuantityBelowMin {
            service: service.service.get(),
            quantity,
            min: min.normalize().to_string(),
        });
    }

    let max = service.max_value().map(|max| max.trunc());
    if let Some(max) = max.filter(|max| requested > *max) {
        return Err(ValidationError::QuantityAboveMax {
            service: service.service.get(),
            quantity,
            max: max.normalize().to_string(),
        });
    }

    Ok(Some(quantity))
}
