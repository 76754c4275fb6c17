use std::collections::BTreeMap;

use serde::Deserialize;

use super::numeric::{TransportId, TransportOutcome};
use super::{TransportError, check_panel_error};
use crate::domain::{CancelItem, OrderId, Orders};

#[derive(Debug, Clone, Deserialize)]
struct CancelJsonItem {
    order: TransportId,
    cancel: TransportOutcome,
}

/// `cancel` always takes the comma-joined `orders` field, even for a single id.
pub fn encode_cancel_form(request: &Orders) -> Vec<(String, String)> {
    vec![(OrderId::BATCH_FIELD.to_owned(), request.joined())]
}

pub fn decode_cancel_json_response(
    json: &str,
) -> Result<BTreeMap<OrderId, CancelItem>, TransportError> {
    check_panel_error(json)?;
    let parsed: Vec<CancelJsonItem> = serde_json::from_str(json)?;
    parsed
        .into_iter()
        .map(|item| {
            let order = OrderId::new(item.order.into_u64()?);
            Ok((
                order,
                CancelItem {
                    order,
                    cancel: item.cancel.into_outcome()?,
                },
            ))
        })
        .collect()
}
