use std::collections::BTreeMap;

use serde::Deserialize;

use super::numeric::{TransportId, TransportOutcome};
use super::{TransportError, check_panel_error, push_orders};
use crate::domain::{OrderId, OrderReply, Orders, RefillResponse};

#[derive(Debug, Clone, Deserialize)]
struct RefillJsonResponse {
    refill: TransportOutcome,
}

#[derive(Debug, Clone, Deserialize)]
struct RefillJsonItem {
    order: TransportId,
    refill: TransportOutcome,
}

pub fn encode_refill_form(request: &Orders) -> Vec<(String, String)> {
    let mut params = Vec::new();
    push_orders(&mut params, request);
    params
}

pub fn decode_refill_json_response(
    request: &Orders,
    json: &str,
) -> Result<OrderReply<RefillResponse>, TransportError> {
    check_panel_error(json)?;
    match request {
        Orders::One(order) => {
            let parsed: RefillJsonResponse = serde_json::from_str(json)?;
            Ok(OrderReply::Single(RefillResponse {
                order: *order,
                refill: parsed.refill.into_outcome()?,
            }))
        }
        Orders::Many(_) => {
            let parsed: Vec<RefillJsonItem> = serde_json::from_str(json)?;
            let refills = parsed
                .into_iter()
                .map(|item| {
                    let order = OrderId::new(item.order.into_u64()?);
                    Ok((
                        order,
                        RefillResponse {
                            order,
                            refill: item.refill.into_outcome()?,
                        },
                    ))
                })
                .collect::<Result<BTreeMap<OrderId, RefillResponse>, TransportError>>()?;
            Ok(OrderReply::Batch(refills))
        }
    }
}
