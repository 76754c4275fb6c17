use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use super::numeric::TransportNumber;
use super::{TransportError, push_orders};
use crate::domain::{ERROR_STATUS, OrderId, Orders, StatusResponse};

#[derive(Debug, Clone, Deserialize)]
struct StatusJsonResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    charge: Option<TransportNumber>,
    #[serde(default)]
    remains: Option<TransportNumber>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    start_count: Option<TransportNumber>,
}

impl StatusJsonResponse {
    fn into_domain(self) -> StatusResponse {
        let error = self.error.filter(|error| !error.is_empty());
        let status = match (self.status, &error) {
            (Some(status), _) => Some(status),
            (None, Some(_)) => Some(ERROR_STATUS.to_owned()),
            (None, None) => None,
        };
        StatusResponse {
            status,
            error,
            charge: self.charge.map(TransportNumber::into_string),
            remains: self.remains.map(TransportNumber::into_string),
            currency: self.currency,
            start_count: self.start_count.map(TransportNumber::into_string),
        }
    }
}

pub fn encode_status_form(request: &Orders) -> Vec<(String, String)> {
    let mut params = Vec::new();
    push_orders(&mut params, request);
    params
}

/// Decode a single-order `status` reply. Errors reported by the panel stay inside the payload.
pub fn decode_status_json_response(json: &str) -> Result<StatusResponse, TransportError> {
    let parsed: StatusJsonResponse = serde_json::from_str(json)?;
    Ok(parsed.into_domain())
}

/// Decode a batch `status` reply keyed by order id.
///
/// Every key must be one of the requested ids.
pub fn decode_status_batch_json_response(
    requested: &[OrderId],
    json: &str,
) -> Result<BTreeMap<OrderId, StatusResponse>, TransportError> {
    let parsed: BTreeMap<String, StatusJsonResponse> = serde_json::from_str(json)?;
    let requested = requested.iter().copied().collect::<HashSet<OrderId>>();

    parsed
        .into_iter()
        .map(|(key, value)| {
            let order = match_order_key(&requested, &key)?;
            Ok((order, value.into_domain()))
        })
        .collect()
}

fn match_order_key(requested: &HashSet<OrderId>, key: &str) -> Result<OrderId, TransportError> {
    key.trim()
        .parse::<u64>()
        .ok()
        .map(OrderId::new)
        .filter(|order| requested.contains(order))
        .ok_or_else(|| TransportError::UnknownOrderKey {
            key: key.to_owned(),
        })
}
