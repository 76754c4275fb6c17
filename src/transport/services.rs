use serde::Deserialize;

use super::numeric::{TransportFlag, TransportId, TransportNumber};
use super::{TransportError, check_panel_error};
use crate::domain::{Service, ServiceId};

#[derive(Debug, Clone, Deserialize)]
struct ServiceJson {
    service: TransportId,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    category: String,
    rate: TransportNumber,
    min: TransportNumber,
    max: TransportNumber,
    #[serde(default)]
    refill: Option<TransportFlag>,
    #[serde(default)]
    cancel: Option<TransportFlag>,
    #[serde(default)]
    dripfeed: Option<TransportFlag>,
}

pub fn encode_services_form() -> Vec<(String, String)> {
    Vec::new()
}

pub fn decode_services_json_response(json: &str) -> Result<Vec<Service>, TransportError> {
    check_panel_error(json)?;
    let parsed: Vec<ServiceJson> = serde_json::from_str(json)?;

    parsed
        .into_iter()
        .map(|item| {
            Ok(Service {
                service: ServiceId::new(item.service.into_u64()?),
                name: item.name,
                kind: item.kind,
                category: item.category,
                rate: item.rate.into_string(),
                min: item.min.into_string(),
                max: item.max.into_string(),
                refill: item.refill.and_then(TransportFlag::into_bool),
                cancel: item.cancel.and_then(TransportFlag::into_bool),
                dripfeed: item.dripfeed.and_then(TransportFlag::into_bool),
            })
        })
        .collect()
}
