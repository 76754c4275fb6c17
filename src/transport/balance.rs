use serde::Deserialize;

use super::numeric::TransportNumber;
use super::{TransportError, check_panel_error};
use crate::domain::BalanceResponse;

#[derive(Debug, Clone, Deserialize)]
struct BalanceJsonResponse {
    balance: TransportNumber,
    currency: String,
}

pub fn encode_balance_form() -> Vec<(String, String)> {
    Vec::new()
}

pub fn decode_balance_json_response(json: &str) -> Result<BalanceResponse, TransportError> {
    check_panel_error(json)?;
    let parsed: BalanceJsonResponse = serde_json::from_str(json)?;
    Ok(BalanceResponse {
        balance: parsed.balance.into_string(),
        currency: parsed.currency,
    })
}
