//! Transport layer: form encoding and JSON decoding for each panel action.
//!
//! Encoders return only the action-specific fields; `key` and `action` are added by the client.

mod balance;
mod cancel;
mod numeric;
mod order;
mod refill;
mod services;
mod status;

use serde::Deserialize;

pub use balance::{decode_balance_json_response, encode_balance_form};
pub use cancel::{decode_cancel_json_response, encode_cancel_form};
pub use order::{decode_add_order_json_response, encode_add_order_form};
pub use refill::{decode_refill_json_response, encode_refill_form};
pub use services::{decode_services_json_response, encode_services_form};
pub use status::{
    decode_status_batch_json_response, decode_status_json_response, encode_status_form,
};

use crate::domain::{OrderId, Orders};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// The panel answered with a top-level `{"error": "..."}` object.
    #[error("panel error: {message}")]
    Panel { message: String },

    #[error("response contains invalid id: {value}")]
    InvalidId { value: String },

    #[error("response contains unknown order id key: {key}")]
    UnknownOrderKey { key: String },
}

#[derive(Debug, Deserialize)]
struct PanelErrorJson {
    error: String,
}

/// Detect a top-level `{"error": "..."}` reply for actions where an error is not data.
fn check_panel_error(json: &str) -> Result<(), TransportError> {
    match serde_json::from_str::<PanelErrorJson>(json) {
        Ok(parsed) => Err(TransportError::Panel {
            message: parsed.error,
        }),
        Err(_) => Ok(()),
    }
}

fn push_orders(params: &mut Vec<(String, String)>, orders: &Orders) {
    match orders {
        Orders::One(order) => params.push((OrderId::FIELD.to_owned(), order.to_string())),
        Orders::Many(_) => params.push((OrderId::BATCH_FIELD.to_owned(), orders.joined())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_error_is_detected_only_for_error_objects() {
        assert!(matches!(
            check_panel_error(r#"{"error": "Incorrect request"}"#),
            Err(TransportError::Panel { message }) if message == "Incorrect request"
        ));
        assert!(check_panel_error(r#"{"order": 1}"#).is_ok());
        assert!(check_panel_error(r#"[{"service": 1}]"#).is_ok());
        assert!(check_panel_error("not json").is_ok());
    }

    #[test]
    fn push_orders_uses_single_or_batch_field() {
        let mut params = Vec::new();
        push_orders(&mut params, &Orders::one(OrderId::new(5)));
        assert_eq!(params, vec![("order".to_owned(), "5".to_owned())]);

        let mut params = Vec::new();
        let batch = Orders::many(vec![OrderId::new(1), OrderId::new(2)]).unwrap();
        push_orders(&mut params, &batch);
        assert_eq!(params, vec![("orders".to_owned(), "1,2".to_owned())]);
    }
}
