use serde::Deserialize;

use super::numeric::TransportId;
use super::{TransportError, check_panel_error};
use crate::domain::{AddOrder, Link, OrderId, OrderResponse, QUANTITY_FIELD, ServiceId};

#[derive(Debug, Clone, Deserialize)]
struct AddOrderJsonResponse {
    order: TransportId,
}

pub fn encode_add_order_form(request: &AddOrder) -> Vec<(String, String)> {
    let mut params = vec![
        (ServiceId::FIELD.to_owned(), request.service().to_string()),
        (Link::FIELD.to_owned(), request.link().as_str().to_owned()),
    ];
    if let Some(quantity) = request.quantity() {
        params.push((QUANTITY_FIELD.to_owned(), quantity.to_string()));
    }
    params.extend(
        request
            .extra()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );
    params
}

pub fn decode_add_order_json_response(json: &str) -> Result<OrderResponse, TransportError> {
    check_panel_error(json)?;
    let parsed: AddOrderJsonResponse = serde_json::from_str(json)?;
    Ok(OrderResponse {
        order: OrderId::new(parsed.order.into_u64()?),
        simulated: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_add_order_form_params() {
        let request = AddOrder::new(ServiceId::new(1), "https://example.com/p/1")
            .unwrap()
            .with_quantity(Some(100))
            .with_param("runs", "2")
            .unwrap()
            .with_param("interval", "5")
            .unwrap();

        assert_eq!(
            encode_add_order_form(&request),
            vec![
                ("service".to_owned(), "1".to_owned()),
                ("link".to_owned(), "https://example.com/p/1".to_owned()),
                ("quantity".to_owned(), "100".to_owned()),
                ("interval".to_owned(), "5".to_owned()),
                ("runs".to_owned(), "2".to_owned()),
            ]
        );
    }

    #[test]
    fn encode_omits_quantity_when_absent() {
        let request = AddOrder::new(ServiceId::new(3), "user").unwrap();
        let params = encode_add_order_form(&request);
        assert!(!params.iter().any(|(k, _)| k == "quantity"));
    }

    #[test]
    fn decode_add_order_accepts_number_or_string_id() {
        let parsed = decode_add_order_json_response(r#"{"order": 23501}"#).unwrap();
        assert_eq!(parsed.order, OrderId::new(23501));
        assert!(!parsed.simulated);

        let parsed = decode_add_order_json_response(r#"{"order": "23502"}"#).unwrap();
        assert_eq!(parsed.order, OrderId::new(23502));
    }

    #[test]
    fn decode_add_order_errors() {
        let err = decode_add_order_json_response(r#"{"error": "Not enough funds on balance"}"#)
            .unwrap_err();
        assert!(matches!(err, TransportError::Panel { .. }));

        let err = decode_add_order_json_response("{}").unwrap_err();
        assert!(matches!(err, TransportError::Json(_)));

        let err = decode_add_order_json_response(r#"{"order": "x1"}"#).unwrap_err();
        assert!(matches!(err, TransportError::InvalidId { .. }));
    }
}
