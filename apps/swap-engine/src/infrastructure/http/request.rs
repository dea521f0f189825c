//! HTTP request DTOs.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::use_cases::SubmitOrderCommand;
use crate::domain::order::{OrderStatus, OrderType};
use crate::domain::shared::{OrderId, UserId};

/// Body of `POST /api/v1/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderRequest {
    /// Client-supplied order id; generated when absent.
    #[serde(default)]
    pub order_id: Option<String>,
    /// Requested execution behavior.
    pub order_type: OrderType,
    /// Token being sold.
    pub token_in: String,
    /// Token being bought.
    pub token_out: String,
    /// Amount of `token_in` to swap.
    pub amount_in: Decimal,
    /// Submitting user, when known.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl SubmitOrderRequest {
    /// Convert into the application-layer command.
    #[must_use]
    pub fn into_command(self) -> SubmitOrderCommand {
        SubmitOrderCommand {
            order_id: self.order_id.map(OrderId::new),
            order_type: self.order_type,
            token_in: self.token_in,
            token_out: self.token_out,
            amount_in: self.amount_in,
            user_id: self.user_id.map(UserId::new),
        }
    }
}

/// Query parameters of `GET /api/v1/orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersQuery {
    /// Restrict to one status.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Page size (default 50).
    #[serde(default)]
    pub limit: Option<usize>,
    /// Page offset (default 0).
    #[serde(default)]
    pub offset: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_request_deserializes_camel_case() {
        let json = r#"{
            "orderType": "MARKET",
            "tokenIn": "sol",
            "tokenOut": "usdc",
            "amountIn": "10",
            "userId": "user-1"
        }"#;

        let request: SubmitOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.order_type, OrderType::Market);
        assert_eq!(request.token_in, "sol");
        assert!(request.order_id.is_none());
    }

    #[test]
    fn unknown_order_type_is_rejected() {
        let json = r#"{
            "orderType": "TWAP",
            "tokenIn": "SOL",
            "tokenOut": "USDC",
            "amountIn": "10"
        }"#;

        assert!(serde_json::from_str::<SubmitOrderRequest>(json).is_err());
    }
}
