//! Engine and token error taxonomy
//!
//! Every failure is surfaced synchronously as a hard failure of the whole
//! operation: validation, state, and authorization errors reject before
//! any mutation, and custody errors roll the operation back entirely.

use thiserror::Error;
use types::ids::OrderId;

/// Errors raised by the order-book engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Order amounts must be positive")]
    InvalidAmount,

    #[error("Commission rate {bps}bps exceeds the 1000bps ceiling")]
    RateTooHigh { bps: u16 },

    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: OrderId },

    #[error("Order {order_id} is not active")]
    OrderNotActive { order_id: OrderId },

    #[error("Unauthorized: caller lacks the required role")]
    Unauthorized,

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Commission pool is empty")]
    EmptyCommissionPool,

    #[error("Arithmetic overflow in commission calculation")]
    Overflow,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

/// Errors raised by the token ledgers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Unknown asset: {asset}")]
    UnknownAsset { asset: String },

    #[error("Insufficient balance for {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: String,
        available: String,
    },

    #[error("Insufficient allowance for {asset}: required {required}, available {available}")]
    InsufficientAllowance {
        asset: String,
        required: String,
        available: String,
    },

    #[error("Account not approved to hold the asset: {account}")]
    NotApproved { account: String },

    #[error("Transfer amount must be positive")]
    InvalidAmount,

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::OrderNotFound {
            order_id: OrderId::new(7),
        };
        assert_eq!(err.to_string(), "Order not found: 7");
    }

    #[test]
    fn test_rate_error_display() {
        let err = EngineError::RateTooHigh { bps: 2_000 };
        assert!(err.to_string().contains("2000"));
    }

    #[test]
    fn test_token_error_display() {
        let err = TokenError::InsufficientBalance {
            asset: "PRJ".to_string(),
            required: "100".to_string(),
            available: "40".to_string(),
        };
        assert!(err.to_string().contains("PRJ"));
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_engine_error_from_token() {
        let token_err = TokenError::InvalidAmount;
        let engine_err: EngineError = token_err.into();
        assert!(matches!(engine_err, EngineError::Token(_)));
    }
}
