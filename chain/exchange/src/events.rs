//! Events emitted by engine operations
//!
//! Events are immutable records appended to the engine's log by every
//! successful state-changing operation.

use serde::{Deserialize, Serialize};
use types::amount::Amount;
use types::ids::{AccountId, AssetId, OrderId};
use types::order::Side;

/// A new order was escrowed and published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub maker: AccountId,
    pub asset: AssetId,
    pub asset_amount: Amount,
    pub quote_amount: Amount,
    pub side: Side,
}

/// An active order was settled by a taker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    pub order_id: OrderId,
    pub taker: AccountId,
    pub commission: Amount,
    pub net_quote: Amount,
}

/// An active order was withdrawn and its escrow refunded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub cancelled_by: AccountId,
}

/// The commission rate was changed by governance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRateUpdated {
    pub old_bps: u16,
    pub new_bps: u16,
    pub updated_by: AccountId,
}

/// The entire commission pool was withdrawn by governance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionReleased {
    pub to: AccountId,
    pub amount: Amount,
}

/// Enum wrapper for all engine events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeEvent {
    OrderCreated(OrderCreated),
    OrderFilled(OrderFilled),
    OrderCancelled(OrderCancelled),
    CommissionRateUpdated(CommissionRateUpdated),
    CommissionReleased(CommissionReleased),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_created_serialization() {
        let event = OrderCreated {
            order_id: OrderId::new(1),
            maker: AccountId::new(),
            asset: AssetId::new("PRJ"),
            asset_amount: Amount::new(100),
            quote_amount: Amount::new(1_000),
            side: Side::Sell,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: OrderCreated = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_order_filled_serialization() {
        let event = OrderFilled {
            order_id: OrderId::new(2),
            taker: AccountId::new(),
            commission: Amount::new(10),
            net_quote: Amount::new(990),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: OrderFilled = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_exchange_event_enum_variant() {
        let event = ExchangeEvent::CommissionReleased(CommissionReleased {
            to: AccountId::new(),
            amount: Amount::new(42),
        });
        assert!(matches!(event, ExchangeEvent::CommissionReleased(_)));
    }

    #[test]
    fn test_rate_updated_serialization() {
        let event = CommissionRateUpdated {
            old_bps: 0,
            new_bps: 100,
            updated_by: AccountId::new(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: CommissionRateUpdated = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }
}
