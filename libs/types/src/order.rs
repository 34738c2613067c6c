//! Order record and status lifecycle
//!
//! An order escrows exactly one leg at creation: a sell order escrows the
//! project asset, a buy order escrows the quote asset. Status transitions
//! are one-way — Active orders become Filled or Cancelled and never leave
//! a terminal state.

use crate::amount::Amount;
use crate::ids::{AccountId, AssetId, OrderId};
use serde::{Deserialize, Serialize};

/// Order side, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Maker offers the project asset, wants the quote asset
    Sell,
    /// Maker offers the quote asset, wants the project asset
    Buy,
}

/// Order status
///
/// Transitions: Active -> Filled, Active -> Cancelled. Terminal orders
/// remain queryable by id; they only leave the active index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Fillable and cancellable
    Active,
    /// Settled by a taker (terminal)
    Filled,
    /// Withdrawn by the maker or an admin (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A published exchange order
///
/// `asset` names the project-asset ledger being traded; the quote asset is
/// fixed engine-wide. Both amounts are strictly positive at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub maker: AccountId,
    pub asset: AssetId,
    pub asset_amount: Amount,
    pub quote_amount: Amount,
    pub side: Side,
    pub status: OrderStatus,
}

impl Order {
    /// Create a new active order
    pub fn new(
        id: OrderId,
        maker: AccountId,
        asset: AssetId,
        asset_amount: Amount,
        quote_amount: Amount,
        side: Side,
    ) -> Self {
        Self {
            id,
            maker,
            asset,
            asset_amount,
            quote_amount,
            side,
            status: OrderStatus::Active,
        }
    }

    /// Check if the order can still be filled or cancelled
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// The leg escrowed from the maker at creation: (asset, amount)
    pub fn escrowed_leg(&self, quote_asset: &AssetId) -> (AssetId, Amount) {
        match self.side {
            Side::Sell => (self.asset.clone(), self.asset_amount),
            Side::Buy => (quote_asset.clone(), self.quote_amount),
        }
    }

    /// Mark the order filled
    ///
    /// # Panics
    /// Panics if the order is already terminal
    pub fn mark_filled(&mut self) {
        assert!(self.is_active(), "Cannot fill a terminal order");
        self.status = OrderStatus::Filled;
    }

    /// Mark the order cancelled
    ///
    /// # Panics
    /// Panics if the order is already terminal
    pub fn mark_cancelled(&mut self) {
        assert!(self.is_active(), "Cannot cancel a terminal order");
        self.status = OrderStatus::Cancelled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order(side: Side) -> Order {
        Order::new(
            OrderId::new(1),
            AccountId::new(),
            AssetId::new("PRJ"),
            Amount::new(100),
            Amount::new(1_000),
            side,
        )
    }

    #[test]
    fn test_order_created_active() {
        let order = sample_order(Side::Sell);
        assert_eq!(order.status, OrderStatus::Active);
        assert!(order.is_active());
        assert!(!order.status.is_terminal());
    }

    #[test]
    fn test_order_fill_transition() {
        let mut order = sample_order(Side::Sell);
        order.mark_filled();
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.status.is_terminal());
    }

    #[test]
    fn test_order_cancel_transition() {
        let mut order = sample_order(Side::Buy);
        order.mark_cancelled();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.status.is_terminal());
    }

    #[test]
    #[should_panic(expected = "Cannot fill a terminal order")]
    fn test_fill_after_cancel_panics() {
        let mut order = sample_order(Side::Sell);
        order.mark_cancelled();
        order.mark_filled();
    }

    #[test]
    #[should_panic(expected = "Cannot cancel a terminal order")]
    fn test_cancel_after_fill_panics() {
        let mut order = sample_order(Side::Sell);
        order.mark_filled();
        order.mark_cancelled();
    }

    #[test]
    fn test_escrowed_leg_by_side() {
        let quote = AssetId::new("USDQ");

        let sell = sample_order(Side::Sell);
        assert_eq!(
            sell.escrowed_leg(&quote),
            (AssetId::new("PRJ"), Amount::new(100))
        );

        let buy = sample_order(Side::Buy);
        assert_eq!(buy.escrowed_leg(&quote), (quote.clone(), Amount::new(1_000)));
    }

    #[test]
    fn test_order_serialization() {
        let order = sample_order(Side::Sell);
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
