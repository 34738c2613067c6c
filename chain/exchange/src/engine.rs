//! Order lifecycle, escrow orchestration, and commission governance
//!
//! The engine owns the order table, the per-account history, the active
//! index, and the commission pool; nothing else mutates them. Every
//! mutating entry point:
//! 1. acquires the reentrancy guard,
//! 2. validates caller and order state,
//! 3. commits its own bookkeeping BEFORE any outbound ledger call
//!    (fill/cancel) so a reentrant observer sees consistent state,
//! 4. settles all transfer legs atomically through [`AssetBank::transact`]
//!    and restores its bookkeeping if settlement aborts.
//!
//! Escrowed funds live in the token ledgers under a dedicated custody
//! account; makers and takers grant that account allowances the way
//! ERC-20 users approve an exchange contract.

use std::collections::HashMap;

use types::amount::{Amount, CommissionRate};
use types::ids::{AccountId, AssetId, OrderId};
use types::order::{Order, OrderStatus, Side};

use crate::errors::EngineError;
use crate::events::{
    CommissionRateUpdated, CommissionReleased, ExchangeEvent, OrderCancelled, OrderCreated,
    OrderFilled,
};
use crate::index::ActiveOrderIndex;
use crate::security::{AccessControl, ReentrancyGuard};
use crate::token::{AssetBank, TransferLeg};

/// The order-book escrow and settlement engine.
///
/// One engine instance serves one quote asset. Orders trade any
/// registered project asset against that quote asset at the maker's
/// stated price, 1:1, with no partial fills.
#[derive(Debug)]
pub struct ExchangeEngine {
    /// Unit of account; commission is always skimmed from this leg
    quote_asset: AssetId,
    /// Ledger account holding all escrowed funds
    custody: AccountId,
    /// Every order ever created, terminal ones included
    orders: HashMap<OrderId, Order>,
    /// Next order id to allocate; ids are never reused
    next_order_id: u64,
    /// Append-only order ids per maker
    history: HashMap<AccountId, Vec<OrderId>>,
    /// Ids of currently active orders
    active: ActiveOrderIndex,
    /// Rate applied at fill time
    commission_rate: CommissionRate,
    /// Accrued, not-yet-released commission in quote units
    held_commission: Amount,
    /// Call-in-progress flag
    guard: ReentrancyGuard,
    /// Governance role checks
    access: AccessControl,
    /// Emitted events log (append-only)
    events: Vec<ExchangeEvent>,
}

impl ExchangeEngine {
    /// Create an engine with an initial admin, a custody account, and the
    /// quote asset it settles against.
    ///
    /// The custody account must be approved with the oracle of every
    /// gated project asset the engine will escrow.
    pub fn new(admin: AccountId, custody: AccountId, quote_asset: AssetId) -> Self {
        Self {
            quote_asset,
            custody,
            orders: HashMap::new(),
            next_order_id: 1,
            history: HashMap::new(),
            active: ActiveOrderIndex::new(),
            commission_rate: CommissionRate::ZERO,
            held_commission: Amount::ZERO,
            guard: ReentrancyGuard::new(),
            access: AccessControl::new(admin),
            events: Vec::new(),
        }
    }

    // ───────────────────────── Order Creation ─────────────────────────

    /// Publish a sell order: `asset_amount` of the project asset is
    /// escrowed from the maker now, `quote_amount` is what a taker must
    /// pay for it.
    pub fn create_sell_order(
        &mut self,
        bank: &mut AssetBank,
        maker: AccountId,
        asset: AssetId,
        asset_amount: Amount,
        quote_amount: Amount,
    ) -> Result<OrderId, EngineError> {
        self.create_order(bank, maker, asset, asset_amount, quote_amount, Side::Sell)
    }

    /// Publish a buy order: `quote_amount` of the quote asset is escrowed
    /// from the maker now, `asset_amount` is what a taker must deliver.
    pub fn create_buy_order(
        &mut self,
        bank: &mut AssetBank,
        maker: AccountId,
        asset: AssetId,
        asset_amount: Amount,
        quote_amount: Amount,
    ) -> Result<OrderId, EngineError> {
        self.create_order(bank, maker, asset, asset_amount, quote_amount, Side::Buy)
    }

    fn create_order(
        &mut self,
        bank: &mut AssetBank,
        maker: AccountId,
        asset: AssetId,
        asset_amount: Amount,
        quote_amount: Amount,
        side: Side,
    ) -> Result<OrderId, EngineError> {
        if asset_amount.is_zero() || quote_amount.is_zero() {
            return Err(EngineError::InvalidAmount);
        }
        if !self.guard.acquire() {
            return Err(EngineError::Reentrancy);
        }

        // Escrow the offered leg first; no order state exists until the
        // maker's funds are in custody.
        let (escrow_asset, escrow_amount) = match side {
            Side::Sell => (asset.clone(), asset_amount),
            Side::Buy => (self.quote_asset.clone(), quote_amount),
        };
        let escrow =
            TransferLeg::delegated(escrow_asset, self.custody, maker, self.custody, escrow_amount);
        if let Err(err) = bank.transact(&[escrow]) {
            self.guard.release();
            return Err(err.into());
        }

        let id = OrderId::new(self.next_order_id);
        self.next_order_id += 1;
        let order = Order::new(id, maker, asset.clone(), asset_amount, quote_amount, side);
        self.orders.insert(id, order);
        self.history.entry(maker).or_default().push(id);
        self.active.insert(id);
        self.events.push(ExchangeEvent::OrderCreated(OrderCreated {
            order_id: id,
            maker,
            asset,
            asset_amount,
            quote_amount,
            side,
        }));

        self.guard.release();
        Ok(id)
    }

    // ───────────────────────── Settlement ─────────────────────────

    /// Fill an active order as `taker`, settling both legs atomically.
    ///
    /// The commission `floor(quote_amount * rate / 10000)` accrues to the
    /// pool; the maker of a sell order receives the net quote, the taker
    /// of a buy order does. The maker is not forbidden from filling their
    /// own order.
    pub fn fill_order(
        &mut self,
        bank: &mut AssetBank,
        taker: AccountId,
        order_id: OrderId,
    ) -> Result<(), EngineError> {
        if !self.guard.acquire() {
            return Err(EngineError::Reentrancy);
        }
        let order = match self.orders.get(&order_id) {
            None => {
                self.guard.release();
                return Err(EngineError::OrderNotFound { order_id });
            }
            Some(order) if !order.is_active() => {
                self.guard.release();
                return Err(EngineError::OrderNotActive { order_id });
            }
            Some(order) => order.clone(),
        };

        let commission = match self.commission_rate.commission_on(order.quote_amount) {
            Some(commission) => commission,
            None => {
                self.guard.release();
                return Err(EngineError::Overflow);
            }
        };
        // The rate ceiling keeps commission strictly below the quote leg
        let net = match order.quote_amount.checked_sub(commission) {
            Some(net) => net,
            None => {
                self.guard.release();
                return Err(EngineError::Overflow);
            }
        };
        let pool_before = self.held_commission;
        let pool_after = match self.held_commission.checked_add(commission) {
            Some(pool) => pool,
            None => {
                self.guard.release();
                return Err(EngineError::Overflow);
            }
        };

        // Mutate before any outbound ledger call: a reentrant observer
        // sees the order already filled and out of the active set.
        if let Some(stored) = self.orders.get_mut(&order_id) {
            stored.mark_filled();
        }
        self.active.remove(order_id);
        self.held_commission = pool_after;

        let legs = match order.side {
            // Taker pays the quote leg into custody; custody releases the
            // escrowed project asset to the taker and the net quote to
            // the maker.
            Side::Sell => vec![
                TransferLeg::delegated(
                    self.quote_asset.clone(),
                    self.custody,
                    taker,
                    self.custody,
                    order.quote_amount,
                ),
                TransferLeg::direct(order.asset.clone(), self.custody, taker, order.asset_amount),
                TransferLeg::direct(self.quote_asset.clone(), self.custody, order.maker, net),
            ],
            // Taker delivers the project asset straight to the maker;
            // custody pays out the quote leg escrowed at creation.
            Side::Buy => vec![
                TransferLeg::delegated(
                    order.asset.clone(),
                    self.custody,
                    taker,
                    order.maker,
                    order.asset_amount,
                ),
                TransferLeg::direct(self.quote_asset.clone(), self.custody, taker, net),
            ],
        };
        if let Err(err) = bank.transact(&legs) {
            // Settlement aborted: restore status, index membership, pool.
            if let Some(stored) = self.orders.get_mut(&order_id) {
                stored.status = OrderStatus::Active;
            }
            self.active.insert(order_id);
            self.held_commission = pool_before;
            self.guard.release();
            return Err(err.into());
        }

        self.events.push(ExchangeEvent::OrderFilled(OrderFilled {
            order_id,
            taker,
            commission,
            net_quote: net,
        }));
        self.guard.release();
        Ok(())
    }

    // ───────────────────────── Cancellation ─────────────────────────

    /// Cancel an active order and refund the escrowed leg in full to the
    /// maker. Caller must be the maker or hold the admin role. No
    /// commission is charged.
    pub fn cancel_order(
        &mut self,
        bank: &mut AssetBank,
        caller: AccountId,
        order_id: OrderId,
    ) -> Result<(), EngineError> {
        if !self.guard.acquire() {
            return Err(EngineError::Reentrancy);
        }
        let order = match self.orders.get(&order_id) {
            None => {
                self.guard.release();
                return Err(EngineError::OrderNotFound { order_id });
            }
            Some(order) if !order.is_active() => {
                self.guard.release();
                return Err(EngineError::OrderNotActive { order_id });
            }
            Some(order) => order.clone(),
        };
        if caller != order.maker && !self.access.is_admin(&caller) {
            self.guard.release();
            return Err(EngineError::Unauthorized);
        }

        let (refund_asset, refund_amount) = order.escrowed_leg(&self.quote_asset);

        if let Some(stored) = self.orders.get_mut(&order_id) {
            stored.mark_cancelled();
        }
        self.active.remove(order_id);

        let refund = TransferLeg::direct(refund_asset, self.custody, order.maker, refund_amount);
        if let Err(err) = bank.transact(&[refund]) {
            if let Some(stored) = self.orders.get_mut(&order_id) {
                stored.status = OrderStatus::Active;
            }
            self.active.insert(order_id);
            self.guard.release();
            return Err(err.into());
        }

        self.events.push(ExchangeEvent::OrderCancelled(OrderCancelled {
            order_id,
            cancelled_by: caller,
        }));
        self.guard.release();
        Ok(())
    }

    // ───────────────────────── Commission Governance ─────────────────────────

    /// Set the commission rate in basis points. Admin-only; rejects rates
    /// above 1000bps. Orders already filled keep the rate they were
    /// filled at.
    pub fn set_commission_rate(&mut self, caller: AccountId, bps: u16) -> Result<(), EngineError> {
        if !self.guard.acquire() {
            return Err(EngineError::Reentrancy);
        }
        if !self.access.is_admin(&caller) {
            self.guard.release();
            return Err(EngineError::Unauthorized);
        }
        let Some(rate) = CommissionRate::try_new(bps) else {
            self.guard.release();
            return Err(EngineError::RateTooHigh { bps });
        };
        let old_bps = self.commission_rate.bps();
        self.commission_rate = rate;
        self.events
            .push(ExchangeEvent::CommissionRateUpdated(CommissionRateUpdated {
                old_bps,
                new_bps: bps,
                updated_by: caller,
            }));
        self.guard.release();
        Ok(())
    }

    /// Withdraw the entire commission pool to `to`. Admin-only; rejects
    /// an empty pool. Returns the released amount.
    pub fn release_commission(
        &mut self,
        bank: &mut AssetBank,
        caller: AccountId,
        to: AccountId,
    ) -> Result<Amount, EngineError> {
        if !self.guard.acquire() {
            return Err(EngineError::Reentrancy);
        }
        if !self.access.is_admin(&caller) {
            self.guard.release();
            return Err(EngineError::Unauthorized);
        }
        if self.held_commission.is_zero() {
            self.guard.release();
            return Err(EngineError::EmptyCommissionPool);
        }

        let amount = self.held_commission;
        self.held_commission = Amount::ZERO;

        let payout = TransferLeg::direct(self.quote_asset.clone(), self.custody, to, amount);
        if let Err(err) = bank.transact(&[payout]) {
            self.held_commission = amount;
            self.guard.release();
            return Err(err.into());
        }

        self.events
            .push(ExchangeEvent::CommissionReleased(CommissionReleased {
                to,
                amount,
            }));
        self.guard.release();
        Ok(amount)
    }

    /// Current commission rate in basis points.
    pub fn commission_rate(&self) -> u16 {
        self.commission_rate.bps()
    }

    /// Accrued commission not yet released.
    pub fn held_commission(&self) -> Amount {
        self.held_commission
    }

    // ───────────────────────── Enumeration Views ─────────────────────────

    /// Look up any order ever created, terminal ones included.
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// All order ids ever created by an account, in creation order.
    pub fn user_order_ids(&self, account: &AccountId) -> &[OrderId] {
        self.history.get(account).map_or(&[], |ids| ids.as_slice())
    }

    /// An account's currently active orders.
    pub fn user_active_orders(&self, account: &AccountId) -> Vec<&Order> {
        self.user_order_ids(account)
            .iter()
            .filter_map(|id| self.orders.get(id))
            .filter(|order| order.is_active())
            .collect()
    }

    /// Snapshot of all active order ids (unstable order).
    pub fn active_order_ids(&self) -> &[OrderId] {
        self.active.ids()
    }

    /// Snapshot of all active orders (unstable order).
    pub fn active_orders(&self) -> Vec<&Order> {
        self.active
            .ids()
            .iter()
            .filter_map(|id| self.orders.get(id))
            .collect()
    }

    /// The custody account holding escrowed funds.
    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    /// The quote asset this engine settles against.
    pub fn quote_asset(&self) -> &AssetId {
        &self.quote_asset
    }

    // ───────────────────────── Access Control ─────────────────────────

    /// Transfer the admin role to a new account.
    pub fn set_admin(&mut self, caller: AccountId, new_admin: AccountId) -> Result<(), EngineError> {
        if !self.access.transfer_admin(&caller, new_admin) {
            return Err(EngineError::Unauthorized);
        }
        Ok(())
    }

    /// Get the current admin.
    pub fn admin(&self) -> &AccountId {
        self.access.admin()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ExchangeEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ExchangeEvent> {
        std::mem::take(&mut self.events)
    }
}
